use super::*;

#[test]
fn empty_json_gives_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.follow_mouse, 1);
    assert!(config.monitor_fallback);
}

#[test]
fn parse_policies_and_rules() {
    let config = Config::from_json(
        r#"{
            "on_focus_under_fullscreen": "redirect",
            "focus_preferred_method": "length",
            "direct_scanout": "games_only",
            "workspace_rules": [
                { "name": "3", "monitor": "HDMI-1", "persistent": true },
                { "name": "web", "monitor": "DP-1", "default": true }
            ],
            "monitor_rules": [
                { "name": "DP-1", "position": { "x": 0.0, "y": 0.0 } },
                { "name": "HDMI-1", "auto_direction": "left" }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(
        config.on_focus_under_fullscreen,
        FocusUnderFullscreen::Redirect
    );
    assert_eq!(config.focus_preferred_method, FocusPreferredMethod::Length);
    assert_eq!(config.direct_scanout, DirectScanout::GamesOnly);
    assert_eq!(config.bound_monitor_name("3"), Some("HDMI-1"));
    assert_eq!(config.bound_monitor_name("4"), None);
    assert_eq!(config.default_workspace_for("DP-1"), Some("web"));
    assert!(config.workspace_rule("3").unwrap().persistent);
    assert_eq!(
        config.monitor_rule("HDMI-1").unwrap().auto_direction,
        AutoDirection::Left
    );
    assert_eq!(
        config.monitor_rule("DP-1").unwrap().position,
        Some(Point::new(0.0, 0.0))
    );
}

#[test]
fn malformed_json_is_an_error() {
    assert!(Config::from_json("{ follow_mouse: }").is_err());
}

#[test]
fn focus_policy_from_raw_clamps() {
    assert_eq!(FocusUnderFullscreen::from_raw(-4), FocusUnderFullscreen::Redirect);
    assert_eq!(FocusUnderFullscreen::from_raw(0), FocusUnderFullscreen::Redirect);
    assert_eq!(FocusUnderFullscreen::from_raw(1), FocusUnderFullscreen::Promote);
    assert_eq!(FocusUnderFullscreen::from_raw(7), FocusUnderFullscreen::Cancel);
}

#[test]
fn border_grab_margin_sums_border_and_extension() {
    let config = Config {
        border_size: 2,
        extend_border_grab_area: 10,
        ..Config::default()
    };
    assert_eq!(config.border_grab_margin(), 12.0);
}

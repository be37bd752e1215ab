mod common;

use common::TestEnv;
use weft::config::{Config, FocusPreferredMethod};
use weft::geometry::{Direction, Point, Rectangle};
use weft::window::{FullscreenMode, WindowProps, WindowSpec};

fn hit_props() -> WindowProps {
    WindowProps::RESERVED_EXTENTS | WindowProps::INPUT_EXTENTS | WindowProps::ALLOW_FLOATING
}

#[test]
fn window_at_finds_window_on_first_monitor() {
    let mut env = TestEnv::new();
    let win = env.map_tiled("term", 100.0, 100.0, 300.0, 200.0);

    assert_eq!(
        env.state.window_at(Point::new(150.0, 150.0), hit_props(), None),
        Some(win)
    );
    assert_eq!(
        env.state.window_at(Point::new(1000.0, 900.0), hit_props(), None),
        None
    );
    assert_eq!(
        env.state
            .window_at(Point::new(150.0, 150.0), hit_props(), Some(win)),
        None
    );
    env.assert_consistent();
}

#[test]
fn floating_window_wins_over_tiled() {
    let mut env = TestEnv::new();
    let tiled = env.map_tiled("tiled", 0.0, 0.0, 1920.0, 1080.0);
    let floating = env.map_floating("float", 500.0, 500.0, 200.0, 200.0);

    let pos = Point::new(600.0, 600.0);
    assert_eq!(env.state.window_at(pos, hit_props(), None), Some(floating));
    assert_eq!(
        env.state.window_at(Point::new(100.0, 100.0), hit_props(), None),
        Some(tiled)
    );
}

#[test]
fn fullscreen_window_shadows_tiled_windows() {
    let mut env = TestEnv::new();
    let a = env.map_tiled("a", 0.0, 0.0, 960.0, 1080.0);
    let b = env.map_tiled("b", 960.0, 0.0, 960.0, 1080.0);
    env.state.set_fullscreen_internal(b, FullscreenMode::FULLSCREEN);

    assert_eq!(
        env.state.window_at(Point::new(100.0, 100.0), hit_props(), None),
        Some(b)
    );
    assert_eq!(
        env.state.window_at(
            Point::new(100.0, 100.0),
            hit_props() | WindowProps::SKIP_FULLSCREEN_PRIORITY,
            None
        ),
        Some(a)
    );
}

#[test]
fn pinned_window_is_hit_on_any_workspace() {
    let mut env = TestEnv::new();
    let pinned = env.map(WindowSpec {
        class: "pip".into(),
        geometry: Rectangle::from_xywh(50.0, 50.0, 100.0, 100.0),
        pinned: true,
        ..WindowSpec::default()
    });
    env.state.switch_workspace("5");

    assert_eq!(
        env.state.window_at(Point::new(60.0, 60.0), hit_props(), None),
        Some(pinned)
    );
    env.assert_consistent();
}

#[test]
fn popups_extend_the_hit_area() {
    let mut env = TestEnv::new();
    let win = env.map(WindowSpec {
        class: "menu-owner".into(),
        geometry: Rectangle::from_xywh(100.0, 100.0, 200.0, 200.0),
        floating: true,
        popups: vec![Rectangle::from_xywh(150.0, 150.0, 100.0, 300.0)],
        ..WindowSpec::default()
    });

    assert_eq!(
        env.state.window_at(Point::new(300.0, 400.0), hit_props(), None),
        Some(win)
    );
}

#[test]
fn monitor_from_vector_falls_back_to_nearest() {
    let env = TestEnv::new();

    assert_eq!(
        env.state.monitor_from_vector(Point::new(2000.0, 10.0)),
        Some(env.hdmi1)
    );
    assert_eq!(
        env.state.monitor_from_vector(Point::new(-500.0, -500.0)),
        Some(env.dp1)
    );
    assert_eq!(
        env.state.monitor_from_vector(Point::new(9000.0, 500.0)),
        Some(env.hdmi1)
    );
    assert_eq!(
        env.state.monitor_from_vector(Point::new(100.0, 5000.0)),
        Some(env.dp1)
    );
}

#[test]
fn edge_mode_prefers_recent_history() {
    let mut env = TestEnv::new();
    let upper = env.map_tiled("upper", 960.0, 0.0, 960.0, 540.0);
    let lower = env.map_tiled("lower", 960.0, 540.0, 960.0, 540.0);
    let left = env.map_tiled("left", 0.0, 0.0, 960.0, 1080.0);

    // lower was focused after upper
    assert_eq!(
        env.state.window_in_direction_of(left, Direction::Right),
        Some(lower)
    );

    env.state.focus_window(Some(upper), None, false);
    env.state.focus_window(Some(left), None, false);
    assert_eq!(
        env.state.window_in_direction_of(left, Direction::Right),
        Some(upper)
    );
    assert_eq!(env.state.window_in_direction_of(left, Direction::Left), None);
}

#[test]
fn edge_mode_by_length_prefers_longest_shared_edge() {
    let mut env = TestEnv::with_config(Config {
        focus_preferred_method: FocusPreferredMethod::Length,
        ..Config::default()
    });
    let short = env.map_tiled("short", 960.0, 0.0, 960.0, 300.0);
    let long = env.map_tiled("long", 960.0, 300.0, 960.0, 780.0);
    let left = env.map_tiled("left", 0.0, 0.0, 960.0, 1080.0);
    env.state.focus_window(Some(short), None, false);

    assert_eq!(
        env.state.window_in_direction_of(left, Direction::Right),
        Some(long)
    );
}

#[test]
fn edge_mode_crosses_to_the_next_monitor() {
    let mut env = TestEnv::new();
    let right_edge = env.map_tiled("dp", 960.0, 0.0, 960.0, 1080.0);
    env.state.focus_monitor(env.hdmi1);
    let other = env.map_tiled("hdmi", 1920.0, 0.0, 1920.0, 1080.0);

    assert_eq!(
        env.state.window_in_direction_of(right_edge, Direction::Right),
        Some(other)
    );
}

#[test]
fn angular_mode_picks_window_in_direction() {
    let mut env = TestEnv::new();
    let source = env.map_floating("source", 100.0, 400.0, 200.0, 200.0);
    let right = env.map_floating("right", 800.0, 420.0, 200.0, 200.0);
    let far_right = env.map_floating("far", 1500.0, 400.0, 200.0, 200.0);
    let above = env.map_floating("above", 110.0, 0.0, 200.0, 200.0);

    assert_eq!(
        env.state.window_in_direction_of(source, Direction::Right),
        Some(right)
    );
    assert_eq!(
        env.state.window_in_direction_of(source, Direction::Up),
        Some(above)
    );
    assert_eq!(
        env.state.window_in_direction_of(far_right, Direction::Left),
        Some(right)
    );
    assert_eq!(env.state.window_in_direction_of(source, Direction::Left), None);
}

#[test]
fn angular_mode_prefers_nearer_window_within_the_threshold() {
    // "near" sits about 0.36 rad off the axis, "far" straight on it
    let layout = |threshold: f64| {
        let mut env = TestEnv::with_config(Config {
            directional_angle_threshold: threshold,
            ..Config::default()
        });
        let source = env.map_floating("source", 0.0, 400.0, 200.0, 200.0);
        let near = env.map_floating("near", 400.0, 550.0, 200.0, 200.0);
        let far = env.map_floating("far", 1400.0, 400.0, 200.0, 200.0);
        (env, source, near, far)
    };

    let (env, source, near, _) = layout(0.5);
    assert_eq!(
        env.state.window_in_direction_of(source, Direction::Right),
        Some(near)
    );

    let (env, source, _, far) = layout(0.1);
    assert_eq!(
        env.state.window_in_direction_of(source, Direction::Right),
        Some(far)
    );
}

#[test]
fn angular_mode_falls_back_to_the_fullscreen_window() {
    let mut env = TestEnv::new();
    let behind = env.map_floating("behind", 1750.0, 450.0, 150.0, 100.0);
    let game = env.map_tiled("game", 0.0, 0.0, 1920.0, 1080.0);
    env.state.set_fullscreen_internal(game, FullscreenMode::FULLSCREEN);
    let popup = env.map_floating("popup", 1500.0, 400.0, 200.0, 200.0);
    assert!(env.state.registry.window(popup).unwrap().created_over_fullscreen);
    assert!(!env.state.registry.window(behind).unwrap().created_over_fullscreen);

    assert_eq!(
        env.state.window_in_direction_of(popup, Direction::Right),
        Some(game)
    );
}

#[test]
fn move_focus_moves_to_adjacent_monitor_when_nothing_is_there() {
    let mut env = TestEnv::new();
    env.state.focus_monitor(env.hdmi1);
    let on_hdmi = env.map_tiled("hdmi", 1920.0, 0.0, 1920.0, 1080.0);
    env.state.focus_monitor(env.dp1);
    let on_dp = env.map_tiled("dp", 0.0, 0.0, 1920.0, 1080.0);
    assert_eq!(env.state.focused_window(), Some(on_dp));

    env.state.move_focus(Direction::Right);
    assert_eq!(env.state.focused_window(), Some(on_hdmi));
    assert_eq!(env.state.focused_monitor(), Some(env.hdmi1));
    env.assert_consistent();
}

#[test]
fn monitor_selectors_resolve() {
    let env = TestEnv::new();
    let state = &env.state;

    assert_eq!(state.monitor_from_string("current"), Some(env.dp1));
    assert_eq!(state.monitor_from_string("r"), Some(env.hdmi1));
    assert_eq!(state.monitor_from_string("left"), None);
    assert_eq!(state.monitor_from_string("+1"), Some(env.hdmi1));
    assert_eq!(state.monitor_from_string("-1"), Some(env.hdmi1));
    assert_eq!(state.monitor_from_string("+2"), Some(env.dp1));
    assert_eq!(state.monitor_from_string("-7"), Some(env.hdmi1));
    assert_eq!(state.monitor_from_string("1"), Some(env.hdmi1));
    assert_eq!(state.monitor_from_string("9"), None);
    assert_eq!(state.monitor_from_string("HDMI-1"), Some(env.hdmi1));
    assert_eq!(state.monitor_from_string("desc:Test output DP"), Some(env.dp1));
    assert_eq!(state.monitor_from_string("nope"), None);
    assert_eq!(state.monitor_in_direction(env.hdmi1, Direction::Left), Some(env.dp1));
    assert_eq!(state.monitor_in_direction(env.dp1, Direction::Down), None);
}

//! Scripted commands for weft
//!
//! Commands are the serializable form of everything an outside driver can ask
//! of the core. Scripts name windows with labels, so a [`CommandExecutor`]
//! keeps the label to [`WindowId`] mapping across a run.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::Config,
    geometry::{Direction, Point},
    monitor::{MonitorId, MonitorSpec},
    state::WeftState,
    window::{FullscreenMode, FullscreenState, WindowId, WindowSpec},
};

/// Result of executing a command
pub type CommandResult = Result<(), CommandError>;

/// Error that can occur during command execution
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// No window carries this label
    UnknownLabel(String),
    /// Label already names a live window
    DuplicateLabel(String),
    /// Monitor selector did not resolve
    MonitorNotFound(String),
    /// Invalid operation
    InvalidOperation(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownLabel(label) => write!(f, "No window labelled '{label}'"),
            CommandError::DuplicateLabel(label) => {
                write!(f, "Label '{label}' is already in use")
            }
            CommandError::MonitorNotFound(selector) => {
                write!(f, "Monitor '{selector}' not found")
            }
            CommandError::InvalidOperation(msg) => write!(f, "Invalid operation: {msg}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// A single scripted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ConnectMonitor {
        #[serde(flatten)]
        spec: MonitorSpec,
    },
    DisconnectMonitor {
        monitor: String,
    },
    MapWindow {
        label: String,
        #[serde(flatten)]
        spec: WindowSpec,
    },
    UnmapWindow {
        label: String,
    },
    DestroyWindow {
        label: String,
    },
    /// Focus a labelled window, or clear focus without a label
    Focus {
        label: Option<String>,
    },
    MoveFocus {
        direction: Direction,
    },
    FocusMonitor {
        monitor: String,
    },
    /// Enter `mode` (0 none, 1 maximized, 2 fullscreen)
    Fullscreen {
        label: String,
        mode: u8,
    },
    ToggleFullscreen {
        label: String,
        mode: u8,
    },
    SetFullscreenState {
        label: String,
        internal: u8,
        client: u8,
    },
    Workspace {
        workspace: String,
    },
    ToggleSpecialWorkspace {
        workspace: String,
    },
    MoveWorkspaceToMonitor {
        workspace: String,
        monitor: String,
    },
    SwapActiveWorkspaces {
        first: String,
        second: String,
    },
    WarpCursor {
        x: f64,
        y: f64,
    },
    ReloadConfig {
        config: Config,
    },
}

impl Command {
    /// Get a description of the command
    pub fn description(&self) -> String {
        match self {
            Command::ConnectMonitor { spec } => format!("Connect monitor {}", spec.name),
            Command::DisconnectMonitor { monitor } => format!("Disconnect monitor {monitor}"),
            Command::MapWindow { label, .. } => format!("Map window '{label}'"),
            Command::UnmapWindow { label } => format!("Unmap window '{label}'"),
            Command::DestroyWindow { label } => format!("Destroy window '{label}'"),
            Command::Focus { label: Some(label) } => format!("Focus window '{label}'"),
            Command::Focus { label: None } => "Clear focus".to_string(),
            Command::MoveFocus { direction } => format!("Move focus {direction}"),
            Command::FocusMonitor { monitor } => format!("Focus monitor {monitor}"),
            Command::Fullscreen { label, mode } => format!("Fullscreen '{label}' mode {mode}"),
            Command::ToggleFullscreen { label, mode } => {
                format!("Toggle fullscreen '{label}' mode {mode}")
            }
            Command::SetFullscreenState {
                label,
                internal,
                client,
            } => format!("Set fullscreen of '{label}' to {internal}/{client}"),
            Command::Workspace { workspace } => format!("Switch to workspace {workspace}"),
            Command::ToggleSpecialWorkspace { workspace } => {
                format!("Toggle special workspace {workspace}")
            }
            Command::MoveWorkspaceToMonitor { workspace, monitor } => {
                format!("Move workspace {workspace} to {monitor}")
            }
            Command::SwapActiveWorkspaces { first, second } => {
                format!("Swap active workspaces of {first} and {second}")
            }
            Command::WarpCursor { x, y } => format!("Warp cursor to ({x}, {y})"),
            Command::ReloadConfig { .. } => "Reload configuration".to_string(),
        }
    }
}

/// Runs commands against a state, resolving window labels
#[derive(Default)]
pub struct CommandExecutor {
    labels: HashMap<String, WindowId>,
    executed: usize,
}

impl fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("labels", &self.labels.len())
            .field("executed", &self.executed)
            .finish()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window behind a label
    pub fn window(&self, label: &str) -> Option<WindowId> {
        self.labels.get(label).copied()
    }

    /// Number of commands executed successfully
    pub fn executed(&self) -> usize {
        self.executed
    }

    fn resolve(&self, label: &str) -> Result<WindowId, CommandError> {
        self.window(label)
            .ok_or_else(|| CommandError::UnknownLabel(label.to_string()))
    }

    fn resolve_monitor(state: &WeftState, selector: &str) -> Result<MonitorId, CommandError> {
        state
            .monitor_from_string(selector)
            .ok_or_else(|| CommandError::MonitorNotFound(selector.to_string()))
    }

    /// Execute a command
    pub fn execute(&mut self, command: &Command, state: &mut WeftState) -> CommandResult {
        debug!("Executing: {}", command.description());
        match command {
            Command::ConnectMonitor { spec } => {
                state.connect_monitor(spec).ok_or_else(|| {
                    CommandError::InvalidOperation(format!("{} is already connected", spec.name))
                })?;
            }
            Command::DisconnectMonitor { monitor } => {
                let id = Self::resolve_monitor(state, monitor)?;
                state.disconnect_monitor(id);
            }
            Command::MapWindow { label, spec } => {
                if self
                    .window(label)
                    .is_some_and(|id| state.registry.windows.contains(id))
                {
                    return Err(CommandError::DuplicateLabel(label.clone()));
                }
                let id = state.map_window(spec).ok_or_else(|| {
                    CommandError::InvalidOperation(format!("could not map '{label}'"))
                })?;
                self.labels.insert(label.clone(), id);
            }
            Command::UnmapWindow { label } => {
                let id = self.resolve(label)?;
                state.unmap_window(id);
            }
            Command::DestroyWindow { label } => {
                let id = self.resolve(label)?;
                state.destroy_window(id);
                self.labels.remove(label);
            }
            Command::Focus { label } => {
                let id = label.as_deref().map(|label| self.resolve(label)).transpose()?;
                state.focus_window(id, None, false);
            }
            Command::MoveFocus { direction } => state.move_focus(*direction),
            Command::FocusMonitor { monitor } => {
                let id = Self::resolve_monitor(state, monitor)?;
                state.focus_monitor(id);
            }
            Command::Fullscreen { label, mode } => {
                let id = self.resolve(label)?;
                state.set_fullscreen_internal(id, FullscreenMode::from_raw_clamped(*mode));
            }
            Command::ToggleFullscreen { label, mode } => {
                let id = self.resolve(label)?;
                state.toggle_fullscreen(id, FullscreenMode::from_raw_clamped(*mode));
            }
            Command::SetFullscreenState {
                label,
                internal,
                client,
            } => {
                let id = self.resolve(label)?;
                state.set_fullscreen_state(
                    id,
                    FullscreenState::new(
                        FullscreenMode::from_raw_clamped(*internal),
                        FullscreenMode::from_raw_clamped(*client),
                    ),
                );
            }
            Command::Workspace { workspace } => state.switch_workspace(workspace),
            Command::ToggleSpecialWorkspace { workspace } => {
                state.toggle_special_workspace(workspace)
            }
            Command::MoveWorkspaceToMonitor { workspace, monitor } => {
                let target = Self::resolve_monitor(state, monitor)?;
                let (id, _) = state.registry.workspace_target(workspace).ok_or_else(|| {
                    CommandError::InvalidOperation(format!("bad workspace '{workspace}'"))
                })?;
                if !state.registry.workspaces.contains(id) {
                    return Err(CommandError::InvalidOperation(format!(
                        "workspace '{workspace}' does not exist"
                    )));
                }
                state.move_workspace_to_monitor(id, target);
            }
            Command::SwapActiveWorkspaces { first, second } => {
                let a = Self::resolve_monitor(state, first)?;
                let b = Self::resolve_monitor(state, second)?;
                state.swap_active_workspaces(a, b);
            }
            Command::WarpCursor { x, y } => {
                state.backends.input.warp_cursor(Point::new(*x, *y));
            }
            Command::ReloadConfig { config } => state.reload_config(config.clone()),
        }
        self.executed += 1;
        Ok(())
    }

    /// Execute a whole script, stopping at the first failing command
    pub fn run(&mut self, commands: &[Command], state: &mut WeftState) -> CommandResult {
        for command in commands {
            self.execute(command, state)?;
        }
        info!("Script finished after {} commands", self.executed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let script = r#"[
            {"command": "connect_monitor", "name": "DP-1"},
            {"command": "map_window", "label": "term", "class": "kitty"},
            {"command": "set_fullscreen_state", "label": "term", "internal": 2, "client": 0},
            {"command": "focus", "label": null},
            {"command": "move_focus", "direction": "left"}
        ]"#;
        let commands: Vec<Command> = serde_json::from_str(script).unwrap();
        assert_eq!(commands.len(), 5);
        match &commands[1] {
            Command::MapWindow { label, spec } => {
                assert_eq!(label, "term");
                assert_eq!(spec.class, "kitty");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            commands[4],
            Command::MoveFocus {
                direction: Direction::Left
            }
        );
    }

    #[test]
    fn descriptions_name_the_target() {
        let command = Command::SwapActiveWorkspaces {
            first: "DP-1".into(),
            second: "HDMI-A-1".into(),
        };
        assert_eq!(
            command.description(),
            "Swap active workspaces of DP-1 and HDMI-A-1"
        );
        assert_eq!(
            CommandError::UnknownLabel("x".into()).to_string(),
            "No window labelled 'x'"
        );
    }
}

//! Error types for weft
//!
//! The coordinators never surface errors across their public API: a lookup
//! miss or a rejected request degrades to `None` or a no-op plus a log line.
//! These types exist for the places where a caller does want to know why,
//! mainly configuration loading and command replay.

use std::fmt;

use crate::monitor::MonitorId;
use crate::window::WindowId;
use crate::workspace::WorkspaceId;

/// Main error type for weft operations
#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    /// Window not found in registry
    #[error("Window {0} not found")]
    WindowNotFound(WindowId),

    /// Workspace not found
    #[error("Workspace {0} not found")]
    WorkspaceNotFound(WorkspaceId),

    /// Monitor not found
    #[error("Monitor {0} not found")]
    MonitorNotFound(MonitorId),

    /// A selector string could not be resolved
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed JSON input
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for weft operations
pub type WeftResult<T> = Result<T, WeftError>;

/// Extension trait for Option to convert to Result with error context
pub trait OptionExt<T> {
    /// Convert None to an error, logging it at debug level
    fn ok_or_log<F>(self, error_fn: F) -> WeftResult<T>
    where
        F: FnOnce() -> WeftError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_log<F>(self, error_fn: F) -> WeftResult<T>
    where
        F: FnOnce() -> WeftError,
    {
        match self {
            Some(val) => Ok(val),
            None => {
                let err = error_fn();
                tracing::debug!("{err}");
                Err(err)
            }
        }
    }
}

/// Helper for operations that should log errors but not propagate them
pub fn log_error<T, E: fmt::Display>(result: Result<T, E>) -> Option<T> {
    match result {
        Ok(val) => Some(val),
        Err(err) => {
            tracing::error!("Operation failed: {err}");
            None
        }
    }
}

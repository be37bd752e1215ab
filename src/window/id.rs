//! Type-safe handles for windows and surfaces
//!
//! Entities never hold references to each other; they hold these handles and
//! resolve them through the registry. A stale handle is an ordinary lookup
//! miss.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for windows
///
/// This ID is guaranteed to be:
/// - Non-zero (can use Option<WindowId> without overhead)
/// - Unique within the compositor lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowId(NonZeroU64);

/// Starts at 1 to ensure NonZeroU64 is always valid
static WINDOW_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl WindowId {
    /// Generate a new unique window ID
    pub fn next() -> Self {
        let id = WINDOW_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        WindowId(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    /// Create a WindowId from a raw value
    ///
    /// Returns None if the value is zero
    pub fn from_raw(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(WindowId)
    }

    /// Get the raw ID value
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window({})", self.0)
    }
}

/// Identifier for a client surface (a window's main surface, a popup, a
/// layer surface or a lock surface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SurfaceId(NonZeroU64);

static SURFACE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl SurfaceId {
    /// Generate a new unique surface ID
    pub fn next() -> Self {
        let id = SURFACE_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        SurfaceId(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    pub fn from_raw(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(SurfaceId)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Surface({:x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_is_unique() {
        let id1 = WindowId::next();
        let id2 = WindowId::next();
        assert_ne!(id1, id2);
    }

    #[test]
    fn window_id_from_raw_rejects_zero() {
        assert!(WindowId::from_raw(0).is_none());
        assert!(WindowId::from_raw(1).is_some());
    }

    #[test]
    fn surface_id_is_unique() {
        let id1 = SurfaceId::next();
        let id2 = SurfaceId::next();
        assert_ne!(id1, id2);
        assert_ne!(id1.get(), 0);
    }
}

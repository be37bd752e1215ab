//! State management module
//!
//! This module contains the core state and its consistency checks.

mod main;
pub mod validation;

pub use main::WeftState;

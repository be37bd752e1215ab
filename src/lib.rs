//! weft - the control core of a dynamic tiling compositor
//!
//! weft owns the compositor's entity registry and the coordinators that act
//! on it, independent of any rendering or protocol stack:
//!
//! - **Spatial resolution**: hit-testing points against windows, and finding
//!   windows and monitors in a direction or by name
//! - **Focus coordination**: keyboard focus, focus history and the policies
//!   that guard it (session lock, grabs, fullscreen windows)
//! - **Fullscreen**: a per-window internal/client mode pair with at most one
//!   fullscreen window per workspace
//! - **Workspace binding**: which monitor shows which workspace, and what
//!   happens on switches, moves, swaps and monitor hot-plug
//!
//! # Architecture
//!
//! - [`registry`]: windows, workspaces and monitors, addressed by id
//! - [`state`]: [`WeftState`], the owner of everything, and its consistency
//!   checks
//! - [`focus`], [`spatial`], [`fullscreen`], [`binding`]: the coordinators,
//!   implemented as methods on [`WeftState`]
//! - [`backend`]: the layout, render, input and activation collaborators,
//!   with headless implementations
//! - [`event`]: the event hook bus and the IPC line stream
//! - [`command`]: scripted commands driving the core

#![warn(rust_2018_idioms)]

pub mod backend;
pub mod binding;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod focus;
pub mod fullscreen;
pub mod geometry;
pub mod monitor;
pub mod registry;
pub mod spatial;
pub mod state;
pub mod window;
pub mod workspace;

pub use state::WeftState;

//! # vshell
//!
//! A minimal interactive shell session. Input lines are queued, executed one at a time by a
//! single background worker, and merged back into a bounded scrollback that a display layer
//! renders once per frame.
//!
//! - [`core`] holds the pure command logic: path navigation, directory listing and the
//!   built-in command interpreter, plus configuration loading.
//! - [`system`] holds the moving parts: storage backends, the session worker and the host
//!   loop that drives a display.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Shared flag raised when a session reaches its terminal state.
/// The host polls it to know when to stop its own loop.
pub type StopToken = Arc<AtomicBool>;

/// Command-line arguments of the `vshell` binary.
pub mod cli;
/// Fixed paths, defaults and file names.
pub mod constants;
pub mod core;
/// Plain data shared across the crate.
pub mod models;
/// Session state guarded for the worker and the display.
pub mod state;
pub mod system;

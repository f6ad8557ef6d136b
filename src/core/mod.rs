// src/core/mod.rs

//! # Command logic
//!
//! Path navigation, directory listing and the built-in interpreter, plus configuration
//! loading. Nothing here owns a thread.

pub mod config_loader;
pub mod interpreter;
pub mod lister;
pub mod navigator;
pub mod paths;

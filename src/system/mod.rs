//! # System Interaction Layer
//!
//! The moving parts around the command logic in [`crate::core`].
//!
//! ## Modules
//!
//! - **`storage`**: The `Storage` seam used by `ls` and `cd`, and its host filesystem
//!   implementation.
//! - **`memory_storage`**: A synthetic in-memory tree rooted at `C:\`, the default backend.
//! - **`session`**: The session core. Owns the scrollback, the FIFO command queue and the
//!   single worker thread that runs commands in submission order.
//! - **`host`**: The `Display` trait and the fixed-cadence loop that feeds input events to a
//!   session and renders a snapshot every frame.
//! - **`terminal`**: A colored stdout display plus stdin and script input sources.

pub mod host;
pub mod memory_storage;
pub mod session;
pub mod storage;
pub mod terminal;

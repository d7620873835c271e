//! HTTP API module.
//!
//! Serves the dashboard views as JSON for an external chart front-end.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;

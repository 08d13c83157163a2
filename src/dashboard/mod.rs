//! Web dashboard module
//!
//! Serves the embedded dashboard page at `/`, with:
//! - Area selector and moving average slider
//! - Contagion and vaccination chart sections with their descriptions
//! - Reload notifications over WebSocket when new data is served

pub mod handler;
pub mod types;
pub mod websocket;

pub use handler::{assets_handler, dashboard_handler};
pub use websocket::websocket_handler;

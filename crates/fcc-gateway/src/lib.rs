//! HTTP gateway for the freeCodeCamp backend exercises.
//!
//! Hosts the URL shortener API together with the timestamp, request header
//! and hello endpoints on a single axum router.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod state;
pub mod timestamp;

pub use app::App;
pub use state::AppState;

//! Core types and traits for the freeCodeCamp URL shortener.
//!
//! This crate provides the shared data model, the registry contract
//! implemented by the storage backends, and the shortener contract used by
//! the HTTP gateway.

pub mod error;
pub mod registry;
pub mod shortcode;
pub mod shortener;

pub use error::{CoreError, ShortenerError, StorageError};
pub use registry::{ReadRegistry, Registry, UrlMapping};
pub use shortcode::ShortCode;
pub use shortener::Shortener;

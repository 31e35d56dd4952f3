//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], which validates and
//! canonicalizes URLs, checks that their host resolves, and allocates
//! sequential short codes through a [`Registry`](fcc_core::Registry).
//! Core types are re-exported from `fcc_core`.

pub mod canonical;
pub mod resolver;
pub mod service;
pub mod settings;

pub use canonical::CanonicalUrl;
pub use fcc_core::{ShortCode, Shortener, ShortenerError, UrlMapping};
pub use resolver::{HostResolver, StaticResolver, TokioResolver};
pub use service::ShortenerService;
pub use settings::ShortenerSettings;

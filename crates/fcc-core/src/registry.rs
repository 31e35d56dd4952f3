use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stored mapping between an original URL and its short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// The canonical form of the shortened URL.
    pub original_url: String,
    /// The code the URL was assigned on first shortening.
    pub short_code: ShortCode,
}

impl UrlMapping {
    pub fn new(original_url: impl Into<String>, short_code: ShortCode) -> Self {
        Self {
            original_url: original_url.into(),
            short_code,
        }
    }
}

/// A read-only view of a registry.
///
/// Lookups never block writers; only allocation is serialized.
#[async_trait]
pub trait ReadRegistry: Send + Sync + 'static {
    /// Looks up the mapping for a canonical URL.
    async fn find_by_original(&self, original_url: &str) -> Result<Option<UrlMapping>>;

    /// Looks up the mapping for a short code.
    async fn find_by_code(&self, code: ShortCode) -> Result<Option<UrlMapping>>;

    /// Returns the highest allocated short code, or `None` if the registry is empty.
    async fn max_code(&self) -> Result<Option<ShortCode>>;
}

#[async_trait]
pub trait Registry: ReadRegistry {
    /// Inserts a mapping with an explicit code.
    ///
    /// Returns `Err(DuplicateKey)` if either the URL or the code already exists.
    async fn insert(&self, mapping: UrlMapping) -> Result<UrlMapping>;

    /// Assigns the next code (`max_code() + 1`, or `1` when empty) to
    /// `original_url` and stores the mapping.
    ///
    /// Reading the maximum and inserting happen as one atomic step with
    /// respect to other allocations. Returns `Err(DuplicateKey)` if the URL
    /// is already registered.
    async fn allocate(&self, original_url: &str) -> Result<UrlMapping>;
}

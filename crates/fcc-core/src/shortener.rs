use crate::registry::UrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Validates `raw_url` and returns its mapping, allocating a new code
    /// only if the canonical URL has never been shortened before.
    async fn shorten(&self, raw_url: &str) -> Result<UrlMapping>;

    /// Returns the original URL stored for `code`.
    /// Fails with `NotFound` if the code was never allocated.
    async fn resolve(&self, code: ShortCode) -> Result<String>;
}

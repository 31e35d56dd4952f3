use fcc_core::ShortenerError;
use std::fmt::Display;
use url::{Host, Url};

/// Longest canonical URL accepted for shortening, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// An absolute `http`/`https` URL in its canonical, re-serialized form.
///
/// Canonicalization is whatever the WHATWG parser produces: scheme and host
/// are lowercased, an empty path becomes `/`, default ports are dropped and
/// non-ASCII characters are percent- or punycode-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    url: Url,
}

impl CanonicalUrl {
    pub fn parse(raw: &str) -> Result<Self, ShortenerError> {
        let url = Url::parse(raw)
            .map_err(|e| ShortenerError::InvalidUrl(format!("'{}' is not an absolute url: {e}", raw)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ShortenerError::InvalidUrl(format!(
                "url scheme must be http or https: {}",
                url.scheme()
            )));
        }

        if url.host().is_none() {
            return Err(ShortenerError::InvalidUrl(format!(
                "url must have a host: {}",
                raw
            )));
        }

        if url.as_str().len() > MAX_URL_LENGTH {
            return Err(ShortenerError::InvalidUrl(format!(
                "url is longer than {} bytes",
                MAX_URL_LENGTH
            )));
        }

        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The host to look up. `None` is unreachable after `parse` succeeded.
    pub fn host(&self) -> Option<Host<&str>> {
        self.url.host()
    }

    /// Explicit port, or the scheme's default.
    pub fn port(&self) -> u16 {
        self.url.port_or_known_default().unwrap_or(80)
    }
}

impl Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}

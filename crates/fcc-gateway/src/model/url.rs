use fcc_core::{ShortCode, UrlMapping};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/shorturl`, accepted as a form or as JSON.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortUrlResponse {
    pub original_url: String,
    pub short_url: ShortCode,
}

impl From<UrlMapping> for ShortUrlResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            original_url: mapping.original_url,
            short_url: mapping.short_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use fcc_core::ShortenerError;

use crate::error::AppError;
use crate::model::ShortenRequest;

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"))
}

/// Reads the `url` field from a JSON body when the request says it is JSON,
/// and from a urlencoded form otherwise.
///
/// A missing field or unreadable body is an invalid url, not a 4xx.
impl<S> FromRequest<S> for ShortenRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json(&req) {
            let Json(body) = Json::<ShortenRequest>::from_request(req, state)
                .await
                .map_err(|e| ShortenerError::InvalidUrl(e.body_text()))?;
            Ok(body)
        } else {
            let Form(body) = Form::<ShortenRequest>::from_request(req, state)
                .await
                .map_err(|e| ShortenerError::InvalidUrl(e.body_text()))?;
            Ok(body)
        }
    }
}

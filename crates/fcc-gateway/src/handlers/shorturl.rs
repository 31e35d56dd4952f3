use crate::error::Result;
use crate::model::{ShortUrlResponse, ShortenRequest};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fcc_core::ShortCode;
use tracing::{info, instrument};

#[instrument(name = "shorten", skip(state, request), fields(url = %request.url))]
pub async fn shorten_handler(
    State(state): State<AppState>,
    request: ShortenRequest,
) -> Result<Json<ShortUrlResponse>> {
    let mapping = state.shortener().shorten(&request.url).await?;
    Ok(Json(mapping.into()))
}

/// Redirects with `302 Found`. A segment that is not a number can never
/// match, so it gets the same answer as an unknown code.
#[instrument(name = "redirect", skip(state))]
pub async fn redirect_handler(
    Path(short_url): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code: ShortCode = short_url.parse()?;

    let original_url = state.shortener().resolve(code).await?;
    info!(code = %code, url = %original_url, "redirecting");
    Ok((StatusCode::FOUND, [(LOCATION, original_url)]).into_response())
}

use crate::model::{ErrorResponse, TimestampResponse};
use crate::timestamp::{format_utc, parse_date};
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jiff::Timestamp;

fn timestamp_response(ts: Timestamp) -> TimestampResponse {
    TimestampResponse {
        unix: ts.as_millisecond(),
        utc: format_utc(ts),
    }
}

pub async fn now_handler() -> Json<TimestampResponse> {
    Json(timestamp_response(Timestamp::now()))
}

pub async fn timestamp_handler(Path(date): Path<String>) -> Response {
    match parse_date(&date) {
        Some(ts) => Json(timestamp_response(ts)).into_response(),
        None => Json(ErrorResponse {
            error: "Invalid Date",
        })
        .into_response(),
    }
}

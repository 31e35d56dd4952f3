use crate::model::WhoamiResponse;
use axum::extract::{ConnectInfo, Request};
use axum::http::header::{ACCEPT_LANGUAGE, USER_AGENT};
use axum::http::HeaderMap;
use axum::Json;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

fn header(headers: &HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Echoes the caller's address, preferred language and user agent.
///
/// The address is the first `X-Forwarded-For` hop when a proxy set one, the
/// peer address otherwise.
pub async fn whoami_handler(request: Request) -> Json<WhoamiResponse> {
    let headers = request.headers();

    let forwarded = header(headers, X_FORWARDED_FOR).and_then(|value| {
        value
            .split(',')
            .map(str::trim)
            .find(|hop| !hop.is_empty())
            .map(String::from)
    });
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    Json(WhoamiResponse {
        ipaddress: forwarded.or(peer),
        language: header(headers, ACCEPT_LANGUAGE),
        software: header(headers, USER_AGENT),
    })
}

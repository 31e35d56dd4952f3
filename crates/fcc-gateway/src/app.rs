use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    hello_handler, now_handler, redirect_handler, shorten_handler, timestamp_handler,
    whoami_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    /// Static segments (`whoami`, `hello`, `shorturl`) take priority over
    /// the `{date}` capture.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/api", get(now_handler))
            .route("/api/hello", get(hello_handler))
            .route("/api/whoami", get(whoami_handler))
            .route("/api/{date}", get(timestamp_handler))
            .route("/api/shorturl", post(shorten_handler))
            .route("/api/shorturl/{short_url}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::header::{CONTENT_TYPE, LOCATION};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use fcc_shortener::{ShortenerService, StaticResolver};
    use fcc_storage::InMemoryRegistry;
    use serde_json::{json, Value};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;
    use tower::util::ServiceExt; // for `oneshot`

    fn test_app() -> Router {
        let addr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
        let resolver = StaticResolver::new()
            .with_host("www.freecodecamp.org", addr)
            .with_host("example.com", addr);
        let shortener = ShortenerService::new(InMemoryRegistry::new(), resolver);
        App::router(AppState::new(Arc::new(shortener)))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn form_post(url: &str) -> Request<Body> {
        let body = format!("url={}", url.replace(':', "%3A").replace('/', "%2F"));
        Request::builder()
            .method("POST")
            .uri("/api/shorturl")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn shorten_with_form_body() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(form_post("https://www.freecodecamp.org"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "original_url": "https://www.freecodecamp.org/", "short_url": 1 })
        );

        // Shortening again returns the same code.
        let response = app
            .oneshot(form_post("https://www.freecodecamp.org"))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "original_url": "https://www.freecodecamp.org/", "short_url": 1 })
        );
    }

    #[tokio::test]
    async fn shorten_with_json_body() {
        let app = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/shorturl")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url":"https://example.com"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "original_url": "https://example.com/", "short_url": 1 })
        );
    }

    #[tokio::test]
    async fn invalid_urls_get_error_payload() {
        let app = test_app();

        for url in ["not a url", "ftp://example.com", "http://this-host-does-not-exist.invalid"] {
            let response = app.clone().oneshot(form_post(url)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{url}");
            assert_eq!(body_json(response).await, json!({ "error": "invalid url" }));
        }
    }

    #[tokio::test]
    async fn missing_url_field_is_invalid() {
        let app = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/shorturl")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"link":"https://example.com"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "error": "invalid url" }));
    }

    #[tokio::test]
    async fn redirect_to_original_url() {
        let app = test_app();

        app.clone()
            .oneshot(form_post("https://www.freecodecamp.org"))
            .await
            .unwrap();
        app.clone()
            .oneshot(form_post("https://example.com"))
            .await
            .unwrap();

        let response = app.oneshot(get_request("/api/shorturl/2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "https://example.com/"
        );
    }

    #[tokio::test]
    async fn unknown_or_malformed_code_gets_message() {
        let app = test_app();

        for uri in ["/api/shorturl/999", "/api/shorturl/abc", "/api/shorturl/-1"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(
                body_json(response).await,
                json!({ "message": "The short url does not exist!" })
            );
        }
    }

    #[tokio::test]
    async fn hello() {
        let response = test_app().oneshot(get_request("/api/hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "greeting": "hello API" }));
    }

    #[tokio::test]
    async fn timestamp_for_date_and_millis() {
        let app = test_app();
        let expected = json!({ "unix": 1451001600000_i64, "utc": "Fri, 25 Dec 2015 00:00:00 GMT" });

        for uri in ["/api/2015-12-25", "/api/1451001600000"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(body_json(response).await, expected);
        }
    }

    #[tokio::test]
    async fn timestamp_for_year_and_unix_seconds() {
        let app = test_app();

        let response = app.clone().oneshot(get_request("/api/2015")).await.unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "unix": 1420070400000_i64, "utc": "Thu, 01 Jan 2015 00:00:00 GMT" })
        );

        let response = app.oneshot(get_request("/api/1451001600")).await.unwrap();
        assert_eq!(body_json(response).await, json!({ "error": "Invalid Date" }));
    }

    #[tokio::test]
    async fn timestamp_with_encoded_spaces() {
        let response = test_app()
            .oneshot(get_request("/api/05%20October%202011,%20GMT"))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "unix": 1317772800000_i64, "utc": "Wed, 05 Oct 2011 00:00:00 GMT" })
        );
    }

    #[tokio::test]
    async fn timestamp_invalid_date() {
        let response = test_app()
            .oneshot(get_request("/api/this-is-not-a-date"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "error": "Invalid Date" }));
    }

    #[tokio::test]
    async fn timestamp_now() {
        let before = jiff::Timestamp::now().as_millisecond();
        let response = test_app().oneshot(get_request("/api")).await.unwrap();
        let body = body_json(response).await;
        let after = jiff::Timestamp::now().as_millisecond();

        let unix = body["unix"].as_i64().unwrap();
        assert!(before <= unix && unix <= after);
        assert!(body["utc"].as_str().unwrap().ends_with(" GMT"));
    }

    #[tokio::test]
    async fn whoami_echoes_headers() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/whoami")
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .header("accept-language", "en-US,en;q=0.9")
            .header("user-agent", "curl/8.5.0")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "ipaddress": "198.51.100.4",
                "language": "en-US,en;q=0.9",
                "software": "curl/8.5.0",
            })
        );
    }

    #[tokio::test]
    async fn whoami_omits_missing_headers() {
        let response = test_app().oneshot(get_request("/api/whoami")).await.unwrap();
        assert_eq!(body_json(response).await, json!({}));
    }

    #[tokio::test]
    async fn whoami_falls_back_to_peer_address() {
        let mut request = Request::builder()
            .method("GET")
            .uri("/api/whoami")
            .header("user-agent", "curl/8.5.0")
            .body(Body::empty())
            .unwrap();
        let peer: SocketAddr = "192.0.2.33:51234".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "ipaddress": "192.0.2.33", "software": "curl/8.5.0" })
        );
    }

    #[tokio::test]
    async fn forwarded_for_wins_over_peer_address() {
        let mut request = Request::builder()
            .method("GET")
            .uri("/api/whoami")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap();
        let peer: SocketAddr = "10.0.0.1:443".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(body_json(response).await, json!({ "ipaddress": "198.51.100.4" }));
    }

    #[tokio::test]
    async fn cors_headers_are_set() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/hello")
            .header("origin", "https://www.freecodecamp.org")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}

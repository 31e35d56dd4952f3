use crate::model::HelloResponse;
use axum::Json;

pub async fn hello_handler() -> Json<HelloResponse> {
    Json(HelloResponse {
        greeting: "hello API",
    })
}

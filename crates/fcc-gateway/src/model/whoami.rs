use serde::Serialize;

/// Missing headers are left out of the payload.
#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipaddress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
}

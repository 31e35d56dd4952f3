use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TimestampResponse {
    /// Milliseconds since the Unix epoch.
    pub unix: i64,
    /// HTTP date, e.g. `Fri, 25 Dec 2015 00:00:00 GMT`.
    pub utc: String,
}

mod health;
mod timestamp;
mod url;
mod whoami;

pub use health::HelloResponse;
pub use timestamp::TimestampResponse;
pub use url::{ErrorResponse, MessageResponse, ShortenRequest, ShortUrlResponse};
pub use whoami::WhoamiResponse;

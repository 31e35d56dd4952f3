mod health;
mod shorturl;
mod timestamp;
mod whoami;

pub use health::hello_handler;
pub use shorturl::{redirect_handler, shorten_handler};
pub use timestamp::{now_handler, timestamp_handler};
pub use whoami::whoami_handler;

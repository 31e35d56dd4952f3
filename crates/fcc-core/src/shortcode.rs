use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A numeric short code identifying a shortened URL.
///
/// Codes are allocated sequentially starting at [`ShortCode::FIRST`], so the
/// numeric order of two codes is also their creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(u64);

impl ShortCode {
    /// The code handed out when the registry is empty.
    pub const FIRST: ShortCode = ShortCode(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the code allocated after `current`, or [`ShortCode::FIRST`]
    /// when nothing has been allocated yet.
    ///
    /// Returns `None` once the `u64` space is exhausted.
    pub fn next_after(current: Option<ShortCode>) -> Option<ShortCode> {
        match current {
            None => Some(Self::FIRST),
            Some(code) => code.0.checked_add(1).map(Self),
        }
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ShortCode {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for ShortCode {
    type Err = CoreError;

    /// Parses an integer-like path segment. Only ASCII digits are accepted,
    /// so `+1`, ` 1` and `1.0` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only ascii digits: '{}'",
                s
            )));
        }

        s.parse::<u64>()
            .map(Self)
            .map_err(|e| CoreError::InvalidShortCode(format!("'{}': {e}", s)))
    }
}

//! Image identifiers.
//!
//! An image identifier is the 64 hex digit directory name a `docker save`
//! bundle uses for each layer. Identifiers are accepted in any case and
//! stored lowercase.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RetagError};

/// Length of an image identifier in hex digits.
pub const IMAGE_ID_LEN: usize = 64;

/// A validated, lowercase, 64 hex digit image identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(String);

impl ImageId {
    /// Validate `raw` and normalize it to lowercase.
    ///
    /// The offending value is carried verbatim in the error.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() != IMAGE_ID_LEN || hex::decode(raw).is_err() {
            return Err(RetagError::InvalidImageId(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Case-insensitive comparison against an arbitrary string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl FromStr for ImageId {
    type Err = RetagError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

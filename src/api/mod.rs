//! JSON payloads exchanged with the registration and storage authorities.
//!
//! Not intended to be used directly. Provided to aid debugging and to implement test doubles.

use std::fmt;

use serde::{Deserialize, Serialize};

mod blocked_key;
mod precertificate;
mod registration;
mod revocation;

pub use self::{
    blocked_key::BlockedKey, precertificate::Precertificate, registration::Registration,
    revocation::AdminRevocation,
};

/// Error document returned by an authority, modelled on `application/problem+json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub _type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    /// Returns true if problem type is "notFound".
    pub fn is_not_found(&self) -> bool {
        self._type == "notFound"
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self._type),
            _ => write!(f, "{}", self._type),
        }
    }
}

/// Result of a `COUNT(*)` style query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}

/// Serials matching a key hash, in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Serials {
    pub serials: Vec<String>,
}

use std::{error::Error as StdError, fmt};

use crate::api::Problem;

impl From<Problem> for eyre::Error {
    fn from(err: Problem) -> eyre::Error {
        if err.is_not_found() {
            return NotFound(err.to_string()).into();
        }

        eyre::eyre!("{err}")
    }
}

/// A serial, registration or key hash that the datastore has no record of.
///
/// Travels inside an [`eyre::Report`]; use [`is_not_found`] to branch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound(pub String);

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for NotFound {}

/// A key that is already present in the blocked keys table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyBlocked;

impl fmt::Display for AlreadyBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the provided key already exists in the 'blockedKeys' table")
    }
}

impl StdError for AlreadyBlocked {}

/// Returns true if any error in the report's chain is a [`NotFound`].
pub fn is_not_found(err: &eyre::Report) -> bool {
    err.chain().any(|cause| cause.is::<NotFound>())
}

/// Returns true if any error in the report's chain is an [`AlreadyBlocked`].
pub fn is_already_blocked(err: &eyre::Report) -> bool {
    err.chain().any(|cause| cause.is::<AlreadyBlocked>())
}

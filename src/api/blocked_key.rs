use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::spki::SpkiHash;

/// A row of the blocked keys table.
///
/// Issuance for any key whose SPKI hash is listed here is refused, and a background revoker
/// eventually revokes already issued certificates for it.
///
/// # Example JSON
///
/// ```json
/// {
///   "keyHash": "5c0f3c6b1e0d7a0f3b0fb0b0a3f7c5a3f5d7b0f2b1e1d3c5b7a9f0e2d4c6b8a0",
///   "added": "2024-03-04T05:00:00Z",
///   "source": "admin-revoker",
///   "comment": "blocked by alice",
///   "revokedBy": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedKey {
    pub key_hash: SpkiHash,

    #[serde(with = "time::serde::rfc3339")]
    pub added: OffsetDateTime,

    pub source: String,

    pub comment: String,

    /// Registration that triggered the block through a revocation; 0 when added by an operator.
    pub revoked_by: i64,
}

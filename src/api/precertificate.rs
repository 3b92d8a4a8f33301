use serde::{Deserialize, Serialize};

use crate::cert::CertificateRef;

/// Stored precertificate: the lookup path from a serial to certificate bytes and owner.
///
/// # Example JSON
///
/// ```json
/// {
///   "serial": "000000000000000000000000000000001234",
///   "registrationId": 42,
///   "der": "MIIB..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precertificate {
    pub serial: String,

    pub registration_id: i64,

    #[serde(with = "crate::util::base64url_bytes")]
    pub der: Vec<u8>,
}

impl Precertificate {
    pub fn to_certificate_ref(&self) -> CertificateRef {
        CertificateRef::Der(self.der.clone())
    }
}

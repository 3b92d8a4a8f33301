use serde::{Deserialize, Serialize};

use crate::{authority::RevocationRequest, cert::CertificateRef, util::base64url, RevocationReason};

/// Administrative revocation request sent to the registration authority.
///
/// Exactly one of `cert` and `serial` is set.
///
/// # Example JSON
///
/// ```json
/// {
///   "serial": "000000000000000000000000000000001234",
///   "code": 1,
///   "adminName": "alice",
///   "skipBlockKey": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRevocation {
    /// The certificate to be revoked, in the base64url-encoded version of the DER format.
    ///
    /// Note: not PEM, since headers are omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,

    /// Hex serial, used when no certificate bytes are available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    /// One of the revocation reasonCodes defined in [RFC 5280 §5.3.1].
    ///
    /// [RFC 5280 §5.3.1]: https://datatracker.ietf.org/doc/html/rfc5280#section-5.3.1
    pub code: RevocationReason,

    pub admin_name: String,

    /// Asks the authority not to add the certificate's key to the blocked keys table itself.
    pub skip_block_key: bool,
}

impl From<&RevocationRequest> for AdminRevocation {
    fn from(req: &RevocationRequest) -> Self {
        let (cert, serial) = match &req.cert {
            CertificateRef::Der(der) => (Some(base64url(der)), None),
            CertificateRef::Serial(serial) => (None, Some(serial.clone())),
        };

        AdminRevocation {
            cert,
            serial,
            code: req.reason,
            admin_name: req.admin_name.clone(),
            skip_block_key: req.skip_block_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_request_omits_cert() {
        let req = RevocationRequest {
            cert: CertificateRef::Serial("00ff".to_owned()),
            reason: RevocationReason::KeyCompromise,
            admin_name: "alice".to_owned(),
            skip_block_key: true,
        };

        let json = serde_json::to_value(AdminRevocation::from(&req)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "serial": "00ff",
                "code": 1,
                "adminName": "alice",
                "skipBlockKey": true,
            })
        );
    }

    #[test]
    fn der_request_omits_serial() {
        let req = RevocationRequest {
            cert: CertificateRef::Der(vec![0x30, 0x00]),
            reason: RevocationReason::Unspecified,
            admin_name: "bob".to_owned(),
            skip_block_key: false,
        };

        let revocation = AdminRevocation::from(&req);
        assert_eq!(revocation.cert.as_deref(), Some("MAA"));
        assert_eq!(revocation.serial, None);
    }
}

use std::fmt;

use eyre::eyre;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Enumeration of reasons for revocation.
///
/// The reason codes are taken from [RFC 5280 §5.3.1]. Value 7 is unused by the RFC and has no
/// variant, so every value of this type is a code the registration authority accepts.
///
/// [RFC 5280 §5.3.1]: https://tools.ietf.org/html/rfc5280#section-5.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RevocationReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CACompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    // value 7 is not used
    RemoveFromCRL = 8,
    PrivilegeWithdrawn = 9,
    AACompromise = 10,
}

impl RevocationReason {
    /// Every reason, in ascending numeric order.
    pub const ALL: [RevocationReason; 10] = [
        RevocationReason::Unspecified,
        RevocationReason::KeyCompromise,
        RevocationReason::CACompromise,
        RevocationReason::AffiliationChanged,
        RevocationReason::Superseded,
        RevocationReason::CessationOfOperation,
        RevocationReason::CertificateHold,
        RevocationReason::RemoveFromCRL,
        RevocationReason::PrivilegeWithdrawn,
        RevocationReason::AACompromise,
    ];

    /// Numeric reason code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Name of the reason as spelled in CRL tooling.
    pub fn label(self) -> &'static str {
        match self {
            RevocationReason::Unspecified => "unspecified",
            RevocationReason::KeyCompromise => "keyCompromise",
            RevocationReason::CACompromise => "cACompromise",
            RevocationReason::AffiliationChanged => "affiliationChanged",
            RevocationReason::Superseded => "superseded",
            RevocationReason::CessationOfOperation => "cessationOfOperation",
            RevocationReason::CertificateHold => "certificateHold",
            RevocationReason::RemoveFromCRL => "removeFromCRL",
            RevocationReason::PrivilegeWithdrawn => "privilegeWithdrawn",
            RevocationReason::AACompromise => "aAcompromise",
        }
    }
}

impl TryFrom<i64> for RevocationReason {
    type Error = eyre::Error;

    fn try_from(code: i64) -> eyre::Result<Self> {
        RevocationReason::ALL
            .into_iter()
            .find(|reason| i64::from(reason.code()) == code)
            .ok_or_else(|| eyre!("invalid reason code {code}, must be 0-10 and not 7"))
    }
}

impl std::str::FromStr for RevocationReason {
    type Err = eyre::Error;

    fn from_str(s: &str) -> eyre::Result<Self> {
        let code = s
            .trim()
            .parse::<i64>()
            .map_err(|_| eyre!("reason code argument must be an integer, got {s:?}"))?;
        RevocationReason::try_from(code)
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RevocationReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for RevocationReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        RevocationReason::try_from(code).map_err(serde::de::Error::custom)
    }
}

//! SubjectPublicKeyInfo fingerprints.
//!
//! The fingerprint is the join key between a compromised key and the certificates issued for it,
//! so it must match, byte for byte, the hash the CA records for each certificate at issuance:
//! SHA-256 over the DER encoded SubjectPublicKeyInfo.

use std::{fmt, str::FromStr};

use eyre::eyre;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::key::PublicKey;

/// SHA-256 digest of a DER encoded SubjectPublicKeyInfo.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpkiHash([u8; 32]);

impl SpkiHash {
    /// Hashes an already DER encoded SubjectPublicKeyInfo (e.g. taken from a certificate).
    pub fn from_spki_der(spki_der: &[u8]) -> Self {
        SpkiHash(Sha256::digest(spki_der).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Returns the SPKI hash of `public_key`.
///
/// Fails only if the key cannot be encoded.
pub fn fingerprint(public_key: &PublicKey) -> eyre::Result<SpkiHash> {
    let spki_der = public_key.to_spki_der()?;
    Ok(SpkiHash::from_spki_der(&spki_der))
}

impl From<[u8; 32]> for SpkiHash {
    fn from(bytes: [u8; 32]) -> Self {
        SpkiHash(bytes)
    }
}

impl fmt::Display for SpkiHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for SpkiHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpkiHash({self})")
    }
}

impl FromStr for SpkiHash {
    type Err = eyre::Error;

    fn from_str(s: &str) -> eyre::Result<Self> {
        let mut bytes = [0; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|err| eyre!("invalid SPKI hash {s:?}: {err}"))?;
        Ok(SpkiHash(bytes))
    }
}

impl Serialize for SpkiHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpkiHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

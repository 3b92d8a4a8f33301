//! Private keys presented as evidence of compromise.
//!
//! A key is loaded with [`load_private_key`], proven against its public half with
//! [`verify_key_pair`] and only then fingerprinted (see [`crate::spki`]).

use std::fmt;

use eyre::WrapErr as _;
use pkcs8::EncodePublicKey as _;

mod codec;
mod verify;

pub use self::{codec::load_private_key, verify::verify_key_pair};

/// An RSA or ECDSA private key.
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(Box<rsa::RsaPrivateKey>),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

impl PrivateKey {
    /// The public counterpart of this private key.
    ///
    /// For EC keys it is derived from the secret scalar; a file whose embedded public point
    /// disagrees is rejected by [`load_private_key`]. This is only the *claimed* counterpart; nothing is trusted until [`verify_key_pair`] has
    /// succeeded against it.
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
            PrivateKey::P256(key) => PublicKey::P256(key.public_key()),
            PrivateKey::P384(key) => PublicKey::P384(key.public_key()),
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            PrivateKey::Rsa(_) => "RSA",
            PrivateKey::P256(_) => "ECDSA P-256",
            PrivateKey::P384(_) => "ECDSA P-384",
        }
    }
}

// never print key material
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&self.algorithm()).finish()
    }
}

impl From<rsa::RsaPrivateKey> for PrivateKey {
    fn from(key: rsa::RsaPrivateKey) -> Self {
        PrivateKey::Rsa(Box::new(key))
    }
}

impl From<p256::SecretKey> for PrivateKey {
    fn from(key: p256::SecretKey) -> Self {
        PrivateKey::P256(key)
    }
}

impl From<p384::SecretKey> for PrivateKey {
    fn from(key: p384::SecretKey) -> Self {
        PrivateKey::P384(key)
    }
}

/// An RSA or ECDSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(rsa::RsaPublicKey),
    P256(p256::PublicKey),
    P384(p384::PublicKey),
}

impl PublicKey {
    pub fn algorithm(&self) -> &'static str {
        match self {
            PublicKey::Rsa(_) => "RSA",
            PublicKey::P256(_) => "ECDSA P-256",
            PublicKey::P384(_) => "ECDSA P-384",
        }
    }

    /// DER encoding of the key's SubjectPublicKeyInfo, as embedded in certificates.
    pub fn to_spki_der(&self) -> eyre::Result<Vec<u8>> {
        let doc = match self {
            PublicKey::Rsa(key) => key.to_public_key_der(),
            PublicKey::P256(key) => key.to_public_key_der(),
            PublicKey::P384(key) => key.to_public_key_der(),
        }
        .wrap_err_with(|| format!("failed to encode {} public key", self.algorithm()))?;

        Ok(doc.as_bytes().to_vec())
    }
}

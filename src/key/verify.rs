use ecdsa::signature::hazmat::{PrehashSigner as _, PrehashVerifier as _};
use eyre::{bail, eyre};
use rsa::Pss;
use sha2::{Digest as _, Sha256};

use super::{PrivateKey, PublicKey};

const VERIFIABLE_MESSAGE: &[u8] = b"verifiable";

/// Verifies that `public_key` is actually a match for `private_key`.
///
/// A private key file can embed a public key that does not belong to it. For an example of
/// private keys embedding a mismatched public key, see
/// <https://blog.hboeck.de/archives/888-How-I-tricked-Symantec-with-a-Fake-Private-Key.html>.
/// The pairing is proven by signing a SHA-256 digest with the private key and verifying the
/// signature against the claimed public key.
pub fn verify_key_pair(private_key: &PrivateKey, public_key: &PublicKey) -> eyre::Result<()> {
    let msg_hash = Sha256::digest(VERIFIABLE_MESSAGE);

    match (private_key, public_key) {
        (PrivateKey::Rsa(pri), PublicKey::Rsa(public)) => verify_rsa_key_pair(pri, public, &msg_hash),
        (PrivateKey::P256(pri), PublicKey::P256(public)) => {
            verify_p256_key_pair(pri, public, &msg_hash)
        }
        (PrivateKey::P384(pri), PublicKey::P384(public)) => {
            verify_p384_key_pair(pri, public, &msg_hash)
        }
        (pri, public) => bail!(
            "the provided {} private key cannot be paired with an {} public key",
            pri.algorithm(),
            public.algorithm(),
        ),
    }
}

fn verify_rsa_key_pair(
    private_key: &rsa::RsaPrivateKey,
    public_key: &rsa::RsaPublicKey,
    msg_hash: &[u8],
) -> eyre::Result<()> {
    let signature = private_key
        .sign_with_rng(&mut rand::thread_rng(), Pss::new::<Sha256>(), msg_hash)
        .map_err(|err| eyre!("failed to sign using the provided RSA private key: {err}"))?;

    public_key
        .verify(Pss::new::<Sha256>(), msg_hash, &signature)
        .map_err(|err| eyre!("the provided RSA private key failed signature verification: {err}"))
}

fn verify_p256_key_pair(
    private_key: &p256::SecretKey,
    public_key: &p256::PublicKey,
    msg_hash: &[u8],
) -> eyre::Result<()> {
    let signature: p256::ecdsa::Signature = p256::ecdsa::SigningKey::from(private_key)
        .sign_prehash(msg_hash)
        .map_err(|err| eyre!("failed to sign using the provided ECDSA private key: {err}"))?;

    p256::ecdsa::VerifyingKey::from(public_key)
        .verify_prehash(msg_hash, &signature)
        .map_err(|_| eyre!("the provided ECDSA private key failed signature verification"))
}

fn verify_p384_key_pair(
    private_key: &p384::SecretKey,
    public_key: &p384::PublicKey,
    msg_hash: &[u8],
) -> eyre::Result<()> {
    let signature: p384::ecdsa::Signature = p384::ecdsa::SigningKey::from(private_key)
        .sign_prehash(msg_hash)
        .map_err(|err| eyre!("failed to sign using the provided ECDSA private key: {err}"))?;

    p384::ecdsa::VerifyingKey::from(public_key)
        .verify_prehash(msg_hash, &signature)
        .map_err(|_| eyre!("the provided ECDSA private key failed signature verification"))
}

use eyre::{ensure, WrapErr as _};
use time::OffsetDateTime;

use super::Revoker;
use crate::{
    api::BlockedKey,
    error::AlreadyBlocked,
    key::{verify_key_pair, PrivateKey},
    spki::{fingerprint, SpkiHash},
    RevocationReason,
};

/// Source recorded on blocked keys table rows added by an operator.
pub const BLOCKED_KEY_SOURCE: &str = "admin-revoker";

/// What a verified key maps to in the datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyReport {
    pub spki_hash: SpkiHash,
    pub matching_certs: u64,
}

/// Outcome of [`Revoker::private_key_block`] and [`Revoker::private_key_revoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyActionOutcome {
    /// Nothing was changed; `affected` certificates would have been.
    DryRun { affected: u64 },
    /// The key was added to the blocked keys table.
    Blocked,
    /// Every matching certificate was revoked, then the key was blocked.
    RevokedAndBlocked { revoked: u64 },
    /// No certificate matched the key, so nothing was done.
    NoMatchingCertificates,
}

fn ensure_key_compromise(reason: RevocationReason) -> eyre::Result<()> {
    ensure!(
        reason == RevocationReason::KeyCompromise,
        "invalid reason code {}, must be 1 (Key Compromise)",
        reason.code(),
    );
    Ok(())
}

/// Hash of the key's public half, only once the public half is proven to belong to it.
fn verified_spki_hash(private_key: &PrivateKey) -> eyre::Result<SpkiHash> {
    let public_key = private_key.public_key();
    verify_key_pair(private_key, &public_key)?;
    fingerprint(&public_key)
}

impl Revoker {
    /// Verifies `private_key` against its embedded public key and counts the certificates issued
    /// for it.
    pub async fn inspect_private_key(&self, private_key: &PrivateKey) -> eyre::Result<KeyReport> {
        let public_key = private_key.public_key();
        verify_key_pair(private_key, &public_key)
            .wrap_err("failed to validate the provided key pair")?;
        log::info!(target: "audit", "The provided key pair has been successfully verified");

        let spki_hash = fingerprint(&public_key)
            .wrap_err("while obtaining the SPKI hash for the provided key")?;

        let matching_certs = self
            .count_certs_matching_spki_hash(&spki_hash)
            .await
            .wrap_err("while retrieving a count of certificates matching the provided key")?;
        log::info!(
            target: "audit",
            "Found {matching_certs} certificates matching the provided key (SPKI hash {spki_hash})"
        );

        Ok(KeyReport {
            spki_hash,
            matching_certs,
        })
    }

    /// Blocks future issuance for the public key of `private_key`.
    ///
    /// The SPKI hash is taken from the public key embedded in `private_key`, after verifying that
    /// it is actually a match for the private key. No certificate is revoked here; the background
    /// revoker watching the blocked keys table eventually revokes certificates with a matching
    /// SPKI hash.
    pub async fn block_by_private_key(
        &self,
        private_key: &PrivateKey,
        reason: RevocationReason,
    ) -> eyre::Result<()> {
        ensure_key_compromise(reason)?;
        let key_hash = verified_spki_hash(private_key)?;
        let operator = self.operator();

        let entry = BlockedKey {
            key_hash,
            added: OffsetDateTime::now_utc(),
            source: BLOCKED_KEY_SOURCE.to_owned(),
            comment: format!("blocked by {operator}"),
            revoked_by: 0,
        };

        self.inner
            .sa
            .add_blocked_key(&entry)
            .await
            .wrap_err_with(|| format!("failed to add SPKI hash {key_hash} to blocked keys"))?;

        log::info!(target: "audit", "{operator} blocked key with SPKI hash {key_hash}");
        Ok(())
    }

    /// Revokes every certificate issued for the public key of `private_key`.
    ///
    /// The key is verified as in [`Revoker::block_by_private_key`] but is *not* added to the
    /// blocked keys table: each revocation asks the authority to skip its own key blocking, and
    /// nothing here blocks the key, so this path cannot race the background revoker into a
    /// duplicate row. The first failed revocation aborts the call.
    pub async fn revoke_by_private_key(
        &self,
        private_key: &PrivateKey,
        reason: RevocationReason,
    ) -> eyre::Result<u64> {
        ensure_key_compromise(reason)?;
        let key_hash = verified_spki_hash(private_key)?;

        let matches = self.get_certs_matching_spki_hash(&key_hash).await?;

        for (i, serial) in matches.iter().enumerate() {
            self.revoke_by_serial(serial, reason, true)
                .await
                .wrap_err_with(|| {
                    format!(
                        "failed to revoke serial {serial:?}. Entry {} of {} affected certificates",
                        i + 1,
                        matches.len(),
                    )
                })?;
        }

        Ok(matches.len() as u64)
    }

    /// Blocks issuance for a compromised key, or with `dry_run` reports what would be affected.
    ///
    /// A dry run refuses with [`AlreadyBlocked`] if the key is already in the blocked keys table.
    pub async fn private_key_block(
        &self,
        dry_run: bool,
        count: u64,
        key_hash: &SpkiHash,
        private_key: &PrivateKey,
    ) -> eyre::Result<KeyActionOutcome> {
        if dry_run {
            let key_exists = self.spki_hash_in_blocked_keys(key_hash).await.wrap_err(
                "while checking if the provided key already exists in the 'blockedKeys' table",
            )?;

            if key_exists {
                return Err(AlreadyBlocked.into());
            }

            log::info!(
                target: "audit",
                "To block issuance for this key and revoke {count} certificates via bad-key-revoker, run with --dry-run=false"
            );
            log::info!(target: "audit", "No keys were blocked or certificates revoked, no mutation performed");
            return Ok(KeyActionOutcome::DryRun { affected: count });
        }

        log::info!(target: "audit", "Attempting to block issuance for the provided key");
        self.block_by_private_key(private_key, RevocationReason::KeyCompromise)
            .await
            .wrap_err("while attempting to block issuance for the provided key")?;
        log::info!(target: "audit", "Issuance for the provided key has been successfully blocked");

        Ok(KeyActionOutcome::Blocked)
    }

    /// Revokes every certificate for a compromised key and then blocks it, or with `dry_run`
    /// reports what would be affected.
    ///
    /// Does nothing when `count` is zero.
    pub async fn private_key_revoke(
        &self,
        dry_run: bool,
        count: u64,
        private_key: &PrivateKey,
    ) -> eyre::Result<KeyActionOutcome> {
        if dry_run {
            log::info!(
                target: "audit",
                "To immediately revoke {count} certificates and block issuance for this key, run with --dry-run=false"
            );
            log::info!(target: "audit", "No keys were blocked or certificates revoked, no mutation performed");
            return Ok(KeyActionOutcome::DryRun { affected: count });
        }

        if count == 0 {
            log::info!(target: "audit", "No certificates match the provided key, nothing to revoke");
            return Ok(KeyActionOutcome::NoMatchingCertificates);
        }

        log::info!(target: "audit", "Attempting to revoke {count} certificates");
        let revoked = self
            .revoke_by_private_key(private_key, RevocationReason::KeyCompromise)
            .await
            .wrap_err("while attempting to revoke certificates for the provided key")?;
        log::info!(target: "audit", "All {revoked} certificates matching the provided key have been revoked");

        log::info!(target: "audit", "Attempting to block issuance for the provided key");
        self.block_by_private_key(private_key, RevocationReason::KeyCompromise)
            .await
            .wrap_err("while attempting to block issuance for the provided key")?;
        log::info!(target: "audit", "All certificates have been successfully revoked and issuance blocked");

        Ok(KeyActionOutcome::RevokedAndBlocked { revoked })
    }
}

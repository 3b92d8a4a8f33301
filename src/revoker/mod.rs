//! Administrative revocation.
//!
//! A [`Revoker`] revokes certificates one at a time (by serial, by owning registration, or by
//! serial alone for certificates that never parsed), in bulk from a file of serials
//! ([`Revoker::revoke_by_serial_batch`]), and in response to a compromised private key
//! ([`Revoker::private_key_block`], [`Revoker::private_key_revoke`]).

use std::sync::Arc;

use eyre::WrapErr as _;

use crate::{
    authority::{RegistrationAuthority, RevocationRequest, StorageAuthority},
    cert::CertificateRef,
    error::NotFound,
    spki::SpkiHash,
    RevocationReason,
};

mod batch;
mod key_compromise;

pub use self::{
    batch::BatchReport,
    key_compromise::{KeyActionOutcome, KeyReport, BLOCKED_KEY_SOURCE},
};

struct RevokerInner {
    ra: Arc<dyn RegistrationAuthority>,
    sa: Arc<dyn StorageAuthority>,
    operator: String,
}

/// Revokes certificates on behalf of an operator.
///
/// Cheap to clone; clones share the same authorities.
#[derive(Clone)]
pub struct Revoker {
    inner: Arc<RevokerInner>,
}

impl Revoker {
    /// Creates a revoker acting as `operator`.
    ///
    /// The operator name is recorded with every revocation and blocked key for audit.
    pub fn new(
        ra: Arc<dyn RegistrationAuthority>,
        sa: Arc<dyn StorageAuthority>,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(RevokerInner {
                ra,
                sa,
                operator: operator.into(),
            }),
        }
    }

    /// Name of the operator this revoker acts for.
    pub fn operator(&self) -> &str {
        &self.inner.operator
    }

    /// Revoke a certificate for the reason given.
    ///
    /// When the certificate is given as DER it must parse; the authority receives the full
    /// certificate. `skip_block_key` tells the authority not to block the certificate's key as a
    /// side effect, which [`Revoker::revoke_by_private_key`] relies on.
    pub async fn revoke_certificate(
        &self,
        cert: &CertificateRef,
        reason: RevocationReason,
        skip_block_key: bool,
    ) -> eyre::Result<()> {
        let serial = cert.serial()?;
        let operator = self.operator();

        let req = RevocationRequest {
            cert: cert.clone(),
            reason,
            admin_name: operator.to_owned(),
            skip_block_key,
        };

        self.inner
            .ra
            .administratively_revoke(&req)
            .await
            .wrap_err_with(|| {
                format!("{operator} failed to revoke certificate {serial} with reason '{reason}'")
            })?;

        log::info!(
            target: "audit",
            "{operator} revoked certificate {serial} with reason '{reason}'"
        );

        Ok(())
    }

    /// Revoke the precertificate with this hex serial.
    ///
    /// Fails with [`NotFound`] if no precertificate has the serial.
    pub async fn revoke_by_serial(
        &self,
        serial: &str,
        reason: RevocationReason,
        skip_block_key: bool,
    ) -> eyre::Result<()> {
        let precert = self
            .inner
            .sa
            .select_precertificate(serial)
            .await?
            .ok_or_else(|| NotFound(format!("precertificate with serial {serial:?} not found")))?;

        self.revoke_certificate(&precert.to_certificate_ref(), reason, skip_block_key)
            .await
    }

    /// Revoke every precertificate issued to a registration.
    ///
    /// Certificates are revoked in the order the datastore returns them and the first failure is
    /// returned immediately, so a failed call may leave the registration partially revoked.
    pub async fn revoke_by_registration(
        &self,
        registration_id: i64,
        reason: RevocationReason,
    ) -> eyre::Result<()> {
        self.inner
            .sa
            .get_registration(registration_id)
            .await
            .and_then(|registration| {
                registration
                    .map(drop)
                    .ok_or_else(|| NotFound(format!("registration {registration_id} not found")).into())
            })
            .wrap_err("couldn't fetch registration")?;

        let precerts = self
            .inner
            .sa
            .select_precertificates_by_registration(registration_id)
            .await?;

        for (i, precert) in precerts.iter().enumerate() {
            self.revoke_certificate(&precert.to_certificate_ref(), reason, false)
                .await
                .wrap_err_with(|| {
                    format!(
                        "registration {registration_id} partially revoked: {i} of {} certificates revoked",
                        precerts.len()
                    )
                })?;
        }

        Ok(())
    }

    /// Revoke a certificate known only by its serial, e.g. one that failed to parse.
    pub async fn revoke_malformed_by_serial(
        &self,
        serial: &str,
        reason: RevocationReason,
    ) -> eyre::Result<()> {
        self.revoke_certificate(&CertificateRef::Serial(serial.to_owned()), reason, false)
            .await
    }

    /// Number of issued certificates whose key has this SPKI hash.
    pub async fn count_certs_matching_spki_hash(&self, key_hash: &SpkiHash) -> eyre::Result<u64> {
        self.inner.sa.count_certs_by_key_hash(key_hash).await
    }

    /// Serials of the issued certificates whose key has this SPKI hash.
    ///
    /// Fails with [`NotFound`] if there are none.
    pub async fn get_certs_matching_spki_hash(
        &self,
        key_hash: &SpkiHash,
    ) -> eyre::Result<Vec<String>> {
        let serials = self.inner.sa.select_serials_by_key_hash(key_hash).await?;

        if serials.is_empty() {
            return Err(NotFound(
                "no certificates with a matching SPKI hash were found".to_owned(),
            )
            .into());
        }

        Ok(serials)
    }

    /// Returns true if the blocked keys table already lists this SPKI hash.
    pub async fn spki_hash_in_blocked_keys(&self, key_hash: &SpkiHash) -> eyre::Result<bool> {
        Ok(self.inner.sa.count_blocked_keys(key_hash).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::is_not_found,
        key::PublicKey,
        test::{test_p256_key, MemoryAuthority, TestCa},
    };

    fn revoker(store: &Arc<MemoryAuthority>) -> Revoker {
        Revoker::new(store.clone(), store.clone(), "alice")
    }

    fn new_subject() -> PublicKey {
        PublicKey::P256(p256::SecretKey::random(&mut rand::thread_rng()).public_key())
    }

    #[tokio::test]
    async fn revoke_by_serial() {
        let ca = TestCa::new();
        let store = Arc::new(MemoryAuthority::new());
        let reg = store.add_registration();
        let serial = store.add_precertificate(reg, ca.issue(1, &new_subject()));

        revoker(&store)
            .revoke_by_serial(&serial, RevocationReason::Superseded, false)
            .await
            .unwrap();

        assert_eq!(store.status(&serial), Some(RevocationReason::Superseded));

        let revocations = store.revocations();
        assert_eq!(revocations.len(), 1);
        assert_eq!(revocations[0].admin_name, "alice");
        assert!(matches!(revocations[0].cert, CertificateRef::Der(_)));
    }

    #[tokio::test]
    async fn revoke_by_unknown_serial_is_not_found() {
        let store = Arc::new(MemoryAuthority::new());

        let err = revoker(&store)
            .revoke_by_serial("00ff", RevocationReason::Unspecified, false)
            .await
            .unwrap_err();

        assert!(is_not_found(&err));
        assert!(store.revocations().is_empty());
    }

    #[tokio::test]
    async fn authority_failure_is_not_not_found() {
        let ca = TestCa::new();
        let store = Arc::new(MemoryAuthority::new());
        let reg = store.add_registration();
        let serial = store.add_precertificate(reg, ca.issue(1, &new_subject()));

        let revoker = revoker(&store);
        revoker
            .revoke_by_serial(&serial, RevocationReason::Unspecified, false)
            .await
            .unwrap();

        // already revoked
        let err = revoker
            .revoke_by_serial(&serial, RevocationReason::Unspecified, false)
            .await
            .unwrap_err();
        assert!(!is_not_found(&err));
        assert!(format!("{err:#}").contains(&serial));
    }

    #[tokio::test]
    async fn revoke_malformed_sends_bare_serial() {
        let store = Arc::new(MemoryAuthority::new());
        let serial = store.add_unparseable_certificate("0000000000000000000000000000000000aa");

        revoker(&store)
            .revoke_malformed_by_serial(&serial, RevocationReason::CessationOfOperation)
            .await
            .unwrap();

        let revocations = store.revocations();
        assert_eq!(revocations[0].cert, CertificateRef::Serial(serial.clone()));
        assert!(!revocations[0].skip_block_key);
        assert_eq!(
            store.status(&serial),
            Some(RevocationReason::CessationOfOperation)
        );
    }

    #[tokio::test]
    async fn revoke_by_registration_revokes_every_precertificate() {
        let ca = TestCa::new();
        let store = Arc::new(MemoryAuthority::new());
        let reg = store.add_registration();
        let other = store.add_registration();

        let owned = (1..=3)
            .map(|serial| store.add_precertificate(reg, ca.issue(serial, &new_subject())))
            .collect::<Vec<_>>();
        let unrelated = store.add_precertificate(other, ca.issue(4, &new_subject()));

        revoker(&store)
            .revoke_by_registration(reg, RevocationReason::PrivilegeWithdrawn)
            .await
            .unwrap();

        for serial in &owned {
            assert_eq!(store.status(serial), Some(RevocationReason::PrivilegeWithdrawn));
        }
        assert_eq!(store.status(&unrelated), None);
    }

    #[tokio::test]
    async fn revoke_by_unknown_registration() {
        let store = Arc::new(MemoryAuthority::new());

        let err = revoker(&store)
            .revoke_by_registration(404, RevocationReason::Unspecified)
            .await
            .unwrap_err();

        assert!(is_not_found(&err));
        assert!(err.to_string().contains("couldn't fetch registration"));
    }

    #[tokio::test]
    async fn revoke_by_registration_stops_at_first_failure() {
        let ca = TestCa::new();
        let store = Arc::new(MemoryAuthority::new());
        let reg = store.add_registration();

        let serials = (1..=3)
            .map(|serial| store.add_precertificate(reg, ca.issue(serial, &new_subject())))
            .collect::<Vec<_>>();
        store.fail_revocations_of(&serials[1]);

        let err = revoker(&store)
            .revoke_by_registration(reg, RevocationReason::Unspecified)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("1 of 3 certificates revoked"));
        assert!(store.status(&serials[0]).is_some());
        assert!(store.status(&serials[1]).is_none());
        assert!(store.status(&serials[2]).is_none());
    }

    #[tokio::test]
    async fn count_certs_matching_spki_hash() {
        let ca = TestCa::new();
        let store = Arc::new(MemoryAuthority::new());
        let reg = store.add_registration();

        let target = PublicKey::P256(test_p256_key().public_key());
        store.add_precertificate(reg, ca.issue(1, &target));
        for serial in 2..=4 {
            store.add_precertificate(reg, ca.issue(serial, &new_subject()));
        }

        let key_hash = crate::spki::fingerprint(&target).unwrap();
        let count = revoker(&store)
            .count_certs_matching_spki_hash(&key_hash)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn get_certs_matching_spki_hash_not_found() {
        let store = Arc::new(MemoryAuthority::new());
        let key_hash = SpkiHash::from_spki_der(b"unknown");

        let err = revoker(&store)
            .get_certs_matching_spki_hash(&key_hash)
            .await
            .unwrap_err();
        assert!(is_not_found(&err));
    }
}

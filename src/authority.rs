//! The collaborators a [`Revoker`](crate::Revoker) acts through.
//!
//! The registration authority performs the actual revocation (and the certificate parsing that
//! goes with it). The storage authority owns registrations, the blocked keys table and the
//! precertificate / key hash indexes. Both are remote services in production; see
//! [`HttpClient`](crate::HttpClient).

use async_trait::async_trait;

use crate::{
    api::{BlockedKey, Precertificate, Registration},
    cert::CertificateRef,
    spki::SpkiHash,
    RevocationReason,
};

/// An administrative revocation, as handed to the registration authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationRequest {
    pub cert: CertificateRef,
    pub reason: RevocationReason,
    /// Operator on whose behalf the revocation happens.
    pub admin_name: String,
    /// Tells the authority not to block the certificate's key as a side effect of a
    /// key compromise revocation.
    pub skip_block_key: bool,
}

#[async_trait]
pub trait RegistrationAuthority: Send + Sync {
    /// Revoke a certificate outside of the ACME flow.
    async fn administratively_revoke(&self, req: &RevocationRequest) -> eyre::Result<()>;
}

#[async_trait]
pub trait StorageAuthority: Send + Sync {
    /// Look up a registration. `None` if there is no such registration.
    async fn get_registration(&self, id: i64) -> eyre::Result<Option<Registration>>;

    /// Append a row to the blocked keys table.
    async fn add_blocked_key(&self, entry: &BlockedKey) -> eyre::Result<()>;

    /// Number of blocked keys table rows with this hash.
    async fn count_blocked_keys(&self, key_hash: &SpkiHash) -> eyre::Result<u64>;

    /// Look up a precertificate by hex serial. `None` if there is no such precertificate.
    async fn select_precertificate(&self, serial: &str) -> eyre::Result<Option<Precertificate>>;

    /// Every precertificate issued to a registration.
    async fn select_precertificates_by_registration(
        &self,
        registration_id: i64,
    ) -> eyre::Result<Vec<Precertificate>>;

    /// Number of certificates issued for keys with this hash.
    async fn count_certs_by_key_hash(&self, key_hash: &SpkiHash) -> eyre::Result<u64>;

    /// Serials of the certificates issued for keys with this hash.
    async fn select_serials_by_key_hash(&self, key_hash: &SpkiHash) -> eyre::Result<Vec<String>>;
}

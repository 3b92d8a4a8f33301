use async_trait::async_trait;
use eyre::{eyre, WrapErr as _};
use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    api::{AdminRevocation, BlockedKey, Count, Precertificate, Registration, Serials},
    authority::{RegistrationAuthority, RevocationRequest, StorageAuthority},
    config::{RevokerConfig, ServiceConfig},
    req::req_handle_error,
    spki::SpkiHash,
};

/// One remote collaborator: a base URL and a client with that service's timeout.
#[derive(Clone, Debug)]
struct Service {
    base_url: Url,
    client: reqwest::Client,
}

impl Service {
    fn new(config: &ServiceConfig) -> eyre::Result<Self> {
        let base_url = Url::parse(&config.url)
            .wrap_err_with(|| format!("invalid service URL {:?}", config.url))?;

        if base_url.cannot_be_a_base() {
            return Err(eyre!("{base_url} cannot be used as a service URL"));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .wrap_err("failed to build HTTP client")?;

        Ok(Service { base_url, client })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();

        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }

    async fn send(&self, req: reqwest::RequestBuilder, url: &Url) -> eyre::Result<reqwest::Response> {
        let res = req
            .send()
            .await
            .wrap_err_with(|| format!("request to {url} failed"))?;

        Ok(req_handle_error(res).await?)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> eyre::Result<T> {
        let url = self.url(segments);
        log::debug!("GET {url}");

        let res = self.send(self.client.get(url.clone()), &url).await?;

        res.json()
            .await
            .wrap_err_with(|| format!("failed to decode response from {url}"))
    }

    /// Like [`Service::get`] but a 404 is `None`.
    async fn get_optional<T: DeserializeOwned>(&self, segments: &[&str]) -> eyre::Result<Option<T>> {
        let url = self.url(segments);
        log::debug!("GET {url}");

        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .wrap_err_with(|| format!("request to {url} failed"))?;

        let res = match req_handle_error(res).await {
            Ok(res) => res,
            Err(problem) if problem.is_not_found() => {
                log::trace!("{url} not found: {problem}");
                return Ok(None);
            }
            Err(problem) => return Err(problem.into()),
        };

        res.json()
            .await
            .map(Some)
            .wrap_err_with(|| format!("failed to decode response from {url}"))
    }

    async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> eyre::Result<()> {
        let url = self.url(segments);
        log::debug!("POST {url}");

        self.send(self.client.post(url.clone()).json(body), &url)
            .await?;

        Ok(())
    }
}

/// Talks to the registration and storage authorities over HTTP with JSON payloads.
#[derive(Clone, Debug)]
pub struct HttpClient {
    ra: Service,
    sa: Service,
}

impl HttpClient {
    pub fn new(config: &RevokerConfig) -> eyre::Result<Self> {
        Ok(HttpClient {
            ra: Service::new(&config.ra_service).wrap_err("while configuring the RA client")?,
            sa: Service::new(&config.sa_service).wrap_err("while configuring the SA client")?,
        })
    }
}

#[async_trait]
impl RegistrationAuthority for HttpClient {
    async fn administratively_revoke(&self, req: &RevocationRequest) -> eyre::Result<()> {
        self.ra
            .post(&["admin", "revoke-certificate"], &AdminRevocation::from(req))
            .await
    }
}

#[async_trait]
impl StorageAuthority for HttpClient {
    async fn get_registration(&self, id: i64) -> eyre::Result<Option<Registration>> {
        self.sa
            .get_optional(&["registrations", &id.to_string()])
            .await
    }

    async fn add_blocked_key(&self, entry: &BlockedKey) -> eyre::Result<()> {
        self.sa.post(&["blocked-keys"], entry).await
    }

    async fn count_blocked_keys(&self, key_hash: &SpkiHash) -> eyre::Result<u64> {
        let count: Count = self
            .sa
            .get(&["blocked-keys", &key_hash.to_string(), "count"])
            .await?;
        Ok(count.count)
    }

    async fn select_precertificate(&self, serial: &str) -> eyre::Result<Option<Precertificate>> {
        self.sa.get_optional(&["precertificates", serial]).await
    }

    async fn select_precertificates_by_registration(
        &self,
        registration_id: i64,
    ) -> eyre::Result<Vec<Precertificate>> {
        self.sa
            .get(&[
                "registrations",
                &registration_id.to_string(),
                "precertificates",
            ])
            .await
    }

    async fn count_certs_by_key_hash(&self, key_hash: &SpkiHash) -> eyre::Result<u64> {
        let count: Count = self
            .sa
            .get(&["key-hashes", &key_hash.to_string(), "count"])
            .await?;
        Ok(count.count)
    }

    async fn select_serials_by_key_hash(&self, key_hash: &SpkiHash) -> eyre::Result<Vec<String>> {
        let serials: Serials = self
            .sa
            .get(&["key-hashes", &key_hash.to_string(), "serials"])
            .await?;
        Ok(serials.serials)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        cert::CertificateRef,
        error::is_not_found,
        key::{PrivateKey, PublicKey},
        spki::fingerprint,
        test::{test_p256_key, with_authority_server, MemoryAuthority, TestCa},
        KeyActionOutcome, RevocationReason, Revoker,
    };

    fn client_for(url: &str) -> HttpClient {
        let service = ServiceConfig {
            url: url.to_owned(),
            timeout_secs: 5,
        };

        HttpClient::new(&RevokerConfig {
            ra_service: service.clone(),
            sa_service: service,
            operator: None,
        })
        .unwrap()
    }

    fn http_revoker(client: HttpClient) -> Revoker {
        let client = Arc::new(client);
        Revoker::new(client.clone(), client, "alice")
    }

    #[test]
    fn urls_join_segments() {
        let client = client_for("http://sa.test:9095/api/");
        assert_eq!(
            client.sa.url(&["precertificates", "00ff"]).as_str(),
            "http://sa.test:9095/api/precertificates/00ff"
        );

        // escaped, not interpreted
        assert_eq!(
            client.sa.url(&["precertificates", "../admin"]).as_str(),
            "http://sa.test:9095/api/precertificates/..%2Fadmin"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        let config = RevokerConfig {
            ra_service: ServiceConfig {
                url: "mailto:ra@example.com".to_owned(),
                timeout_secs: 5,
            },
            sa_service: ServiceConfig {
                url: "http://sa.test".to_owned(),
                timeout_secs: 5,
            },
            operator: None,
        };

        assert!(HttpClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn registration_lookup() {
        let authority = Arc::new(MemoryAuthority::new());
        let id = authority.add_registration();
        let server = with_authority_server(authority);
        let client = client_for(&server.url);

        let registration = client.get_registration(id).await.unwrap().unwrap();
        assert_eq!(registration.id, id);

        assert!(client.get_registration(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoke_over_http() {
        let ca = TestCa::new();
        let authority = Arc::new(MemoryAuthority::new());
        let reg = authority.add_registration();
        let subject = PublicKey::P256(test_p256_key().public_key());
        let serial = authority.add_precertificate(reg, ca.issue(9, &subject));

        let server = with_authority_server(authority.clone());
        let revoker = http_revoker(client_for(&server.url));

        revoker
            .revoke_by_serial(&serial, RevocationReason::Superseded, false)
            .await
            .unwrap();

        assert_eq!(authority.status(&serial), Some(RevocationReason::Superseded));
        let revocations = authority.revocations();
        assert_eq!(revocations[0].admin_name, "alice");
        assert!(matches!(revocations[0].cert, CertificateRef::Der(_)));
    }

    #[tokio::test]
    async fn not_found_crosses_http() {
        let authority = Arc::new(MemoryAuthority::new());
        let server = with_authority_server(authority.clone());
        let revoker = http_revoker(client_for(&server.url));

        let err = revoker
            .revoke_by_serial("00ff", RevocationReason::Unspecified, false)
            .await
            .unwrap_err();
        assert!(is_not_found(&err));

        // the authority itself reports the unknown serial
        let err = revoker
            .revoke_malformed_by_serial("00ff", RevocationReason::Unspecified)
            .await
            .unwrap_err();
        assert!(is_not_found(&err));

        let err = revoker
            .revoke_by_registration(42, RevocationReason::Unspecified)
            .await
            .unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn authority_failure_is_reported() {
        let ca = TestCa::new();
        let authority = Arc::new(MemoryAuthority::new());
        let reg = authority.add_registration();
        let subject = PublicKey::P256(test_p256_key().public_key());
        let serial = authority.add_precertificate(reg, ca.issue(1, &subject));
        authority.fail_revocations_of(&serial);

        let server = with_authority_server(authority);
        let revoker = http_revoker(client_for(&server.url));

        let err = revoker
            .revoke_by_serial(&serial, RevocationReason::Unspecified, false)
            .await
            .unwrap_err();
        assert!(!is_not_found(&err));
        assert!(format!("{err:#}").contains("serverInternal"));
    }

    #[tokio::test]
    async fn key_compromise_over_http() {
        let ca = TestCa::new();
        let authority = Arc::new(MemoryAuthority::new());
        let reg = authority.add_registration();
        let key = PrivateKey::from(test_p256_key());
        let serials = [
            authority.add_precertificate(reg, ca.issue(1, &key.public_key())),
            authority.add_precertificate(reg, ca.issue(2, &key.public_key())),
        ];

        let server = with_authority_server(authority.clone());
        let revoker = http_revoker(client_for(&server.url));

        let report = revoker.inspect_private_key(&key).await.unwrap();
        assert_eq!(report.matching_certs, 2);
        assert_eq!(report.spki_hash, fingerprint(&key.public_key()).unwrap());

        let outcome = revoker
            .private_key_revoke(false, report.matching_certs, &key)
            .await
            .unwrap();
        assert_eq!(outcome, KeyActionOutcome::RevokedAndBlocked { revoked: 2 });

        for serial in &serials {
            assert_eq!(authority.status(serial), Some(RevocationReason::KeyCompromise));
        }
        assert_eq!(authority.blocked_keys().len(), 1);
        assert!(revoker
            .spki_hash_in_blocked_keys(&report.spki_hash)
            .await
            .unwrap());
    }
}

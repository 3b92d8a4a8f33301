//! Administrative certificate revocation and key-compromise response for a CA back-end.
//!
//! Operators use this crate (usually through the `admin-revoker` binary) to revoke issued
//! certificates outside the normal subscriber flow:
//!
//! - a single certificate by serial, or one whose stored bytes never parsed;
//! - every certificate in a file of serials, with bounded parallelism;
//! - every certificate belonging to a registration;
//! - every certificate issued for a compromised private key, and/or blocking future issuance for
//!   that key.
//!
//! # Key Compromise
//!
//! A compromised key is accepted as evidence only after proving that its private half signs for
//! its public half (see [`verify_key_pair`]). Its fingerprint is the SHA-256 hash of the DER
//! encoded SubjectPublicKeyInfo (see [`SpkiHash`]), which is matched against the hashes the CA
//! recorded at issuance.
//!
//! Both key workflows default to a dry run which only reports how many certificates would be
//! affected. See [`Revoker::private_key_block`] and [`Revoker::private_key_revoke`].
//!
//! # Collaborators
//!
//! A [`Revoker`] acts through a [`RegistrationAuthority`] and a [`StorageAuthority`].
//! [`HttpClient`] implements both against the CA's services; tests and embedders can substitute
//! their own.
//!
//! [`RegistrationAuthority`]: crate::authority::RegistrationAuthority
//! [`StorageAuthority`]: crate::authority::StorageAuthority

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

mod cert;
mod config;
mod error;
mod reason;
mod req;
mod revoker;
mod trans;
mod util;

pub mod api;
pub mod authority;
pub mod key;
pub mod spki;


pub use crate::{
    cert::{certificate_spki_hash, serial_to_string, CertificateRef},
    config::{Config, RevokerConfig, ServiceConfig},
    error::{is_already_blocked, is_not_found, AlreadyBlocked, NotFound},
    key::{load_private_key, verify_key_pair, PrivateKey, PublicKey},
    reason::RevocationReason,
    revoker::{BatchReport, KeyActionOutcome, KeyReport, Revoker, BLOCKED_KEY_SOURCE},
    spki::{fingerprint, SpkiHash},
    trans::HttpClient,
};

use std::fmt;

use der::{Decode as _, Encode as _};
use eyre::WrapErr as _;

use crate::spki::SpkiHash;

/// A certificate to revoke.
///
/// DER is authoritative when present. Certificates that failed to parse (or were never stored)
/// can only be named by their serial.
#[derive(Clone, PartialEq, Eq)]
pub enum CertificateRef {
    Der(Vec<u8>),
    Serial(String),
}

impl CertificateRef {
    /// Hex serial of the certificate, parsed out of the DER when available.
    pub fn serial(&self) -> eyre::Result<String> {
        match self {
            CertificateRef::Der(der) => Ok(serial_to_string(&parse_certificate(der)?)),
            CertificateRef::Serial(serial) => Ok(serial.clone()),
        }
    }
}

impl fmt::Debug for CertificateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateRef::Der(der) => write!(f, "Der({} bytes)", der.len()),
            CertificateRef::Serial(serial) => f.debug_tuple("Serial").field(serial).finish(),
        }
    }
}

pub(crate) fn parse_certificate(der: &[u8]) -> eyre::Result<x509_cert::Certificate> {
    x509_cert::Certificate::from_der(der).wrap_err("failed to parse certificate DER")
}

/// Renders the serial as the CA does: lowercase hex, zero padded to 36 digits.
pub fn serial_to_string(cert: &x509_cert::Certificate) -> String {
    let bytes = cert.tbs_certificate.serial_number.as_bytes();
    let significant = bytes
        .iter()
        .position(|byte| *byte != 0)
        .map_or(&[][..], |first| &bytes[first..]);

    format!("{:0>36}", hex::encode(significant))
}

/// SPKI hash of the key a certificate was issued for.
pub fn certificate_spki_hash(cert: &x509_cert::Certificate) -> eyre::Result<SpkiHash> {
    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .wrap_err("failed to encode certificate SubjectPublicKeyInfo")?;
    Ok(SpkiHash::from_spki_der(&spki_der))
}

use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rsa::pkcs8::DecodePublicKey;
use rsa::rand_core::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use x509_cert::Certificate;
use x509_cert::der::{Decode, DecodePem, Encode};
use x509_cert::spki::ObjectIdentifier;

use crate::config::consts::TIMESTAMP_FORMAT;
use crate::error::{DarajaError, Result};

/// rsaEncryption (PKCS #1)
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Gateway timestamps are East Africa Time (UTC+3, no DST).
const GATEWAY_UTC_OFFSET_HOURS: i64 = 3;

/// Derive the STK password: base64(shortcode + passkey + timestamp).
pub fn derive_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    BASE64_STANDARD.encode(format!("{shortcode}{passkey}{timestamp}"))
}

/// Format an instant the way the gateway expects, e.g. `20230101120000`.
pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current gateway timestamp.
pub fn timestamp_now() -> String {
    let now = Utc::now() + Duration::hours(GATEWAY_UTC_OFFSET_HOURS);
    now.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

/// Encrypt the initiator password with the gateway certificate's RSA key
/// (PKCS#1 v1.5) and base64 the ciphertext.
///
/// The certificate may be PEM or raw DER. Fails with
/// [`DarajaError::CertificateParse`] on malformed input and
/// [`DarajaError::UnsupportedKeyType`] if the key is not RSA.
pub fn encrypt_initiator_secret(initiator_password: &str, certificate: &[u8]) -> Result<String> {
    let public_key = rsa_public_key(certificate)?;
    let ciphertext =
        public_key.encrypt(&mut OsRng, Pkcs1v15Encrypt, initiator_password.as_bytes())?;
    Ok(BASE64_STANDARD.encode(ciphertext))
}

fn rsa_public_key(certificate: &[u8]) -> Result<RsaPublicKey> {
    let cert = parse_certificate(certificate)?;
    let spki = &cert.tbs_certificate.subject_public_key_info;
    if spki.algorithm.oid != RSA_ENCRYPTION_OID {
        return Err(DarajaError::UnsupportedKeyType(spki.algorithm.oid.to_string()));
    }
    let spki_der = spki
        .to_der()
        .map_err(|e| DarajaError::CertificateParse(e.to_string()))?;
    RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| DarajaError::CertificateParse(e.to_string()))
}

fn parse_certificate(certificate: &[u8]) -> Result<Certificate> {
    let trimmed = certificate.trim_ascii_start();
    if trimmed.starts_with(b"-----BEGIN") {
        return Certificate::from_pem(trimmed)
            .map_err(|e| DarajaError::CertificateParse(e.to_string()));
    }
    Certificate::from_der(certificate).map_err(|e| DarajaError::CertificateParse(e.to_string()))
}

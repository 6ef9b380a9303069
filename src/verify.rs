//! Single-step certificate checks.
//!
//! A certificate is checked against exactly one trust root: itself for
//! self-signed fixtures, or the CA certificate it was issued by. No
//! intermediate chain building is attempted.

use der::Encode;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha2::Sha256;
use time::OffsetDateTime;

use crate::cert::Certificate;
use crate::cert::extensions::KeyUsages;
use crate::error::{CertFixtureError, Result};

/// Verifies a PEM certificate using only itself as the trust root.
pub fn verify_self_signed(cert_pem: &[u8]) -> Result<()> {
    let cert = Certificate::from_pem(cert_pem)?;
    verify_at(&cert, &cert, OffsetDateTime::now_utc())
}

/// Verifies a PEM certificate using `ca_cert_pem` as the sole trust root.
pub fn verify_signed_by(cert_pem: &[u8], ca_cert_pem: &[u8]) -> Result<()> {
    let cert = Certificate::from_pem(cert_pem)?;
    let root = Certificate::from_pem(ca_cert_pem)?;
    verify_at(&cert, &root, OffsetDateTime::now_utc())
}

/// Verifies `cert` against `root` at the instant `at`.
///
/// Name chaining, issuer constraints and the signature are checked before
/// time validity, so an expired but otherwise valid certificate reports
/// [`CertFixtureError::CertificateExpiredError`].
pub fn verify_at(cert: &Certificate, root: &Certificate, at: OffsetDateTime) -> Result<()> {
    let tbs = &cert.inner.tbs_certificate;

    if tbs.issuer != root.inner.tbs_certificate.subject {
        return Err(CertFixtureError::VerificationError(
            "issuer does not match trust root subject".to_string(),
        ));
    }

    if cert != root {
        if !root.is_ca()? {
            return Err(CertFixtureError::VerificationError(
                "trust root is not a certificate authority".to_string(),
            ));
        }
        if let Some(key_usage) = root.key_usage()? {
            if !key_usage.contains(KeyUsages::KeyCertSign) {
                return Err(CertFixtureError::VerificationError(
                    "trust root key usage does not allow certificate signing".to_string(),
                ));
            }
        }
    }

    if cert.inner.signature_algorithm.oid != const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION {
        return Err(CertFixtureError::VerificationError(format!(
            "unsupported signature algorithm {}",
            cert.inner.signature_algorithm.oid
        )));
    }

    let verifying_key = VerifyingKey::<Sha256>::new(root.public_key()?);
    let signature = Signature::try_from(cert.inner.signature.raw_bytes())
        .map_err(|e| CertFixtureError::VerificationError(e.to_string()))?;
    verifying_key
        .verify(&tbs.to_der()?, &signature)
        .map_err(|_| {
            CertFixtureError::VerificationError("certificate signature does not verify".to_string())
        })?;

    if !cert.validity().contains(at) || !root.validity().contains(at) {
        return Err(CertFixtureError::CertificateExpiredError);
    }

    Ok(())
}

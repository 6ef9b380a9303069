//! Fixture issuance entry points.

use rand_core::{CryptoRngCore, OsRng};

use crate::cert::params::CertificateOptions;
use crate::error::{CertFixtureError, Result};
use crate::issuer::{CertificateAuthority, Issuer, SelfIssuer};
use crate::key::KeyPair;
use crate::pem_utils;
use crate::request::CertificationRequest;
use crate::tbs_certificate::CertificateTemplate;

/// A freshly issued certificate and its private key, both PEM-encoded.
///
/// `certificate` holds a `CERTIFICATE` block, `private_key` an
/// `RSA PRIVATE KEY` (PKCS#1) block.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    pub certificate: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl IssuedCertificate {
    /// Splits into `(certificate, private_key)`.
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.certificate, self.private_key)
    }
}

impl std::fmt::Debug for IssuedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCertificate")
            .field("certificate", &String::from_utf8_lossy(&self.certificate))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Where the issuer identity and signing key come from.
enum IssuerStrategy<'a> {
    SelfSigned,
    Authority(&'a CertificateAuthority),
}

/// Generates a self-signed certificate using the operating system RNG.
pub fn generate_self_signed(options: &CertificateOptions) -> Result<IssuedCertificate> {
    generate_self_signed_with_rng(options, &mut OsRng)
}

/// Generates a self-signed certificate drawing all randomness from `rng`.
pub fn generate_self_signed_with_rng<R: CryptoRngCore + ?Sized>(
    options: &CertificateOptions,
    rng: &mut R,
) -> Result<IssuedCertificate> {
    let template = CertificateTemplate::from_options(options, rng)?;
    issue(&template, IssuerStrategy::SelfSigned, rng)
}

/// Generates a certificate signed by the CA in `ca_cert_pem` / `ca_key_pem`,
/// using the operating system RNG.
///
/// An empty slice stands for a missing input and fails like any other
/// unloadable CA pair.
pub fn generate_signed(
    options: &CertificateOptions,
    ca_cert_pem: &[u8],
    ca_key_pem: &[u8],
) -> Result<IssuedCertificate> {
    generate_signed_with_rng(options, ca_cert_pem, ca_key_pem, &mut OsRng)
}

/// Generates a CA-signed certificate drawing all randomness from `rng`.
///
/// The CA pair is loaded after the template is built and before the subject
/// key is generated.
pub fn generate_signed_with_rng<R: CryptoRngCore + ?Sized>(
    options: &CertificateOptions,
    ca_cert_pem: &[u8],
    ca_key_pem: &[u8],
    rng: &mut R,
) -> Result<IssuedCertificate> {
    let template = CertificateTemplate::from_options(options, rng)?;
    let authority = CertificateAuthority::from_pem(ca_cert_pem, ca_key_pem)?;
    issue(&template, IssuerStrategy::Authority(&authority), rng)
}

fn issue<R: CryptoRngCore + ?Sized>(
    template: &CertificateTemplate,
    strategy: IssuerStrategy<'_>,
    rng: &mut R,
) -> Result<IssuedCertificate> {
    let key_pair = KeyPair::generate_rsa(rng)?;

    let (certificate, mode) = match strategy {
        IssuerStrategy::SelfSigned => {
            let issuer = SelfIssuer::new(template.subject.as_x509_name()?, &key_pair);
            (issuer.issue(template, key_pair.as_spki()?)?, "self-signed")
        }
        IssuerStrategy::Authority(authority) => {
            let request = CertificationRequest::new(&template.subject, &key_pair)?;
            let request = CertificationRequest::from_der(&request.to_der()?)
                .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))?;
            let certificate = authority.issue(template, request.subject_public_key().clone())?;
            (certificate, "ca-signed")
        }
    };

    tracing::debug!(
        mode,
        serial = %format!("{:032x}", template.serial_number),
        subject = %template.subject.common_name,
        is_ca = template.is_ca,
        "issued fixture certificate"
    );

    Ok(IssuedCertificate {
        certificate: pem_utils::encode_certificate(&certificate.to_der()?),
        private_key: pem_utils::encode_rsa_private_key(&key_pair)?,
    })
}

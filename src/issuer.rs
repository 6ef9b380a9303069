use der::Encode;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::{Certificate, SignatureAlgorithm};
use crate::error::{CertFixtureError, Result};
use crate::key::KeyPair;
use crate::pem_utils;
use crate::tbs_certificate::CertificateTemplate;

/// Represents an entity capable of issuing certificates.
///
/// Self-signed and CA-signed issuance differ only in where the issuer name,
/// signing key and authority key identifier come from.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> Name;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Returns the key identifier to reference from issued certificates.
    fn authority_key_identifier(&self) -> Option<Vec<u8>>;

    /// Issues a certificate for `subject_public_key` shaped by `template`.
    ///
    /// # Arguments
    /// * `template` - The logical certificate fields.
    /// * `subject_public_key` - The key the certificate binds to the subject.
    fn issue(
        &self,
        template: &CertificateTemplate,
        subject_public_key: SubjectPublicKeyInfoOwned,
    ) -> Result<Certificate> {
        let authority_key_id = self.authority_key_identifier();
        let tbs_cert_inner = template.to_tbs_certificate_inner(
            self.issuer_name(),
            subject_public_key,
            authority_key_id.as_deref(),
        )?;

        let tbs_der = tbs_cert_inner
            .to_der()
            .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))?;
        let signature = self.signing_key().sign_data(&tbs_der)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: SignatureAlgorithm::Sha256WithRSA.into(),
            signature: der::asn1::BitString::from_bytes(&signature)
                .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

/// Issuer for self-signed certificates: the subject signs for itself.
pub struct SelfIssuer<'a> {
    name: Name,
    key: &'a KeyPair,
}

impl<'a> SelfIssuer<'a> {
    pub fn new(name: Name, key: &'a KeyPair) -> Self {
        Self { name, key }
    }
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> Name {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }

    fn authority_key_identifier(&self) -> Option<Vec<u8>> {
        None
    }
}

/// A CA certificate together with its private key.
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    pub cert: Certificate,
    pub key: KeyPair,
    key_identifier: Option<Vec<u8>>,
}

impl CertificateAuthority {
    /// Loads a CA from PEM-encoded certificate and key input.
    ///
    /// Fails with [`CertFixtureError::CaKeyLoadError`] when either input is
    /// missing or unparsable, the key is not RSA, the key does not belong
    /// to the certificate, or its subject key identifier is malformed.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let load_error = |e: CertFixtureError| CertFixtureError::CaKeyLoadError(e.to_string());

        let cert_der = pem_utils::find_block(cert_pem, pem_utils::CERTIFICATE_LABEL)
            .map_err(load_error)?
            .ok_or_else(|| {
                CertFixtureError::CaKeyLoadError(
                    "failed to find certificate PEM data in certificate input".to_string(),
                )
            })?;
        let cert = Certificate::from_der(&cert_der).map_err(load_error)?;
        let key = KeyPair::import_from_pem(key_pem).map_err(load_error)?;

        let cert_public_key = cert.public_key().map_err(load_error)?;
        if &cert_public_key != key.public_key() {
            return Err(CertFixtureError::CaKeyLoadError(
                "private key does not match public key".to_string(),
            ));
        }

        let key_identifier = cert.subject_key_identifier().map_err(load_error)?;

        Ok(Self {
            cert,
            key,
            key_identifier,
        })
    }
}

impl Issuer for CertificateAuthority {
    fn issuer_name(&self) -> Name {
        // Copied verbatim so issued certificates chain by exact name match.
        self.cert.inner.tbs_certificate.subject.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }

    fn authority_key_identifier(&self) -> Option<Vec<u8>> {
        self.key_identifier.clone()
    }
}

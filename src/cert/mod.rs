pub mod extensions;
pub mod params;

use crate::error::{CertFixtureError, Result};
use der::{Decode, Encode, EncodePem};
use extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage,
    SubjectKeyIdentifier, ToAndFromX509Extension,
};
use params::{DistinguishedName, Validity};
use pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use time::{OffsetDateTime, UtcOffset};

/// Represents the supported signature algorithms for certificates.
///
/// Fixtures are RSA only, so a single algorithm is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRSA,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA signature identifiers carry explicit NULL parameters.
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Sha256WithRSA => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(der::asn1::AnyRef::NULL.into()),
            },
        }
    }
}

/// Represents an X.509 certificate.
///
/// Wraps the parsed `x509_cert` structure and exposes the fields fixtures
/// are usually asserted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: x509_cert::Certificate,
}

impl Certificate {
    /// Parses a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: x509_cert::Certificate::from_der(der)?,
        })
    }

    /// Parses the first `CERTIFICATE` block of PEM input.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self> {
        let der = crate::pem_utils::find_block(pem_bytes, crate::pem_utils::CERTIFICATE_LABEL)?
            .ok_or_else(|| {
                CertFixtureError::DecodingError("no CERTIFICATE PEM block found".to_string())
            })?;
        Self::from_der(&der)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertFixtureError::PemEncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(der::pem::LineEnding::LF)
            .map_err(|e| CertFixtureError::PemEncodingError(e.to_string()))
    }

    pub fn subject(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// Returns the serial number as big-endian bytes without sign padding.
    pub fn serial_number(&self) -> Vec<u8> {
        let bytes = self.inner.tbs_certificate.serial_number.as_bytes();
        let first_significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        bytes[first_significant..].to_vec()
    }

    pub fn validity(&self) -> Validity {
        let validity = &self.inner.tbs_certificate.validity;
        Validity {
            not_before: x509_time_to_offset(&validity.not_before),
            not_after: x509_time_to_offset(&validity.not_after),
        }
    }

    /// Reports whether the basic constraints extension marks this certificate as a CA.
    pub fn is_ca(&self) -> Result<bool> {
        Ok(self
            .extension::<BasicConstraints>()?
            .map(|bc| bc.is_ca)
            .unwrap_or(false))
    }

    pub fn key_usage(&self) -> Result<Option<KeyUsage>> {
        self.extension::<KeyUsage>()
    }

    pub fn extended_key_usage(&self) -> Result<Vec<ExtendedKeyUsageOption>> {
        Ok(self
            .extension::<ExtendedKeyUsage>()?
            .map(|eku| eku.usage)
            .unwrap_or_default())
    }

    pub fn subject_key_identifier(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.extension::<SubjectKeyIdentifier>()?.map(|ski| ski.0))
    }

    pub fn authority_key_identifier(&self) -> Result<Option<Vec<u8>>> {
        Ok(self
            .extension::<AuthorityKeyIdentifier>()?
            .map(|aki| aki.key_identifier))
    }

    /// Returns the RSA public key embedded in the certificate.
    pub fn public_key(&self) -> Result<RsaPublicKey> {
        let spki_der = self
            .inner
            .tbs_certificate
            .subject_public_key_info
            .to_der()?;
        RsaPublicKey::from_public_key_der(&spki_der)
            .map_err(|e| CertFixtureError::DecodingError(e.to_string()))
    }

    /// Decodes the extension of type `E`, if the certificate carries one.
    pub fn extension<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        self.inner
            .tbs_certificate
            .extensions
            .iter()
            .flatten()
            .find(|ext| ext.extn_id == E::OID)
            .map(|ext| E::from_x509_extension_value(ext.extn_value.as_bytes()))
            .transpose()
    }
}

fn x509_time_to_offset(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(ut) => OffsetDateTime::from(ut.to_system_time()),
        x509_cert::time::Time::GeneralTime(gt) => OffsetDateTime::from(gt.to_system_time()),
    }
}

pub(crate) fn offset_to_x509_time(instant: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let to_creation_error = |e: der::Error| CertFixtureError::CertificateCreationError(e.to_string());
    let time = instant.to_offset(UtcOffset::UTC);
    let system_time = std::time::SystemTime::from(time);
    // RFC 5280 4.1.2.5: UTCTime through 2049, GeneralizedTime from 2050.
    if time.year() < 2050 {
        Ok(x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_system_time(system_time).map_err(to_creation_error)?,
        ))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            der::asn1::GeneralizedTime::from_system_time(system_time)
                .map_err(to_creation_error)?,
        ))
    }
}

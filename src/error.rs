//! use certfixture::error::CertFixtureError;

use thiserror::Error;
use time::OffsetDateTime;

/// Represents errors that can occur while issuing or checking fixture certificates.
///
/// Variants are listed in the order an end-to-end issuance call can raise them.
#[derive(Debug, Error, Clone)]
pub enum CertFixtureError {
    /// The requested validity window is empty or inverted.
    #[error("not_before ({not_before}) must be earlier than not_after ({not_after})")]
    ValidityRangeError {
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    },

    /// The random source or the RSA key generation primitive failed.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// The supplied CA certificate and key do not form a loadable pair.
    #[error("Failed to load CA key pair: {0}")]
    CaKeyLoadError(String),

    /// The certificate could not be assembled or signed.
    #[error("Failed to create certificate: {0}")]
    CertificateCreationError(String),

    /// The certificate or key could not be serialized.
    #[error("Failed to encode PEM output: {0}")]
    PemEncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// A certificate failed signature, name or constraint checks.
    #[error("Certificate verification failed: {0}")]
    VerificationError(String),

    /// A certificate is outside its validity window.
    #[error("certificate has expired or is not yet valid")]
    CertificateExpiredError,
}

pub type Result<T> = std::result::Result<T, CertFixtureError>;

impl From<der::Error> for CertFixtureError {
    /// Converts a `der::Error` into a `CertFixtureError`.
    fn from(err: der::Error) -> Self {
        CertFixtureError::DecodingError(err.to_string())
    }
}

impl From<pem::PemError> for CertFixtureError {
    fn from(err: pem::PemError) -> Self {
        CertFixtureError::DecodingError(err.to_string())
    }
}

//! # certfixture - X.509 Test Fixtures in Pure Rust
//!
//! certfixture manufactures throwaway X.509 certificates for tests: self-signed
//! certificates and certificates signed by a caller-supplied certificate
//! authority, with a configurable subject, CA flag and validity window. It is
//! built entirely with rustcrypto libraries and returns PEM byte buffers ready
//! to be written to fixture files or handed to the program under test.
//!
//! ## What Gets Issued
//!
//! Every call generates a fresh **RSA-4096** key pair and a random 128-bit
//! serial number. Issued certificates carry:
//!
//! - **Key Usage**: `digitalSignature` and `keyEncipherment`, plus `keyCertSign` for CAs
//! - **Extended Key Usage**: `serverAuth` and `clientAuth`
//! - **Basic Constraints**: `cA = true` for CA certificates only
//! - **Validity**: now to now + 30 days unless bounds are supplied
//!
//! ## Quick Start
//!
//! ### Generating a Self-Signed Certificate
//!
//! ```rust,no_run
//! use certfixture::{CertificateOptions, generate_self_signed};
//!
//! # fn main() -> Result<(), certfixture::error::CertFixtureError> {
//! let options = CertificateOptions::builder()
//!     .common_name("example.com")
//!     .build();
//!
//! let issued = generate_self_signed(&options)?;
//! println!("Certificate:\n{}", String::from_utf8_lossy(&issued.certificate));
//! # Ok(())
//! # }
//! ```
//!
//! ### Issuing From a CA
//!
//! ```rust,no_run
//! use certfixture::{CertificateOptions, generate_self_signed, generate_signed};
//!
//! # fn main() -> Result<(), certfixture::error::CertFixtureError> {
//! let ca_options = CertificateOptions::builder()
//!     .common_name("Fixture CA")
//!     .is_ca(true)
//!     .build();
//! let (ca_cert, ca_key) = generate_self_signed(&ca_options)?.into_parts();
//!
//! let server_options = CertificateOptions::builder()
//!     .common_name("server.local")
//!     .organizational_unit("fixtures")
//!     .build();
//! let server = generate_signed(&server_options, &ca_cert, &ca_key)?;
//!
//! certfixture::verify::verify_signed_by(&server.certificate, &ca_cert)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Reproducible Fixtures
//!
//! Every entry point has a `_with_rng` variant taking any
//! [`rand_core::CryptoRngCore`]. With a seeded generator and both validity
//! bounds fixed, the output is byte-for-byte reproducible.
//!
//! ## Error Handling
//!
//! ```rust
//! use certfixture::{CertificateOptions, error::CertFixtureError, generate_signed};
//!
//! match generate_signed(&CertificateOptions::default(), b"", b"") {
//!     Err(CertFixtureError::CaKeyLoadError(msg)) => println!("Bad CA pair: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`generate`]: Issuance entry points
//! - [`key`]: RSA key generation, import and signing
//! - [`cert`]: Certificate parameters, extensions and read-back accessors
//! - [`tbs_certificate`]: Certificate templates and the "To Be Signed" structure
//! - [`request`]: PKCS#10 certification requests
//! - [`issuer`]: Self-signed and CA issuers
//! - [`pem_utils`]: PEM containers
//! - [`verify`]: Single-step chain and validity checks
//! - [`error`]: Error types

pub mod cert;
pub mod error;
pub mod generate;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod request;
pub mod tbs_certificate;
pub mod verify;

pub use cert::params::CertificateOptions;
pub use generate::{
    IssuedCertificate, generate_self_signed, generate_self_signed_with_rng, generate_signed,
    generate_signed_with_rng,
};

#![allow(dead_code)]

use std::sync::OnceLock;

use certfixture::{CertificateOptions, IssuedCertificate, generate_self_signed};
use time::{Duration, OffsetDateTime};

/// Allowed drift between the clock read by a test and the one read during issuance.
pub const THRESHOLD: Duration = Duration::minutes(2);

/// A self-signed CA shared by every test in the binary.
///
/// RSA-4096 generation is slow, so the CA is issued once per test binary.
pub fn ca() -> &'static IssuedCertificate {
    static CA: OnceLock<IssuedCertificate> = OnceLock::new();
    CA.get_or_init(|| {
        let options = CertificateOptions::builder()
            .common_name("myca.local")
            .is_ca(true)
            .build();
        generate_self_signed(&options).expect("failed to generate CA")
    })
}

/// An unrelated CA with the same subject as [`ca`], so only the signature tells them apart.
pub fn other_ca() -> &'static IssuedCertificate {
    static CA: OnceLock<IssuedCertificate> = OnceLock::new();
    CA.get_or_init(|| {
        let options = CertificateOptions::builder()
            .common_name("myca.local")
            .is_ca(true)
            .build();
        generate_self_signed(&options).expect("failed to generate CA")
    })
}

pub fn assert_close(actual: OffsetDateTime, expected: OffsetDateTime) {
    let drift = (actual - expected).abs();
    assert!(
        drift <= THRESHOLD,
        "expected {actual} to be within {THRESHOLD} of {expected}"
    );
}

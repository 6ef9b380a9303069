use crate::error::{CertFixtureError, Result};
use der::flagset::FlagSet;
use rand_core::CryptoRngCore;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::ext::pkix::KeyUsages;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage,
    SubjectKeyIdentifier, ToAndFromX509Extension,
};
use crate::cert::params::{CertificateOptions, DistinguishedName, Validity};

/// The logical fields of a fixture certificate, before an issuer is known.
///
/// # Fields
/// * `serial_number` - Random 128-bit positive serial.
/// * `subject` - The distinguished name of the certificate subject.
/// * `validity` - The resolved validity window.
/// * `key_usage` - Key usage bits.
/// * `extended_key_usage` - Extended key usage purposes.
/// * `is_ca` - Whether basic constraints mark the certificate as a CA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateTemplate {
    pub serial_number: u128,
    pub subject: DistinguishedName,
    pub validity: Validity,
    pub key_usage: FlagSet<KeyUsages>,
    pub extended_key_usage: Vec<ExtendedKeyUsageOption>,
    pub is_ca: bool,
}

impl CertificateTemplate {
    /// Builds a template from caller options.
    ///
    /// The validity window is resolved before anything is drawn from `rng`,
    /// so an invalid range never consumes randomness.
    pub fn from_options<R: CryptoRngCore + ?Sized>(
        options: &CertificateOptions,
        rng: &mut R,
    ) -> Result<Self> {
        let validity = Validity::resolve(options.not_before, options.not_after)?;
        let serial_number = random_serial_number(rng)?;

        let mut key_usage = KeyUsages::KeyEncipherment | KeyUsages::DigitalSignature;
        if options.is_ca {
            key_usage |= KeyUsages::KeyCertSign;
        }

        Ok(Self {
            serial_number,
            subject: DistinguishedName::from_options(options),
            validity,
            key_usage,
            extended_key_usage: vec![
                ExtendedKeyUsageOption::ServerAuth,
                ExtendedKeyUsageOption::ClientAuth,
            ],
            is_ca: options.is_ca,
        })
    }

    /// Assembles the extensions for a certificate carrying `subject_public_key`.
    ///
    /// CA certificates get a subject key identifier; an authority key
    /// identifier is added whenever the issuer provides one.
    pub fn extensions(
        &self,
        subject_public_key: &SubjectPublicKeyInfoOwned,
        authority_key_id: Option<&[u8]>,
    ) -> Result<Vec<x509_cert::ext::Extension>> {
        let mut extensions = vec![
            KeyUsage(self.key_usage).to_x509_extension(true)?,
            ExtendedKeyUsage {
                usage: self.extended_key_usage.clone(),
            }
            .to_x509_extension(false)?,
        ];

        if self.is_ca {
            extensions.push(
                BasicConstraints {
                    is_ca: true,
                    max_path_length: None,
                }
                .to_x509_extension(true)?,
            );
            extensions.push(SubjectKeyIdentifier::from_spki(subject_public_key).to_x509_extension(false)?);
        }

        if let Some(key_identifier) = authority_key_id {
            extensions.push(
                AuthorityKeyIdentifier {
                    key_identifier: key_identifier.to_vec(),
                }
                .to_x509_extension(false)?,
            );
        }

        Ok(extensions)
    }

    /// Converts the template into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(
        &self,
        issuer: Name,
        subject_public_key: SubjectPublicKeyInfoOwned,
        authority_key_id: Option<&[u8]>,
    ) -> Result<TbsCertificateInner> {
        let extensions = self.extensions(&subject_public_key, authority_key_id)?;

        let validity = x509_cert::time::Validity {
            not_before: crate::cert::offset_to_x509_time(self.validity.not_before)?,
            not_after: crate::cert::offset_to_x509_time(self.validity.not_after)?,
        };

        let serial_number = SerialNumber::new(&self.serial_number.to_be_bytes())
            .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: SignatureAlgorithm::Sha256WithRSA.into(),
            issuer,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: subject_public_key,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }
}

/// Draws a uniformly random serial in `1..2^128`.
fn random_serial_number<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<u128> {
    loop {
        let mut bytes = [0u8; 16];
        rng.try_fill_bytes(&mut bytes).map_err(|e| {
            CertFixtureError::KeyGenerationError(format!("failed to generate serial number: {e}"))
        })?;
        let serial = u128::from_be_bytes(bytes);
        if serial != 0 {
            return Ok(serial);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::{CryptoRng, RngCore, SeedableRng};
    use time::{Duration, OffsetDateTime};

    /// Fails every request for randomness.
    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            panic!("infallible draw from FailingRng")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("infallible draw from FailingRng")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("infallible draw from FailingRng")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
            Err(rand_core::Error::from(
                core::num::NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap(),
            ))
        }
    }

    impl CryptoRng for FailingRng {}

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(7)
    }

    #[test]
    fn test_template_defaults() {
        let template = CertificateTemplate::from_options(&CertificateOptions::default(), &mut rng()).unwrap();

        assert_ne!(template.serial_number, 0);
        assert_eq!(
            template.key_usage,
            KeyUsages::KeyEncipherment | KeyUsages::DigitalSignature
        );
        assert_eq!(
            template.extended_key_usage,
            vec![
                ExtendedKeyUsageOption::ServerAuth,
                ExtendedKeyUsageOption::ClientAuth
            ]
        );
        assert!(!template.is_ca);
        assert_eq!(template.subject, DistinguishedName::default());
        assert_eq!(
            template.validity.not_after - template.validity.not_before,
            Duration::days(30)
        );
    }

    #[test]
    fn test_template_ca_adds_cert_sign() {
        let options = CertificateOptions::builder().is_ca(true).build();
        let template = CertificateTemplate::from_options(&options, &mut rng()).unwrap();

        assert!(template.is_ca);
        assert!(template.key_usage.contains(KeyUsages::KeyCertSign));
        assert!(template.key_usage.contains(KeyUsages::DigitalSignature));
    }

    #[test]
    fn test_template_subject_from_options() {
        let options = CertificateOptions::builder()
            .common_name("some-common-name")
            .organizational_unit("some-organizational-unit")
            .build();
        let template = CertificateTemplate::from_options(&options, &mut rng()).unwrap();

        assert_eq!(template.subject.common_name, "some-common-name");
        assert_eq!(
            template.subject.organization_unit.as_deref(),
            Some("some-organizational-unit")
        );
    }

    #[test]
    fn test_serial_numbers_differ_between_calls() {
        let mut rng = rng();
        let options = CertificateOptions::default();
        let first = CertificateTemplate::from_options(&options, &mut rng).unwrap();
        let second = CertificateTemplate::from_options(&options, &mut rng).unwrap();
        assert_ne!(first.serial_number, second.serial_number);
    }

    #[test]
    fn test_invalid_range_is_reported_before_drawing_randomness() {
        let now = OffsetDateTime::now_utc();
        let options = CertificateOptions::builder()
            .not_before(now + Duration::days(1))
            .not_after(now)
            .build();
        let err = CertificateTemplate::from_options(&options, &mut FailingRng).unwrap_err();
        assert!(matches!(err, CertFixtureError::ValidityRangeError { .. }));
    }

    #[test]
    fn test_random_source_failure_is_a_key_generation_error() {
        let err =
            CertificateTemplate::from_options(&CertificateOptions::default(), &mut FailingRng)
                .unwrap_err();
        assert!(matches!(err, CertFixtureError::KeyGenerationError(_)));
    }

    #[test]
    fn test_extensions_for_leaf_and_ca() {
        let spki = SubjectPublicKeyInfoOwned {
            algorithm: x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::RSA_ENCRYPTION,
                parameters: None,
            },
            subject_public_key: der::asn1::BitString::from_bytes(&[1, 2, 3]).unwrap(),
        };

        let leaf = CertificateTemplate::from_options(&CertificateOptions::default(), &mut rng()).unwrap();
        let oids: Vec<_> = leaf
            .extensions(&spki, None)
            .unwrap()
            .iter()
            .map(|ext| ext.extn_id)
            .collect();
        assert_eq!(oids, vec![KeyUsage::OID, ExtendedKeyUsage::OID]);

        let options = CertificateOptions::builder().is_ca(true).build();
        let ca = CertificateTemplate::from_options(&options, &mut rng()).unwrap();
        let extensions = ca.extensions(&spki, Some(&[9, 9, 9])).unwrap();
        let oids: Vec<_> = extensions.iter().map(|ext| ext.extn_id).collect();
        assert_eq!(
            oids,
            vec![
                KeyUsage::OID,
                ExtendedKeyUsage::OID,
                BasicConstraints::OID,
                SubjectKeyIdentifier::OID,
                AuthorityKeyIdentifier::OID,
            ]
        );
        assert!(extensions[2].critical);
    }
}

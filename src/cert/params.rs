use bon::Builder;
use der::Tag;
use der::asn1::{Any, SetOfVec};
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use crate::error::{CertFixtureError, Result};

/// Lifetime of a certificate when no upper bound is supplied.
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// Caller input for one issuance call.
///
/// # Fields
/// * `common_name` - The subject common name (CN).
/// * `organizational_unit` - The subject organizational unit (OU).
/// * `is_ca` - Marks the certificate as a certificate authority.
/// * `not_before` - Start of the validity window; defaults to now.
/// * `not_after` - End of the validity window; defaults to `not_before` + 30 days.
///
/// Both bounds must fall between 1970 and 9999 (UTC). Earlier instants cannot
/// be encoded and fail with [`CertFixtureError::CertificateCreationError`].
#[derive(Clone, Debug, Default, Builder)]
pub struct CertificateOptions {
    #[builder(into)]
    pub common_name: Option<String>,
    #[builder(into)]
    pub organizational_unit: Option<String>,
    #[builder(default)]
    pub is_ca: bool,
    pub not_before: Option<OffsetDateTime>,
    pub not_after: Option<OffsetDateTime>,
}

/// Distinguished name of a fixture certificate.
///
/// Only the attributes fixtures use are modelled. An empty or missing value
/// means the attribute is absent from the encoded name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
pub struct DistinguishedName {
    #[builder(default, into)]
    pub common_name: String,
    #[builder(into)]
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// Builds the subject named by `options`.
    pub fn from_options(options: &CertificateOptions) -> Self {
        DistinguishedName {
            common_name: options.common_name.clone().unwrap_or_default(),
            organization_unit: options
                .organizational_unit
                .clone()
                .filter(|ou| !ou.is_empty()),
        }
    }

    /// Converts the distinguished name to an X.509-compatible format.
    ///
    /// Attributes are emitted as UTF8String, OU before CN.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::Name> {
        let mut rdns = Vec::new();
        if let Some(ou) = self.organization_unit.as_deref().filter(|ou| !ou.is_empty()) {
            rdns.push(single_attribute_rdn(const_oid::db::rfc4519::OU, ou)?);
        }
        if !self.common_name.is_empty() {
            rdns.push(single_attribute_rdn(
                const_oid::db::rfc4519::CN,
                &self.common_name,
            )?);
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Attribute values are read as text regardless of their string type.
    pub fn from_x509_name(x509dn: &x509_cert::name::Name) -> Result<Self> {
        let mut name = DistinguishedName::default();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let value = || {
                    std::str::from_utf8(attr.value.value())
                        .map(str::to_string)
                        .map_err(|e| CertFixtureError::DecodingError(e.to_string()))
                };
                if attr.oid == const_oid::db::rfc4519::CN {
                    name.common_name = value()?;
                } else if attr.oid == const_oid::db::rfc4519::OU {
                    name.organization_unit = Some(value()?);
                }
            }
        }

        Ok(name)
    }
}

fn single_attribute_rdn(
    oid: const_oid::ObjectIdentifier,
    value: &str,
) -> Result<RelativeDistinguishedName> {
    let to_creation_error = |e: der::Error| CertFixtureError::CertificateCreationError(e.to_string());
    let attribute = AttributeTypeAndValue {
        oid,
        value: Any::new(Tag::Utf8String, value.as_bytes().to_vec()).map_err(to_creation_error)?,
    };
    let set = SetOfVec::try_from(vec![attribute]).map_err(to_creation_error)?;
    Ok(RelativeDistinguishedName(set))
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Resolves partially specified bounds against the current time.
    pub fn resolve(
        not_before: Option<OffsetDateTime>,
        not_after: Option<OffsetDateTime>,
    ) -> Result<Self> {
        Self::resolve_at(not_before, not_after, OffsetDateTime::now_utc())
    }

    /// Resolves partially specified bounds, using `now` for a missing start.
    ///
    /// A missing end defaults to [`DEFAULT_VALIDITY_DAYS`] after the start.
    /// Fails with [`CertFixtureError::ValidityRangeError`] unless
    /// `not_before` is strictly earlier than `not_after`.
    pub fn resolve_at(
        not_before: Option<OffsetDateTime>,
        not_after: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Result<Self> {
        let not_before = not_before.unwrap_or(now);
        let not_after = match not_after {
            Some(not_after) => not_after,
            None => not_before
                .checked_add(Duration::days(DEFAULT_VALIDITY_DAYS))
                .ok_or_else(|| {
                    CertFixtureError::CertificateCreationError(format!(
                        "default validity end after {not_before} is out of range"
                    ))
                })?,
        };

        if not_before >= not_after {
            return Err(CertFixtureError::ValidityRangeError {
                not_before,
                not_after,
            });
        }

        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// Reports whether `at` falls inside the window, bounds included.
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap()
    }

    #[test]
    fn test_resolve_defaults_to_thirty_days_from_now() {
        let validity = Validity::resolve_at(None, None, now()).unwrap();
        assert_eq!(validity.not_before, now());
        assert_eq!(validity.not_after, now() + Duration::days(30));
    }

    #[test]
    fn test_resolve_only_not_before() {
        let not_before = now() - Duration::days(10);
        let validity = Validity::resolve_at(Some(not_before), None, now()).unwrap();
        assert_eq!(validity.not_before, not_before);
        assert_eq!(validity.not_after, not_before + Duration::days(30));
    }

    #[test]
    fn test_resolve_only_not_after() {
        let not_after = now() + Duration::days(10);
        let validity = Validity::resolve_at(None, Some(not_after), now()).unwrap();
        assert_eq!(validity.not_before, now());
        assert_eq!(validity.not_after, not_after);
    }

    #[test]
    fn test_resolve_both_bounds_verbatim() {
        let not_before = now() - Duration::days(10);
        let not_after = now() - Duration::days(5);
        let validity = Validity::resolve_at(Some(not_before), Some(not_after), now()).unwrap();
        assert_eq!(
            validity,
            Validity {
                not_before,
                not_after
            }
        );
    }

    #[test]
    fn test_resolve_rejects_inverted_range() {
        let not_after = now();
        let not_before = now() + Duration::days(1);
        let err = Validity::resolve_at(Some(not_before), Some(not_after), now()).unwrap_err();
        match err {
            CertFixtureError::ValidityRangeError {
                not_before: nb,
                not_after: na,
            } => {
                assert_eq!(nb, not_before);
                assert_eq!(na, not_after);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_rejects_equal_bounds() {
        let err = Validity::resolve_at(Some(now()), Some(now()), now()).unwrap_err();
        assert!(matches!(err, CertFixtureError::ValidityRangeError { .. }));
    }

    #[test]
    fn test_resolve_rejects_not_after_before_now() {
        let not_after = now() - Duration::days(1);
        let err = Validity::resolve_at(None, Some(not_after), now()).unwrap_err();
        assert!(matches!(err, CertFixtureError::ValidityRangeError { .. }));
    }

    #[test]
    fn test_resolve_default_end_past_max_date_is_an_error() {
        let not_before = time::Date::from_calendar_date(9999, time::Month::December, 20)
            .unwrap()
            .midnight()
            .assume_utc();
        let err = Validity::resolve_at(Some(not_before), None, now()).unwrap_err();
        assert!(matches!(err, CertFixtureError::CertificateCreationError(_)));
    }

    #[test]
    fn test_distinguished_name_omits_empty_attributes() {
        let options = CertificateOptions::builder()
            .common_name("")
            .organizational_unit("")
            .build();
        let dn = DistinguishedName::from_options(&options);
        assert_eq!(dn.organization_unit, None);
        assert!(dn.as_x509_name().unwrap().0.is_empty());
    }

    #[test]
    fn test_distinguished_name_x509_round_trip() {
        let dn = DistinguishedName::builder()
            .common_name("example.com")
            .organization_unit("fixtures")
            .build();
        let x509 = dn.as_x509_name().unwrap();
        assert_eq!(x509.0.len(), 2);
        assert_eq!(DistinguishedName::from_x509_name(&x509).unwrap(), dn);
    }
}

//! PKCS#10 certification requests.
//!
//! CA-signed fixtures take their subject public key from a request signed by
//! the freshly generated subject key, the same path an external CSR would take.

use der::asn1::BitString;
use der::{Decode, Encode};
use pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha2::Sha256;
use x509_cert::attr::Attributes;
use x509_cert::request::{CertReq, CertReqInfo, Version};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::cert::params::DistinguishedName;
use crate::error::{CertFixtureError, Result};
use crate::key::KeyPair;

/// A signed certification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationRequest {
    pub inner: CertReq,
}

impl CertificationRequest {
    /// Builds a request for `subject` and signs it with `key_pair`.
    pub fn new(subject: &DistinguishedName, key_pair: &KeyPair) -> Result<Self> {
        let info = CertReqInfo {
            version: Version::V1,
            subject: subject.as_x509_name()?,
            public_key: key_pair.as_spki()?,
            attributes: Attributes::new(),
        };

        let info_der = info
            .to_der()
            .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))?;
        let signature = key_pair.sign_data(&info_der)?;

        Ok(Self {
            inner: CertReq {
                info,
                algorithm: SignatureAlgorithm::Sha256WithRSA.into(),
                signature: BitString::from_bytes(&signature)
                    .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))?,
            },
        })
    }

    /// Parses a DER-encoded request and checks its self-signature.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let request = Self {
            inner: CertReq::from_der(der)?,
        };
        request.verify()?;
        Ok(request)
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))
    }

    /// Checks that the request was signed by the key it carries.
    pub fn verify(&self) -> Result<()> {
        if self.inner.algorithm.oid != const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION {
            return Err(CertFixtureError::VerificationError(format!(
                "unsupported request signature algorithm {}",
                self.inner.algorithm.oid
            )));
        }

        let public_key = RsaPublicKey::from_public_key_der(&self.inner.info.public_key.to_der()?)
            .map_err(|e| CertFixtureError::DecodingError(e.to_string()))?;
        let signature = Signature::try_from(self.inner.signature.raw_bytes())
            .map_err(|e| CertFixtureError::VerificationError(e.to_string()))?;

        VerifyingKey::<Sha256>::new(public_key)
            .verify(&self.inner.info.to_der()?, &signature)
            .map_err(|_| {
                CertFixtureError::VerificationError("request signature does not verify".to_string())
            })
    }

    pub fn subject_public_key(&self) -> &SubjectPublicKeyInfoOwned {
        &self.inner.info.public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_request_round_trip_keeps_public_key() {
        let key_pair = KeyPair::generate_rsa(&mut ChaCha20Rng::seed_from_u64(11)).unwrap();
        let subject = DistinguishedName::builder().common_name("csr.local").build();

        let request = CertificationRequest::new(&subject, &key_pair).unwrap();
        let parsed = CertificationRequest::from_der(&request.to_der().unwrap()).unwrap();

        assert_eq!(parsed, request);
        assert_eq!(parsed.subject_public_key(), &key_pair.as_spki().unwrap());

        let mut tampered = request.clone();
        tampered.inner.info.subject = DistinguishedName::builder()
            .common_name("other.local")
            .build()
            .as_x509_name()
            .unwrap();
        assert!(matches!(
            tampered.verify(),
            Err(CertFixtureError::VerificationError(_))
        ));
    }
}

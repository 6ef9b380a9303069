use pkcs8::DecodePrivateKey;
use rand_core::CryptoRngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs1v15::SigningKey as RsaSigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::{CertFixtureError, Result};
use crate::pem_utils;

/// Modulus size of every generated key pair.
pub const RSA_KEY_SIZE: usize = 4096;

/// An RSA key pair used either as a certificate subject key or as an issuer key.
#[derive(Clone)]
pub struct KeyPair {
    private: Box<RsaPrivateKey>,
    public: RsaPublicKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a fresh RSA key pair of [`RSA_KEY_SIZE`] bits.
    ///
    /// Every call draws new key material from `rng`; nothing is cached.
    pub fn generate_rsa<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        tracing::trace!(bits = RSA_KEY_SIZE, "generating RSA key pair");
        let private = RsaPrivateKey::new(rng, RSA_KEY_SIZE)
            .map_err(|e| CertFixtureError::KeyGenerationError(e.to_string()))?;
        Ok(Self::from_private_key(private))
    }

    /// Wraps an existing private key.
    pub fn from_private_key(private: RsaPrivateKey) -> Self {
        let public = RsaPublicKey::from(&private);
        KeyPair {
            private: Box::new(private),
            public,
        }
    }

    /// Loads a private key from PEM input.
    ///
    /// Accepts the first `RSA PRIVATE KEY` (PKCS#1) or `PRIVATE KEY` (PKCS#8)
    /// block found in `pem_bytes`; any other block is skipped.
    pub fn import_from_pem(pem_bytes: &[u8]) -> Result<Self> {
        let blocks = pem::parse_many(pem_bytes)?;
        let private = blocks
            .iter()
            .find_map(|block| match block.tag() {
                pem_utils::RSA_PRIVATE_KEY_LABEL => {
                    Some(RsaPrivateKey::from_pkcs1_der(block.contents()).map_err(|e| e.to_string()))
                }
                pem_utils::PRIVATE_KEY_LABEL => {
                    Some(RsaPrivateKey::from_pkcs8_der(block.contents()).map_err(|e| e.to_string()))
                }
                _ => None,
            })
            .ok_or_else(|| {
                CertFixtureError::DecodingError("no RSA private key PEM block found".to_string())
            })?
            .map_err(CertFixtureError::DecodingError)?;

        private
            .validate()
            .map_err(|e| CertFixtureError::DecodingError(e.to_string()))?;
        Ok(Self::from_private_key(private))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Returns the SubjectPublicKeyInfo describing the public half.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        SubjectPublicKeyInfoOwned::from_key(self.public.clone())
            .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))
    }

    /// Signs `data` with RSASSA-PKCS1-v1_5 over SHA-256.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signing_key = RsaSigningKey::<Sha256>::new((*self.private).clone());
        let signature = signing_key
            .try_sign(data)
            .map_err(|e| CertFixtureError::CertificateCreationError(e.to_string()))?;
        Ok(signature.to_vec())
    }

    /// Serializes the private key as PKCS#1 DER.
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>> {
        let document = self
            .private
            .to_pkcs1_der()
            .map_err(|e| CertFixtureError::PemEncodingError(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }
}

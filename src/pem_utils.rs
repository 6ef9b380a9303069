use crate::error::Result;
use crate::key::KeyPair;

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
pub const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(&pem, pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF))
}

/// Wraps a DER certificate in a `CERTIFICATE` block.
pub fn encode_certificate(der: &[u8]) -> Vec<u8> {
    der_to_pem(der, CERTIFICATE_LABEL).into_bytes()
}

/// Wraps the PKCS#1 form of the private key in an `RSA PRIVATE KEY` block.
pub fn encode_rsa_private_key(key: &KeyPair) -> Result<Vec<u8>> {
    let der = key.to_pkcs1_der()?;
    Ok(der_to_pem(&der, RSA_PRIVATE_KEY_LABEL).into_bytes())
}

/// Returns the contents of the first block tagged `label`, if any.
pub fn find_block(input: &[u8], label: &str) -> Result<Option<Vec<u8>>> {
    let blocks = pem::parse_many(input)?;
    Ok(blocks
        .into_iter()
        .find(|block| block.tag() == label)
        .map(|block| block.into_contents()))
}

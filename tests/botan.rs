mod util;

use botan::Certificate as BotanCertificate;

use certfixture::cert::Certificate;
use certfixture::{CertificateOptions, generate_self_signed, generate_signed};

fn check_cert(cert_pem: &[u8]) {
    let cert_der = Certificate::from_pem(cert_pem).unwrap().to_der().unwrap();
    // Use botan crate to parse the DER and assert it succeeds
    BotanCertificate::load(&cert_der).expect("Botan failed to parse certificate");
}

#[test]
#[ignore]
fn test_botan_self_signed() {
    let options = CertificateOptions::builder()
        .common_name("crabs.crabs")
        .organizational_unit("Crab widgits SE")
        .build();
    let issued = generate_self_signed(&options).unwrap();
    check_cert(&issued.certificate);
}

#[test]
#[ignore]
fn test_botan_ca_signed() {
    let ca = util::ca();
    check_cert(&ca.certificate);

    let options = CertificateOptions::builder().common_name("crabs.crabs").build();
    let issued = generate_signed(&options, &ca.certificate, &ca.private_key).unwrap();
    check_cert(&issued.certificate);
}

//! Shared helpers for CA integration tests.

#![allow(dead_code)]

use der::{Decode, Encode};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use sha2::Sha256;
use signature::Verifier;
use std::sync::OnceLock;
use trustcore_pki::{CaSubject, Certificate, CertificateAuthority};

pub const CA_KEY_PEM: &str = include_str!("../fixtures/ca_key.pem");
pub const P256_PUBLIC_PEM: &str = include_str!("../fixtures/p256_public.pem");
pub const ED25519_PUBLIC_PEM: &str = include_str!("../fixtures/ed25519_public.pem");
pub const RSA_PUBLIC_PEM: &str = include_str!("../fixtures/rsa_public.pem");

/// CA restored from the fixture key, shared across tests in one binary.
pub fn fixture_ca() -> &'static CertificateAuthority {
    static CA: OnceLock<CertificateAuthority> = OnceLock::new();
    CA.get_or_init(|| {
        CertificateAuthority::from_pem(CA_KEY_PEM, CaSubject::default())
            .expect("fixture CA key should restore")
    })
}

/// Verify that `leaf_der` was issued by `root`: issuer names match and the
/// leaf signature validates under the root's public key.
pub fn verify_issued_by(leaf_der: &[u8], root: &Certificate) -> Result<Certificate, String> {
    let leaf = Certificate::from_der(leaf_der).map_err(|e| e.to_string())?;

    if leaf.tbs_certificate.issuer != root.tbs_certificate.subject {
        return Err("issuer does not match root subject".to_string());
    }

    let spki_der = root
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| e.to_string())?;
    let root_key = RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| e.to_string())?;
    let verifying_key = VerifyingKey::<Sha256>::new(root_key);

    let tbs = leaf.tbs_certificate.to_der().map_err(|e| e.to_string())?;
    let signature = Signature::try_from(leaf.signature.raw_bytes()).map_err(|e| e.to_string())?;

    verifying_key
        .verify(&tbs, &signature)
        .map_err(|e| e.to_string())?;

    Ok(leaf)
}

/// Value of the first attribute with `oid` in `name`, as a string.
pub fn name_attribute(name: &x509_cert::name::Name, oid: const_oid::ObjectIdentifier) -> Option<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|atv| atv.oid == oid)
        .and_then(|atv| String::from_utf8(atv.value.value().to_vec()).ok())
}

/// Re-wrap a PEM block so its base64 body sits on lines of `width` columns
/// separated by `newline`.
pub fn rewrap_pem(pem: &str, width: usize, newline: &str) -> String {
    let lines: Vec<&str> = pem.lines().map(str::trim).collect();
    let (begin, end) = (lines[0], lines[lines.len() - 1]);
    let body: String = lines[1..lines.len() - 1].concat();

    let wrapped: Vec<&str> = body
        .as_bytes()
        .chunks(width)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect();
    format!("{begin}{newline}{}{newline}{end}", wrapped.join(newline))
}

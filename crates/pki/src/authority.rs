//! Certificate Authority issuing short-lived client certificates.
//!
//! The authority owns an RSA-2048 root key and a self-signed root certificate
//! derived from it. Both are fixed at construction; every operation takes
//! `&self`, so a single instance can be shared across threads without locking.
//!
//! # Construction modes
//!
//! - [`CertificateAuthority::generate`] creates a fresh key and root.
//! - [`CertificateAuthority::from_pem`] restores a key and re-derives the root
//!   from it. The root's validity window starts at restoration time.

use der::asn1::OctetString;
use der::pem::LineEnding;
use der::{Decode, Encode, EncodePem};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs1v15::{Signature, SigningKey};
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use spki::SubjectPublicKeyInfoOwned;
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};
use uuid::Uuid;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages,
    SubjectKeyIdentifier,
};
use x509_cert::serial_number::SerialNumber;
use x509_cert::Certificate;
use zeroize::Zeroizing;

use const_oid::db::rfc5280::{ID_KP_CLIENT_AUTH, ID_KP_SERVER_AUTH};
use trustcore_core::CertificateAuthorityConfig;

use crate::error::{PkiError, PkiResult};
use crate::fingerprint::Fingerprint;
use crate::pem;
use crate::public_key;
use crate::serial;
use crate::subject::CaSubject;
use crate::validity;

/// Modulus size of freshly generated CA keys.
pub const CA_KEY_BITS: usize = 2048;

/// PEM label of PKCS#8 private keys; anything else is read as PKCS#1.
const PKCS8_PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// Leftmost 160 bits of SHA-256 over the key (RFC 7093 method 1).
const KEY_IDENTIFIER_LEN: usize = 20;

/// A leaf certificate produced by [`CertificateAuthority::issue_certificate`].
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    /// DER encoding
    pub der: Vec<u8>,
    /// PEM encoding (`CERTIFICATE` block)
    pub pem: String,
    /// SHA-256 over `der`
    pub fingerprint: Fingerprint,
    /// Random serial number
    pub serial: SerialNumber,
}

impl IssuedCertificate {
    /// Serial number as lowercase hex of its DER integer content.
    pub fn serial_hex(&self) -> String {
        hex::encode(self.serial.as_bytes())
    }
}

/// Certificate Authority owning the root key material.
pub struct CertificateAuthority {
    subject: CaSubject,
    signer: SigningKey<Sha256>,
    root: Certificate,
    root_der: Vec<u8>,
    root_fingerprint: Fingerprint,
    key_identifier: [u8; KEY_IDENTIFIER_LEN],
}

impl CertificateAuthority {
    /// Create a CA with a freshly generated RSA-2048 key.
    pub fn generate(subject: CaSubject) -> PkiResult<Self> {
        let private_key = RsaPrivateKey::new(&mut OsRng, CA_KEY_BITS)
            .map_err(|e| PkiError::KeyGeneration(e.to_string()))?;

        info!(bits = CA_KEY_BITS, "generated fresh CA key");
        Self::from_private_key(private_key, subject)
    }

    /// Restore a CA from a PEM-encoded RSA private key.
    ///
    /// Accepts `RSA PRIVATE KEY` (PKCS#1) and `PRIVATE KEY` (PKCS#8) blocks.
    pub fn from_pem(private_key_pem: &str, subject: CaSubject) -> PkiResult<Self> {
        let block = pem::decode_first_block(private_key_pem).map_err(PkiError::KeyDecode)?;
        let der = Zeroizing::new(block.der);

        let private_key = if block.label == PKCS8_PRIVATE_KEY_LABEL {
            RsaPrivateKey::from_pkcs8_der(&der).map_err(|e| PkiError::KeyParse(e.to_string()))?
        } else {
            RsaPrivateKey::from_pkcs1_der(&der).map_err(|e| PkiError::KeyParse(e.to_string()))?
        };

        private_key
            .validate()
            .map_err(|e| PkiError::KeyParse(e.to_string()))?;

        info!(label = %block.label, "restored CA key");
        Self::from_private_key(private_key, subject)
    }

    /// Build a CA from configuration: restored when a key is configured,
    /// fresh otherwise.
    pub fn from_config(config: &CertificateAuthorityConfig) -> PkiResult<Self> {
        let subject = CaSubject::new(
            config.organization.clone(),
            config.country.clone(),
            config.common_name.clone(),
        );

        let pem = config
            .resolve_private_key_pem()
            .map_err(|e| PkiError::KeyDecode(e.to_string()))?;

        match pem {
            Some(pem) => Self::from_pem(&Zeroizing::new(pem), subject),
            None => Self::generate(subject),
        }
    }

    fn from_private_key(private_key: RsaPrivateKey, subject: CaSubject) -> PkiResult<Self> {
        let public_key_der = private_key
            .to_public_key()
            .to_public_key_der()
            .map_err(|e| PkiError::KeyParse(e.to_string()))?;
        let spki = SubjectPublicKeyInfoOwned::from_der(public_key_der.as_bytes())
            .map_err(|e| PkiError::KeyParse(e.to_string()))?;

        let key_identifier = key_identifier(&spki);
        let signer = SigningKey::<Sha256>::new(private_key);

        let root = build_root(&signer, &subject, spki, &key_identifier, SystemTime::now())?;
        let root_der = root
            .to_der()
            .map_err(|e| PkiError::Encoding(e.to_string()))?;
        let root_fingerprint = Fingerprint::of(&root_der);

        info!(
            root_fingerprint = %root_fingerprint,
            common_name = %subject.common_name,
            "certificate authority initialized"
        );

        Ok(Self {
            subject,
            signer,
            root,
            root_der,
            root_fingerprint,
            key_identifier,
        })
    }

    /// Issue a client certificate binding `user_id` to the subject public key.
    ///
    /// Issuance is all-or-nothing: any failure returns an error and no
    /// partial certificate material.
    pub fn issue_certificate(
        &self,
        public_key_pem: &str,
        user_id: Uuid,
        validity: Duration,
    ) -> PkiResult<IssuedCertificate> {
        let block = pem::decode_first_block(public_key_pem).map_err(PkiError::PublicKeyDecode)?;
        let spki = public_key::parse_subject_key(&block.der)?;

        let serial = serial::random_serial()?;
        let validity = validity::leaf_validity(SystemTime::now(), validity)?;
        let subject = self.subject.leaf_name(&user_id)?;

        let profile = Profile::Manual {
            issuer: Some(self.root.tbs_certificate.subject.clone()),
        };
        let mut builder =
            CertificateBuilder::new(profile, serial.clone(), validity, subject, spki, &self.signer)
                .map_err(signing_error)?;

        builder
            .add_extension(&KeyUsage(KeyUsages::DigitalSignature.into()))
            .map_err(signing_error)?;
        builder
            .add_extension(&ExtendedKeyUsage(vec![ID_KP_CLIENT_AUTH]))
            .map_err(signing_error)?;
        builder
            .add_extension(&AuthorityKeyIdentifier {
                key_identifier: Some(octet_string(&self.key_identifier)?),
                authority_cert_issuer: None,
                authority_cert_serial_number: None,
            })
            .map_err(signing_error)?;

        let certificate = builder.build::<Signature>().map_err(signing_error)?;

        let der = certificate
            .to_der()
            .map_err(|e| PkiError::Encoding(e.to_string()))?;
        let pem = certificate
            .to_pem(LineEnding::LF)
            .map_err(|e| PkiError::Encoding(e.to_string()))?;
        let fingerprint = self.compute_fingerprint(&der);

        let issued = IssuedCertificate {
            der,
            pem,
            fingerprint,
            serial,
        };

        debug!(
            user_id = %user_id,
            serial = %issued.serial_hex(),
            fingerprint = %issued.fingerprint,
            "issued leaf certificate"
        );

        Ok(issued)
    }

    /// SHA-256 over the given certificate bytes.
    ///
    /// Independent of this authority's state; see [`Fingerprint::of`].
    pub fn compute_fingerprint(&self, certificate_der: &[u8]) -> Fingerprint {
        Fingerprint::of(certificate_der)
    }

    /// The self-signed root certificate, for chain validation by verifiers.
    pub fn ca_certificate(&self) -> &Certificate {
        &self.root
    }

    pub fn ca_certificate_der(&self) -> &[u8] {
        &self.root_der
    }

    pub fn ca_certificate_pem(&self) -> PkiResult<String> {
        self.root
            .to_pem(LineEnding::LF)
            .map_err(|e| PkiError::Encoding(e.to_string()))
    }

    pub fn ca_fingerprint(&self) -> Fingerprint {
        self.root_fingerprint
    }

    pub fn subject(&self) -> &CaSubject {
        &self.subject
    }

    /// Export the root private key as a PKCS#1 PEM block.
    ///
    /// The output restores an equivalent authority through [`Self::from_pem`].
    pub fn export_private_key_pem(&self) -> PkiResult<Zeroizing<String>> {
        let private_key: &RsaPrivateKey = self.signer.as_ref();
        private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| PkiError::Export(e.to_string()))
    }
}

impl fmt::Debug for CertificateAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateAuthority")
            .field("subject", &self.subject)
            .field("root_fingerprint", &self.root_fingerprint)
            .finish_non_exhaustive()
    }
}

fn build_root(
    signer: &SigningKey<Sha256>,
    subject: &CaSubject,
    spki: SubjectPublicKeyInfoOwned,
    key_identifier: &[u8],
    now: SystemTime,
) -> PkiResult<Certificate> {
    let name = subject.root_name()?;
    let validity = validity::root_validity(now)?;

    let mut builder = CertificateBuilder::new(
        Profile::Manual { issuer: None },
        serial::root_serial()?,
        validity,
        name,
        spki,
        signer,
    )
    .map_err(signing_error)?;

    builder
        .add_extension(&BasicConstraints {
            ca: true,
            path_len_constraint: None,
        })
        .map_err(signing_error)?;
    builder
        .add_extension(&KeyUsage(
            KeyUsages::DigitalSignature | KeyUsages::KeyCertSign,
        ))
        .map_err(signing_error)?;
    builder
        .add_extension(&ExtendedKeyUsage(vec![ID_KP_CLIENT_AUTH, ID_KP_SERVER_AUTH]))
        .map_err(signing_error)?;
    builder
        .add_extension(&SubjectKeyIdentifier(octet_string(key_identifier)?))
        .map_err(signing_error)?;

    builder.build::<Signature>().map_err(signing_error)
}

fn key_identifier(spki: &SubjectPublicKeyInfoOwned) -> [u8; KEY_IDENTIFIER_LEN] {
    let digest = Sha256::digest(spki.subject_public_key.raw_bytes());
    let mut id = [0u8; KEY_IDENTIFIER_LEN];
    id.copy_from_slice(&digest[..KEY_IDENTIFIER_LEN]);
    id
}

fn octet_string(bytes: &[u8]) -> PkiResult<OctetString> {
    OctetString::new(bytes.to_vec()).map_err(|e| PkiError::Signing(e.to_string()))
}

fn signing_error<E: fmt::Display>(e: E) -> PkiError {
    PkiError::Signing(e.to_string())
}

//! Certificate issuance for TrustCore client identities.
//!
//! This crate provides the Certificate Authority that binds user identifiers
//! to public keys through short-lived X.509 leaf certificates signed by a
//! long-lived RSA root.
//!
//! # Core Concepts
//!
//! - **Root certificate**: self-signed, serial 1, ten-year validity, re-derived
//!   from the root key at every construction
//! - **Leaf certificate**: random 159-bit serial, user id as CN and subject
//!   serialNumber, client-auth only
//! - **Fingerprint**: SHA-256 over the DER bytes, a stable lookup key for
//!   allow-lists and pinning stores
//!
//! # Out of scope
//!
//! Chain validation is a verifier concern. Verifiers obtain the root through
//! [`CertificateAuthority::ca_certificate`]. Revocation, OCSP and key rotation
//! are not provided.

pub mod authority;
pub mod error;
pub mod fingerprint;
mod pem;
mod public_key;
pub mod serial;
pub mod subject;
pub mod validity;

pub use authority::{CertificateAuthority, IssuedCertificate, CA_KEY_BITS};
pub use error::{PkiError, PkiResult};
pub use fingerprint::{Fingerprint, FINGERPRINT_LEN};
pub use subject::CaSubject;

// Re-export core types for convenience
pub use trustcore_core::ErrorKind;

// Certificate types handed to verifiers
pub use x509_cert::Certificate;

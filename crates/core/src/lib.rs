//! Core functionality shared by the TrustCore authorities.
//!
//! This crate provides configuration loading, structured logging setup and
//! the core error type used by the TrustCore services.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CertificateAuthorityConfig, Config, LoggingConfig, TokenAuthorityConfig};
pub use error::{CoreError, ErrorKind, Result};

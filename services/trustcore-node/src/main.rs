//! TrustCore node: operator front end for the certificate and token
//! authorities. Every command prints one JSON document on stdout.

mod cli;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use trustcore_core::{logging, Config};
use trustcore_pki::{CertificateAuthority, Fingerprint};
use trustcore_token::{ErrorKind, TokenAuthority, ALGORITHM};

use cli::{Command, Invocation};

const NODE_PROTOCOL_VERSION: u32 = 1;
const NODE_RUNTIME_VERSION: u32 = 1;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    runtime_version: u32,
    protocol_version: u32,
}

#[derive(Debug, Serialize)]
struct RootOutput {
    certificate_pem: String,
    fingerprint: Fingerprint,
}

#[derive(Debug, Serialize)]
struct IssueOutput {
    user_id: Uuid,
    serial: String,
    fingerprint: Fingerprint,
    certificate_pem: String,
}

#[derive(Debug, Serialize)]
struct FingerprintOutput {
    fingerprint: Fingerprint,
}

#[derive(Debug, Serialize)]
struct MintOutput {
    user_id: Uuid,
    algorithm: &'static str,
    key_id: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct VerifyOutput {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
}

#[derive(Debug, Serialize)]
struct ExportOutput<'a> {
    private_key_pem: &'a str,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Invocation { config, command } =
        cli::parse_args(&args).map_err(|e| anyhow!("{}\n\n{}", e, cli::USAGE))?;

    if command == Command::VersionJson {
        return print_version();
    }

    let config = load_config(config.as_deref())?;
    logging::init_from_config(&config.logging);

    run(&config, command)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default_config(),
    };
    config.apply_env();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::VersionJson => print_version(),
        Command::Root => {
            let ca = certificate_authority(config)?;
            print_json(&RootOutput {
                certificate_pem: ca.ca_certificate_pem()?,
                fingerprint: ca.ca_fingerprint(),
            })
        }
        Command::Issue {
            public_key,
            user_id,
            validity_days,
        } => {
            let public_key_pem = std::fs::read_to_string(&public_key)
                .with_context(|| format!("failed to read {}", public_key.display()))?;
            let validity = match validity_days {
                Some(days) => Duration::from_secs(
                    days.checked_mul(SECONDS_PER_DAY)
                        .ok_or_else(|| anyhow!("--validity-days {} is too large", days))?,
                ),
                None => config.certificate_authority.leaf_validity(),
            };

            let ca = certificate_authority(config)?;
            let issued = ca.issue_certificate(&public_key_pem, user_id, validity)?;
            info!(user_id = %user_id, fingerprint = %issued.fingerprint, "certificate issued");

            print_json(&IssueOutput {
                user_id,
                serial: issued.serial_hex(),
                fingerprint: issued.fingerprint,
                certificate_pem: issued.pem,
            })
        }
        Command::Fingerprint { cert } => {
            let bytes = std::fs::read(&cert)
                .with_context(|| format!("failed to read {}", cert.display()))?;
            let der = certificate_der(&bytes)?;
            print_json(&FingerprintOutput {
                fingerprint: Fingerprint::of(&der),
            })
        }
        Command::Mint { user_id } => {
            let tokens = TokenAuthority::from_config(&config.token_authority)?;
            print_json(&MintOutput {
                user_id,
                algorithm: ALGORITHM,
                key_id: tokens.key_id().to_string(),
                token: tokens.mint(user_id)?,
            })
        }
        Command::Verify { token } => {
            let tokens = TokenAuthority::from_config(&config.token_authority)?;
            match tokens.verify(token.trim()) {
                Ok(user_id) => print_json(&VerifyOutput {
                    valid: true,
                    user_id: Some(user_id),
                    error: None,
                    kind: None,
                }),
                Err(e) => {
                    print_json(&VerifyOutput {
                        valid: false,
                        user_id: None,
                        error: Some(e.to_string()),
                        kind: Some(e.kind()),
                    })?;
                    Err(anyhow!("token rejected"))
                }
            }
        }
        Command::ExportCaKey => {
            let ca = certificate_authority(config)?;
            let pem = ca.export_private_key_pem()?;
            print_json(&ExportOutput {
                private_key_pem: &pem,
            })
        }
    }
}

fn print_version() -> Result<()> {
    print_json(&NodeVersionHandshake {
        version: env!("CARGO_PKG_VERSION"),
        runtime_version: NODE_RUNTIME_VERSION,
        protocol_version: NODE_PROTOCOL_VERSION,
    })
}

fn certificate_authority(config: &Config) -> Result<CertificateAuthority> {
    CertificateAuthority::from_config(&config.certificate_authority)
        .context("failed to initialize certificate authority")
}

/// Accept either a PEM `CERTIFICATE` block or raw DER.
fn certificate_der(bytes: &[u8]) -> Result<Vec<u8>> {
    match std::str::from_utf8(bytes) {
        Ok(text) if text.contains("-----BEGIN") => {
            let (label, der) =
                der::pem::decode_vec(text.trim().as_bytes()).context("malformed PEM")?;
            if label != "CERTIFICATE" {
                return Err(anyhow!("expected a CERTIFICATE block, found {}", label));
            }
            Ok(der)
        }
        _ => Ok(bytes.to_vec()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

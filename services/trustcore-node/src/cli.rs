//! Command-line parsing for the TrustCore node.

use std::path::PathBuf;
use uuid::Uuid;

pub const USAGE: &str = "\
Usage: trustcore-node [--config <path>] <command> [options]

Commands:
  root                                   Print the root certificate and fingerprint
  issue --public-key <file> --user <uuid> [--validity-days <n>]
                                         Issue a client certificate
  fingerprint --cert <file>              Fingerprint a PEM or DER certificate
  mint --user <uuid>                     Mint an identity token
  verify --token <token>                 Verify an identity token
  export-ca-key                          Print the CA private key (PKCS#1 PEM)
  --version-json                         Print version handshake";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    VersionJson,
    Root,
    Issue {
        public_key: PathBuf,
        user_id: Uuid,
        validity_days: Option<u64>,
    },
    Fingerprint {
        cert: PathBuf,
    },
    Mint {
        user_id: Uuid,
    },
    Verify {
        token: String,
    },
    ExportCaKey,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
    pub config: Option<PathBuf>,
    pub command: Command,
}

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation, String> {
    if args.iter().any(|arg| arg == "--version-json") {
        return Ok(Invocation {
            config: None,
            command: Command::VersionJson,
        });
    }

    let mut config = None;
    let mut command = None;
    let mut options: Vec<(String, String)> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(name) = arg.strip_prefix("--") {
            let value = iter
                .next()
                .ok_or_else(|| format!("--{} was provided without a value", name))?;
            if name == "config" {
                config = Some(PathBuf::from(value));
            } else {
                options.push((name.to_string(), value.clone()));
            }
        } else if command.is_none() {
            command = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument: {}", arg));
        }
    }

    let command = command.ok_or_else(|| "missing command".to_string())?;
    let mut options = Options(options);

    let command = match command.as_str() {
        "root" => Command::Root,
        "issue" => Command::Issue {
            public_key: PathBuf::from(options.required("public-key")?),
            user_id: parse_uuid(&options.required("user")?)?,
            validity_days: options
                .optional("validity-days")
                .map(|days| {
                    days.parse::<u64>()
                        .map_err(|_| format!("invalid --validity-days: {}", days))
                })
                .transpose()?,
        },
        "fingerprint" => Command::Fingerprint {
            cert: PathBuf::from(options.required("cert")?),
        },
        "mint" => Command::Mint {
            user_id: parse_uuid(&options.required("user")?)?,
        },
        "verify" => Command::Verify {
            token: options.required("token")?,
        },
        "export-ca-key" => Command::ExportCaKey,
        other => return Err(format!("unknown command: {}", other)),
    };

    options.finish()?;

    Ok(Invocation { config, command })
}

struct Options(Vec<(String, String)>);

impl Options {
    fn optional(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    fn required(&mut self, name: &str) -> Result<String, String> {
        self.optional(name)
            .ok_or_else(|| format!("missing required --{} <value>", name))
    }

    fn finish(self) -> Result<(), String> {
        match self.0.first() {
            Some((name, _)) => Err(format!("unknown option: --{}", name)),
            None => Ok(()),
        }
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value).map_err(|e| format!("invalid user id {}: {}", value, e))
}

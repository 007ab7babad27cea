//! vw: vaultwire client
//!
//! Commands:
//!   keygen                  - generate an Ed25519 signing key pair
//!   upload <files...>       - encrypt, sign, and upload files concurrently
//!   download <name>         - fetch a file, verify its integrity code, decrypt

mod download;
mod upload;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use serde::Serialize;
use std::path::PathBuf;

use vw_crypto::SALT_SIZE;

#[derive(Parser, Debug)]
#[command(
    name = "vw",
    version,
    about = "vaultwire client",
    long_about = "vw: encrypt files locally, authenticate them, and transfer them to a vaultwire server"
)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "VW_SERVER", default_value = "http://localhost:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 signing key pair
    Keygen {
        /// Output in JSON format for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Encrypt, sign, and upload one or more files
    ///
    /// Files are processed as independent concurrent tasks; a failure in one
    /// upload does not cancel the others.
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Password for key derivation
        #[arg(long, env = "VW_PASSWORD")]
        password: String,

        /// Salt for key derivation (hex, 64 chars). Generated and printed
        /// when omitted; keep it, downloads need the same salt.
        #[arg(long)]
        salt: Option<String>,

        /// Ed25519 signing key seed (hex, 64 chars). Generated and printed
        /// when omitted.
        #[arg(long, env = "VW_SIGNING_KEY")]
        signing_key: Option<String>,
    },

    /// Download a file, verify its integrity code, and decrypt it
    Download {
        /// File name on the server
        name: String,

        /// Password used at upload time
        #[arg(long, env = "VW_PASSWORD")]
        password: String,

        /// Salt used at upload time (hex, 64 chars)
        #[arg(long)]
        salt: String,

        /// Local destination path (default: the file name in the current dir)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct KeypairJson {
    /// Public key in hex (64 characters)
    public_key: String,
    /// Signing key seed in hex (64 characters)
    private_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { json } => keygen(json),
        Commands::Upload {
            files,
            password,
            salt,
            signing_key,
        } => {
            let opts = upload::UploadOpts {
                server: cli.server,
                password: SecretString::from(password),
                salt: resolve_salt(salt)?,
                signing_key: resolve_signing_key(signing_key)?,
            };
            upload::upload_files(&opts, files).await
        }
        Commands::Download {
            name,
            password,
            salt,
            output,
        } => {
            download::download_file(
                &cli.server,
                &name,
                &SecretString::from(password),
                &parse_salt(&salt)?,
                output,
            )
            .await
        }
    }
}

fn keygen(json: bool) -> Result<()> {
    let (public, signing) = vw_crypto::generate_keypair()?;
    let public_hex = vw_crypto::sign::public_key_to_hex(&public);
    let private_hex = vw_crypto::sign::signing_key_to_hex(&signing);

    if json {
        let out = KeypairJson {
            public_key: public_hex,
            private_key: private_hex,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("public key:  {public_hex}");
        println!("private key: {private_hex}");
        println!();
        println!("Keep the private key secret. The public key travels with every upload.");
    }
    Ok(())
}

fn parse_salt(hex_salt: &str) -> Result<[u8; SALT_SIZE]> {
    let bytes = hex::decode(hex_salt).context("salt is not valid hex")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("salt must be {} bytes ({} hex chars)", SALT_SIZE, SALT_SIZE * 2))
}

/// Use the provided salt, or generate a fresh one and tell the user; the
/// same salt is needed again at download time.
fn resolve_salt(salt: Option<String>) -> Result<[u8; SALT_SIZE]> {
    match salt {
        Some(hex_salt) => parse_salt(&hex_salt),
        None => {
            let salt = vw_crypto::generate_salt()?;
            println!("Generated salt: {}", hex::encode(salt));
            Ok(salt)
        }
    }
}

fn resolve_signing_key(key: Option<String>) -> Result<ed25519_dalek::SigningKey> {
    match key {
        Some(hex_key) => Ok(vw_crypto::sign::signing_key_from_hex(&hex_key)?),
        None => {
            let (public, signing) = vw_crypto::generate_keypair()?;
            println!(
                "Generated public key:  {}",
                vw_crypto::sign::public_key_to_hex(&public)
            );
            println!(
                "Generated private key: {}",
                vw_crypto::sign::signing_key_to_hex(&signing)
            );
            Ok(signing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_salt_roundtrip() {
        let salt = [0xA5u8; SALT_SIZE];
        assert_eq!(parse_salt(&hex::encode(salt)).unwrap(), salt);
    }

    #[test]
    fn test_parse_salt_rejects_bad_hex() {
        assert!(parse_salt("zz").is_err());
    }

    #[test]
    fn test_parse_salt_rejects_short_salt() {
        assert!(parse_salt("abcd").is_err());
    }

    #[test]
    fn test_cli_parses_upload() {
        let cli = Cli::try_parse_from([
            "vw", "upload", "a.txt", "b.txt", "--password", "pw", "--salt", "00",
        ])
        .unwrap();
        match cli.command {
            Commands::Upload { files, .. } => assert_eq!(files.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_files_for_upload() {
        assert!(Cli::try_parse_from(["vw", "upload", "--password", "pw"]).is_err());
    }
}

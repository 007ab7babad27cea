//! Download, verify, decrypt
//!
//! The server returns ciphertext plus authentication metadata; everything
//! cryptographic happens here, where the password lives. The integrity code
//! is checked before decryption and both failures are terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::debug;

use vw_core::{DownloadResponse, StoredRecord};
use vw_crypto::{derive_master_key, SALT_SIZE};

pub async fn download_file(
    server: &str,
    name: &str,
    password: &SecretString,
    salt: &[u8; SALT_SIZE],
    output: Option<PathBuf>,
) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{server}/download"))
        .query(&[("file", name)])
        .send()
        .await
        .context("sending download request")?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        anyhow::bail!("file not found on server: {name}");
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("download failed ({status}): {body}");
    }

    let payload: DownloadResponse = response
        .json()
        .await
        .context("parsing download response")?;
    debug!(file = %name, sender = %payload.public_key, "record fetched");

    let record = StoredRecord {
        ciphertext: payload.file_data,
        hmac_hex: payload.hmac,
        public_key_hex: payload.public_key,
        nonce_hex: payload.nonce,
    };

    let master = derive_master_key(password, salt);
    let plaintext = vw_crypto::open(&record, &master)
        .context("verifying and decrypting downloaded file")?;

    let dest = output.unwrap_or_else(|| PathBuf::from(name));
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    tokio::fs::write(&dest, &plaintext)
        .await
        .with_context(|| format!("writing {}", dest.display()))?;

    println!("downloaded {} ({} bytes) -> {}", name, plaintext.len(), dest.display());
    Ok(())
}

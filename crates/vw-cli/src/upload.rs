//! Concurrent upload fan-out
//!
//! Each file is sealed and sent as an independent task; tasks share only
//! read-only key material. All tasks are joined before reporting, and a
//! failure in one never cancels its siblings.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ed25519_dalek::SigningKey;
use secrecy::SecretString;
use tokio::task::JoinSet;
use tracing::debug;

use vw_crypto::{derive_master_key, MasterKey, SALT_SIZE};

pub struct UploadOpts {
    pub server: String,
    pub password: SecretString,
    pub salt: [u8; SALT_SIZE],
    pub signing_key: SigningKey,
}

pub async fn upload_files(opts: &UploadOpts, files: Vec<PathBuf>) -> Result<()> {
    // One PBKDF2 pass for the whole batch; tasks share the derived key
    // read-only.
    let master = Arc::new(derive_master_key(&opts.password, &opts.salt));
    let signing_key = Arc::new(opts.signing_key.clone());
    let client = reqwest::Client::new();

    let total = files.len();
    let mut tasks = JoinSet::new();
    for path in files {
        let master = Arc::clone(&master);
        let signing_key = Arc::clone(&signing_key);
        let client = client.clone();
        let server = opts.server.clone();
        tasks.spawn(async move {
            let outcome = upload_one(&client, &server, &path, &master, &signing_key).await;
            (path, outcome)
        });
    }

    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (path, outcome) = joined.context("upload task panicked")?;
        match outcome {
            Ok(bytes) => println!("uploaded {} ({bytes} bytes)", path.display()),
            Err(e) => {
                failures += 1;
                eprintln!("failed {}: {e:#}", path.display());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {total} uploads failed");
    }
    println!("Uploaded {total} file(s).");
    Ok(())
}

async fn upload_one(
    client: &reqwest::Client,
    server: &str,
    path: &PathBuf,
    master: &MasterKey,
    signing_key: &SigningKey,
) -> Result<usize> {
    let plaintext = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;

    let envelope = vw_crypto::seal(file_name, &plaintext, master, signing_key)?;
    let ciphertext_len = envelope.file_data.len();
    debug!(file = %file_name, bytes = ciphertext_len, "envelope sealed");

    let response = client
        .post(format!("{server}/upload"))
        .json(&envelope)
        .send()
        .await
        .context("sending upload request")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("server rejected upload ({status}): {body}");
    }

    Ok(plaintext.len())
}

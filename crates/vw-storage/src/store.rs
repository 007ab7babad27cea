//! The server's file store: an in-memory index backed by durable storage
//!
//! Write path: exclusive lock → insert into the index → persist ciphertext
//! and metadata objects → release. A durable failure surfaces to the caller
//! but does not roll back the in-memory insert; the store is eventually
//! durable, not transactional across cache and disk.
//!
//! Read path: shared lock, serve from the index on a hit; on a miss, fall
//! through to durable storage, parse the metadata sidecar, and backfill the
//! index under an exclusive lock before returning.
//!
//! One lock guards the whole index, so writes to different names still
//! serialize. Last writer under the lock wins; there are no merge semantics
//! and no versioning.

use std::collections::HashMap;

use opendal::Operator;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use vw_core::{StoredRecord, VwError, VwResult};

/// Storage service handle. Constructed once at startup and shared by
/// reference; request handlers receive it rather than reaching for process
/// globals, so tests can build one over a memory operator.
pub struct FileStore {
    op: Operator,
    index: RwLock<HashMap<String, StoredRecord>>,
}

fn data_key(name: &str) -> String {
    format!("files/{name}")
}

fn meta_key(name: &str) -> String {
    format!("meta/{name}")
}

/// Render the metadata sidecar: newline-delimited `key:value` lines.
fn render_meta(record: &StoredRecord) -> String {
    format!(
        "hmac:{}\npublic_key:{}\nnonce:{}\n",
        record.hmac_hex, record.public_key_hex, record.nonce_hex
    )
}

/// Parse a metadata sidecar back into its fields by line prefix.
fn parse_meta(name: &str, content: &str) -> VwResult<(String, String, String)> {
    let mut hmac = None;
    let mut public_key = None;
    let mut nonce = None;

    for line in content.lines() {
        if let Some(value) = line.strip_prefix("hmac:") {
            hmac = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix("public_key:") {
            public_key = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix("nonce:") {
            nonce = Some(value.to_string());
        }
    }

    match (hmac, public_key, nonce) {
        (Some(h), Some(p), Some(n)) => Ok((h, p, n)),
        _ => Err(VwError::Storage(format!(
            "corrupt metadata object for {name}"
        ))),
    }
}

fn map_read_err(name: &str, e: opendal::Error) -> VwError {
    if e.kind() == opendal::ErrorKind::NotFound {
        VwError::NotFound(name.to_string())
    } else {
        VwError::Storage(format!("reading {name}: {e}"))
    }
}

impl FileStore {
    pub fn new(op: Operator) -> Self {
        Self {
            op,
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Persist a record under `name`, overwriting any previous record.
    pub async fn store(&self, name: &str, record: StoredRecord) -> VwResult<()> {
        let mut index = self.index.write().await;
        let ciphertext = record.ciphertext.clone();
        let meta = render_meta(&record);
        index.insert(name.to_string(), record);

        // Durable writes happen under the lock so concurrent stores to the
        // same name cannot interleave cache and disk in different orders.
        self.op
            .write(&data_key(name), ciphertext)
            .await
            .map_err(|e| VwError::Storage(format!("writing {name}: {e}")))?;
        self.op
            .write(&meta_key(name), meta.into_bytes())
            .await
            .map_err(|e| VwError::Storage(format!("writing {name} metadata: {e}")))?;

        debug!(file = %name, "stored record");
        Ok(())
    }

    /// Fetch the record for `name`, serving from the index when warm and
    /// falling back to durable storage on a miss.
    pub async fn retrieve(&self, name: &str) -> VwResult<StoredRecord> {
        {
            let index = self.index.read().await;
            if let Some(record) = index.get(name) {
                debug!(file = %name, "cache hit");
                return Ok(record.clone());
            }
        }

        let ciphertext = self
            .op
            .read(&data_key(name))
            .await
            .map_err(|e| map_read_err(name, e))?
            .to_vec();
        let meta = self
            .op
            .read(&meta_key(name))
            .await
            .map_err(|e| map_read_err(name, e))?
            .to_vec();
        let meta = String::from_utf8(meta)
            .map_err(|_| VwError::Storage(format!("metadata for {name} is not UTF-8")))?;
        let (hmac_hex, public_key_hex, nonce_hex) = parse_meta(name, &meta)?;

        let record = StoredRecord {
            ciphertext,
            hmac_hex,
            public_key_hex,
            nonce_hex,
        };

        // Backfill is best-effort cache population. If a store for this name
        // won the race while we were reading disk, its entry is newer: keep it.
        let mut index = self.index.write().await;
        index
            .entry(name.to_string())
            .or_insert_with(|| record.clone());
        debug!(file = %name, "cache backfilled from durable storage");

        Ok(record)
    }

    /// Number of records currently in the memory index.
    pub async fn cached_len(&self) -> usize {
        self.index.read().await.len()
    }

    /// Durable backend reachability, for readiness probes.
    pub async fn health(&self) -> VwResult<()> {
        self.op.list("/").await.map(|_| ()).map_err(|e| {
            warn!("storage health check failed: {e}");
            VwError::Storage(format!("health check: {e}"))
        })
    }
}

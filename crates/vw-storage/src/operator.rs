//! OpenDAL Operator factory for vaultwire storage backends

use anyhow::{Context, Result};
use opendal::Operator;

use vw_core::config::StorageConfig;

/// Build an OpenDAL Operator from the server storage config.
///
/// Backends: `fs` (one object per file under a local root), `s3` (any
/// S3-compatible endpoint, path-style addressing), `memory` (tests and
/// throwaway dev servers; contents die with the process).
pub fn build_operator(cfg: &StorageConfig) -> Result<Operator> {
    let op = match cfg.backend.as_str() {
        "fs" => {
            let root = cfg
                .root
                .to_str()
                .context("storage root is not valid UTF-8")?;
            // opendal 0.55: builders use the consuming pattern
            let builder = opendal::services::Fs::default().root(root);
            Operator::new(builder)
                .context("creating OpenDAL fs operator")?
                .finish()
        }
        "s3" => {
            let builder = opendal::services::S3::default()
                .endpoint(&cfg.endpoint)
                .region(&cfg.region)
                .bucket(&cfg.bucket)
                .access_key_id(&cfg.access_key_id)
                .secret_access_key(&cfg.secret_access_key);
            // path-style addressing is the opendal default, which MinIO and
            // SeaweedFS require
            Operator::new(builder)
                .context("creating OpenDAL S3 operator")?
                .finish()
        }
        "memory" => Operator::new(opendal::services::Memory::default())
            .context("creating OpenDAL memory operator")?
            .finish(),
        other => anyhow::bail!("unknown storage backend: {other}"),
    };

    Ok(op
        .layer(opendal::layers::LoggingLayer::default())
        .layer(
            opendal::layers::RetryLayer::new()
                .with_max_times(5)
                .with_jitter(),
        ))
}

pub mod config;
pub mod error;
pub mod types;

pub use error::{VwError, VwResult};
pub use types::{DownloadResponse, Envelope, StoredRecord};

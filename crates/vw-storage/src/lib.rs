//! vw-storage: OpenDAL storage abstraction + the server's file store
//!
//! Durable layout under the operator root:
//! ```text
//! files/{name}   ciphertext bytes
//! meta/{name}    newline-delimited key:value lines (hmac, public_key, nonce)
//! ```

pub mod operator;
pub mod store;

pub use operator::build_operator;
pub use store::FileStore;

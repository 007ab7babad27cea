//! vw-crypto: Client-side encryption and envelope authentication for Vaultwire
//!
//! Pipeline: plaintext → AES-256-GCM encrypt → HMAC-SHA256 over ciphertext →
//! Ed25519 sign canonical payload → envelope → upload
//!
//! Key hierarchy:
//! ```text
//! Master Key (256-bit, PBKDF2-HMAC-SHA256 from password + salt, 100k rounds)
//!   ├── Cipher Key (HKDF from master key, domain="vaultwire-cipher")
//!   └── MAC Key    (HKDF from master key, domain="vaultwire-mac")
//! Signing keys (Ed25519) are independent of the password hierarchy.
//! ```
//!
//! The canonical signing payload is the raw concatenation
//! `file_name ++ ciphertext ++ hex(hmac) ++ hex(nonce)` with no separators.
//! Both sides of the protocol must reproduce it byte-for-byte; see
//! [`envelope::signing_payload`].

pub mod aead;
pub mod envelope;
pub mod kdf;
pub mod mac;
pub mod sign;

pub use aead::{decrypt, encrypt};
pub use envelope::{
    open, seal, seal_with_password, signing_payload, verify, RejectReason, Verdict,
};
pub use kdf::{derive_cipher_key, derive_mac_key, derive_master_key, generate_salt, MasterKey};
pub use mac::{compute_hmac, verify_hmac};
pub use sign::{generate_keypair, sign, verify_signature};

/// Size of the master key and both derived subkeys in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the KDF salt in bytes
pub const SALT_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of an HMAC-SHA256 integrity code
pub const MAC_SIZE: usize = 32;

/// PBKDF2 iteration count. Fixed; both sides of a transfer must agree.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

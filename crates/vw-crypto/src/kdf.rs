//! Key derivation: PBKDF2 password → master key, HKDF master key → subkeys

use hkdf::Hkdf;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use vw_core::{VwError, VwResult};

use crate::{KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};

/// A 256-bit master key derived from a password via PBKDF2-HMAC-SHA256.
///
/// Never used directly as a cipher or MAC key; subkeys for those roles come
/// from [`derive_cipher_key`] and [`derive_mac_key`]. Zeroized on drop to
/// prevent secrets lingering in memory.
#[derive(Clone)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the master key from a password and salt.
///
/// Deterministic: the same (password, salt) pair always yields the same key.
/// The iteration count is fixed at [`PBKDF2_ITERATIONS`]; it is part of the
/// protocol, not a tunable.
pub fn derive_master_key(password: &SecretString, salt: &[u8; SALT_SIZE]) -> MasterKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        password.expose_secret().as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
        &mut key,
    );
    MasterKey::from_bytes(key)
}

/// Generate a random salt from the OS CSPRNG.
///
/// The salt is not secret and is stored alongside the encrypted data. A
/// failing random source is a fatal error, never silently substituted.
pub fn generate_salt() -> VwResult<[u8; SALT_SIZE]> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| VwError::Randomness(format!("salt generation: {e}")))?;
    Ok(salt)
}

/// Derive the AEAD cipher key from the master key via HKDF-SHA256.
pub fn derive_cipher_key(master: &MasterKey) -> [u8; KEY_SIZE] {
    hkdf_derive(master.as_bytes(), b"vaultwire-cipher")
}

/// Derive the integrity-code key from the master key via HKDF-SHA256.
///
/// Distinct from the cipher key so the encryption and authentication roles
/// never share key material.
pub fn derive_mac_key(master: &MasterKey) -> [u8; KEY_SIZE] {
    hkdf_derive(master.as_bytes(), b"vaultwire-mac")
}

/// HKDF-SHA256 key derivation with a domain-specific info string.
fn hkdf_derive(ikm: &[u8; KEY_SIZE], info: &[u8]) -> [u8; KEY_SIZE] {
    let hkdf = Hkdf::<Sha256>::new(None, ikm);
    let mut okm = [0u8; KEY_SIZE];
    // KEY_SIZE is far below the HKDF-SHA256 output limit of 255*32 bytes
    hkdf.expand(info, &mut okm)
        .expect("HKDF output length within bounds");
    okm
}

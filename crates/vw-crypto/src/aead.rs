//! AES-256-GCM encryption/decryption
//!
//! The nonce is returned separately from the ciphertext and must travel with
//! it; decryption with a different nonce (or key, or a tampered ciphertext)
//! fails closed with a generic authentication error.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;

use vw_core::{VwError, VwResult};

use crate::{KEY_SIZE, NONCE_SIZE};

/// Encrypt plaintext under a 256-bit cipher key.
///
/// Returns `(ciphertext, nonce)`. The nonce is freshly random per call and
/// never reused with the same key; reuse would destroy confidentiality, so
/// callers must always pair the returned nonce with exactly this ciphertext.
pub fn encrypt(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> VwResult<(Vec<u8>, [u8; NONCE_SIZE])> {
    let cipher = Aes256Gcm::new(key.into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| VwError::Randomness(format!("nonce generation: {e}")))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| VwError::Other(anyhow::anyhow!("AES-GCM encryption failed")))?;

    Ok((ciphertext, nonce_bytes))
}

/// Decrypt ciphertext produced by [`encrypt`].
///
/// Any tampering with ciphertext, key, or nonce yields the same generic
/// authentication failure; partial plaintext is never returned.
pub fn decrypt(
    key: &[u8; KEY_SIZE],
    ciphertext: &[u8],
    nonce: &[u8; NONCE_SIZE],
) -> VwResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| VwError::Auth("ciphertext authentication failed".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TAG_SIZE;

    fn test_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"Hello, World! This is a test message.";

        let (ciphertext, nonce) = encrypt(&key, plaintext).unwrap();
        assert!(!ciphertext.is_empty());

        let decrypted = decrypt(&key, &ciphertext, &nonce).unwrap();
        assert_eq!(&decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let key = test_key();
        let (ciphertext, nonce) = encrypt(&key, b"").unwrap();
        let decrypted = decrypt(&key, &ciphertext, &nonce).unwrap();
        assert_eq!(decrypted, b"");
    }

    #[test]
    fn test_nonces_are_fresh() {
        let key = test_key();
        let (c1, n1) = encrypt(&key, b"same input").unwrap();
        let (c2, n2) = encrypt(&key, b"same input").unwrap();

        assert_ne!(n1, n2, "nonce must be fresh per encryption");
        assert_ne!(c1, c2, "fresh nonces must yield distinct ciphertexts");
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let (ciphertext, nonce) = encrypt(&test_key(), b"secret data").unwrap();
        let result = decrypt(&[0xAAu8; KEY_SIZE], &ciphertext, &nonce);

        assert!(matches!(result, Err(VwError::Auth(_))));
    }

    #[test]
    fn test_decrypt_tampered_ciphertext() {
        let key = test_key();
        let (mut ciphertext, nonce) = encrypt(&key, b"secret data").unwrap();
        ciphertext[0] ^= 0xFF;

        let result = decrypt(&key, &ciphertext, &nonce);
        assert!(result.is_err(), "tampered ciphertext must fail");
    }

    #[test]
    fn test_decrypt_wrong_nonce() {
        let key = test_key();
        let (ciphertext, mut nonce) = encrypt(&key, b"secret data").unwrap();
        nonce[0] ^= 0x01;

        let result = decrypt(&key, &ciphertext, &nonce);
        assert!(result.is_err(), "wrong nonce must fail");
    }

    #[test]
    fn test_ciphertext_size() {
        let key = test_key();
        let plaintext = vec![0u8; 1000];
        let (ciphertext, _) = encrypt(&key, &plaintext).unwrap();

        // plaintext (1000) + tag (16) = 1016
        assert_eq!(ciphertext.len(), 1000 + TAG_SIZE);
    }
}

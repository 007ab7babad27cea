//! Envelope construction (sender) and verification (receiver)
//!
//! Canonical signing payload (raw concatenation, no separators, no length
//! prefixes):
//! ```text
//! file_name_bytes ++ ciphertext_bytes ++ hex(hmac)_bytes ++ hex(nonce)_bytes
//! ```
//! Sender and receiver each build this independently; a single reordered or
//! re-encoded byte breaks verification. The nonce term is included so a relay
//! cannot swap the nonce out from under a signed ciphertext.
//!
//! The receiver checks provenance and ciphertext integrity only: it holds no
//! symmetric key and never attempts decryption. The integrity code is checked
//! by the key-holding client in [`open`] after download.

use ed25519_dalek::SigningKey;
use secrecy::SecretString;

use vw_core::{Envelope, StoredRecord, VwError, VwResult};

use crate::kdf::{derive_cipher_key, derive_master_key, derive_mac_key, MasterKey};
use crate::{aead, mac, sign, NONCE_SIZE, SALT_SIZE};

/// Outcome of receiver-side envelope verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A hex field failed to decode or had the wrong length.
    Malformed(String),
    /// The signature does not cover the reconstructed canonical payload.
    BadSignature,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Malformed(what) => write!(f, "malformed envelope: {what}"),
            RejectReason::BadSignature => write!(f, "invalid signature"),
        }
    }
}

impl Verdict {
    /// Fold the verdict into the shared error type: malformed input and bad
    /// signatures map to the input and authentication kinds respectively.
    pub fn into_result(self) -> VwResult<()> {
        match self {
            Verdict::Accept => Ok(()),
            Verdict::Reject(RejectReason::Malformed(what)) => Err(VwError::Input(what)),
            Verdict::Reject(RejectReason::BadSignature) => {
                Err(VwError::Auth("invalid signature".into()))
            }
        }
    }
}

/// Build the canonical signing payload.
///
/// Both [`seal`] and [`verify`] call this; it is the single definition of the
/// byte layout the signature covers.
pub fn signing_payload(
    file_name: &str,
    ciphertext: &[u8],
    hmac_hex: &str,
    nonce_hex: &str,
) -> Vec<u8> {
    let mut payload =
        Vec::with_capacity(file_name.len() + ciphertext.len() + hmac_hex.len() + nonce_hex.len());
    payload.extend_from_slice(file_name.as_bytes());
    payload.extend_from_slice(ciphertext);
    payload.extend_from_slice(hmac_hex.as_bytes());
    payload.extend_from_slice(nonce_hex.as_bytes());
    payload
}

/// Sender side: encrypt, authenticate, and sign one file into an envelope.
///
/// Cipher and MAC subkeys are derived from the master key; the master key
/// itself never touches the ciphertext. The envelope is immutable once built.
pub fn seal(
    file_name: &str,
    plaintext: &[u8],
    master: &MasterKey,
    signing_key: &SigningKey,
) -> VwResult<Envelope> {
    let cipher_key = derive_cipher_key(master);
    let mac_key = derive_mac_key(master);

    let (ciphertext, nonce) = aead::encrypt(&cipher_key, plaintext)?;
    let hmac_hex = hex::encode(mac::compute_hmac(&mac_key, &ciphertext));
    let nonce_hex = hex::encode(nonce);

    let payload = signing_payload(file_name, &ciphertext, &hmac_hex, &nonce_hex);
    let signature = sign::sign(signing_key, &payload);

    Ok(Envelope {
        file_name: file_name.to_string(),
        file_data: ciphertext,
        hmac: hmac_hex,
        signature: sign::signature_to_hex(&signature),
        public_key: sign::public_key_to_hex(&signing_key.verifying_key()),
        nonce: nonce_hex,
    })
}

/// Convenience for callers holding a raw password: derive the master key,
/// then [`seal`].
pub fn seal_with_password(
    file_name: &str,
    plaintext: &[u8],
    password: &SecretString,
    salt: &[u8; SALT_SIZE],
    signing_key: &SigningKey,
) -> VwResult<Envelope> {
    let master = derive_master_key(password, salt);
    seal(file_name, plaintext, &master, signing_key)
}

/// Receiver side: admit or reject an envelope.
///
/// Reconstructs the canonical payload from the envelope fields and checks the
/// signature against the enclosed public key. Fail-closed: every failure path
/// is a rejection, never a warning.
pub fn verify(envelope: &Envelope) -> Verdict {
    let public_key = match sign::public_key_from_hex(&envelope.public_key) {
        Ok(key) => key,
        Err(_) => return Verdict::Reject(RejectReason::Malformed("public key".into())),
    };
    let signature = match sign::signature_from_hex(&envelope.signature) {
        Ok(sig) => sig,
        Err(_) => return Verdict::Reject(RejectReason::Malformed("signature".into())),
    };

    let payload = signing_payload(
        &envelope.file_name,
        &envelope.file_data,
        &envelope.hmac,
        &envelope.nonce,
    );

    if sign::verify_signature(&public_key, &payload, &signature) {
        Verdict::Accept
    } else {
        Verdict::Reject(RejectReason::BadSignature)
    }
}

/// Client side after download: check the integrity code, then decrypt.
///
/// The mirror of [`seal`] minus the signature (already checked at admission).
/// Fails closed on a MAC mismatch before any decryption is attempted.
pub fn open(record: &StoredRecord, master: &MasterKey) -> VwResult<Vec<u8>> {
    let mac_key = derive_mac_key(master);
    let code = hex::decode(&record.hmac_hex)
        .map_err(|_| VwError::Input("malformed integrity code hex".into()))?;
    if !mac::verify_hmac(&mac_key, &record.ciphertext, &code) {
        return Err(VwError::Auth("integrity code mismatch".into()));
    }

    let nonce: [u8; NONCE_SIZE] = hex::decode(&record.nonce_hex)
        .map_err(|_| VwError::Input("malformed nonce hex".into()))?
        .try_into()
        .map_err(|_| VwError::Input("nonce has wrong length".into()))?;

    let cipher_key = derive_cipher_key(master);
    aead::decrypt(&cipher_key, &record.ciphertext, &nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::generate_salt;
    use crate::KEY_SIZE;

    fn test_master() -> MasterKey {
        MasterKey::from_bytes([0x5Au8; KEY_SIZE])
    }

    fn test_signing_key() -> SigningKey {
        SigningKey::from_bytes(&[0x17u8; 32])
    }

    fn sealed(name: &str, body: &[u8]) -> Envelope {
        seal(name, body, &test_master(), &test_signing_key()).unwrap()
    }

    #[test]
    fn test_seal_then_verify_accepts() {
        let envelope = sealed("notes.txt", b"some file contents");
        assert_eq!(verify(&envelope), Verdict::Accept);
    }

    #[test]
    fn test_flipped_file_name_rejects() {
        let mut envelope = sealed("notes.txt", b"some file contents");
        envelope.file_name = "nodes.txt".into();
        assert_eq!(verify(&envelope), Verdict::Reject(RejectReason::BadSignature));
    }

    #[test]
    fn test_flipped_ciphertext_byte_rejects() {
        let mut envelope = sealed("notes.txt", b"some file contents");
        envelope.file_data[0] ^= 0x01;
        assert_eq!(verify(&envelope), Verdict::Reject(RejectReason::BadSignature));
    }

    #[test]
    fn test_flipped_hmac_rejects() {
        let mut envelope = sealed("notes.txt", b"some file contents");
        // flip one hex digit
        let mut hmac = envelope.hmac.into_bytes();
        hmac[0] = if hmac[0] == b'0' { b'1' } else { b'0' };
        envelope.hmac = String::from_utf8(hmac).unwrap();
        assert_eq!(verify(&envelope), Verdict::Reject(RejectReason::BadSignature));
    }

    #[test]
    fn test_flipped_nonce_rejects() {
        let mut envelope = sealed("notes.txt", b"some file contents");
        let mut nonce = envelope.nonce.into_bytes();
        nonce[0] = if nonce[0] == b'0' { b'1' } else { b'0' };
        envelope.nonce = String::from_utf8(nonce).unwrap();
        assert_eq!(verify(&envelope), Verdict::Reject(RejectReason::BadSignature));
    }

    #[test]
    fn test_tampered_signature_rejects() {
        let mut envelope = sealed("notes.txt", b"some file contents");
        let mut sig = envelope.signature.into_bytes();
        sig[0] = if sig[0] == b'0' { b'1' } else { b'0' };
        envelope.signature = String::from_utf8(sig).unwrap();
        assert!(matches!(verify(&envelope), Verdict::Reject(_)));
    }

    #[test]
    fn test_wrong_public_key_rejects() {
        let mut envelope = sealed("notes.txt", b"some file contents");
        let other = SigningKey::from_bytes(&[0x99u8; 32]);
        envelope.public_key = sign::public_key_to_hex(&other.verifying_key());
        assert_eq!(verify(&envelope), Verdict::Reject(RejectReason::BadSignature));
    }

    #[test]
    fn test_malformed_public_key_hex_rejects_as_malformed() {
        let mut envelope = sealed("notes.txt", b"data");
        envelope.public_key = "not hex at all".into();
        assert_eq!(
            verify(&envelope),
            Verdict::Reject(RejectReason::Malformed("public key".into()))
        );
    }

    #[test]
    fn test_malformed_signature_hex_rejects_as_malformed() {
        let mut envelope = sealed("notes.txt", b"data");
        envelope.signature = "abcd".into();
        assert_eq!(
            verify(&envelope),
            Verdict::Reject(RejectReason::Malformed("signature".into()))
        );
    }

    #[test]
    fn test_payload_order_is_significant() {
        // name/ciphertext boundary shifts must change the payload
        let a = signing_payload("ab", b"c", "dd", "ee");
        let b = signing_payload("a", b"bc", "dd", "ee");
        assert_eq!(a, b, "raw concatenation has no field boundaries");

        let c = signing_payload("ab", b"c", "ee", "dd");
        assert_ne!(a, c, "term order must matter");
    }

    #[test]
    fn test_open_roundtrip() {
        let master = test_master();
        let envelope = seal("doc.bin", b"plaintext body", &master, &test_signing_key()).unwrap();
        let (_, record) = envelope.into_record();

        let plaintext = open(&record, &master).unwrap();
        assert_eq!(plaintext, b"plaintext body");
    }

    #[test]
    fn test_open_wrong_master_key_fails_closed() {
        let envelope = sealed("doc.bin", b"plaintext body");
        let (_, record) = envelope.into_record();

        let wrong = MasterKey::from_bytes([0u8; KEY_SIZE]);
        let result = open(&record, &wrong);
        assert!(matches!(result, Err(VwError::Auth(_))));
    }

    #[test]
    fn test_open_tampered_ciphertext_fails_on_mac() {
        let master = test_master();
        let envelope = seal("doc.bin", b"plaintext body", &master, &test_signing_key()).unwrap();
        let (_, mut record) = envelope.into_record();
        record.ciphertext[0] ^= 0xFF;

        assert!(matches!(open(&record, &master), Err(VwError::Auth(_))));
    }

    #[test]
    fn test_verdict_into_result_mapping() {
        assert!(Verdict::Accept.into_result().is_ok());
        assert!(matches!(
            Verdict::Reject(RejectReason::Malformed("x".into())).into_result(),
            Err(VwError::Input(_))
        ));
        assert!(matches!(
            Verdict::Reject(RejectReason::BadSignature).into_result(),
            Err(VwError::Auth(_))
        ));
    }

    // End to end: password → master key → seal → admit → open, with a
    // forged sender rejected along the way.
    #[test]
    fn test_password_to_plaintext_scenario() {
        let password = SecretString::from("test-password");
        let salt = generate_salt().unwrap();
        let message = b"Hello, World! This is a test message.";

        let (_, signing_key) = sign::generate_keypair().unwrap();
        let envelope =
            seal_with_password("hello.txt", message, &password, &salt, &signing_key).unwrap();

        // receiver admits it
        assert_eq!(verify(&envelope), Verdict::Accept);

        // a different sender's public key must not verify it
        let (other_public, _) = sign::generate_keypair().unwrap();
        let mut forged = envelope.clone();
        forged.public_key = sign::public_key_to_hex(&other_public);
        assert_ne!(verify(&forged), Verdict::Accept);

        // the key-holding client gets the plaintext back exactly
        let (_, record) = envelope.into_record();
        let master = derive_master_key(&password, &salt);
        assert_eq!(open(&record, &master).unwrap(), message);
    }
}

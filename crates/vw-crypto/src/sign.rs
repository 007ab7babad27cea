//! Ed25519 key pairs, signatures, and hex transport encoding
//!
//! Ed25519 nonces are deterministic, so signing needs no secure randomness
//! beyond key generation. Public keys and signatures travel hex-encoded in
//! envelopes; the decoding helpers here turn malformed transport strings into
//! input errors rather than panics.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;

use vw_core::{VwError, VwResult};

/// Length of a hex-encoded Ed25519 public key or signing-key seed.
pub const KEY_HEX_LEN: usize = 64;

/// Generate a fresh Ed25519 key pair from the OS CSPRNG.
///
/// A failing random source aborts key generation; there is no fallback.
pub fn generate_keypair() -> VwResult<(VerifyingKey, SigningKey)> {
    let mut seed = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|e| VwError::Randomness(format!("signing key generation: {e}")))?;
    let signing = SigningKey::from_bytes(&seed);
    Ok((signing.verifying_key(), signing))
}

/// Sign a message. Deterministic for a given (key, message) pair.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> Signature {
    signing_key.sign(message)
}

/// Verify a signature against the exact message bytes it claims to cover.
pub fn verify_signature(public_key: &VerifyingKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature).is_ok()
}

pub fn public_key_to_hex(key: &VerifyingKey) -> String {
    hex::encode(key.as_bytes())
}

pub fn public_key_from_hex(hex_key: &str) -> VwResult<VerifyingKey> {
    let bytes: [u8; 32] = decode_fixed(hex_key, "public key")?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|_| VwError::Input("public key is not a valid Ed25519 point".into()))
}

/// Hex-encode the 32-byte signing-key seed.
pub fn signing_key_to_hex(key: &SigningKey) -> String {
    hex::encode(key.to_bytes())
}

pub fn signing_key_from_hex(hex_key: &str) -> VwResult<SigningKey> {
    let bytes: [u8; 32] = decode_fixed(hex_key, "signing key")?;
    Ok(SigningKey::from_bytes(&bytes))
}

pub fn signature_to_hex(signature: &Signature) -> String {
    hex::encode(signature.to_bytes())
}

pub fn signature_from_hex(hex_sig: &str) -> VwResult<Signature> {
    let bytes: [u8; 64] = decode_fixed(hex_sig, "signature")?;
    Ok(Signature::from_bytes(&bytes))
}

fn decode_fixed<const N: usize>(hex_str: &str, what: &str) -> VwResult<[u8; N]> {
    let bytes = hex::decode(hex_str).map_err(|_| VwError::Input(format!("malformed {what} hex")))?;
    bytes
        .try_into()
        .map_err(|_| VwError::Input(format!("{what} has wrong length")))
}

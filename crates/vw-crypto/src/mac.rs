//! HMAC-SHA256 integrity codes over ciphertext

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::MAC_SIZE;

type HmacSha256 = Hmac<Sha256>;

/// Compute an HMAC-SHA256 integrity code over `data`.
pub fn compute_hmac(key: &[u8], data: &[u8]) -> [u8; MAC_SIZE] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Verify an integrity code in constant time.
///
/// `verify_slice` performs the comparison without early exit, so a mismatch
/// position is not observable through timing.
pub fn verify_hmac(key: &[u8], data: &[u8], code: &[u8]) -> bool {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.verify_slice(code).is_ok()
}

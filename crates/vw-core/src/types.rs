use serde::{Deserialize, Serialize};

/// The self-contained authenticated unit a client sends to the server.
///
/// Wire shape of `POST /upload`. Ciphertext travels base64-encoded; every
/// cryptographic field travels hex-encoded. The signature covers the exact
/// concatenation `file_name ++ ciphertext ++ hmac ++ nonce` (hex fields as
/// their ASCII bytes), so any re-encoding or reordering breaks verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub file_name: String,
    /// AES-256-GCM ciphertext of the file body
    #[serde(with = "base64_bytes")]
    pub file_data: Vec<u8>,
    /// HMAC-SHA256 over the ciphertext, hex
    pub hmac: String,
    /// Ed25519 signature over the canonical payload, hex
    pub signature: String,
    /// Ed25519 public key of the sender, hex
    pub public_key: String,
    /// AES-GCM nonce, hex. Required to ever decrypt the ciphertext, so it
    /// always travels with it.
    pub nonce: String,
}

/// What the server persists for one file name. The server cannot decrypt
/// `ciphertext`; it keeps the metadata so a later download can be verified
/// and decrypted by a key-holding client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub ciphertext: Vec<u8>,
    pub hmac_hex: String,
    pub public_key_hex: String,
    pub nonce_hex: String,
}

/// Wire shape of `GET /download` responses. Plaintext is never returned;
/// decryption is the caller's job given out-of-band key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResponse {
    #[serde(with = "base64_bytes")]
    pub file_data: Vec<u8>,
    pub hmac: String,
    pub public_key: String,
    pub nonce: String,
}

impl Envelope {
    /// Convert an accepted envelope into the record the storage layer keeps.
    pub fn into_record(self) -> (String, StoredRecord) {
        (
            self.file_name,
            StoredRecord {
                ciphertext: self.file_data,
                hmac_hex: self.hmac,
                public_key_hex: self.public_key,
                nonce_hex: self.nonce,
            },
        )
    }
}

impl From<StoredRecord> for DownloadResponse {
    fn from(record: StoredRecord) -> Self {
        DownloadResponse {
            file_data: record.ciphertext,
            hmac: record.hmac_hex,
            public_key: record.public_key_hex,
            nonce: record.nonce_hex,
        }
    }
}

/// Serde adapter: `Vec<u8>` as standard base64 in JSON.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

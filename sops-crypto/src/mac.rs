//! The integrity MAC: a keyed, tamper-evident digest over a tree's leaves.

use crate::aead::{decrypt_leaf, encrypt_leaf};
use crate::error::CryptoError;
use sops_types::{DataKey, Value};
use subtle::ConstantTimeEq;

/// Path bound as associated data for the MAC's own ciphertext token —
/// the MAC is encrypted "as if a leaf with path=''".
pub const MAC_PATH: &[u8] = b"";

/// Encrypt a raw MAC digest under `data_key` for storage in the envelope.
pub fn encrypt_mac(digest: &[u8], data_key: &DataKey) -> String {
    encrypt_leaf(&Value::Bytes(digest.to_vec()), data_key, MAC_PATH)
}

/// Decrypt a MAC token from the envelope back into raw digest bytes.
pub fn decrypt_mac(token: &str, data_key: &DataKey) -> Result<Vec<u8>, CryptoError> {
    match decrypt_leaf(token, data_key, MAC_PATH)? {
        Value::Bytes(b) => Ok(b),
        other => Err(CryptoError::MalformedCiphertext(format!(
            "MAC token decoded to unexpected type: {other:?}"
        ))),
    }
}

/// Compare two MAC digests in constant time. Never use `==` on decrypted
/// MAC bytes — this is the one comparison point in the whole pipeline
/// where timing must not leak how many leading bytes matched.
pub fn verify_mac(expected: &[u8], actual: &[u8]) -> Result<(), CryptoError> {
    if expected.len() != actual.len() {
        return Err(CryptoError::MacMismatch);
    }
    if expected.ct_eq(actual).into() {
        Ok(())
    } else {
        Err(CryptoError::MacMismatch)
    }
}

//! AEAD leaf encryption: one value, one path, one `ENC[...]` token.

use crate::error::CryptoError;
use crate::token::{format_token, parse_token};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaChaNonce};
use rand::RngCore;
use sops_types::{DataKey, Value};

const NONCE_LEN: usize = 12;

/// AEAD cipher identifiers this crate can produce or consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherId {
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl CipherId {
    fn as_str(&self) -> &'static str {
        match self {
            CipherId::Aes256Gcm => "AES256_GCM",
            CipherId::ChaCha20Poly1305 => "CHACHA20_POLY1305",
        }
    }

    fn parse(s: &str) -> Result<Self, CryptoError> {
        match s {
            "AES256_GCM" => Ok(CipherId::Aes256Gcm),
            "CHACHA20_POLY1305" => Ok(CipherId::ChaCha20Poly1305),
            other => Err(CryptoError::UnsupportedCipher(other.to_string())),
        }
    }
}

/// Encrypt `value` under `data_key`, binding `path` as associated data, and
/// return the `ENC[...]` token. Encryption always uses [`CipherId::Aes256Gcm`].
pub fn encrypt_leaf(value: &Value, data_key: &DataKey, path: &[u8]) -> String {
    let (type_tag, plaintext) = value.encode_canonical();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let mut buffer = plaintext;
    let tag = data_key.with_bytes(|key_bytes| {
        let cipher = Aes256Gcm::new_from_slice(key_bytes).expect("32-byte key");
        cipher
            .encrypt_in_place_detached(AesNonce::from_slice(&nonce_bytes), path, &mut buffer)
            .expect("AEAD encryption of a bounded in-memory buffer cannot fail")
    });

    format_token(
        CipherId::Aes256Gcm.as_str(),
        &buffer,
        &nonce_bytes,
        &tag,
        type_tag,
    )
}

/// Parse and decrypt an `ENC[...]` token, verifying `path` as associated
/// data, and reconstruct the typed [`Value`].
pub fn decrypt_leaf(token: &str, data_key: &DataKey, path: &[u8]) -> Result<Value, CryptoError> {
    let parsed = parse_token(token)?;
    let cipher_id = CipherId::parse(&parsed.cipher)?;

    if parsed.iv.len() != NONCE_LEN {
        return Err(CryptoError::MalformedCiphertext(format!(
            "expected {NONCE_LEN}-byte nonce, got {}",
            parsed.iv.len()
        )));
    }

    let mut buffer = parsed.data;
    let tag_array = aes_gcm::aead::generic_array::GenericArray::clone_from_slice(&parsed.tag);

    let decrypt_result = data_key.with_bytes(|key_bytes| match cipher_id {
        CipherId::Aes256Gcm => {
            let cipher = Aes256Gcm::new_from_slice(key_bytes).expect("32-byte key");
            cipher.decrypt_in_place_detached(
                AesNonce::from_slice(&parsed.iv),
                path,
                &mut buffer,
                &tag_array,
            )
        }
        CipherId::ChaCha20Poly1305 => {
            let cipher = ChaCha20Poly1305::new_from_slice(key_bytes).expect("32-byte key");
            cipher.decrypt_in_place_detached(
                ChaChaNonce::from_slice(&parsed.iv),
                path,
                &mut buffer,
                &tag_array,
            )
        }
    });

    decrypt_result.map_err(|_| CryptoError::Integrity)?;

    Value::decode_canonical(&parsed.type_tag, &buffer)
        .map_err(|e| CryptoError::MalformedCiphertext(e.to_string()))
}

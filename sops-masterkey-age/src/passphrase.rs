//! Passphrase-derived wrapping, used only to protect an identity file's
//! key material at rest — never as a per-document `MasterKeyRef` variant.
//! `sops_types::MasterKeyKind::Passphrase` still exists so the envelope
//! schema and rotation-freshness hint have somewhere to live, but the
//! pipeline's key-group path never constructs a [`sops_masterkey::MasterKey`]
//! trait object of this kind — there is nothing to identify a passphrase
//! master key *by* (identifier form is `none` per the original variant
//! table), so it can't participate in `wrap`-to-N-recipients the way the
//! other variants do.

use crate::error::AgeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand_core::{OsRng, RngCore};
use scrypt::Params as ScryptParams;
use zeroize::Zeroizing;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
/// `log_n = 15` per the design note — scrypt's N = 2^15 = 32768.
const SCRYPT_LOG_N: u8 = 15;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

fn derive_key(passphrase: &[u8], salt: &[u8]) -> Zeroizing<[u8; 32]> {
    let params = ScryptParams::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, 32)
        .expect("fixed scrypt parameters are always valid");
    let mut out = Zeroizing::new([0u8; 32]);
    scrypt::scrypt(passphrase, salt, &params, out.as_mut())
        .expect("32-byte scrypt output always succeeds with valid parameters");
    out
}

/// Wraps/unwraps arbitrary identity-file key material under a
/// user-supplied passphrase. Not a [`sops_masterkey::MasterKey`] — see the
/// module doc for why.
pub struct PassphraseIdentity;

impl PassphraseIdentity {
    /// Encrypt `plaintext` (typically a private key's raw bytes) under
    /// `passphrase`, returning a self-contained base64 token of
    /// `salt || nonce || ciphertext || tag`.
    pub fn wrap(passphrase: &[u8], plaintext: &[u8]) -> String {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(passphrase, &salt);

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let mut buffer = plaintext.to_vec();
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_ref()).expect("32-byte key");
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce_bytes), b"", &mut buffer)
            .expect("AEAD encryption of a bounded in-memory buffer cannot fail");

        let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + buffer.len() + 16);
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&buffer);
        out.extend_from_slice(&tag);
        STANDARD.encode(out)
    }

    /// Decrypt a token produced by [`PassphraseIdentity::wrap`].
    pub fn unwrap(passphrase: &[u8], token: &str) -> Result<Zeroizing<Vec<u8>>, AgeError> {
        let raw = STANDARD
            .decode(token)
            .map_err(|e| AgeError::MalformedWrapped(e.to_string()))?;
        if raw.len() < SALT_LEN + NONCE_LEN + 16 {
            return Err(AgeError::MalformedWrapped("token too short".into()));
        }
        let (salt, rest) = raw.split_at(SALT_LEN);
        let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
        let (ciphertext, tag_bytes) = rest.split_at(rest.len() - 16);

        let key = derive_key(passphrase, salt);
        let mut buffer = ciphertext.to_vec();
        let tag = chacha20poly1305::aead::generic_array::GenericArray::clone_from_slice(tag_bytes);
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_ref()).expect("32-byte key");
        cipher
            .decrypt_in_place_detached(Nonce::from_slice(nonce_bytes), b"", &mut buffer, &tag)
            .map_err(|_| AgeError::Integrity)?;

        Ok(Zeroizing::new(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_then_unwrap_roundtrips() {
        let token = PassphraseIdentity::wrap(b"correct horse battery staple", b"identity-key-bytes");
        let recovered = PassphraseIdentity::unwrap(b"correct horse battery staple", &token).unwrap();
        assert_eq!(&recovered[..], b"identity-key-bytes");
    }

    #[test]
    fn wrong_passphrase_fails() {
        let token = PassphraseIdentity::wrap(b"right", b"secret-material");
        assert!(PassphraseIdentity::unwrap(b"wrong", &token).is_err());
    }

    #[test]
    fn each_wrap_uses_a_fresh_salt() {
        let a = PassphraseIdentity::wrap(b"pw", b"data");
        let b = PassphraseIdentity::wrap(b"pw", b"data");
        assert_ne!(a, b);
    }
}

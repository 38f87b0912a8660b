//! Shared ECIES-over-X25519 wrap/unwrap used by both the x25519-recipient
//! and ssh-recipient backends: an ephemeral X25519 keypair, HKDF-SHA256 to
//! derive a wrap key from the shared secret, ChaCha20-Poly1305 to wrap the
//! data key.

use crate::error::AgeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use hkdf::Hkdf;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use sops_types::DataKey;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

const HKDF_INFO: &[u8] = b"sops-age-wrap-v1";
const NONCE_LEN: usize = 12;

fn derive_wrap_key(shared_secret: &x25519_dalek::SharedSecret, eph_pub: &[u8; 32]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(eph_pub), shared_secret.as_bytes());
    let mut out = [0u8; 32];
    hk.expand(HKDF_INFO, &mut out).expect("32 bytes is a valid HKDF-SHA256 output length");
    out
}

/// Wrap `data_key` against `recipient`, returning a base64 token of
/// `eph_pub || nonce || ciphertext`.
pub fn wrap(recipient: &PublicKey, data_key: &DataKey) -> String {
    let eph_secret = EphemeralSecret::random_from_rng(OsRng);
    let eph_pub = PublicKey::from(&eph_secret);
    let shared = eph_secret.diffie_hellman(recipient);
    let wrap_key = derive_wrap_key(&shared, eph_pub.as_bytes());

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let mut buffer = data_key.with_bytes(|b| b.to_vec());
    let cipher = ChaCha20Poly1305::new_from_slice(&wrap_key).expect("32-byte key");
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce_bytes), b"", &mut buffer)
        .expect("AEAD encryption of a bounded in-memory buffer cannot fail");

    let mut out = Vec::with_capacity(32 + NONCE_LEN + buffer.len() + 16);
    out.extend_from_slice(eph_pub.as_bytes());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&buffer);
    out.extend_from_slice(&tag);
    STANDARD.encode(out)
}

/// Unwrap a token produced by [`wrap`] using `identity`, the recipient's
/// private key.
pub fn unwrap(identity: &StaticSecret, token: &str) -> Result<DataKey, AgeError> {
    let raw = STANDARD
        .decode(token)
        .map_err(|e| AgeError::MalformedWrapped(e.to_string()))?;
    if raw.len() < 32 + NONCE_LEN + 16 {
        return Err(AgeError::MalformedWrapped("token too short".into()));
    }

    let (eph_pub_bytes, rest) = raw.split_at(32);
    let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
    let (ciphertext, tag_bytes) = rest.split_at(rest.len() - 16);

    let mut eph_pub_arr = [0u8; 32];
    eph_pub_arr.copy_from_slice(eph_pub_bytes);
    let eph_pub = PublicKey::from(eph_pub_arr);

    let shared = identity.diffie_hellman(&eph_pub);
    let wrap_key = derive_wrap_key(&shared, &eph_pub_arr);

    let mut buffer = ciphertext.to_vec();
    let tag = chacha20poly1305::aead::generic_array::GenericArray::clone_from_slice(tag_bytes);
    let cipher = ChaCha20Poly1305::new_from_slice(&wrap_key).expect("32-byte key");
    cipher
        .decrypt_in_place_detached(Nonce::from_slice(nonce_bytes), b"", &mut buffer, &tag)
        .map_err(|_| AgeError::Integrity)?;

    DataKey::from_slice(&buffer).map_err(|e| AgeError::MalformedWrapped(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_then_unwrap_roundtrips() {
        let identity = StaticSecret::random_from_rng(OsRng);
        let recipient = PublicKey::from(&identity);
        let key = DataKey::generate();

        let token = wrap(&recipient, &key);
        let recovered = unwrap(&identity, &token).unwrap();
        assert_eq!(key.with_bytes(|b| *b), recovered.with_bytes(|b| *b));
    }

    #[test]
    fn wrong_identity_fails() {
        let identity_a = StaticSecret::random_from_rng(OsRng);
        let recipient_a = PublicKey::from(&identity_a);
        let identity_b = StaticSecret::random_from_rng(OsRng);

        let token = wrap(&recipient_a, &DataKey::generate());
        assert!(unwrap(&identity_b, &token).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let identity = StaticSecret::random_from_rng(OsRng);
        let recipient = PublicKey::from(&identity);
        let token = wrap(&recipient, &DataKey::generate());
        let mut raw = STANDARD.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xFF;
        let tampered = STANDARD.encode(raw);
        assert!(unwrap(&identity, &tampered).is_err());
    }
}

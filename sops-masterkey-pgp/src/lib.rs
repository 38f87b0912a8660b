//! The `openpgp` master key backend.
//!
//! A simplified stand-in for real OpenPGP: recipients and identities are
//! plain X25519 keypairs registered under a hex fingerprint label, wrapped
//! with the same HKDF-then-AEAD construction used elsewhere in this
//! workspace. Real RFC 4880 packet parsing, a keyring/keybox, and
//! multi-subkey selection are out of scope — see `DESIGN.md` for why this
//! line was drawn here rather than pulling in a full OpenPGP
//! implementation for one backend among several.

mod error;

pub use error::PgpError;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use hkdf::Hkdf;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::DataKey;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

const HKDF_INFO: &[u8] = b"sops-pgp-transport-wrap-v1";
const NONCE_LEN: usize = 12;

fn derive_wrap_key(shared_secret: &x25519_dalek::SharedSecret, eph_pub: &[u8; 32]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(eph_pub), shared_secret.as_bytes());
    let mut out = [0u8; 32];
    hk.expand(HKDF_INFO, &mut out)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    out
}

/// Parse a 64-character hex fingerprint into its canonical lowercase form.
pub fn normalize_fingerprint(fingerprint: &str) -> Result<String, PgpError> {
    let bytes = hex::decode(fingerprint)
        .map_err(|e| PgpError::InvalidFingerprint(e.to_string()))?;
    if bytes.len() != 20 && bytes.len() != 32 {
        return Err(PgpError::InvalidFingerprint(format!(
            "expected a 20-byte (v4) or 32-byte (v5) fingerprint, got {} bytes",
            bytes.len()
        )));
    }
    Ok(hex::encode(bytes))
}

/// A master key backed by a fingerprint-keyed X25519 transport keypair —
/// wraps the data key directly, same as a real OpenPGP public-key
/// encryption subpacket would conceptually do.
pub struct PgpMasterKey {
    fingerprint: String,
    recipient: Option<PublicKey>,
    identity: Option<StaticSecret>,
    wrapped: Option<String>,
}

impl PgpMasterKey {
    /// Build an encrypt-only instance for the recipient at `fingerprint`
    /// whose transport public key is `public_key_hex` (64 hex characters).
    pub fn for_recipient(fingerprint: &str, public_key_hex: &str) -> Result<Self, PgpError> {
        let fingerprint = normalize_fingerprint(fingerprint)?;
        let bytes = hex::decode(public_key_hex)
            .map_err(|e| PgpError::InvalidPublicKey(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PgpError::InvalidPublicKey("expected a 32-byte public key".into()))?;
        Ok(PgpMasterKey {
            fingerprint,
            recipient: Some(PublicKey::from(arr)),
            identity: None,
            wrapped: None,
        })
    }

    /// Build a decrypt-capable instance from the already-held transport
    /// private key and the wrapped data key from the envelope.
    pub fn for_identity(
        fingerprint: impl Into<String>,
        identity_bytes: [u8; 32],
        wrapped: impl Into<String>,
    ) -> Self {
        let identity = StaticSecret::from(identity_bytes);
        PgpMasterKey {
            fingerprint: fingerprint.into(),
            recipient: Some(PublicKey::from(&identity)),
            identity: Some(identity),
            wrapped: Some(wrapped.into()),
        }
    }
}

#[async_trait]
impl MasterKey for PgpMasterKey {
    async fn encrypt(&self, data_key: &DataKey) -> Result<String, MasterKeyError> {
        let recipient = self.recipient.as_ref().ok_or_else(|| {
            MasterKeyError::UnsupportedOperation("no recipient configured for encrypt".into())
        })?;

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
        Ok(STANDARD.encode(out))
    }

    async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
        let identity = self.identity.as_ref().ok_or_else(|| {
            MasterKeyError::UnsupportedOperation("no identity configured for decrypt".into())
        })?;
        let wrapped = self
            .wrapped
            .as_ref()
            .ok_or_else(|| MasterKeyError::NotFound("no wrapped data key held".into()))?;

        let raw = STANDARD
            .decode(wrapped)
            .map_err(|e| PgpError::MalformedWrapped(e.to_string()))?;
        if raw.len() < 32 + NONCE_LEN + 16 {
            return Err(PgpError::MalformedWrapped("token too short".into()).into());
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
            .map_err(|_| PgpError::Integrity)?;

        DataKey::from_slice(&buffer)
            .map_err(|e| PgpError::MalformedWrapped(e.to_string()).into())
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        "openpgp"
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("fp".into(), self.fingerprint.clone().into());
        if let Some(w) = &self.wrapped {
            map.insert("enc".into(), w.clone().into());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    fn fresh_keypair() -> (StaticSecret, PublicKey) {
        let identity = StaticSecret::random_from_rng(OsRng);
        let recipient = PublicKey::from(&identity);
        (identity, recipient)
    }

    #[test]
    fn normalizes_v4_fingerprint() {
        let fp = "ABCDEF0123456789ABCDEF0123456789ABCDEF01";
        assert_eq!(normalize_fingerprint(fp).unwrap(), fp.to_lowercase());
    }

    #[test]
    fn rejects_wrong_length_fingerprint() {
        assert!(normalize_fingerprint("ab").is_err());
    }

    #[tokio::test]
    async fn wrap_then_unwrap_roundtrips() {
        let (identity, recipient) = fresh_keypair();
        let fp = "ab".repeat(20);
        let encryptor =
            PgpMasterKey::for_recipient(&fp, &hex::encode(recipient.as_bytes())).unwrap();
        let data_key = DataKey::generate();
        let wrapped = encryptor.encrypt(&data_key).await.unwrap();

        let decryptor = PgpMasterKey::for_identity(fp, identity.to_bytes(), wrapped);
        let recovered = decryptor.decrypt().await.unwrap();
        assert_eq!(data_key.with_bytes(|b| *b), recovered.with_bytes(|b| *b));
    }

    #[tokio::test]
    async fn wrong_identity_fails_to_unwrap() {
        let (_, recipient) = fresh_keypair();
        let (other_identity, _) = fresh_keypair();
        let fp = "cd".repeat(20);
        let encryptor =
            PgpMasterKey::for_recipient(&fp, &hex::encode(recipient.as_bytes())).unwrap();
        let wrapped = encryptor.encrypt(&DataKey::generate()).await.unwrap();

        let decryptor = PgpMasterKey::for_identity(fp, other_identity.to_bytes(), wrapped);
        assert!(decryptor.decrypt().await.is_err());
    }

    fn _assert_send_sync<T: Send + Sync>() {}
    fn _assert_object_safe() {
        _assert_send_sync::<Box<dyn MasterKey>>();
    }
}

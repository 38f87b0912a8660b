//! The `x25519-recipient` master key backend: a modern stream-cipher
//! recipient format wrapping the data key directly, identified by a
//! bech32 `age1...` string.

use crate::ecies;
use crate::error::AgeError;
use async_trait::async_trait;
use bech32::{FromBase32, ToBase32, Variant};
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::DataKey;
use x25519_dalek::{PublicKey, StaticSecret};

const RECIPIENT_HRP: &str = "age";

/// Encode a raw X25519 public key as a bech32 `age1...` recipient string.
pub fn encode_recipient(public_key: &PublicKey) -> String {
    bech32::encode(RECIPIENT_HRP, public_key.as_bytes().to_base32(), Variant::Bech32)
        .expect("fixed 32-byte payload always encodes")
}

/// Decode a bech32 `age1...` recipient string into a raw public key.
pub fn decode_recipient(recipient: &str) -> Result<PublicKey, AgeError> {
    let (hrp, data, variant) =
        bech32::decode(recipient).map_err(|e| AgeError::InvalidRecipient(e.to_string()))?;
    if hrp != RECIPIENT_HRP {
        return Err(AgeError::InvalidRecipient(format!(
            "unexpected human-readable part: {hrp}"
        )));
    }
    if variant != Variant::Bech32 {
        return Err(AgeError::InvalidRecipient("expected bech32 (not bech32m) encoding".into()));
    }
    let bytes = Vec::<u8>::from_base32(&data).map_err(|e| AgeError::InvalidRecipient(e.to_string()))?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| AgeError::InvalidRecipient("expected 32-byte payload".into()))?;
    Ok(PublicKey::from(arr))
}

/// A master key backed by an X25519 recipient. Constructed either for
/// encrypt (from a recipient string alone) or for decrypt (from an
/// identity secret plus the wrapped ciphertext already in the envelope).
pub struct X25519MasterKey {
    recipient_str: String,
    recipient: Option<PublicKey>,
    identity: Option<StaticSecret>,
    wrapped: Option<String>,
}

impl X25519MasterKey {
    /// Build an encrypt-only instance from a recipient string.
    pub fn for_recipient(recipient: &str) -> Result<Self, AgeError> {
        let public_key = decode_recipient(recipient)?;
        Ok(X25519MasterKey {
            recipient_str: recipient.to_string(),
            recipient: Some(public_key),
            identity: None,
            wrapped: None,
        })
    }

    /// Build a decrypt-capable instance from a 32-byte identity secret and
    /// the wrapped data key already stored in a [`sops_types::MasterKeyRef`].
    pub fn for_identity(
        identity_bytes: [u8; 32],
        recipient_str: impl Into<String>,
        wrapped: impl Into<String>,
    ) -> Self {
        let identity = StaticSecret::from(identity_bytes);
        X25519MasterKey {
            recipient_str: recipient_str.into(),
            recipient: Some(PublicKey::from(&identity)),
            identity: Some(identity),
            wrapped: Some(wrapped.into()),
        }
    }
}

#[async_trait]
impl MasterKey for X25519MasterKey {
    async fn encrypt(&self, data_key: &DataKey) -> Result<String, MasterKeyError> {
        let recipient = self.recipient.as_ref().ok_or_else(|| {
            MasterKeyError::UnsupportedOperation("no recipient configured for encrypt".into())
        })?;
        Ok(ecies::wrap(recipient, data_key))
    }

    async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
        let identity = self.identity.as_ref().ok_or_else(|| {
            MasterKeyError::UnsupportedOperation("no identity configured for decrypt".into())
        })?;
        let wrapped = self.wrapped.as_ref().ok_or_else(|| {
            MasterKeyError::NotFound("no wrapped data key held".into())
        })?;
        ecies::unwrap(identity, wrapped).map_err(Into::into)
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        "x25519-recipient"
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("recipient".into(), self.recipient_str.clone().into());
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

    #[test]
    fn recipient_roundtrips_through_bech32() {
        let identity = StaticSecret::random_from_rng(OsRng);
        let public_key = PublicKey::from(&identity);
        let encoded = encode_recipient(&public_key);
        assert!(encoded.starts_with("age1"));
        let decoded = decode_recipient(&encoded).unwrap();
        assert_eq!(decoded.as_bytes(), public_key.as_bytes());
    }

    #[tokio::test]
    async fn wrap_then_unwrap_through_master_key_trait() {
        let identity = StaticSecret::random_from_rng(OsRng);
        let recipient_str = encode_recipient(&PublicKey::from(&identity));

        let encryptor = X25519MasterKey::for_recipient(&recipient_str).unwrap();
        let key = DataKey::generate();
        let wrapped = encryptor.encrypt(&key).await.unwrap();

        let decryptor =
            X25519MasterKey::for_identity(identity.to_bytes(), recipient_str, wrapped);
        let recovered = decryptor.decrypt().await.unwrap();
        assert_eq!(key.with_bytes(|b| *b), recovered.with_bytes(|b| *b));
    }

    #[tokio::test]
    async fn encrypt_only_instance_cannot_decrypt() {
        let identity = StaticSecret::random_from_rng(OsRng);
        let recipient_str = encode_recipient(&PublicKey::from(&identity));
        let encryptor = X25519MasterKey::for_recipient(&recipient_str).unwrap();
        assert!(encryptor.decrypt().await.is_err());
    }

    #[test]
    fn rejects_non_age_hrp() {
        let identity = StaticSecret::random_from_rng(OsRng);
        let bech = bech32::encode(
            "notage",
            PublicKey::from(&identity).as_bytes().to_base32(),
            Variant::Bech32,
        )
        .unwrap();
        assert!(decode_recipient(&bech).is_err());
    }

    fn _assert_send_sync<T: Send + Sync>() {}
    fn _assert_object_safe() {
        _assert_send_sync::<Box<dyn MasterKey>>();
    }
}

//! The `ssh-recipient` master key backend: same ECIES wrap as
//! `x25519-recipient`, but the recipient is parsed from an SSH public key
//! line and converted from its Edwards form to Montgomery form. Only
//! `ssh-ed25519` keys are supported — `ssh-rsa` recipients are rejected
//! outright, since RSA has no X25519 conversion and bridging it would mean
//! a second, unrelated wrap mechanism this backend deliberately doesn't
//! take on.

use crate::ecies;
use crate::error::AgeError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use curve25519_dalek::edwards::CompressedEdwardsY;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::DataKey;
use x25519_dalek::{PublicKey, StaticSecret};

/// Parse an `ssh-ed25519 AAAA... [comment]` line and return the recipient's
/// X25519 public key, converted from its native Edwards form.
pub fn parse_ssh_recipient(line: &str) -> Result<PublicKey, AgeError> {
    let mut parts = line.split_whitespace();
    let key_type = parts
        .next()
        .ok_or_else(|| AgeError::InvalidSshKey("empty key line".into()))?;
    if key_type != "ssh-ed25519" {
        return Err(AgeError::UnsupportedSshKeyType(key_type.to_string()));
    }
    let blob_b64 = parts
        .next()
        .ok_or_else(|| AgeError::InvalidSshKey("missing base64 blob".into()))?;
    let blob = STANDARD
        .decode(blob_b64)
        .map_err(|e| AgeError::InvalidSshKey(format!("invalid base64: {e}")))?;

    let point = extract_ed25519_point(&blob)?;
    let edwards = CompressedEdwardsY(point)
        .decompress()
        .ok_or_else(|| AgeError::InvalidSshKey("public key is not a valid curve point".into()))?;
    let montgomery = edwards.to_montgomery();
    Ok(PublicKey::from(montgomery.to_bytes()))
}

/// Read the two length-prefixed fields of an `ssh-ed25519` wire-format
/// public key blob: the type string, then the 32-byte point.
fn extract_ed25519_point(blob: &[u8]) -> Result<[u8; 32], AgeError> {
    let (type_str, rest) = read_ssh_string(blob)?;
    if type_str != b"ssh-ed25519" {
        return Err(AgeError::InvalidSshKey(
            "wire-format type string does not match ssh-ed25519".into(),
        ));
    }
    let (point, _) = read_ssh_string(rest)?;
    point
        .try_into()
        .map_err(|_| AgeError::InvalidSshKey("expected a 32-byte ed25519 point".into()))
}

fn read_ssh_string(data: &[u8]) -> Result<(&[u8], &[u8]), AgeError> {
    if data.len() < 4 {
        return Err(AgeError::InvalidSshKey("truncated length-prefixed field".into()));
    }
    let (len_bytes, rest) = data.split_at(4);
    let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
    if rest.len() < len {
        return Err(AgeError::InvalidSshKey("length-prefixed field exceeds blob".into()));
    }
    Ok(rest.split_at(len))
}

/// A master key backed by an `ssh-ed25519` recipient.
pub struct SshMasterKey {
    key_line: String,
    recipient: Option<PublicKey>,
    identity: Option<StaticSecret>,
    wrapped: Option<String>,
}

impl SshMasterKey {
    pub fn for_recipient(key_line: &str) -> Result<Self, AgeError> {
        let recipient = parse_ssh_recipient(key_line)?;
        Ok(SshMasterKey {
            key_line: key_line.to_string(),
            recipient: Some(recipient),
            identity: None,
            wrapped: None,
        })
    }

    /// Build a decrypt-capable instance from the X25519 scalar already
    /// converted from the corresponding ssh-ed25519 private key (that
    /// conversion happens at the edge, outside this crate).
    pub fn for_identity(
        identity_bytes: [u8; 32],
        key_line: impl Into<String>,
        wrapped: impl Into<String>,
    ) -> Self {
        let identity = StaticSecret::from(identity_bytes);
        SshMasterKey {
            key_line: key_line.into(),
            recipient: Some(PublicKey::from(&identity)),
            identity: Some(identity),
            wrapped: Some(wrapped.into()),
        }
    }
}

#[async_trait]
impl MasterKey for SshMasterKey {
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
        let wrapped = self
            .wrapped
            .as_ref()
            .ok_or_else(|| MasterKeyError::NotFound("no wrapped data key held".into()))?;
        ecies::unwrap(identity, wrapped).map_err(Into::into)
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        "ssh-recipient"
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("ssh_key".into(), self.key_line.clone().into());
        if let Some(w) = &self.wrapped {
            map.insert("enc".into(), w.clone().into());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use sha2::{Digest, Sha512};

    fn build_ssh_ed25519_line(verifying_key_bytes: [u8; 32]) -> String {
        let mut blob = Vec::new();
        blob.extend_from_slice(&(11u32).to_be_bytes());
        blob.extend_from_slice(b"ssh-ed25519");
        blob.extend_from_slice(&(32u32).to_be_bytes());
        blob.extend_from_slice(&verifying_key_bytes);
        format!("ssh-ed25519 {} test@example", STANDARD.encode(blob))
    }

    /// The standard ed25519-seed-to-x25519-scalar conversion (SHA-512 of
    /// the seed, clamped, matching how ed25519 itself derives its scalar).
    fn seed_to_x25519_scalar(seed: &[u8; 32]) -> [u8; 32] {
        let hash = Sha512::digest(seed);
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&hash[..32]);
        scalar[0] &= 248;
        scalar[31] &= 127;
        scalar[31] |= 64;
        scalar
    }

    #[tokio::test]
    async fn full_ssh_recipient_wrap_unwrap_roundtrip() {
        let seed: [u8; 32] = [7u8; 32];
        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();
        let key_line = build_ssh_ed25519_line(verifying_key.to_bytes());

        let encryptor = SshMasterKey::for_recipient(&key_line).unwrap();
        let data_key = DataKey::generate();
        let wrapped = encryptor.encrypt(&data_key).await.unwrap();

        let x25519_scalar = seed_to_x25519_scalar(&seed);
        let decryptor = SshMasterKey::for_identity(x25519_scalar, key_line, wrapped);
        let recovered = decryptor.decrypt().await.unwrap();
        assert_eq!(data_key.with_bytes(|b| *b), recovered.with_bytes(|b| *b));
    }

    #[test]
    fn rejects_ssh_rsa_recipients() {
        let err = parse_ssh_recipient("ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQ== comment").unwrap_err();
        assert!(matches!(err, AgeError::UnsupportedSshKeyType(ref t) if t == "ssh-rsa"));
    }

    #[test]
    fn rejects_truncated_blob() {
        assert!(parse_ssh_recipient("ssh-ed25519 QQ==").is_err());
    }

    #[test]
    fn read_ssh_string_rejects_oversized_length() {
        let data = [0, 0, 0, 100, 1, 2, 3];
        assert!(read_ssh_string(&data).is_err());
    }

    fn _assert_send_sync<T: Send + Sync>() {}
    fn _assert_object_safe() {
        _assert_send_sync::<Box<dyn MasterKey>>();
    }
}

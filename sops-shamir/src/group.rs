//! Per-group wrap/unwrap orchestration across a key group's master keys.
//!
//! Wrapping fans out concurrently: every master key in the group gets an
//! independent chance to wrap the same share, and the group only fails if
//! all of them do — a backend that's temporarily unreachable shouldn't
//! block a document from being protected by the keys that are. Unwrapping
//! instead tries each master key in listed order and stops at the first
//! success, since any one of them holding the share is sufficient and most
//! calls only need to touch the backend actually capable of decrypting.

use crate::error::ShamirError;
use futures::future::join_all;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::{DataKey, MasterKeyRef};
use std::sync::Arc;
use time::OffsetDateTime;

/// One key group member: the envelope-facing reference paired with the
/// live backend that can wrap or unwrap against it.
pub struct KeyGroupMember {
    pub reference: MasterKeyRef,
    pub master_key: Arc<dyn MasterKey>,
}

impl KeyGroupMember {
    pub fn new(reference: MasterKeyRef, master_key: Arc<dyn MasterKey>) -> Self {
        KeyGroupMember {
            reference,
            master_key,
        }
    }
}

/// Wrap `share` under every master key in the group, concurrently.
///
/// Succeeds as long as at least one master key wraps successfully, and
/// returns an updated [`MasterKeyRef`] (fresh `wrapped_data_key` and
/// `created_at`) for each that did. Per-key failures are logged and
/// otherwise discarded — callers that need to know which backends failed
/// should consult the returned count against `members.len()`.
pub async fn wrap_group(
    share: &DataKey,
    members: &[KeyGroupMember],
) -> Result<Vec<MasterKeyRef>, ShamirError> {
    if members.is_empty() {
        return Err(ShamirError::EmptyKeyGroup);
    }

    let share_bytes = share.with_bytes(|b| *b);
    let tasks = members.iter().map(|member| {
        let master_key = member.master_key.clone();
        let reference = member.reference.clone();
        tokio::spawn(async move {
            let outcome = master_key.encrypt(&DataKey::from_bytes(share_bytes)).await;
            (reference, outcome)
        })
    });

    let joined = join_all(tasks).await;
    let mut succeeded = Vec::with_capacity(members.len());
    let mut failure_messages = Vec::new();

    for result in joined {
        match result {
            Ok((reference, Ok(wrapped_data_key))) => {
                tracing::debug!(
                    backend = reference.kind.as_tag(),
                    identifier = %reference.identifier,
                    "wrapped data key share"
                );
                succeeded.push(MasterKeyRef {
                    wrapped_data_key,
                    created_at: OffsetDateTime::now_utc(),
                    ..reference
                });
            }
            Ok((reference, Err(e))) => {
                tracing::warn!(
                    backend = reference.kind.as_tag(),
                    identifier = %reference.identifier,
                    error = %e,
                    "master key failed to wrap share"
                );
                failure_messages.push(format!(
                    "{}/{}: {e}",
                    reference.kind.as_tag(),
                    reference.identifier
                ));
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "master key wrap task panicked");
                failure_messages.push(format!("task panic: {join_err}"));
            }
        }
    }

    if succeeded.is_empty() {
        return Err(ShamirError::GroupWrapFailed(failure_messages.join("; ")));
    }
    Ok(succeeded)
}

/// Unwrap this group's share by trying each master key in order, stopping
/// at the first success.
pub async fn unwrap_group(master_keys: &[Arc<dyn MasterKey>]) -> Result<DataKey, MasterKeyError> {
    let mut last_err = MasterKeyError::NotFound("key group has no master keys".into());
    for mk in master_keys {
        match mk.decrypt().await {
            Ok(data_key) => {
                tracing::debug!(backend = mk.type_identifier(), "unwrapped data key share");
                return Ok(data_key);
            }
            Err(e) => {
                tracing::debug!(backend = mk.type_identifier(), error = %e, "master key could not unwrap share");
                last_err = e;
            }
        }
    }
    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sops_types::MasterKeyKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct AlwaysFails;
    #[async_trait]
    impl MasterKey for AlwaysFails {
        async fn encrypt(&self, _data_key: &DataKey) -> Result<String, MasterKeyError> {
            Err(MasterKeyError::BackendUnavailable("down".into()))
        }
        async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
            Err(MasterKeyError::BackendUnavailable("down".into()))
        }
        fn needs_rotation(&self) -> bool {
            false
        }
        fn type_identifier(&self) -> &'static str {
            "always-fails"
        }
        fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
            serde_json::Map::new()
        }
    }

    struct RecordingKey {
        wrapped: Mutex<Option<[u8; sops_types::DATA_KEY_LEN]>>,
        decrypt_attempted: AtomicBool,
        name: &'static str,
    }
    #[async_trait]
    impl MasterKey for RecordingKey {
        async fn encrypt(&self, data_key: &DataKey) -> Result<String, MasterKeyError> {
            *self.wrapped.lock().unwrap() = Some(data_key.with_bytes(|b| *b));
            Ok(format!("ENC[{},data:,iv:,tag:,type:bytes]", self.name))
        }
        async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
            self.decrypt_attempted.store(true, Ordering::SeqCst);
            match *self.wrapped.lock().unwrap() {
                Some(bytes) => Ok(DataKey::from_bytes(bytes)),
                None => Err(MasterKeyError::NotFound("nothing wrapped".into())),
            }
        }
        fn needs_rotation(&self) -> bool {
            false
        }
        fn type_identifier(&self) -> &'static str {
            self.name
        }
        fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
            serde_json::Map::new()
        }
    }

    fn reference(identifier: &str) -> MasterKeyRef {
        MasterKeyRef::new(
            MasterKeyKind::Age,
            identifier,
            "",
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
        )
    }

    #[tokio::test]
    async fn wrap_group_succeeds_if_any_master_key_succeeds() {
        let good = Arc::new(RecordingKey {
            wrapped: Mutex::new(None),
            decrypt_attempted: AtomicBool::new(false),
            name: "good",
        });
        let members = vec![
            KeyGroupMember::new(reference("bad"), Arc::new(AlwaysFails)),
            KeyGroupMember::new(reference("good"), good.clone()),
        ];
        let key = DataKey::generate();
        let wrapped = wrap_group(&key, &members).await.unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].identifier, "good");
        assert!(!wrapped[0].wrapped_data_key.is_empty());
    }

    #[tokio::test]
    async fn wrap_group_fails_if_every_master_key_fails() {
        let members = vec![
            KeyGroupMember::new(reference("a"), Arc::new(AlwaysFails)),
            KeyGroupMember::new(reference("b"), Arc::new(AlwaysFails)),
        ];
        let key = DataKey::generate();
        assert!(wrap_group(&key, &members).await.is_err());
    }

    #[tokio::test]
    async fn wrap_group_rejects_empty_group() {
        let members: Vec<KeyGroupMember> = vec![];
        let key = DataKey::generate();
        assert!(matches!(
            wrap_group(&key, &members).await,
            Err(ShamirError::EmptyKeyGroup)
        ));
    }

    #[tokio::test]
    async fn unwrap_group_stops_at_first_success() {
        let first = Arc::new(RecordingKey {
            wrapped: Mutex::new(Some([9u8; sops_types::DATA_KEY_LEN])),
            decrypt_attempted: AtomicBool::new(false),
            name: "first",
        });
        let second = Arc::new(RecordingKey {
            wrapped: Mutex::new(Some([9u8; sops_types::DATA_KEY_LEN])),
            decrypt_attempted: AtomicBool::new(false),
            name: "second",
        });
        let keys: Vec<Arc<dyn MasterKey>> = vec![first.clone(), second.clone()];
        let recovered = unwrap_group(&keys).await.unwrap();
        assert_eq!(recovered.with_bytes(|b| *b), [9u8; sops_types::DATA_KEY_LEN]);
        assert!(first.decrypt_attempted.load(Ordering::SeqCst));
        assert!(!second.decrypt_attempted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unwrap_group_falls_through_to_later_keys() {
        let keys: Vec<Arc<dyn MasterKey>> = vec![
            Arc::new(AlwaysFails),
            Arc::new(RecordingKey {
                wrapped: Mutex::new(Some([3u8; sops_types::DATA_KEY_LEN])),
                decrypt_attempted: AtomicBool::new(false),
                name: "fallback",
            }),
        ];
        let recovered = unwrap_group(&keys).await.unwrap();
        assert_eq!(recovered.with_bytes(|b| *b), [3u8; sops_types::DATA_KEY_LEN]);
    }

    #[tokio::test]
    async fn unwrap_group_fails_when_all_fail() {
        let keys: Vec<Arc<dyn MasterKey>> = vec![Arc::new(AlwaysFails), Arc::new(AlwaysFails)];
        assert!(unwrap_group(&keys).await.is_err());
    }
}

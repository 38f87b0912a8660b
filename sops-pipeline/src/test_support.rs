//! A minimal in-memory [`MasterKey`] stand-in for exercising the pipeline
//! without pulling in a real backend crate. Not for production use —
//! ships behind `test-utils` so the workspace's own integration tests can
//! build key groups without depending on every concrete backend.

use async_trait::async_trait;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::{DataKey, DATA_KEY_LEN};
use std::sync::Mutex;

/// Wraps and unwraps in memory, optionally forced to fail every call —
/// good enough to exercise group fan-out/fallback without a real backend.
pub struct StubMasterKey {
    wrapped: Mutex<Option<[u8; DATA_KEY_LEN]>>,
    fail: bool,
}

impl StubMasterKey {
    pub fn new() -> Self {
        StubMasterKey {
            wrapped: Mutex::new(None),
            fail: false,
        }
    }

    pub fn always_fails() -> Self {
        StubMasterKey {
            wrapped: Mutex::new(None),
            fail: true,
        }
    }
}

impl Default for StubMasterKey {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MasterKey for StubMasterKey {
    async fn encrypt(&self, data_key: &DataKey) -> Result<String, MasterKeyError> {
        if self.fail {
            return Err(MasterKeyError::BackendUnavailable(
                "stub configured to fail".into(),
            ));
        }
        *self.wrapped.lock().unwrap() = Some(data_key.with_bytes(|b| *b));
        Ok("ENC[stub,data:,iv:,tag:,type:bytes]".to_string())
    }

    async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
        if self.fail {
            return Err(MasterKeyError::BackendUnavailable(
                "stub configured to fail".into(),
            ));
        }
        match *self.wrapped.lock().unwrap() {
            Some(bytes) => Ok(DataKey::from_bytes(bytes)),
            None => Err(MasterKeyError::NotFound("nothing wrapped yet".into())),
        }
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        "stub"
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }
}

//! The out-of-process client: one connection, a monotonic request-id
//! counter, and a background task routing responses back to the caller
//! that sent the matching request.

use crate::error::KeyServiceError;
use crate::protocol::{
    DecryptDataKeyRequest, EncryptDataKeyRequest, GenerateDataKeyRequest, Request, Response,
};
use crate::service::KeyService;
use crate::transport::codec::framed_codec;
use crate::transport::envelope::{RequestEnvelope, ResponseEnvelope};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::{SinkExt, StreamExt};
use sops_types::{DataKey, MasterKeyRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::UnixStream;
use tokio::sync::{oneshot, Mutex};
use tokio_util::codec::Framed;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Response>>>>;

/// A client connection to an out-of-process key service.
///
/// Per the protocol's at-most-once guarantee, a connection loss mid-request
/// surfaces as [`KeyServiceError::KeyServiceUnavailable`] rather than a
/// retry — callers that want retry semantics reconnect and reissue.
pub struct RemoteKeyServiceClient {
    next_id: AtomicU64,
    pending: PendingMap,
    writer: Mutex<futures::stream::SplitSink<Framed<UnixStream, tokio_util::codec::LengthDelimitedCodec>, bytes::Bytes>>,
}

impl RemoteKeyServiceClient {
    /// Connect to a Unix domain socket and spawn the background reader
    /// task that demultiplexes responses by id.
    pub async fn connect(path: impl AsRef<std::path::Path>) -> Result<Self, KeyServiceError> {
        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| KeyServiceError::KeyServiceUnavailable(e.to_string()))?;
        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: UnixStream) -> Self {
        let framed = Framed::new(stream, framed_codec());
        let (writer, mut reader) = framed.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let reader_pending = pending.clone();
        tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                let frame = match frame {
                    Ok(f) => f,
                    Err(e) => {
                        tracing::warn!(error = %e, "key service client: connection read error");
                        break;
                    }
                };
                let envelope: ResponseEnvelope = match serde_json::from_slice(&frame) {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "key service client: malformed response envelope");
                        continue;
                    }
                };
                if let Some(tx) = reader_pending.lock().await.remove(&envelope.id) {
                    let _ = tx.send(envelope.response);
                }
            }
            // Connection closed: wake any still-pending callers with an error
            // by dropping their senders, which turns their `recv()` into
            // `RecvError` — mapped to `KeyServiceUnavailable` by the caller.
            reader_pending.lock().await.clear();
        });

        RemoteKeyServiceClient {
            next_id: AtomicU64::new(0),
            pending,
            writer: Mutex::new(writer),
        }
    }

    async fn call(&self, request: Request) -> Result<Response, KeyServiceError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let envelope = RequestEnvelope { id, request };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| KeyServiceError::Other(Box::new(e)))?;
        if let Err(e) = self.writer.lock().await.send(bytes.into()).await {
            self.pending.lock().await.remove(&id);
            return Err(KeyServiceError::KeyServiceUnavailable(e.to_string()));
        }

        rx.await
            .map_err(|_| KeyServiceError::KeyServiceUnavailable("connection closed mid-request".into()))
    }
}

#[async_trait]
impl KeyService for RemoteKeyServiceClient {
    async fn generate_data_key(
        &self,
        master_keys: &[MasterKeyRef],
    ) -> Result<(DataKey, Vec<MasterKeyRef>), KeyServiceError> {
        let response = self
            .call(Request::GenerateDataKey(GenerateDataKeyRequest {
                master_keys: master_keys.to_vec(),
            }))
            .await?;
        match response {
            Response::GenerateDataKey(r) => {
                let bytes = STANDARD
                    .decode(&r.data_key_b64)
                    .map_err(|e| KeyServiceError::Other(Box::new(e)))?;
                let data_key = DataKey::from_slice(&bytes)
                    .map_err(|e| KeyServiceError::Other(Box::new(e)))?;
                Ok((data_key, r.updated_keys))
            }
            Response::Error(msg) => Err(KeyServiceError::Rejected(msg)),
            _ => Err(KeyServiceError::Rejected("unexpected response op".into())),
        }
    }

    async fn encrypt_data_key(
        &self,
        master_key: &MasterKeyRef,
        plaintext: &DataKey,
    ) -> Result<String, KeyServiceError> {
        let response = self
            .call(Request::EncryptDataKey(EncryptDataKeyRequest {
                master_key: master_key.clone(),
                plaintext_b64: plaintext.with_bytes(|b| STANDARD.encode(b)),
            }))
            .await?;
        match response {
            Response::EncryptDataKey(r) => {
                let bytes = STANDARD
                    .decode(&r.ciphertext_b64)
                    .map_err(|e| KeyServiceError::Other(Box::new(e)))?;
                String::from_utf8(bytes).map_err(|e| KeyServiceError::Other(Box::new(e)))
            }
            Response::Error(msg) => Err(KeyServiceError::Rejected(msg)),
            _ => Err(KeyServiceError::Rejected("unexpected response op".into())),
        }
    }

    async fn decrypt_data_key(
        &self,
        master_key: &MasterKeyRef,
        ciphertext: &str,
    ) -> Result<DataKey, KeyServiceError> {
        let response = self
            .call(Request::DecryptDataKey(DecryptDataKeyRequest {
                master_key: master_key.clone(),
                ciphertext_b64: STANDARD.encode(ciphertext.as_bytes()),
            }))
            .await?;
        match response {
            Response::DecryptDataKey(r) => {
                let bytes = STANDARD
                    .decode(&r.plaintext_b64)
                    .map_err(|e| KeyServiceError::Other(Box::new(e)))?;
                DataKey::from_slice(&bytes).map_err(|e| KeyServiceError::Other(Box::new(e)))
            }
            Response::Error(msg) => Err(KeyServiceError::Rejected(msg)),
            _ => Err(KeyServiceError::Rejected("unexpected response op".into())),
        }
    }
}

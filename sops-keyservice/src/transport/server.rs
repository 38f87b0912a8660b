//! Serve one accepted connection: `RECV_REQUEST → DISPATCH →
//! {CALL_BACKEND | REJECT} → SEND_RESPONSE`, pipelined — a request
//! doesn't block the next frame from being read, and responses are
//! written back tagged with the request's id as each dispatch finishes.

use crate::protocol::{
    DecryptDataKeyResponse, EncryptDataKeyResponse, Request, Response,
};
use crate::service::{to_generate_response, KeyService};
use crate::transport::codec::framed_codec;
use crate::transport::envelope::{RequestEnvelope, ResponseEnvelope};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::{SinkExt, StreamExt};
use sops_types::DataKey;
use std::sync::Arc;
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tokio_util::codec::Framed;

async fn dispatch(key_service: &dyn KeyService, request: Request) -> Response {
    match request {
        Request::GenerateDataKey(req) => {
            match key_service.generate_data_key(&req.master_keys).await {
                Ok((data_key, updated)) => {
                    Response::GenerateDataKey(to_generate_response(&data_key, updated))
                }
                Err(e) => Response::Error(e.to_string()),
            }
        }
        Request::EncryptDataKey(req) => {
            let plaintext = match STANDARD
                .decode(&req.plaintext_b64)
                .ok()
                .and_then(|b| DataKey::from_slice(&b).ok())
            {
                Some(key) => key,
                None => return Response::Error("malformed plaintext_b64".into()),
            };
            match key_service.encrypt_data_key(&req.master_key, &plaintext).await {
                Ok(ciphertext) => Response::EncryptDataKey(EncryptDataKeyResponse {
                    ciphertext_b64: STANDARD.encode(ciphertext),
                }),
                Err(e) => Response::Error(e.to_string()),
            }
        }
        Request::DecryptDataKey(req) => {
            let ciphertext = match STANDARD.decode(&req.ciphertext_b64) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(s) => s,
                    Err(_) => return Response::Error("malformed ciphertext_b64".into()),
                },
                Err(_) => return Response::Error("malformed ciphertext_b64".into()),
            };
            match key_service.decrypt_data_key(&req.master_key, &ciphertext).await {
                Ok(data_key) => Response::DecryptDataKey(DecryptDataKeyResponse {
                    plaintext_b64: data_key.with_bytes(|b| STANDARD.encode(b)),
                }),
                Err(e) => Response::Error(e.to_string()),
            }
        }
    }
}

/// Drive one accepted connection to completion (until the client closes
/// it or a frame fails to decode).
pub async fn serve_connection(stream: UnixStream, key_service: Arc<dyn KeyService>) {
    let framed = Framed::new(stream, framed_codec());
    let (writer, mut reader) = framed.split();
    let writer = Arc::new(Mutex::new(writer));

    while let Some(frame) = reader.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(error = %e, "key service connection: frame decode error");
                break;
            }
        };
        let envelope: RequestEnvelope = match serde_json::from_slice(&frame) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "key service connection: malformed request envelope");
                continue;
            }
        };

        let key_service = key_service.clone();
        let writer = writer.clone();
        tokio::spawn(async move {
            let response = dispatch(key_service.as_ref(), envelope.request).await;
            let out = ResponseEnvelope {
                id: envelope.id,
                response,
            };
            match serde_json::to_vec(&out) {
                Ok(bytes) => {
                    if let Err(e) = writer.lock().await.send(bytes.into()).await {
                        tracing::warn!(error = %e, "key service connection: failed to write response frame");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "key service connection: failed to encode response"),
            }
        });
    }
}

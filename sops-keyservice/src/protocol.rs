//! The three Key Service Protocol operations, as a transport-agnostic
//! request/response model.
//!
//! This module defines the payload shapes; [`crate::KeyService`] is the
//! trait both transports implement against, and
//! [`crate::transport::envelope`] wraps these in a request-id-correlated
//! envelope for the framed transport.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sops_types::MasterKeyRef;

/// The stable wire method identifiers. These integers, not the Rust variant
/// names, are what actually crosses the wire in a [`Request`]'s `op` field.
pub const METHOD_GENERATE_DATA_KEY: u8 = 0;
pub const METHOD_ENCRYPT_DATA_KEY: u8 = 1;
pub const METHOD_DECRYPT_DATA_KEY: u8 = 2;
/// Not one of the three request methods; used only to tag an error
/// [`Response`], which no method id otherwise identifies.
const METHOD_ERROR: u8 = 255;

/// `{"op": <u8>, "data": <payload>}` — the actual shape every [`Request`]
/// and [`Response`] takes on the wire, with `op` one of the stable method
/// integers rather than a string variant name.
#[derive(Serialize, Deserialize)]
struct Wire<T> {
    op: u8,
    data: T,
}

/// `GenerateDataKey` request: mint a fresh data key and wrap it under
/// every listed master key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDataKeyRequest {
    pub master_keys: Vec<MasterKeyRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDataKeyResponse {
    /// Base64 of the freshly generated 32-byte data key. Only ever
    /// present in an in-process, same-trust-boundary response; callers
    /// crossing a real trust boundary should prefer individual
    /// `EncryptDataKey` calls over transporting raw key material.
    pub data_key_b64: String,
    pub updated_keys: Vec<MasterKeyRef>,
}

/// `EncryptDataKey` (wire name for [`crate::KeyService::encrypt_data_key`],
/// internally called `wrap`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptDataKeyRequest {
    pub master_key: MasterKeyRef,
    pub plaintext_b64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptDataKeyResponse {
    pub ciphertext_b64: String,
}

/// `DecryptDataKey` (wire name for [`crate::KeyService::decrypt_data_key`],
/// internally called `unwrap`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptDataKeyRequest {
    pub master_key: MasterKeyRef,
    pub ciphertext_b64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptDataKeyResponse {
    pub plaintext_b64: String,
}

/// The request variants a server dispatches on. Carries the three stable
/// method identifiers (`0=GenerateDataKey, 1=EncryptDataKey,
/// 2=DecryptDataKey`) as the literal `op` integer on the wire — see
/// [`Request::method_id`].
#[derive(Debug, Clone)]
pub enum Request {
    GenerateDataKey(GenerateDataKeyRequest),
    EncryptDataKey(EncryptDataKeyRequest),
    DecryptDataKey(DecryptDataKeyRequest),
}

impl Request {
    pub fn method_id(&self) -> u8 {
        match self {
            Request::GenerateDataKey(_) => METHOD_GENERATE_DATA_KEY,
            Request::EncryptDataKey(_) => METHOD_ENCRYPT_DATA_KEY,
            Request::DecryptDataKey(_) => METHOD_DECRYPT_DATA_KEY,
        }
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let op = self.method_id();
        match self {
            Request::GenerateDataKey(data) => Wire { op, data }.serialize(serializer),
            Request::EncryptDataKey(data) => Wire { op, data }.serialize(serializer),
            Request::DecryptDataKey(data) => Wire { op, data }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Wire::<serde_json::Value>::deserialize(deserializer)?;
        match wire.op {
            METHOD_GENERATE_DATA_KEY => Ok(Request::GenerateDataKey(
                serde_json::from_value(wire.data).map_err(D::Error::custom)?,
            )),
            METHOD_ENCRYPT_DATA_KEY => Ok(Request::EncryptDataKey(
                serde_json::from_value(wire.data).map_err(D::Error::custom)?,
            )),
            METHOD_DECRYPT_DATA_KEY => Ok(Request::DecryptDataKey(
                serde_json::from_value(wire.data).map_err(D::Error::custom)?,
            )),
            other => Err(D::Error::custom(format!("unknown method id {other}"))),
        }
    }
}

/// The response variants a client decodes. Mirrors [`Request`]'s `op`
/// integer so a response frame can be read without a schema keyed by
/// string names; `Error` carries no request method and is tagged with
/// a sentinel id outside the stable 0/1/2 range.
#[derive(Debug, Clone)]
pub enum Response {
    GenerateDataKey(GenerateDataKeyResponse),
    EncryptDataKey(EncryptDataKeyResponse),
    DecryptDataKey(DecryptDataKeyResponse),
    Error(String),
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Response::GenerateDataKey(data) => Wire {
                op: METHOD_GENERATE_DATA_KEY,
                data,
            }
            .serialize(serializer),
            Response::EncryptDataKey(data) => Wire {
                op: METHOD_ENCRYPT_DATA_KEY,
                data,
            }
            .serialize(serializer),
            Response::DecryptDataKey(data) => Wire {
                op: METHOD_DECRYPT_DATA_KEY,
                data,
            }
            .serialize(serializer),
            Response::Error(message) => Wire {
                op: METHOD_ERROR,
                data: message,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Wire::<serde_json::Value>::deserialize(deserializer)?;
        match wire.op {
            METHOD_GENERATE_DATA_KEY => Ok(Response::GenerateDataKey(
                serde_json::from_value(wire.data).map_err(D::Error::custom)?,
            )),
            METHOD_ENCRYPT_DATA_KEY => Ok(Response::EncryptDataKey(
                serde_json::from_value(wire.data).map_err(D::Error::custom)?,
            )),
            METHOD_DECRYPT_DATA_KEY => Ok(Response::DecryptDataKey(
                serde_json::from_value(wire.data).map_err(D::Error::custom)?,
            )),
            METHOD_ERROR => Ok(Response::Error(
                serde_json::from_value(wire.data).map_err(D::Error::custom)?,
            )),
            other => Err(D::Error::custom(format!("unknown method id {other}"))),
        }
    }
}

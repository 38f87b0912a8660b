//! The Key Service Protocol: `GenerateDataKey`, `EncryptDataKey` (wrap),
//! and `DecryptDataKey` (unwrap), over an in-process trait call or a
//! framed out-of-process connection.
//!
//! [`KeyService`] is the transport-agnostic contract. [`LocalKeyService`]
//! is the in-process transport, dispatching directly through a
//! [`MasterKeyResolver`]. With the `unix-transport` feature,
//! [`transport::RemoteKeyServiceClient`] and [`transport::serve_connection`]
//! provide the out-of-process transport over a Unix domain socket.

mod adapter;
mod cache;
mod error;
mod protocol;
mod service;
pub mod transport;

pub use adapter::RemoteMasterKey;
pub use cache::{CacheKey, PlaintextCache};
pub use error::KeyServiceError;
pub use protocol::{
    DecryptDataKeyRequest, DecryptDataKeyResponse, EncryptDataKeyRequest, EncryptDataKeyResponse,
    GenerateDataKeyRequest, GenerateDataKeyResponse, Request, Response,
};
pub use service::{to_generate_response, KeyService, LocalKeyService, MasterKeyResolver};

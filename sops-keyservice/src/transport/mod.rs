//! Out-of-process transport: request/response envelopes over a
//! length-delimited, little-endian-u32-framed connection.

mod envelope;

pub use envelope::{RequestEnvelope, ResponseEnvelope};

#[cfg(feature = "unix-transport")]
mod codec;
#[cfg(feature = "unix-transport")]
pub use codec::framed_codec;

#[cfg(feature = "unix-transport")]
mod client;
#[cfg(feature = "unix-transport")]
pub use client::RemoteKeyServiceClient;

#[cfg(feature = "unix-transport")]
mod server;
#[cfg(feature = "unix-transport")]
pub use server::serve_connection;

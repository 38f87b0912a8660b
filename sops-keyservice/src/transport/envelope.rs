//! Request/response correlation for the framed transport.
//!
//! Length-delimited framing alone tells a reader where one frame ends and
//! the next begins; it says nothing about which response answers which
//! request once a connection is pipelined (multiple requests in flight
//! before their responses arrive). Every envelope carries an `id` the
//! client assigns and the server echoes back, so the client's reader task
//! can route an out-of-order response to the right waiting caller.

use crate::protocol::{Request, Response};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: u64,
    pub request: Request,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub response: Response,
}

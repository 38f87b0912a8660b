//! Scalar leaf values and their canonical byte encoding.
//!
//! [`Value::encode_canonical`] and [`Value::decode_canonical`] are the single
//! source of truth for turning a scalar into (and back out of) the bytes that
//! get AEAD-encrypted or folded into the integrity MAC. The leaf cipher and
//! the MAC fingerprint both call through here so the two can never disagree
//! about what a given value looks like on the wire.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The type tag embedded in an `ENC[...]` token (`type:<tag>`).
///
/// These strings are part of the on-disk compatibility contract — do not
/// rename existing variants.
pub const TAG_STR: &str = "str";
pub const TAG_INT: &str = "int";
pub const TAG_FLOAT: &str = "float";
pub const TAG_BOOL: &str = "bool";
pub const TAG_BYTES: &str = "bytes";
pub const TAG_COMMENT: &str = "comment";
pub const TAG_TIME: &str = "time";

/// A scalar leaf value.
///
/// `Null` is the sentinel for an absent/null value and is never a candidate
/// for encryption (see [`Value::is_encryptable`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Timestamp(OffsetDateTime),
    /// Text of a standalone or trailing comment. Only ever produced for
    /// [`crate::tree::Item::Comment`] items or a leaf's `trailing_comment`
    /// when the comment-trigger policy mode encrypts the comment itself.
    Comment(String),
}

/// Errors decoding a canonical byte representation back into a [`Value`].
#[derive(Debug, thiserror::Error)]
pub enum ValueDecodeError {
    #[error("unknown type tag: {0}")]
    UnknownTag(String),
    #[error("malformed {tag} payload: {reason}")]
    Malformed { tag: &'static str, reason: String },
}

impl Value {
    /// Whether this value is a candidate for encryption at all.
    ///
    /// `Null` is never encrypted regardless of policy — there is no
    /// information to protect and round-tripping a ciphertext token for
    /// `null` would only add noise.
    pub fn is_encryptable(&self) -> bool {
        !matches!(self, Value::Null)
    }

    /// Encode this value into its canonical (tag, bytes) form.
    pub fn encode_canonical(&self) -> (&'static str, Vec<u8>) {
        match self {
            Value::Null => (TAG_STR, Vec::new()),
            Value::Str(s) => (TAG_STR, s.as_bytes().to_vec()),
            Value::Int(i) => (TAG_INT, i.to_string().into_bytes()),
            Value::Float(f) => (TAG_FLOAT, format_shortest_float(*f).into_bytes()),
            Value::Bool(b) => (
                TAG_BOOL,
                if *b { b"True".to_vec() } else { b"False".to_vec() },
            ),
            Value::Bytes(b) => (TAG_BYTES, b.clone()),
            Value::Comment(c) => (TAG_COMMENT, c.as_bytes().to_vec()),
            Value::Timestamp(t) => {
                let formatted = t
                    .to_offset(time::UtcOffset::UTC)
                    .format(&time::format_description::well_known::Rfc3339)
                    .unwrap_or_default();
                (TAG_TIME, formatted.into_bytes())
            }
        }
    }

    /// Reconstruct a typed value from a canonical (tag, bytes) pair.
    pub fn decode_canonical(tag: &str, bytes: &[u8]) -> Result<Value, ValueDecodeError> {
        match tag {
            TAG_STR => Ok(Value::Str(
                String::from_utf8(bytes.to_vec()).map_err(|e| ValueDecodeError::Malformed {
                    tag: "str",
                    reason: e.to_string(),
                })?,
            )),
            TAG_INT => {
                let s = std::str::from_utf8(bytes).map_err(|e| ValueDecodeError::Malformed {
                    tag: "int",
                    reason: e.to_string(),
                })?;
                let i = s.parse::<i64>().map_err(|e| ValueDecodeError::Malformed {
                    tag: "int",
                    reason: e.to_string(),
                })?;
                Ok(Value::Int(i))
            }
            TAG_FLOAT => {
                let s = std::str::from_utf8(bytes).map_err(|e| ValueDecodeError::Malformed {
                    tag: "float",
                    reason: e.to_string(),
                })?;
                let f = s.parse::<f64>().map_err(|e| ValueDecodeError::Malformed {
                    tag: "float",
                    reason: e.to_string(),
                })?;
                Ok(Value::Float(f))
            }
            TAG_BOOL => match bytes {
                b"True" => Ok(Value::Bool(true)),
                b"False" => Ok(Value::Bool(false)),
                _ => Err(ValueDecodeError::Malformed {
                    tag: "bool",
                    reason: "expected literal True or False".into(),
                }),
            },
            TAG_BYTES => Ok(Value::Bytes(bytes.to_vec())),
            TAG_COMMENT => Ok(Value::Comment(
                String::from_utf8(bytes.to_vec()).map_err(|e| ValueDecodeError::Malformed {
                    tag: "comment",
                    reason: e.to_string(),
                })?,
            )),
            TAG_TIME => {
                let s = std::str::from_utf8(bytes).map_err(|e| ValueDecodeError::Malformed {
                    tag: "time",
                    reason: e.to_string(),
                })?;
                let t = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
                    .map_err(|e| ValueDecodeError::Malformed {
                        tag: "time",
                        reason: e.to_string(),
                    })?;
                Ok(Value::Timestamp(t))
            }
            other => Err(ValueDecodeError::UnknownTag(other.to_string())),
        }
    }
}

/// Shortest round-trip decimal representation of a float.
///
/// Rust's `{}` formatter for `f64` already produces the shortest string that
/// round-trips (Grisu/Ryu under the hood), so this is a thin named wrapper
/// rather than a hand-rolled formatter.
fn format_shortest_float(f: f64) -> String {
    if f == f.trunc() && f.is_finite() && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

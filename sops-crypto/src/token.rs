//! The `ENC[...]` ciphertext token grammar.
//!
//! `ENC[<cipher>,data:<b64>,iv:<b64>,tag:<b64>,type:<tag>]`
//!
//! Parsed with a hand-rolled, allocation-light scanner rather than a
//! general regex engine, so a malformed or adversarial token can never
//! panic or blow up parse time. [`looks_like_token`] keeps a compiled
//! `Regex` around only as a cheap "is this worth trying to parse" filter
//! during tree walking — the real parse always goes through [`parse_token`].

use crate::error::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_PREFILTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ENC\[[A-Za-z0-9_]+,data:").expect("static regex is valid"));

/// Cheap pre-filter: `true` if `s` looks enough like an `ENC[...]` token to
/// be worth a full parse. Never false-negatives a real token; may
/// false-positive on crafted plaintext, which is harmless since
/// [`parse_token`] will then just reject it properly.
pub fn looks_like_token(s: &str) -> bool {
    TOKEN_PREFILTER.is_match(s)
}

/// A parsed `ENC[...]` token, still base64-decoded but otherwise inert.
pub struct ParsedToken {
    pub cipher: String,
    pub data: Vec<u8>,
    pub iv: Vec<u8>,
    pub tag: Vec<u8>,
    pub type_tag: String,
}

/// Render the token for a completed AEAD encryption.
pub fn format_token(cipher: &str, data: &[u8], iv: &[u8], tag: &[u8], type_tag: &str) -> String {
    format!(
        "ENC[{cipher},data:{},iv:{},tag:{},type:{type_tag}]",
        STANDARD.encode(data),
        STANDARD.encode(iv),
        STANDARD.encode(tag),
    )
}

/// Parse a token string into its fields, base64-decoding `data`/`iv`/`tag`.
///
/// This never panics on attacker-controlled input: every failure path
/// returns [`CryptoError::MalformedCiphertext`].
pub fn parse_token(s: &str) -> Result<ParsedToken, CryptoError> {
    let inner = s
        .strip_prefix("ENC[")
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| CryptoError::MalformedCiphertext("missing ENC[...] wrapper".into()))?;

    let mut parts = inner.splitn(2, ',');
    let cipher = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CryptoError::MalformedCiphertext("missing cipher identifier".into()))?
        .to_string();
    let rest = parts
        .next()
        .ok_or_else(|| CryptoError::MalformedCiphertext("missing fields".into()))?;

    let mut data = None;
    let mut iv = None;
    let mut tag = None;
    let mut type_tag = None;

    for field in rest.split(',') {
        let (name, value) = field
            .split_once(':')
            .ok_or_else(|| CryptoError::MalformedCiphertext(format!("malformed field: {field}")))?;
        match name {
            "data" => data = Some(decode_b64(value)?),
            "iv" => iv = Some(decode_b64(value)?),
            "tag" => tag = Some(decode_b64(value)?),
            "type" => type_tag = Some(value.to_string()),
            other => {
                return Err(CryptoError::MalformedCiphertext(format!(
                    "unknown field: {other}"
                )))
            }
        }
    }

    Ok(ParsedToken {
        cipher,
        data: data.ok_or_else(|| CryptoError::MalformedCiphertext("missing data field".into()))?,
        iv: iv.ok_or_else(|| CryptoError::MalformedCiphertext("missing iv field".into()))?,
        tag: tag.ok_or_else(|| CryptoError::MalformedCiphertext("missing tag field".into()))?,
        type_tag: type_tag
            .ok_or_else(|| CryptoError::MalformedCiphertext("missing type field".into()))?,
    })
}

fn decode_b64(s: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(s)
        .map_err(|e| CryptoError::MalformedCiphertext(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_all_fields() {
        let token = format_token("AES256_GCM", b"ciphertext", b"nonce12bytes", b"tag1234567890ab", "str");
        assert!(looks_like_token(&token));
        let parsed = parse_token(&token).unwrap();
        assert_eq!(parsed.cipher, "AES256_GCM");
        assert_eq!(parsed.data, b"ciphertext");
        assert_eq!(parsed.iv, b"nonce12bytes");
        assert_eq!(parsed.type_tag, "str");
    }

    #[test]
    fn rejects_missing_wrapper() {
        assert!(parse_token("not a token").is_err());
    }

    #[test]
    fn rejects_unknown_field() {
        let bogus = "ENC[AES256_GCM,data:YQ==,iv:YQ==,tag:YQ==,type:str,bogus:x]";
        assert!(parse_token(bogus).is_err());
    }

    #[test]
    fn rejects_bad_base64() {
        let bogus = "ENC[AES256_GCM,data:not-base64!!,iv:YQ==,tag:YQ==,type:str]";
        assert!(parse_token(bogus).is_err());
    }

    #[test]
    fn prefilter_does_not_match_plain_strings() {
        assert!(!looks_like_token("just a normal string value"));
    }

    #[test]
    fn malformed_input_never_panics() {
        let inputs = [
            "ENC[",
            "ENC[]",
            "ENC[,data:,iv:,tag:,type:]",
            "ENC[AES256_GCM]",
            "",
        ];
        for input in inputs {
            let _ = parse_token(input);
        }
    }
}

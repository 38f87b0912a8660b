//! Bulk encryption modes and the resolved [`EncryptionPolicy`].

use crate::error::PolicyError;
use regex::Regex;
use std::collections::HashMap;

const DEFAULT_UNENCRYPTED_SUFFIX: &str = "_unencrypted";

/// Which bulk rule decides a leaf's encryption status absent an override.
pub enum BulkMode {
    UnencryptedSuffix(String),
    EncryptedSuffix(String),
    UnencryptedRegex(Regex),
    EncryptedRegex(Regex),
    UnencryptedCommentRegex(Regex),
    EncryptedCommentRegex(Regex),
}

impl BulkMode {
    /// `true` if `key`/`comment` should be encrypted under this rule.
    fn should_encrypt(&self, key: &str, comment: Option<&str>) -> bool {
        match self {
            BulkMode::UnencryptedSuffix(s) => !key.ends_with(s.as_str()),
            BulkMode::EncryptedSuffix(s) => key.ends_with(s.as_str()),
            BulkMode::UnencryptedRegex(r) => !r.is_match(key),
            BulkMode::EncryptedRegex(r) => r.is_match(key),
            BulkMode::UnencryptedCommentRegex(r) => !comment.is_some_and(|c| r.is_match(c)),
            BulkMode::EncryptedCommentRegex(r) => comment.is_some_and(|c| r.is_match(c)),
        }
    }
}

/// A resolved, already-validated policy. Construct via
/// [`PolicyConfig::build`] rather than directly.
pub struct EncryptionPolicy {
    pub(crate) mode: BulkMode,
    /// Fully-qualified path string (e.g. `db.password`) to forced
    /// encrypt/plaintext decision. Always wins over the bulk mode.
    pub(crate) overrides: HashMap<String, bool>,
    pub mac_only_encrypted: bool,
}

impl EncryptionPolicy {
    /// The default policy: `unencrypted-suffix = "_unencrypted"`, no
    /// overrides, `mac-only-encrypted = false`.
    pub fn default_policy() -> Self {
        EncryptionPolicy {
            mode: BulkMode::UnencryptedSuffix(DEFAULT_UNENCRYPTED_SUFFIX.to_string()),
            overrides: HashMap::new(),
            mac_only_encrypted: false,
        }
    }

    pub(crate) fn bulk_decide(&self, key: &str, comment: Option<&str>) -> bool {
        self.mode.should_encrypt(key, comment)
    }
}

/// Builder for [`EncryptionPolicy`] — the shape a resolved `.sops.yaml`
/// creation rule would already have been parsed into upstream of this
/// crate. At most one bulk-mode field may be set; [`PolicyConfig::build`]
/// rejects more than one with [`PolicyError::ConflictingModes`].
#[derive(Default)]
pub struct PolicyConfig {
    unencrypted_suffix: Option<String>,
    encrypted_suffix: Option<String>,
    unencrypted_regex: Option<String>,
    encrypted_regex: Option<String>,
    unencrypted_comment_regex: Option<String>,
    encrypted_comment_regex: Option<String>,
    mac_only_encrypted: bool,
    overrides: HashMap<String, bool>,
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unencrypted_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.unencrypted_suffix = Some(suffix.into());
        self
    }

    pub fn with_encrypted_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.encrypted_suffix = Some(suffix.into());
        self
    }

    pub fn with_unencrypted_regex(mut self, pattern: impl Into<String>) -> Self {
        self.unencrypted_regex = Some(pattern.into());
        self
    }

    pub fn with_encrypted_regex(mut self, pattern: impl Into<String>) -> Self {
        self.encrypted_regex = Some(pattern.into());
        self
    }

    pub fn with_unencrypted_comment_regex(mut self, pattern: impl Into<String>) -> Self {
        self.unencrypted_comment_regex = Some(pattern.into());
        self
    }

    pub fn with_encrypted_comment_regex(mut self, pattern: impl Into<String>) -> Self {
        self.encrypted_comment_regex = Some(pattern.into());
        self
    }

    pub fn with_mac_only_encrypted(mut self, value: bool) -> Self {
        self.mac_only_encrypted = value;
        self
    }

    /// Force the leaf at `path` (e.g. `"db.password"`) to always be
    /// encrypted (`true`) or always left plaintext (`false`), regardless
    /// of the bulk mode.
    pub fn with_override(mut self, path: impl Into<String>, encrypt: bool) -> Self {
        self.overrides.insert(path.into(), encrypt);
        self
    }

    /// Validate and compile this configuration into an [`EncryptionPolicy`].
    pub fn build(self) -> Result<EncryptionPolicy, PolicyError> {
        let mut set: Vec<(&'static str, BulkMode)> = Vec::new();
        if let Some(s) = self.unencrypted_suffix {
            set.push(("unencrypted-suffix", BulkMode::UnencryptedSuffix(s)));
        }
        if let Some(s) = self.encrypted_suffix {
            set.push(("encrypted-suffix", BulkMode::EncryptedSuffix(s)));
        }
        if let Some(p) = self.unencrypted_regex {
            let r = Regex::new(&p).map_err(|source| PolicyError::InvalidRegex {
                field: "unencrypted-regex",
                source,
            })?;
            set.push(("unencrypted-regex", BulkMode::UnencryptedRegex(r)));
        }
        if let Some(p) = self.encrypted_regex {
            let r = Regex::new(&p).map_err(|source| PolicyError::InvalidRegex {
                field: "encrypted-regex",
                source,
            })?;
            set.push(("encrypted-regex", BulkMode::EncryptedRegex(r)));
        }
        if let Some(p) = self.unencrypted_comment_regex {
            let r = Regex::new(&p).map_err(|source| PolicyError::InvalidRegex {
                field: "unencrypted-comment-regex",
                source,
            })?;
            set.push((
                "unencrypted-comment-regex",
                BulkMode::UnencryptedCommentRegex(r),
            ));
        }
        if let Some(p) = self.encrypted_comment_regex {
            let r = Regex::new(&p).map_err(|source| PolicyError::InvalidRegex {
                field: "encrypted-comment-regex",
                source,
            })?;
            set.push((
                "encrypted-comment-regex",
                BulkMode::EncryptedCommentRegex(r),
            ));
        }

        let mode = match set.len() {
            0 => BulkMode::UnencryptedSuffix(DEFAULT_UNENCRYPTED_SUFFIX.to_string()),
            1 => set.pop().unwrap().1,
            _ => {
                let names: Vec<&str> = set.iter().map(|(name, _)| *name).collect();
                return Err(PolicyError::ConflictingModes(names.join(", ")));
            }
        };

        Ok(EncryptionPolicy {
            mode,
            overrides: self.overrides,
            mac_only_encrypted: self.mac_only_encrypted,
        })
    }
}

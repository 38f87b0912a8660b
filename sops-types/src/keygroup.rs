//! Key groups: the unit Shamir secret sharing splits the data key across.

use crate::masterkey_ref::MasterKeyRef;
use serde::{Deserialize, Serialize};

/// An ordered set of master keys that together protect one share of the
/// data key.
///
/// With a single key group and threshold 1, this degrades to "classic"
/// sops behavior: every listed master key independently wraps the whole
/// data key, and any one of them can unwrap it. With multiple key groups
/// and threshold > 1, each group's first-success unwrap yields one Shamir
/// share, and `threshold` shares reconstruct the data key.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeyGroup {
    pub master_keys: Vec<MasterKeyRef>,
    /// This group's Shamir share x-coordinate (the `sharks` crate's
    /// `Share::x`). `None` for the implicit single group synthesized when
    /// `shamir-threshold` is unset or 0/1 — there every master key wraps
    /// the whole data key directly, with no splitting involved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_index: Option<u8>,
}

impl KeyGroup {
    pub fn new(master_keys: Vec<MasterKeyRef>) -> Self {
        KeyGroup {
            master_keys,
            share_index: None,
        }
    }

    pub fn with_share_index(mut self, index: u8) -> Self {
        self.share_index = Some(index);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.master_keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masterkey_ref::MasterKeyKind;
    use time::OffsetDateTime;

    #[test]
    fn empty_group_reports_empty() {
        assert!(KeyGroup::default().is_empty());
    }

    #[test]
    fn preserves_master_key_order() {
        let g = KeyGroup::new(vec![
            MasterKeyRef::new(MasterKeyKind::Age, "a", "x", OffsetDateTime::from_unix_timestamp(0).unwrap()),
            MasterKeyRef::new(MasterKeyKind::Pgp, "b", "y", OffsetDateTime::from_unix_timestamp(0).unwrap()),
        ]);
        assert_eq!(g.master_keys[0].identifier, "a");
        assert_eq!(g.master_keys[1].identifier, "b");
    }
}

//! Per-branch policy propagation, so the pipeline doesn't re-test ancestor
//! overrides for every leaf.

use crate::policy::EncryptionPolicy;
use sops_types::Path;

/// Whether a leaf should be encrypted, and why.
///
/// Distinguishing `Bulk` from `Override` lets callers (and tests) assert on
/// *why* a leaf ended up encrypted or not, not just the boolean outcome —
/// useful when the bulk rule and an override would have disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Bulk(bool),
    Override(bool),
}

impl PolicyDecision {
    pub fn should_encrypt(&self) -> bool {
        match self {
            PolicyDecision::Bulk(b) | PolicyDecision::Override(b) => *b,
        }
    }
}

/// A policy view scoped to one branch of the tree.
///
/// Once an ancestor branch matches a path-level override, that decision is
/// carried in `forced` and every descendant leaf inherits it without
/// re-testing the bulk suffix/regex rule.
pub struct PolicyScope<'a> {
    policy: &'a EncryptionPolicy,
    prefix: Path,
    forced: Option<bool>,
}

impl<'a> PolicyScope<'a> {
    pub fn root(policy: &'a EncryptionPolicy) -> Self {
        let forced = policy.overrides.get("").copied();
        PolicyScope {
            policy,
            prefix: Path::root(),
            forced,
        }
    }

    /// Descend into the child branch named `branch_key`, picking up any
    /// override declared at that path and carrying forward any override
    /// already forced by an ancestor.
    pub fn descend(&self, branch_key: &str) -> PolicyScope<'a> {
        let prefix = self.prefix.push_key(branch_key);
        let forced = self
            .forced
            .or_else(|| self.policy.overrides.get(&prefix.to_string()).copied());
        PolicyScope {
            policy: self.policy,
            prefix,
            forced,
        }
    }

    /// Descend into the `index`th element of an array branch.
    pub fn descend_index(&self, index: usize) -> PolicyScope<'a> {
        let prefix = self.prefix.push_index(index);
        let forced = self
            .forced
            .or_else(|| self.policy.overrides.get(&prefix.to_string()).copied());
        PolicyScope {
            policy: self.policy,
            prefix,
            forced,
        }
    }

    /// Decide whether the leaf named `leaf_key` (a direct child of this
    /// scope) with the given trailing comment should be encrypted.
    pub fn decide(&self, leaf_key: &str, comment: Option<&str>) -> PolicyDecision {
        if let Some(encrypt) = self.forced {
            return PolicyDecision::Override(encrypt);
        }
        let full_path = self.prefix.push_key(leaf_key);
        if let Some(encrypt) = self.policy.overrides.get(&full_path.to_string()) {
            return PolicyDecision::Override(*encrypt);
        }
        PolicyDecision::Bulk(self.policy.bulk_decide(leaf_key, comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyConfig;

    #[test]
    fn bulk_rule_applies_with_no_overrides() {
        let policy = EncryptionPolicy::default_policy();
        let scope = PolicyScope::root(&policy);
        assert_eq!(scope.decide("password", None), PolicyDecision::Bulk(true));
        assert_eq!(
            scope.decide("debug_unencrypted", None),
            PolicyDecision::Bulk(false)
        );
    }

    #[test]
    fn override_wins_over_bulk_rule() {
        let policy = PolicyConfig::new()
            .with_override("db.password", false)
            .build()
            .unwrap();
        let scope = PolicyScope::root(&policy).descend("db");
        assert_eq!(
            scope.decide("password", None),
            PolicyDecision::Override(false)
        );
    }

    #[test]
    fn branch_override_propagates_to_descendants_without_retesting() {
        let policy = PolicyConfig::new()
            .with_override("public", false)
            .build()
            .unwrap();
        let scope = PolicyScope::root(&policy).descend("public");
        // Leaves under `public` inherit the forced decision even though
        // no override is declared at `public.anything` specifically.
        assert_eq!(
            scope.decide("anything", None),
            PolicyDecision::Override(false)
        );
        let nested = scope.descend("deeper");
        assert_eq!(
            nested.decide("leaf", None),
            PolicyDecision::Override(false)
        );
    }

    #[test]
    fn array_element_paths_support_overrides() {
        let policy = PolicyConfig::new()
            .with_override("items[0].secret", true)
            .build()
            .unwrap();
        let scope = PolicyScope::root(&policy).descend("items").descend_index(0);
        assert_eq!(
            scope.decide("secret", None),
            PolicyDecision::Override(true)
        );
    }
}

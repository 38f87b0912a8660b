//! Umbrella crate: the public surface of every `sops-*` crate in this
//! workspace, gathered behind one dependency and a handful of feature
//! flags for the master key backends that pull in their own dependency
//! trees.
//!
//! Each module here simply re-exports its corresponding crate; nothing is
//! redefined. [`prelude`] pulls in the types and functions most programs
//! reach for first — a tree, a policy, an envelope, `encrypt_tree` and
//! `decrypt_tree`.
//!
//! Backend crates are opt-in: enable `age`, `pgp`, `kms-aws`, `kms-gcp`,
//! or `kms-vault` for the corresponding `sops_masterkey::MasterKey`
//! implementation. `keyservice-transport` pulls in the Unix-socket
//! framing for `sops-keyservice`; without it only the in-process
//! `LocalKeyService` is available. `test-utils` exposes the in-memory
//! store and stub master key the rest of this workspace's own
//! integration tests are built on.

pub mod types {
    pub use sops_types::*;
}

pub mod tree {
    pub use sops_tree::*;
}

pub mod policy {
    pub use sops_policy::*;
}

pub mod crypto {
    pub use sops_crypto::*;
}

pub mod masterkey {
    pub use sops_masterkey::*;

    #[cfg(feature = "age")]
    pub mod age {
        pub use sops_masterkey_age::*;
    }

    #[cfg(feature = "pgp")]
    pub mod pgp {
        pub use sops_masterkey_pgp::*;
    }

    #[cfg(feature = "kms-aws")]
    pub mod kms_aws {
        pub use sops_masterkey_kms_aws::*;
    }

    #[cfg(feature = "kms-gcp")]
    pub mod kms_gcp {
        pub use sops_masterkey_kms_gcp::*;
    }

    #[cfg(feature = "kms-vault")]
    pub mod kms_vault {
        pub use sops_masterkey_kms_vault::*;
    }
}

pub mod shamir {
    pub use sops_shamir::*;
}

pub mod keyservice {
    pub use sops_keyservice::*;
}

pub mod envelope {
    pub use sops_envelope::*;
}

pub mod store {
    pub use sops_store::*;
}

pub mod pipeline {
    pub use sops_pipeline::*;
}

/// The common imports for encrypting or decrypting a tree end to end.
pub mod prelude {
    pub use sops_crypto::{decrypt_leaf, encrypt_leaf, looks_like_token, CryptoError};
    pub use sops_envelope::{Envelope, EnvelopeError, PolicyMetadata};
    pub use sops_masterkey::{MasterKey, MasterKeyError};
    pub use sops_pipeline::{decrypt_tree, encrypt_tree, PipelineError};
    pub use sops_policy::{BulkMode, EncryptionPolicy, PolicyConfig};
    pub use sops_shamir::KeyGroupMember;
    pub use sops_store::Store;
    pub use sops_types::{
        Branch, DataKey, Item, KeyGroup, Leaf, MasterKeyKind, MasterKeyRef, Node, Path, Tree,
        Value,
    };

    #[cfg(feature = "test-utils")]
    pub use sops_pipeline::test_support::StubMasterKey;
    #[cfg(feature = "test-utils")]
    pub use sops_store::InMemoryStore;
}

#[cfg(all(test, feature = "test-utils"))]
mod tests {
    use super::prelude::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn prelude_round_trips_a_tree() {
        let mut root = Branch::new();
        root.push(Item::Pair {
            key: "password".to_string(),
            node: Node::Leaf(Leaf::new(Value::Str("hunter2".to_string()))),
        });
        let mut tree = Tree::new(root);
        let original = tree.clone();

        let backend: std::sync::Arc<dyn MasterKey> = std::sync::Arc::new(StubMasterKey::new());
        let member = KeyGroupMember::new(
            MasterKeyRef::new(
                MasterKeyKind::Age,
                "k1",
                "",
                time::OffsetDateTime::from_unix_timestamp(0).unwrap(),
            ),
            backend.clone(),
        );

        let envelope = encrypt_tree(
            &mut tree,
            vec![vec![member]],
            0,
            PolicyMetadata::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        decrypt_tree(
            &mut tree,
            &envelope,
            &[vec![backend]],
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(tree, original);
    }
}

//! Workspace-level scenarios exercising the full encrypt/decrypt pipeline
//! across several crates at once, rather than one crate's internals.

use sops_envelope::PolicyMetadata;
use sops_pipeline::test_support::StubMasterKey;
use sops_pipeline::{decrypt_tree, encrypt_tree, PipelineError};
use sops_shamir::KeyGroupMember;
use sops_types::{Branch, Item, Leaf, MasterKeyKind, MasterKeyRef, Node, Tree, Value};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

fn member(name: &str, backend: Arc<dyn sops_masterkey::MasterKey>) -> KeyGroupMember {
    KeyGroupMember::new(
        MasterKeyRef::new(
            MasterKeyKind::Age,
            name,
            "",
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
        ),
        backend,
    )
}

// Scenario 1: simple round-trip, string and int leaves, including an array.
#[tokio::test]
async fn simple_round_trip_with_mixed_scalar_types() {
    let mut array = Branch::new();
    array.push(Item::Element {
        index: 0,
        node: Node::Leaf(Leaf::new(Value::Int(1))),
    });
    array.push(Item::Element {
        index: 1,
        node: Node::Leaf(Leaf::new(Value::Int(2))),
    });
    array.push(Item::Element {
        index: 2,
        node: Node::Leaf(Leaf::new(Value::Str("three".to_string()))),
    });

    let mut root = Branch::new();
    root.push(Item::Pair {
        key: "hello".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("Welcome to SOPS!".to_string()))),
    });
    root.push(Item::Pair {
        key: "example_key".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("example_value".to_string()))),
    });
    root.push(Item::Pair {
        key: "example_array".to_string(),
        node: Node::Branch(array),
    });

    let mut tree = Tree::new(root);
    let original = tree.clone();
    let backend: Arc<dyn sops_masterkey::MasterKey> = Arc::new(StubMasterKey::new());
    let groups = vec![vec![member("k1", backend.clone())]];

    let envelope = encrypt_tree(
        &mut tree,
        groups,
        0,
        PolicyMetadata::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    for (path, leaf) in tree.walk_leaves() {
        match &leaf.value {
            Value::Str(s) => assert!(s.starts_with("ENC["), "leaf {path} was not encrypted"),
            other => panic!("unexpected leaf representation at {path}: {other:?}"),
        }
    }
    match &tree.root.0[2] {
        Item::Pair {
            node: Node::Branch(arr),
            ..
        } => match &arr.0[0] {
            Item::Element {
                node: Node::Leaf(leaf),
                ..
            } => assert!(matches!(&leaf.value, Value::Str(s) if s.contains("type:int"))),
            _ => panic!("expected element"),
        },
        _ => panic!("expected branch"),
    }

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

// Scenario 2: unencrypted-suffix leaves a matching key's value untouched.
#[tokio::test]
async fn unencrypted_suffix_leaves_matching_leaf_alone() {
    let mut root = Branch::new();
    root.push(Item::Pair {
        key: "password_unencrypted".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("hunter2".to_string()))),
    });
    root.push(Item::Pair {
        key: "password".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("hunter2".to_string()))),
    });
    let mut tree = Tree::new(root);

    let policy = PolicyMetadata {
        unencrypted_suffix: Some("_unencrypted".to_string()),
        ..Default::default()
    };
    let backend: Arc<dyn sops_masterkey::MasterKey> = Arc::new(StubMasterKey::new());
    let groups = vec![vec![member("k1", backend)]];

    encrypt_tree(&mut tree, groups, 0, policy, &CancellationToken::new())
        .await
        .unwrap();

    match &tree.root.0[0] {
        Item::Pair {
            node: Node::Leaf(leaf),
            ..
        } => assert_eq!(leaf.value, Value::Str("hunter2".to_string())),
        _ => panic!("expected leaf"),
    }
    match &tree.root.0[1] {
        Item::Pair {
            node: Node::Leaf(leaf),
            ..
        } => assert!(matches!(&leaf.value, Value::Str(s) if s.starts_with("ENC["))),
        _ => panic!("expected leaf"),
    }
}

// Scenario 3: Shamir 2-of-3 — losing one whole group's keys still recovers,
// losing two does not.
#[tokio::test]
async fn shamir_two_of_three_tolerates_losing_one_group() {
    let mut root = Branch::new();
    root.push(Item::Pair {
        key: "secret".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("s3cr3t".to_string()))),
    });
    let mut tree = Tree::new(root);

    let b1: Arc<dyn sops_masterkey::MasterKey> = Arc::new(StubMasterKey::new());
    let b2: Arc<dyn sops_masterkey::MasterKey> = Arc::new(StubMasterKey::new());
    let b3: Arc<dyn sops_masterkey::MasterKey> = Arc::new(StubMasterKey::new());
    let groups = vec![
        vec![member("g1", b1.clone())],
        vec![member("g2", b2.clone())],
        vec![member("g3", b3.clone())],
    ];

    let envelope = encrypt_tree(
        &mut tree,
        groups,
        2,
        PolicyMetadata::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // Deleting all master keys from any one group still permits decrypt.
    let key_groups = vec![vec![b1.clone()], vec![b2.clone()], vec![]];
    decrypt_tree(
        &mut tree.clone(),
        &envelope,
        &key_groups,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // Deleting from two groups fails, reporting recovered=1.
    let key_groups = vec![vec![b1], vec![], vec![]];
    let result = decrypt_tree(
        &mut tree,
        &envelope,
        &key_groups,
        &CancellationToken::new(),
    )
    .await;
    match result {
        Err(PipelineError::Shamir(sops_shamir::ShamirError::InsufficientShares {
            recovered,
            required,
        })) => {
            assert_eq!(recovered, 1);
            assert_eq!(required, 2);
        }
        other => panic!("expected InsufficientShares, got {other:?}"),
    }
}

// Scenario 4: path rebinding — swapping two leaves' ciphertext tokens must
// fail decrypt even though both tokens decrypt cleanly against the data key.
#[tokio::test]
async fn path_rebinding_attack_is_rejected() {
    let mut root = Branch::new();
    let mut inner = Branch::new();
    inner.push(Item::Pair {
        key: "password".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("hunter2".to_string()))),
    });
    inner.push(Item::Pair {
        key: "username".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("alice".to_string()))),
    });
    root.push(Item::Pair {
        key: "a".to_string(),
        node: Node::Branch({
            let mut b = Branch::new();
            b.push(Item::Pair {
                key: "b".to_string(),
                node: Node::Branch(inner),
            });
            b
        }),
    });
    let mut tree = Tree::new(root);

    let backend: Arc<dyn sops_masterkey::MasterKey> = Arc::new(StubMasterKey::new());
    let groups = vec![vec![member("k1", backend.clone())]];
    let envelope = encrypt_tree(
        &mut tree,
        groups,
        0,
        PolicyMetadata::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let (password_token, username_token) = match &tree.root.0[0] {
        Item::Pair {
            node: Node::Branch(a),
            ..
        } => match &a.0[0] {
            Item::Pair {
                node: Node::Branch(b),
                ..
            } => {
                let pw = match &b.0[0] {
                    Item::Pair {
                        node: Node::Leaf(l),
                        ..
                    } => l.value.clone(),
                    _ => panic!("expected leaf"),
                };
                let user = match &b.0[1] {
                    Item::Pair {
                        node: Node::Leaf(l),
                        ..
                    } => l.value.clone(),
                    _ => panic!("expected leaf"),
                };
                (pw, user)
            }
            _ => panic!("expected branch"),
        },
        _ => panic!("expected branch"),
    };

    if let Item::Pair {
        node: Node::Branch(a),
        ..
    } = &mut tree.root.0[0]
    {
        if let Item::Pair {
            node: Node::Branch(b),
            ..
        } = &mut a.0[0]
        {
            if let Item::Pair {
                node: Node::Leaf(l), ..
            } = &mut b.0[0]
            {
                l.value = username_token;
            }
            if let Item::Pair {
                node: Node::Leaf(l), ..
            } = &mut b.0[1]
            {
                l.value = password_token;
            }
        }
    }

    let result = decrypt_tree(
        &mut tree,
        &envelope,
        &[vec![backend]],
        &CancellationToken::new(),
    )
    .await;
    assert!(result.is_err());
}

// Scenario 5: mac-only-encrypted — editing a plaintext leaf leaves the
// stored MAC valid, because that leaf never contributed to the fingerprint.
#[tokio::test]
async fn mac_only_encrypted_ignores_plaintext_edits() {
    let mut root = Branch::new();
    root.push(Item::Pair {
        key: "secret_unencrypted".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("top secret".to_string()))),
    });
    root.push(Item::Pair {
        key: "other_secret".to_string(),
        node: Node::Leaf(Leaf::new(Value::Str("note".to_string()))),
    });
    let mut tree = Tree::new(root);

    let policy = PolicyMetadata {
        mac_only_encrypted: true,
        ..Default::default()
    };
    let backend: Arc<dyn sops_masterkey::MasterKey> = Arc::new(StubMasterKey::new());
    let groups = vec![vec![member("k1", backend.clone())]];
    let envelope = encrypt_tree(&mut tree, groups, 0, policy, &CancellationToken::new())
        .await
        .unwrap();

    // "secret_unencrypted" stayed plaintext and was excluded from the MAC;
    // edit it and confirm decrypt (and its MAC check) still succeeds.
    if let Item::Pair {
        node: Node::Leaf(leaf),
        ..
    } = &mut tree.root.0[0]
    {
        leaf.value = Value::Str("edited after the fact".to_string());
    }

    decrypt_tree(
        &mut tree,
        &envelope,
        &[vec![backend]],
        &CancellationToken::new(),
    )
    .await
    .unwrap();
}


//! The one true traversal: in-order, depth-first, over an owned `&mut Tree`.
//!
//! [`walk_leaves`] hands the visitor a `&[PathSegment]` slice rather than a
//! built [`sops_types::Path`] so hot per-leaf callers (the pipeline, on
//! every encrypt/decrypt) don't allocate a path object unless they need to
//! render or clone it.

use sops_types::{Branch, Item, Node, PathSegment, Tree, Value};

/// Walk every leaf of `tree` in document order, calling `visit` with the
/// leaf's path segments and a mutable handle to its value.
///
/// The visitor may replace the value in place (e.g. ciphertext for
/// plaintext on encrypt, or the reverse on decrypt). Errors from the
/// visitor abort the walk immediately and propagate to the caller.
pub fn walk_leaves<E>(
    tree: &mut Tree,
    mut visit: impl FnMut(&[PathSegment], &mut Value) -> Result<(), E>,
) -> Result<(), E> {
    let mut stack = Vec::new();
    walk_branch_mut(&mut tree.root, &mut stack, &mut visit)
}

fn walk_branch_mut<E>(
    branch: &mut Branch,
    stack: &mut Vec<PathSegment>,
    visit: &mut impl FnMut(&[PathSegment], &mut Value) -> Result<(), E>,
) -> Result<(), E> {
    for item in &mut branch.0 {
        match item {
            Item::Pair { key, node } => {
                stack.push(PathSegment::Key(key.clone()));
                walk_node_mut(node, stack, visit)?;
                stack.pop();
            }
            Item::Element { index, node } => {
                stack.push(PathSegment::Index(*index));
                walk_node_mut(node, stack, visit)?;
                stack.pop();
            }
            Item::Comment(_) => {}
        }
    }
    Ok(())
}

fn walk_node_mut<E>(
    node: &mut Node,
    stack: &mut Vec<PathSegment>,
    visit: &mut impl FnMut(&[PathSegment], &mut Value) -> Result<(), E>,
) -> Result<(), E> {
    match node {
        Node::Leaf(leaf) => visit(stack, &mut leaf.value),
        Node::Branch(branch) => walk_branch_mut(branch, stack, visit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sops_types::{Leaf, Path};

    fn tree_with_two_leaves() -> Tree {
        let mut inner = Branch::new();
        inner.push(Item::Pair {
            key: "user".into(),
            node: Node::Leaf(Leaf::new(Value::Str("alice".into()))),
        });
        let mut root = Branch::new();
        root.push(Item::Pair {
            key: "db".into(),
            node: Node::Branch(inner),
        });
        root.push(Item::Pair {
            key: "count".into(),
            node: Node::Leaf(Leaf::new(Value::Int(1))),
        });
        Tree::new(root)
    }

    #[test]
    fn visits_leaves_in_order_with_correct_paths() {
        let mut tree = tree_with_two_leaves();
        let mut seen = Vec::new();
        walk_leaves::<std::convert::Infallible>(&mut tree, |segs, _value| {
            let path = Path(segs.to_vec());
            seen.push(path.to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec!["db.user", "count"]);
    }

    #[test]
    fn visitor_can_replace_value_in_place() {
        let mut tree = tree_with_two_leaves();
        walk_leaves::<std::convert::Infallible>(&mut tree, |_segs, value| {
            *value = Value::Str("REPLACED".into());
            Ok(())
        })
        .unwrap();
        for (_, leaf) in tree.walk_leaves() {
            assert_eq!(leaf.value, Value::Str("REPLACED".into()));
        }
    }

    #[test]
    fn visitor_error_aborts_walk() {
        let mut tree = tree_with_two_leaves();
        let mut calls = 0;
        let result = walk_leaves(&mut tree, |_segs, _value| {
            calls += 1;
            Err::<(), &'static str>("boom")
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}

//! The document tree: the shape every store adapter loads into and emits
//! from, and the shape the pipeline walks leaf-by-leaf.
//!
//! A [`Branch`] is an *ordered* sequence of [`Item`]s. Order is significant:
//! it is preserved end to end so that re-emitting an unmodified tree produces
//! byte-identical output modulo the ciphertext tokens themselves, and so a
//! comment attached "after key `foo`, before key `bar`" stays there.

use crate::path::Path;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A leaf scalar, plus an optional trailing line comment carried alongside
/// it in formats that support one (YAML, dotenv-with-comments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub value: Value,
    pub trailing_comment: Option<String>,
}

impl Leaf {
    pub fn new(value: Value) -> Self {
        Leaf {
            value,
            trailing_comment: None,
        }
    }

    pub fn with_comment(value: Value, comment: impl Into<String>) -> Self {
        Leaf {
            value,
            trailing_comment: Some(comment.into()),
        }
    }
}

/// A node one level below a branch: either a scalar leaf or a nested branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf(Leaf),
    Branch(Branch),
}

/// One ordered slot inside a [`Branch`].
///
/// `Comment` represents a standalone comment line with no associated key —
/// emitted between sibling pairs, never reordered relative to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Pair { key: String, node: Node },
    Element { index: usize, node: Node },
    Comment(String),
}

/// An ordered collection of sibling items, either keyed (map-like) or
/// indexed (array-like). A branch never mixes `Pair` and `Element` items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Branch(pub Vec<Item>);

impl Branch {
    pub fn new() -> Self {
        Branch(Vec::new())
    }

    pub fn is_indexed(&self) -> bool {
        self.0
            .iter()
            .any(|item| matches!(item, Item::Element { .. }))
    }

    pub fn push(&mut self, item: Item) {
        self.0.push(item);
    }
}

/// The whole document, rooted at a single branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub root: Branch,
}

impl Tree {
    pub fn new(root: Branch) -> Self {
        Tree { root }
    }

    /// Depth-first, in-order walk of every leaf, yielding its fully
    /// qualified [`Path`] alongside a reference to the leaf itself.
    ///
    /// This is the one true traversal order: the leaf cipher binds
    /// ciphertext to a path produced here, and the integrity MAC
    /// concatenates leaves in this same order, so the two never disagree
    /// about "leaf #7".
    pub fn walk_leaves(&self) -> Vec<(Path, &Leaf)> {
        let mut out = Vec::new();
        walk_branch(&self.root, Path::root(), &mut out);
        out
    }

    /// Mutable counterpart of [`Tree::walk_leaves`], used by the pipeline to
    /// write ciphertext (or plaintext) values back in place.
    pub fn walk_leaves_mut(&mut self) -> Vec<(Path, &mut Leaf)> {
        let mut out = Vec::new();
        walk_branch_mut(&mut self.root, Path::root(), &mut out);
        out
    }
}

fn walk_branch<'a>(branch: &'a Branch, prefix: Path, out: &mut Vec<(Path, &'a Leaf)>) {
    for item in &branch.0 {
        match item {
            Item::Pair { key, node } => {
                let path = prefix.push_key(key);
                walk_node(node, path, out);
            }
            Item::Element { index, node } => {
                let path = prefix.push_index(*index);
                walk_node(node, path, out);
            }
            Item::Comment(_) => {}
        }
    }
}

fn walk_node<'a>(node: &'a Node, path: Path, out: &mut Vec<(Path, &'a Leaf)>) {
    match node {
        Node::Leaf(leaf) => out.push((path, leaf)),
        Node::Branch(branch) => walk_branch(branch, path, out),
    }
}

fn walk_branch_mut<'a>(branch: &'a mut Branch, prefix: Path, out: &mut Vec<(Path, &'a mut Leaf)>) {
    for item in &mut branch.0 {
        match item {
            Item::Pair { key, node } => {
                let path = prefix.push_key(key.clone());
                walk_node_mut(node, path, out);
            }
            Item::Element { index, node } => {
                let path = prefix.push_index(*index);
                walk_node_mut(node, path, out);
            }
            Item::Comment(_) => {}
        }
    }
}

fn walk_node_mut<'a>(node: &'a mut Node, path: Path, out: &mut Vec<(Path, &'a mut Leaf)>) {
    match node {
        Node::Leaf(leaf) => out.push((path, leaf)),
        Node::Branch(branch) => walk_branch_mut(branch, path, out),
    }
}

//! Read access to the host render tree, plus an in-memory implementation.

use crate::style::InlineStyle;
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque handle to a node in the host render tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The root node key of a `MemoryRenderTree`.
    pub const ROOT: Self = Self(0);
}

/// What a render-tree node is, as far as inline layout cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderNodeKind {
    /// A block container. Only the formatting root is expected to be one.
    BlockContainer,
    Text(String),
    /// A forced line break (`<br>`).
    LineBreak,
    /// An inline element (`<span>`) whose children are inline-level too.
    InlineBox,
    /// Floats and positioned boxes; laid out elsewhere.
    OutOfFlow,
}

/// Host render tree as seen by the box tree adapter.
pub trait RenderTreeReader {
    /// Children of `node` in document order.
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// Kind of `node`, or `None` if the node does not exist.
    fn kind(&self, node: NodeKey) -> Option<RenderNodeKind>;

    /// Resolved style. Text and line break nodes may return `None`, in which
    /// case they inherit their parent's style.
    fn style(&self, node: NodeKey) -> Option<Arc<InlineStyle>>;
}

#[derive(Clone, Debug)]
struct MemoryNode {
    kind: RenderNodeKind,
    style: Option<Arc<InlineStyle>>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

/// A minimal render tree kept in memory.
///
/// Node `NodeKey::ROOT` is the block container that establishes the inline
/// formatting context.
#[derive(Clone, Debug)]
pub struct MemoryRenderTree {
    nodes: HashMap<NodeKey, MemoryNode>,
    next_key: u64,
}

impl MemoryRenderTree {
    /// Create a tree holding only the root block container.
    pub fn new(root_style: Arc<InlineStyle>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeKey::ROOT,
            MemoryNode {
                kind: RenderNodeKind::BlockContainer,
                style: Some(root_style),
                parent: None,
                children: Vec::new(),
            },
        );
        Self { nodes, next_key: 1 }
    }

    pub const fn root(&self) -> NodeKey {
        NodeKey::ROOT
    }

    /// Append a text node under `parent`. Text inherits the parent's style.
    ///
    /// # Errors
    /// Returns an error if `parent` does not exist.
    pub fn append_text(&mut self, parent: NodeKey, text: &str) -> Result<NodeKey> {
        self.append(parent, RenderNodeKind::Text(text.to_owned()), None)
    }

    /// Append a forced line break under `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` does not exist.
    pub fn append_line_break(&mut self, parent: NodeKey) -> Result<NodeKey> {
        self.append(parent, RenderNodeKind::LineBreak, None)
    }

    /// Append an inline element with its own style.
    ///
    /// # Errors
    /// Returns an error if `parent` does not exist.
    pub fn append_inline_box(
        &mut self,
        parent: NodeKey,
        style: Arc<InlineStyle>,
    ) -> Result<NodeKey> {
        self.append(parent, RenderNodeKind::InlineBox, Some(style))
    }

    /// Append an out-of-flow (floated/positioned) child.
    ///
    /// # Errors
    /// Returns an error if `parent` does not exist.
    pub fn append_out_of_flow(&mut self, parent: NodeKey) -> Result<NodeKey> {
        self.append(parent, RenderNodeKind::OutOfFlow, None)
    }

    /// Replace the content of a text node.
    ///
    /// # Errors
    /// Returns an error if `node` is missing or not a text node.
    pub fn set_text(&mut self, node: NodeKey, text: &str) -> Result<()> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or_else(|| anyhow!("unknown node {node:?}"))?;
        match &mut entry.kind {
            RenderNodeKind::Text(content) => {
                text.clone_into(content);
                Ok(())
            }
            other => Err(anyhow!("node {node:?} is {other:?}, not text")),
        }
    }

    /// Replace the style of an element node.
    ///
    /// # Errors
    /// Returns an error if `node` does not exist.
    pub fn set_style(&mut self, node: NodeKey, style: Arc<InlineStyle>) -> Result<()> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or_else(|| anyhow!("unknown node {node:?}"))?;
        entry.style = Some(style);
        Ok(())
    }

    /// Detach `node` and drop it with its descendants. Returns false if absent.
    pub fn remove(&mut self, node: NodeKey) -> bool {
        let Some(removed) = self.nodes.remove(&node) else {
            return false;
        };
        if let Some(parent) = removed.parent.and_then(|key| self.nodes.get_mut(&key)) {
            parent.children.retain(|child| *child != node);
        }
        let mut pending = removed.children;
        while let Some(child) = pending.pop() {
            if let Some(entry) = self.nodes.remove(&child) {
                pending.extend(entry.children);
            }
        }
        true
    }

    fn append(
        &mut self,
        parent: NodeKey,
        kind: RenderNodeKind,
        style: Option<Arc<InlineStyle>>,
    ) -> Result<NodeKey> {
        let key = NodeKey(self.next_key);
        let parent_entry = self
            .nodes
            .get_mut(&parent)
            .ok_or_else(|| anyhow!("unknown parent {parent:?}"))?;
        parent_entry.children.push(key);
        self.next_key += 1;
        self.nodes.insert(
            key,
            MemoryNode {
                kind,
                style,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        Ok(key)
    }
}

impl RenderTreeReader for MemoryRenderTree {
    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.nodes
            .get(&node)
            .map_or_else(Vec::new, |entry| entry.children.clone())
    }

    fn kind(&self, node: NodeKey) -> Option<RenderNodeKind> {
        self.nodes.get(&node).map(|entry| entry.kind.clone())
    }

    fn style(&self, node: NodeKey) -> Option<Arc<InlineStyle>> {
        self.nodes.get(&node).and_then(|entry| entry.style.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Children are reported in insertion order and removal detaches subtrees.
    ///
    /// # Panics
    /// Panics if child order or removal is wrong.
    #[test]
    fn append_and_remove() -> Result<()> {
        let mut tree = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
        let root = tree.root();
        let first = tree.append_text(root, "Hello")?;
        let span = tree.append_inline_box(root, Arc::new(InlineStyle::default()))?;
        let nested = tree.append_text(span, "nested")?;
        assert_eq!(tree.children(root), vec![first, span]);

        assert!(tree.remove(span));
        assert_eq!(tree.children(root), vec![first]);
        assert_eq!(tree.kind(nested), None);
        assert!(!tree.remove(span));
        Ok(())
    }

    /// Only text nodes accept new text.
    ///
    /// # Panics
    /// Panics if `set_text` accepts a line break.
    #[test]
    fn set_text_rejects_non_text() -> Result<()> {
        let mut tree = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
        let root = tree.root();
        let text = tree.append_text(root, "a")?;
        let line_break = tree.append_line_break(root)?;
        tree.set_text(text, "b")?;
        assert_eq!(tree.kind(text), Some(RenderNodeKind::Text(String::from("b"))));
        assert!(tree.set_text(line_break, "c").is_err());
        Ok(())
    }
}

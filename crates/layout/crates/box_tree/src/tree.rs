//! The box tree adapter: an arena of `LayoutBox`es for one inline formatting
//! context plus the node <-> box maps used by queries.

use crate::layout_box::{LayoutBox, LayoutBoxId, LayoutBoxKind, StyleOrigin};
use crate::reader::{NodeKey, RenderNodeKind, RenderTreeReader};
use crate::style::InlineStyle;
use anyhow::{Context as _, Result, anyhow};
use core::iter;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Slot {
    /// Bumped every time the slot is emptied.
    generation: u32,
    layout_box: Option<LayoutBox>,
}

/// Mirrors the inline-level subtree of one block container.
#[derive(Clone, Debug)]
pub struct BoxTree {
    slots: Vec<Slot>,
    /// Indices of empty slots, reused before the arena grows.
    free: Vec<u32>,
    root: LayoutBoxId,
    node_to_box: HashMap<NodeKey, LayoutBoxId>,
}

impl BoxTree {
    /// Mirror `container` and its inline-level descendants.
    ///
    /// # Errors
    /// Returns an error if the reader does not know `container` or has no
    /// style for it.
    pub fn build(reader: &dyn RenderTreeReader, container: NodeKey) -> Result<Self> {
        reader
            .kind(container)
            .ok_or_else(|| anyhow!("container {container:?} is not in the render tree"))?;
        let root_style = reader
            .style(container)
            .with_context(|| format!("container {container:?} has no style"))?;

        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: LayoutBoxId::new(0),
            node_to_box: HashMap::new(),
        };
        tree.root = tree.push_box(LayoutBox {
            kind: LayoutBoxKind::Root,
            style: root_style,
            style_origin: StyleOrigin::Own,
            renderer: container,
            parent: None,
            children: Vec::new(),
        });
        for child in reader.children(container) {
            tree.build_subtree(reader, tree.root, child);
        }
        debug!(
            "built box tree for {container:?}: {} boxes",
            tree.node_to_box.len()
        );
        Ok(tree)
    }

    pub const fn root(&self) -> LayoutBoxId {
        self.root
    }

    pub fn root_style(&self) -> Option<&Arc<InlineStyle>> {
        self.get(self.root).map(LayoutBox::style_arc)
    }

    /// Box behind `id`; `None` once it was removed, even if the slot was reused.
    pub fn get(&self, id: LayoutBoxId) -> Option<&LayoutBox> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.layout_box.as_ref())
    }

    fn get_mut(&mut self, id: LayoutBoxId) -> Option<&mut LayoutBox> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.layout_box.as_mut())
    }

    /// Arena slots in use or free. Stays bounded by the peak number of live
    /// boxes.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Box mirroring `node`, or `None` if `node` is outside this formatting
    /// context's inline subtree.
    pub fn layout_box_for(&self, node: NodeKey) -> Option<LayoutBoxId> {
        self.node_to_box.get(&node).copied()
    }

    /// Render-tree node behind `id`. `None` only for ids that were removed or
    /// never belonged to this tree.
    pub fn renderer_for(&self, id: LayoutBoxId) -> Option<NodeKey> {
        self.get(id).map(|layout_box| layout_box.renderer)
    }

    /// Number of live boxes, root included.
    pub fn len(&self) -> usize {
        self.node_to_box.len()
    }

    /// True when the root has no inline children.
    pub fn is_empty(&self) -> bool {
        self.get(self.root)
            .is_none_or(|layout_box| layout_box.children.is_empty())
    }

    /// Install a new root style and refresh the anonymous styles derived from
    /// it. The tree shape is untouched.
    ///
    /// Returns whether the change affects layout.
    pub fn update_style(&mut self, root_style: Arc<InlineStyle>) -> bool {
        let Some(changed) = self
            .get(self.root)
            .map(|root| root.style.differs_in_layout(&root_style))
        else {
            return false;
        };
        for layout_box in self.slots.iter_mut().filter_map(|slot| slot.layout_box.as_mut()) {
            if layout_box.style_origin == StyleOrigin::Root {
                layout_box.style = Arc::clone(&root_style);
            }
        }
        if let Some(root) = self.get_mut(self.root) {
            root.style = root_style;
        }
        changed
    }

    /// Mirror a node newly inserted under `parent_node`.
    ///
    /// # Errors
    /// Returns an error if `parent_node` is not mirrored or `node` is already.
    pub fn insert_child(
        &mut self,
        reader: &dyn RenderTreeReader,
        parent_node: NodeKey,
        node: NodeKey,
    ) -> Result<()> {
        let parent = self
            .layout_box_for(parent_node)
            .ok_or_else(|| anyhow!("parent {parent_node:?} is not in the box tree"))?;
        if self.node_to_box.contains_key(&node) {
            return Err(anyhow!("{node:?} is already in the box tree"));
        }
        let Some(child) = self.build_subtree(reader, parent, node) else {
            return Ok(());
        };

        // Reorder the parent's children to match document order.
        let order = reader.children(parent_node);
        let position_of = |id: &LayoutBoxId, tree: &Self| {
            tree.renderer_for(*id)
                .and_then(|key| order.iter().position(|candidate| *candidate == key))
                .unwrap_or(usize::MAX)
        };
        let mut siblings = self
            .get(parent)
            .map(|layout_box| layout_box.children.clone())
            .unwrap_or_default();
        siblings.sort_by_key(|id| position_of(id, self));
        if let Some(parent_box) = self.get_mut(parent) {
            parent_box.children = siblings;
        }
        trace!("inserted {node:?} as {child:?}");
        Ok(())
    }

    /// Drop the box for `node` and all its descendants.
    ///
    /// Returns false if `node` is not mirrored or is the root.
    pub fn remove_subtree(&mut self, node: NodeKey) -> bool {
        let Some(id) = self.layout_box_for(node) else {
            return false;
        };
        if id == self.root {
            return false;
        }
        let parent = self.get(id).and_then(LayoutBox::parent);
        if let Some(parent_box) = parent.and_then(|parent_id| self.get_mut(parent_id)) {
            parent_box.children.retain(|child| *child != id);
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index())
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            let Some(removed) = slot.layout_box.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
            self.node_to_box.remove(&removed.renderer);
            pending.extend(removed.children);
        }
        true
    }

    /// Update the content of a mirrored text node. Returns whether it changed.
    pub fn set_text(&mut self, node: NodeKey, text: &str) -> bool {
        let Some(id) = self.layout_box_for(node) else {
            return false;
        };
        match self.get_mut(id).map(|layout_box| &mut layout_box.kind) {
            Some(LayoutBoxKind::Text { content }) if content.as_str() != text => {
                text.clone_into(content);
                true
            }
            _ => false,
        }
    }

    /// Leaf boxes (text, line breaks) in depth-first, left-to-right order.
    pub fn leaves(&self) -> Leaves<'_> {
        let stack = self
            .get(self.root)
            .map(|root| root.children.iter().rev().copied().collect())
            .unwrap_or_default();
        Leaves { tree: self, stack }
    }

    /// Inline box ancestors of `id`, nearest first. The root is not included.
    pub fn inline_ancestors(&self, id: LayoutBoxId) -> impl Iterator<Item = LayoutBoxId> + '_ {
        let mut current = self.get(id).and_then(LayoutBox::parent);
        iter::from_fn(move || {
            let candidate = current?;
            let layout_box = self.get(candidate)?;
            if !layout_box.is_inline_box() {
                return None;
            }
            current = layout_box.parent;
            Some(candidate)
        })
    }

    fn push_box(&mut self, layout_box: LayoutBox) -> LayoutBoxId {
        let renderer = layout_box.renderer;
        let id = if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            slot.layout_box = Some(layout_box);
            LayoutBoxId::with_generation(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                layout_box: Some(layout_box),
            });
            LayoutBoxId::new(index)
        };
        self.node_to_box.insert(renderer, id);
        id
    }

    fn build_subtree(
        &mut self,
        reader: &dyn RenderTreeReader,
        parent: LayoutBoxId,
        node: NodeKey,
    ) -> Option<LayoutBoxId> {
        let kind = match reader.kind(node)? {
            RenderNodeKind::Text(content) => LayoutBoxKind::Text { content },
            RenderNodeKind::LineBreak => LayoutBoxKind::LineBreak,
            RenderNodeKind::InlineBox => LayoutBoxKind::InlineBox,
            skipped @ (RenderNodeKind::BlockContainer | RenderNodeKind::OutOfFlow) => {
                debug!("skipping {skipped:?} child {node:?} of inline content");
                return None;
            }
        };
        let parent_box = self.get(parent)?;
        let (style, style_origin) = match reader.style(node) {
            Some(style) => (style, StyleOrigin::Own),
            _ if parent_box.is_root() => (Arc::clone(&parent_box.style), StyleOrigin::Root),
            _ => (Arc::clone(&parent_box.style), StyleOrigin::Parent),
        };
        let is_inline_box = matches!(kind, LayoutBoxKind::InlineBox);
        let id = self.push_box(LayoutBox {
            kind,
            style,
            style_origin,
            renderer: node,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent_box) = self.get_mut(parent) {
            parent_box.children.push(id);
        }
        if is_inline_box {
            for child in reader.children(node) {
                self.build_subtree(reader, id, child);
            }
        }
        Some(id)
    }
}

/// Iterator returned by [`BoxTree::leaves`].
#[derive(Clone, Debug)]
pub struct Leaves<'tree> {
    tree: &'tree BoxTree,
    stack: Vec<LayoutBoxId>,
}

impl Iterator for Leaves<'_> {
    type Item = LayoutBoxId;

    fn next(&mut self) -> Option<LayoutBoxId> {
        while let Some(id) = self.stack.pop() {
            let Some(layout_box) = self.tree.get(id) else {
                continue;
            };
            if layout_box.is_leaf() {
                return Some(id);
            }
            self.stack.extend(layout_box.children.iter().rev().copied());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryRenderTree;
    use anyhow::Context as _;
    use inline_layout_geometry::LayoutUnit;

    fn sample_tree() -> Result<(MemoryRenderTree, Vec<NodeKey>)> {
        let mut render = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
        let root = render.root();
        let hello = render.append_text(root, "Hello ")?;
        let span = render.append_inline_box(root, Arc::new(InlineStyle::default()))?;
        let nested = render.append_text(span, "big")?;
        let line_break = render.append_line_break(root)?;
        let floated = render.append_out_of_flow(root)?;
        let world = render.append_text(root, "World")?;
        Ok((render, vec![hello, span, nested, line_break, floated, world]))
    }

    /// Every mirrored box maps back to its node and vice versa.
    ///
    /// # Panics
    /// Panics if a node/box mapping does not round-trip.
    #[test]
    fn node_mapping_round_trips() -> Result<()> {
        let (render, nodes) = sample_tree()?;
        let tree = BoxTree::build(&render, render.root())?;
        for node in nodes.iter().copied().filter(|node| *node != nodes[4]) {
            let id = tree.layout_box_for(node).context("node should be mirrored")?;
            assert_eq!(tree.renderer_for(id), Some(node));
            assert_eq!(tree.layout_box_for(node), Some(id));
        }
        assert_eq!(tree.layout_box_for(nodes[4]), None, "out-of-flow is skipped");
        assert_eq!(tree.layout_box_for(NodeKey(999)), None);
        Ok(())
    }

    /// Leaves come out in document order, descending into inline boxes.
    ///
    /// # Panics
    /// Panics if leaf order differs from document order.
    #[test]
    fn leaves_in_document_order() -> Result<()> {
        let (render, nodes) = sample_tree()?;
        let tree = BoxTree::build(&render, render.root())?;
        let leaves: Vec<_> = tree
            .leaves()
            .filter_map(|id| tree.renderer_for(id))
            .collect();
        assert_eq!(leaves, vec![nodes[0], nodes[2], nodes[3], nodes[5]]);
        Ok(())
    }

    /// Root style updates reach anonymous children but not styled inline boxes.
    ///
    /// # Panics
    /// Panics if the style is not propagated as expected.
    #[test]
    fn update_style_refreshes_anonymous_boxes() -> Result<()> {
        let (render, nodes) = sample_tree()?;
        let mut tree = BoxTree::build(&render, render.root())?;
        let mut bigger = InlineStyle::default();
        bigger.font.size = LayoutUnit::from_px_i32(24);
        let len_before = tree.len();
        assert!(tree.update_style(Arc::new(bigger.clone())));
        assert_eq!(tree.len(), len_before);

        let hello = tree.layout_box_for(nodes[0]).context("hello")?;
        let span = tree.layout_box_for(nodes[1]).context("span")?;
        let nested = tree.layout_box_for(nodes[2]).context("nested")?;
        assert_eq!(tree.get(hello).map(LayoutBox::style), Some(&bigger));
        assert_ne!(tree.get(span).map(LayoutBox::style), Some(&bigger));
        assert_ne!(tree.get(nested).map(LayoutBox::style), Some(&bigger));

        assert!(!tree.update_style(Arc::new(bigger)), "same style is not a change");
        Ok(())
    }

    /// Removing a subtree unmaps it; re-inserting restores document order.
    ///
    /// # Panics
    /// Panics if removal or insertion leaves stale mappings.
    #[test]
    fn remove_and_insert() -> Result<()> {
        let (mut render, nodes) = sample_tree()?;
        let mut tree = BoxTree::build(&render, render.root())?;
        assert!(tree.remove_subtree(nodes[1]));
        assert_eq!(tree.layout_box_for(nodes[1]), None);
        assert_eq!(tree.layout_box_for(nodes[2]), None);
        assert!(!tree.remove_subtree(render.root()));

        let extra = render.append_text(render.root(), "!")?;
        tree.insert_child(&render, render.root(), extra)?;
        let leaves: Vec<_> = tree
            .leaves()
            .filter_map(|id| tree.renderer_for(id))
            .collect();
        assert_eq!(leaves, vec![nodes[0], nodes[3], nodes[5], extra]);
        assert!(tree.insert_child(&render, render.root(), extra).is_err());
        Ok(())
    }

    /// A text node with its own style keeps it; unstyled text inherits.
    ///
    /// # Panics
    /// Panics if the styled text inherits the root style.
    #[test]
    fn styled_text_keeps_own_style() -> Result<()> {
        let mut render = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
        let styled = render.append_text(render.root(), "styled")?;
        let plain = render.append_text(render.root(), "plain")?;
        let mut own = InlineStyle::default();
        own.font.size = LayoutUnit::from_px_i32(30);
        render.set_style(styled, Arc::new(own.clone()))?;
        let tree = BoxTree::build(&render, render.root())?;

        let styled_box = tree
            .layout_box_for(styled)
            .and_then(|id| tree.get(id))
            .context("styled text")?;
        assert_eq!(styled_box.style_origin(), StyleOrigin::Own);
        assert_eq!(styled_box.style(), &own);
        let plain_box = tree
            .layout_box_for(plain)
            .and_then(|id| tree.get(id))
            .context("plain text")?;
        assert_eq!(plain_box.style_origin(), StyleOrigin::Root);
        Ok(())
    }

    /// Insert/remove churn reuses slots, and ids of removed boxes stay dead.
    ///
    /// # Panics
    /// Panics if the arena grows with churn or a stale id resolves.
    #[test]
    fn removed_slots_are_reused() -> Result<()> {
        let mut render = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
        let root = render.root();
        render.append_text(root, "keep")?;
        let mut tree = BoxTree::build(&render, root)?;
        let capacity = tree.capacity();

        let mut stale = Vec::new();
        for _ in 0..50 {
            let node = render.append_text(root, "churn")?;
            tree.insert_child(&render, root, node)?;
            stale.push(tree.layout_box_for(node).context("inserted node")?);
            assert!(tree.remove_subtree(node));
            assert!(render.remove(node));
        }
        assert_eq!(tree.capacity(), capacity + 1);
        assert_eq!(stale[0].index(), stale[49].index());
        assert_ne!(stale[0], stale[49]);

        let last = render.append_text(root, "last")?;
        tree.insert_child(&render, root, last)?;
        assert!(stale.iter().all(|id| tree.get(*id).is_none()));
        assert_eq!(tree.len(), 3);
        Ok(())
    }

    /// An unknown container is an error rather than an empty tree.
    ///
    /// # Panics
    /// Panics if building succeeds.
    #[test]
    fn unknown_container_fails() {
        let render = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
        assert!(BoxTree::build(&render, NodeKey(42)).is_err());
    }
}

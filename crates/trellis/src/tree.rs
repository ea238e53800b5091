//! The widget tree: an arena of nodes over which input rays are cast.
use std::any::Any;

use slotmap::SlotMap;

use crate::{
    error::{Error, Result},
    event::Event,
    geom::{Point, Rect},
    id::NodeId,
    node::Node,
    state::{InputState, NodeName},
    widget::{EventOutcome, Widget},
};

/// Root widget backing the implicit root node.
///
/// Transparent to input so rays pass through to the host's own nodes.
#[derive(Default)]
struct Backdrop;

impl Widget for Backdrop {
    fn accepts_input(&self) -> bool {
        false
    }

    fn name(&self) -> NodeName {
        NodeName::convert("root")
    }
}

/// A tree of widget nodes with absolute-coordinate bounds.
///
/// The tree owns structure and geometry only. Hover, press and focus flags
/// on nodes are transient state managed by the router. Rects are supplied by
/// the host in absolute screen coordinates; the root starts with a zero rect
/// and is typically sized to the window before any input arrives.
pub struct Tree {
    /// Arena storage for all nodes.
    nodes: SlotMap<NodeId, Node>,
    /// The permanent root node.
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree containing only the root node.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(Box::new(Backdrop), None));
        Self { nodes, root }
    }

    /// The permanent root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if only the root node exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// True if `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node's data.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Insert a widget as the last child of `parent`.
    ///
    /// The new node is enabled, idle and has a zero rect.
    pub fn insert<W: Into<Box<dyn Widget>>>(
        &mut self,
        parent: NodeId,
        widget: W,
    ) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let id = self.nodes.insert(Node::new(widget.into(), Some(parent)));
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    /// Remove a node and all its descendants.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::Tree("cannot remove the root".into()));
        }
        if !self.nodes.contains_key(id) {
            return Err(Error::NodeNotFound(id));
        }
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent)
            && let Some(node) = self.nodes.get_mut(parent)
        {
            node.children.retain(|c| *c != id);
        }
        for node_id in self.subtree(id) {
            self.nodes.remove(node_id);
        }
        Ok(())
    }

    /// Move a node, with its subtree, under a new parent as its last child.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(Error::NodeNotFound(id));
        }
        if !self.nodes.contains_key(new_parent) {
            return Err(Error::NodeNotFound(new_parent));
        }
        if id == self.root {
            return Err(Error::Tree("cannot reparent the root".into()));
        }
        if new_parent == id || self.is_ancestor(id, new_parent) {
            return Err(Error::Tree("reparent would create a cycle".into()));
        }
        let old_parent = self.nodes.get(id).and_then(|n| n.parent);
        if old_parent == Some(new_parent) {
            return Err(Error::Tree("node is already a child of the target".into()));
        }
        if let Some(old) = old_parent
            && let Some(node) = self.nodes.get_mut(old)
        {
            node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.nodes.get_mut(new_parent) {
            node.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = Some(new_parent);
        }
        Ok(())
    }

    /// Set a node's bounds in absolute screen coordinates.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) -> Result<()> {
        if !rect.is_valid() {
            return Err(Error::Geometry(format!("invalid rect {rect:?}")));
        }
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        node.rect = rect;
        Ok(())
    }

    /// A node's bounds. Zero for stale ids.
    pub fn rect(&self, id: NodeId) -> Rect {
        self.nodes.get(id).map_or(Rect::ZERO, |n| n.rect)
    }

    /// Enable or disable a node. Disabled subtrees are invisible to input.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        node.enabled = enabled;
        Ok(())
    }

    /// True if the node exists and is enabled.
    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.enabled)
    }

    /// A node's parent, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// A node's children, in z-order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// True if the point falls within the node's bounds.
    pub fn contains_point(&self, id: NodeId, p: Point) -> bool {
        self.nodes.get(id).is_some_and(|n| n.rect.contains(p))
    }

    /// Return true if `ancestor` appears strictly above `node` in the parent
    /// chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// True if the nodes are equal or one is an ancestor of the other.
    pub fn is_related(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    /// Locate the deepest input-accepting node under a point.
    ///
    /// Children are searched in z-order and later hits win, so overlapping
    /// siblings resolve to the one on top. Disabled or out-of-bounds
    /// subtrees are pruned whole.
    pub fn node_at(&self, p: Point) -> Option<NodeId> {
        self.node_at_in(self.root, p)
    }

    /// Like [`Tree::node_at`], restricted to the subtree under `start`.
    pub fn node_at_in(&self, start: NodeId, p: Point) -> Option<NodeId> {
        let mut result = None;
        locate_recursive(self, start, p, true, &mut result);
        result
    }

    /// Locate the deepest node under a point, ignoring the accepts-input
    /// filter.
    ///
    /// Pruning of disabled and out-of-bounds subtrees still applies. For
    /// internal bookkeeping, not for dispatch.
    pub fn node_at_any(&self, p: Point) -> Option<NodeId> {
        let mut result = None;
        locate_recursive(self, self.root, p, false, &mut result);
        result
    }

    /// Borrow a node's widget as a concrete type.
    pub fn widget<T: Widget>(&self, id: NodeId) -> Option<&T> {
        let w: &dyn Any = self.nodes.get(id)?.widget.as_ref();
        w.downcast_ref()
    }

    /// Mutably borrow a node's widget as a concrete type.
    pub fn widget_mut<T: Widget>(&mut self, id: NodeId) -> Option<&mut T> {
        let w: &mut dyn Any = self.nodes.get_mut(id)?.widget.as_mut();
        w.downcast_mut()
    }

    /// Deliver an event to a single node, without any dispatch walk.
    pub fn on_event(&mut self, id: NodeId, event: &Event) -> EventOutcome {
        match self.nodes.get_mut(id) {
            Some(node) => node.widget.on_event(event),
            None => EventOutcome::Ignore,
        }
    }

    /// A node's diagnostic name.
    pub fn node_name(&self, id: NodeId) -> Option<NodeName> {
        self.nodes.get(id).map(|n| n.name.clone())
    }

    /// True if the node's widget accepts input.
    pub(crate) fn accepts_input(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.widget.accepts_input())
    }

    /// True if the node's widget can take focus.
    pub(crate) fn accept_focus(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.widget.accept_focus())
    }

    /// True if the node's widget wants multi-click counts.
    pub(crate) fn accepts_multi_click(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.widget.accepts_multi_click())
    }

    /// A node's mouse-interaction state. Idle for stale ids.
    pub fn input_state(&self, id: NodeId) -> InputState {
        self.nodes.get(id).map_or(InputState::Idle, |n| n.input_state)
    }

    /// Set a node's mouse-interaction state.
    pub(crate) fn set_input_state(&mut self, id: NodeId, state: InputState) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.input_state = state;
        }
    }

    /// True if the node is part of the focus chain.
    pub fn is_focused(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.focused)
    }

    /// Set or clear a node's focus flag, without dispatch.
    pub(crate) fn set_focus_flag(&mut self, id: NodeId, focused: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.focused = focused;
        }
    }

    /// Clear hover, press and focus flags on every node.
    pub(crate) fn clear_transient(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            node.input_state = InputState::Idle;
            node.focused = false;
        }
    }

    /// Render the tree as an indented debug listing.
    ///
    /// Each line shows a node's name, rect and any state markers.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    /// Append one node and its subtree to the dump.
    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let r = node.rect;
        out.push_str(&format!(
            "{:indent$}{} [{},{} {}x{}]",
            "",
            node.name,
            r.x,
            r.y,
            r.w,
            r.h,
            indent = depth * 2
        ));
        if !node.enabled {
            out.push_str(" disabled");
        }
        match node.input_state {
            InputState::Idle => {}
            InputState::Hovered => out.push_str(" hover"),
            InputState::Pressed => out.push_str(" pressed"),
        }
        if node.focused {
            out.push_str(" focus");
        }
        out.push('\n');
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }

    /// Collect a subtree in post-order, including its root.
    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((node_id, visited)) = stack.pop() {
            if visited {
                out.push(node_id);
                continue;
            }
            stack.push((node_id, true));
            if let Some(node) = self.nodes.get(node_id) {
                for child in node.children.iter().rev() {
                    stack.push((*child, false));
                }
            }
        }
        out
    }
}

/// Depth-first search for a node at a point.
///
/// A hit on the current node is recorded before recursing, so deeper and
/// later matches overwrite shallower and earlier ones.
fn locate_recursive(
    tree: &Tree,
    node_id: NodeId,
    point: Point,
    filter: bool,
    result: &mut Option<NodeId>,
) {
    let Some(node) = tree.nodes.get(node_id) else {
        return;
    };
    if !node.enabled || !node.rect.contains(point) {
        return;
    }
    if !filter || node.widget.accepts_input() {
        *result = Some(node_id);
    }
    for &child in &node.children {
        locate_recursive(tree, child, point, filter, result);
    }
}

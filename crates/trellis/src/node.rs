use crate::{geom::Rect, id::NodeId, state::InputState, state::NodeName, widget::Widget};

/// Core node data stored in the arena.
pub struct Node {
    /// Widget behavior and state.
    pub(crate) widget: Box<dyn Widget>,

    /// Parent in the arena tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree, in z-order: later children sit on top.
    pub(crate) children: Vec<NodeId>,

    /// Bounds in absolute screen coordinates, supplied by the host.
    pub(crate) rect: Rect,
    /// Disabled nodes are invisible to hit-testing, subtree included.
    pub(crate) enabled: bool,
    /// Node name for dumps and traces, cached at insertion.
    pub(crate) name: NodeName,

    /// Mouse-interaction state, managed by the router.
    pub(crate) input_state: InputState,
    /// Whether this node is part of the focus chain.
    pub(crate) focused: bool,
}

impl Node {
    /// Wrap a widget into a fresh, enabled node with a zero rect.
    pub(crate) fn new(widget: Box<dyn Widget>, parent: Option<NodeId>) -> Self {
        let name = widget.name();
        Self {
            widget,
            parent,
            children: Vec::new(),
            rect: Rect::ZERO,
            enabled: true,
            name,
            input_state: InputState::default(),
            focused: false,
        }
    }

    /// Return the node's name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the bounds in absolute screen coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Return true if the node participates in hit-testing.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Return the current mouse-interaction state.
    pub fn input_state(&self) -> InputState {
        self.input_state
    }

    /// Return true if the node is part of the focus chain.
    pub fn focused(&self) -> bool {
        self.focused
    }
}

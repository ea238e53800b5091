//! Widget trait and event outcome types.

use std::any::{Any, type_name};

use crate::{event::Event, state::NodeName};

/// The result of an event handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventOutcome {
    /// The event was fully handled and propagation stops.
    Handle,
    /// The event was not handled and will bubble up the tree.
    Ignore,
}

impl EventOutcome {
    /// True for [`EventOutcome::Handle`].
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handle)
    }
}

/// Widgets are the behavior attached to nodes in the tree arena.
///
/// A widget only sees its own events; it has no access to the tree or the
/// router from inside a handler, so handlers cannot re-enter the dispatch
/// walk. Structural changes happen between events, driven by the host.
pub trait Widget: Any + Send {
    /// Handle an event delivered to this node.
    ///
    /// Return [`EventOutcome::Handle`] exactly when the event was fully
    /// consumed. Anything else lets it bubble to the parent.
    fn on_event(&mut self, _event: &Event) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Whether this node is a hit-test target.
    ///
    /// Nodes that refuse input are transparent to the cursor: hit-testing
    /// passes through them to whatever lies beneath, though their children
    /// are still considered.
    fn accepts_input(&self) -> bool {
        true
    }

    /// Whether this widget can take keyboard focus.
    fn accept_focus(&self) -> bool {
        false
    }

    /// Whether this widget wants double/triple-click counts.
    ///
    /// Widgets that do not opt in receive every click in a rapid combo as a
    /// discrete single click.
    fn accepts_multi_click(&self) -> bool {
        false
    }

    /// Name used for dumps, logs and test traces.
    fn name(&self) -> NodeName {
        NodeName::convert(type_name::<Self>())
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}

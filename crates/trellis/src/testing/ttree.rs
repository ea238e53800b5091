/*! This module defines a standard tree of instrumented widgets for testing. */
use std::cell::RefCell;

use crate::{
    error::Result,
    event::{Event, mouse::MouseEvent},
    geom::Rect,
    id::NodeId,
    router::InputRouter,
    settings::Settings,
    state::NodeName,
    tree::Tree,
    widget::{EventOutcome, Widget},
};

/// Thread-local state tracked by test widgets.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct State {
    /// Recorded event path entries.
    pub path: Vec<String>,
}

impl State {
    /// Construct a new empty state.
    pub fn new() -> Self {
        Self { path: vec![] }
    }
    /// Clear recorded events.
    pub fn reset(&mut self) {
        self.path = vec![];
    }
    /// Record a widget event.
    pub fn add_event(&mut self, n: &NodeName, evt: &str, result: &EventOutcome) {
        let outcome = match result {
            EventOutcome::Handle => "handle",
            EventOutcome::Ignore => "ignore",
        };
        self.path.push(format!("{n}@{evt}->{outcome}"))
    }
}

thread_local! {
    pub(crate) static TSTATE: RefCell<State> = RefCell::new(State::new());
}

/// Clear the global test state.
pub fn reset_state() {
    TSTATE.with(|s| {
        s.borrow_mut().reset();
    });
}

/// Get the current test state.
pub fn get_state() -> State {
    TSTATE.with(|s| s.borrow().clone())
}

/// Allows tests to set the next event outcome on a widget.
pub trait OutcomeTarget {
    /// Set the next event outcome.
    fn set_outcome(&mut self, outcome: EventOutcome);
}

/// Set the next event outcome on an instrumented node.
pub fn set_outcome<W: Widget + OutcomeTarget>(tree: &mut Tree, id: NodeId, outcome: EventOutcome) {
    if let Some(w) = tree.widget_mut::<W>(id) {
        w.set_outcome(outcome);
    }
}

/// Generate an instrumented test widget type.
macro_rules! twidget {
    ($name:ident) => {
        /// Test widget with instrumented behavior.
        pub struct $name {
            /// Next event outcome override, consumed by one event.
            pub next_outcome: Option<EventOutcome>,
            /// Outcome returned when no override is queued.
            pub default_outcome: EventOutcome,
            /// Whether hit-testing may land on this widget.
            pub accepts_input: bool,
            /// Whether the widget takes focus.
            pub focusable: bool,
            /// Whether combo click counts are delivered whole.
            pub multi_click: bool,
        }

        impl $name {
            /// Construct a new test widget.
            pub fn new() -> Self {
                $name {
                    next_outcome: None,
                    default_outcome: EventOutcome::Ignore,
                    accepts_input: true,
                    focusable: true,
                    multi_click: false,
                }
            }

            /// Record a test event for this widget.
            fn handle(&mut self, evt: &str) -> EventOutcome {
                let ret = if let Some(x) = self.next_outcome.take() {
                    x
                } else {
                    self.default_outcome
                };
                TSTATE.with(|s| {
                    s.borrow_mut().add_event(&self.name(), evt, &ret);
                });
                ret
            }
        }

        impl Widget for $name {
            fn on_event(&mut self, event: &Event) -> EventOutcome {
                // Click counts and scroll deltas matter to tests, so those
                // labels carry the payload.
                match event {
                    Event::Mouse(MouseEvent::Clicked { clicks, .. }) => {
                        self.handle(&format!("clicked:{clicks}"))
                    }
                    Event::Mouse(MouseEvent::Scrolled { dx, dy, .. }) => {
                        self.handle(&format!("scrolled:{dx},{dy}"))
                    }
                    _ => self.handle(event.label()),
                }
            }

            fn accepts_input(&self) -> bool {
                self.accepts_input
            }

            fn accept_focus(&self) -> bool {
                self.focusable
            }

            fn accepts_multi_click(&self) -> bool {
                self.multi_click
            }

            fn name(&self) -> NodeName {
                NodeName::convert(stringify!($name))
            }
        }

        impl OutcomeTarget for $name {
            fn set_outcome(&mut self, outcome: EventOutcome) {
                self.next_outcome = Some(outcome);
            }
        }
    };
}

twidget!(R);
twidget!(Ba);
twidget!(Bb);
twidget!(BaLa);
twidget!(BaLb);
twidget!(BbLa);
twidget!(BbLb);

/// Node ids for the standard test tree.
///
/// Geometry, in absolute window coordinates:
///
/// ```text
/// |---------------------|---------------------|
/// | a_a (0,0 50x50)     | b_a (50,0 50x50)    |
/// |---------------------|---------------------|
/// | a_b (0,50 50x50)    | b_b (50,50 50x50)   |
/// |---------------------|---------------------|
/// ```
///
/// `a` spans the left half, `b` the right half, and `root` the whole
/// 100x100 window.
#[derive(Debug, Clone, Copy)]
pub struct TestTree {
    /// Root-level instrumented node covering the window.
    pub root: NodeId,
    /// Left branch node id.
    pub a: NodeId,
    /// Right branch node id.
    pub b: NodeId,
    /// Left-left leaf id.
    pub a_a: NodeId,
    /// Left-right leaf id.
    pub a_b: NodeId,
    /// Right-left leaf id.
    pub b_a: NodeId,
    /// Right-right leaf id.
    pub b_b: NodeId,
}

/// Build the standard test tree and attach its geometry.
fn build_tree(tree: &mut Tree) -> Result<TestTree> {
    let window = Rect::new(0.0, 0.0, 100.0, 100.0);
    tree.set_rect(tree.root(), window)?;
    let root = tree.insert(tree.root(), R::new())?;
    tree.set_rect(root, window)?;

    let a = tree.insert(root, Ba::new())?;
    let b = tree.insert(root, Bb::new())?;
    tree.set_rect(a, Rect::new(0.0, 0.0, 50.0, 100.0))?;
    tree.set_rect(b, Rect::new(50.0, 0.0, 50.0, 100.0))?;

    let a_a = tree.insert(a, BaLa::new())?;
    let a_b = tree.insert(a, BaLb::new())?;
    tree.set_rect(a_a, Rect::new(0.0, 0.0, 50.0, 50.0))?;
    tree.set_rect(a_b, Rect::new(0.0, 50.0, 50.0, 50.0))?;

    let b_a = tree.insert(b, BbLa::new())?;
    let b_b = tree.insert(b, BbLb::new())?;
    tree.set_rect(b_a, Rect::new(50.0, 0.0, 50.0, 50.0))?;
    tree.set_rect(b_b, Rect::new(50.0, 50.0, 50.0, 50.0))?;

    Ok(TestTree {
        root,
        a,
        b,
        a_a,
        a_b,
        b_a,
        b_b,
    })
}

/// Run a function on our standard input setup built from [`ttree`](self).
pub fn run_ttree(
    func: impl FnOnce(&mut InputRouter, &mut Tree, TestTree) -> Result<()>,
) -> Result<()> {
    let mut tree = Tree::new();
    let tt = build_tree(&mut tree)?;
    let mut router = InputRouter::new(Settings::default());
    reset_state();
    func(&mut router, &mut tree, tt)
}

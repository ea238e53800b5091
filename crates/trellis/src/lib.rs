//! Trellis: a retained-mode input layer for widget trees.
//!
//! Trellis turns raw platform callbacks into typed events delivered to a
//! tree of widgets. It provides hit-testing over absolute-coordinate
//! bounds, hover and press tracking, drag and click-combo state machines,
//! a focus chain, and a keybind registry with interactive chord recording.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`InputRouter`] - Feeds platform callbacks through binds and the tree
//! - [`Tree`] - The widget arena with geometry and hit-testing
//! - [`Widget`] - The trait implemented by all widgets
//! - [`Binder`] - The keybind registry
//!
//! # Module Organization
//!
//! - [`event`] - The event taxonomy delivered to widgets
//! - [`geom`] - Geometry primitives (Point, Rect)
//! - [`state`] - Node names and interaction state
//! - [`error`] - Error and result types

#![allow(clippy::new_without_default)]
#![warn(missing_docs)]

// Internal modules - re-export specific items below
mod bind;
mod binder;
mod focus;
mod id;
mod node;
mod router;
mod settings;
mod tree;
mod widget;

// Public modules
pub mod error;
pub mod event;
pub mod geom;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export core types
pub use bind::{Action, Bind};
pub use binder::{Binder, RecordingDone};
pub use error::{Error, Result};
pub use event::{
    Event, FocusEvent,
    key::{Key, Mods},
    mouse::{Button, MouseEvent},
};
pub use focus::FocusManager;
pub use id::NodeId;
// Export commonly used geometry types at the root
pub use geom::{Point, Rect};
pub use node::Node;
pub use router::InputRouter;
pub use settings::Settings;
pub use state::{InputState, NodeName};
pub use tree::Tree;
pub use widget::{EventOutcome, Widget};

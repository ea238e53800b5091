//! The typed event taxonomy dispatched to widgets.
pub mod key;
pub mod mouse;

use std::path::PathBuf;

use crate::event::{
    key::{Key, Mods},
    mouse::MouseEvent,
};

/// A keyboard or focus-targeted event, routed to the focused node.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusEvent {
    /// The node became the focus target.
    Gained,
    /// The node left the focus chain.
    Lost,
    /// A mapped key was pressed.
    KeyDown {
        /// The pressed key.
        key: Key,
        /// Modifiers held at the press.
        mods: Mods,
    },
    /// A mapped key was released.
    KeyUp {
        /// The released key.
        key: Key,
        /// Modifiers held at the release.
        mods: Mods,
    },
    /// A printable character was typed, after platform keymap translation.
    Typed(char),
    /// A key the platform could not map to [`Key`], by raw scan code.
    RawKey {
        /// Platform scan code.
        code: u32,
        /// Whether this is a press or a release.
        down: bool,
    },
    /// Files were dropped onto the window.
    FileDrop(Vec<PathBuf>),
}

/// This enum represents every event the router can deliver to a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A mouse event, routed along the hover chain.
    Mouse(MouseEvent),
    /// A keyboard or focus event, routed along the focus chain.
    Focus(FocusEvent),
}

impl Event {
    /// Whether this event belongs to the focus category.
    ///
    /// Focus events skip focusable nodes other than their own target during
    /// the dispatch walk.
    pub const fn is_focus(&self) -> bool {
        matches!(self, Self::Focus(_))
    }

    /// A short lowercase label for the event kind, for logs and test traces.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Mouse(m) => match m {
                MouseEvent::Moved { .. } => "moved",
                MouseEvent::Pressed { .. } => "pressed",
                MouseEvent::Released { .. } => "released",
                MouseEvent::Clicked { .. } => "clicked",
                MouseEvent::Scrolled { .. } => "scrolled",
                MouseEvent::DragStarted { .. } => "drag_started",
                MouseEvent::Dragged { .. } => "dragged",
                MouseEvent::DragEnded { .. } => "drag_ended",
            },
            Self::Focus(k) => match k {
                FocusEvent::Gained => "gained",
                FocusEvent::Lost => "lost",
                FocusEvent::KeyDown { .. } => "key_down",
                FocusEvent::KeyUp { .. } => "key_up",
                FocusEvent::Typed(_) => "typed",
                FocusEvent::RawKey { .. } => "raw_key",
                FocusEvent::FileDrop(_) => "file_drop",
            },
        }
    }
}

impl From<MouseEvent> for Event {
    fn from(e: MouseEvent) -> Self {
        Self::Mouse(e)
    }
}

impl From<FocusEvent> for Event {
    fn from(e: FocusEvent) -> Self {
        Self::Focus(e)
    }
}

//! Mouse buttons and the mouse half of the event taxonomy.
use std::fmt;

use crate::{event::key::Mods, geom::Point};

/// Mouse button codes.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// Left (primary) mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
    /// Any other button, by platform code.
    Other(u8),
}

impl Button {
    /// The platform button code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
            Self::Other(n) => n,
        }
    }
}

impl From<u8> for Button {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Middle,
            n => Self::Other(n),
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "LMB"),
            Self::Right => write!(f, "RMB"),
            Self::Middle => write!(f, "MMB"),
            Self::Other(n) => write!(f, "Mouse{n}"),
        }
    }
}

/// A mouse input event, routed to the node under the cursor.
///
/// Positions are absolute screen coordinates. Drag events carry the press
/// origin alongside the current position so handlers can compute the total
/// displacement without tracking it themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseEvent {
    /// Cursor moved with no primary button held.
    Moved {
        /// Cursor location.
        pos: Point,
    },
    /// Button press.
    Pressed {
        /// The pressed button.
        button: Button,
        /// Cursor location.
        pos: Point,
        /// Modifiers held at the press.
        mods: Mods,
    },
    /// Button release.
    Released {
        /// The released button.
        button: Button,
        /// Cursor location.
        pos: Point,
        /// Modifiers held at the release.
        mods: Mods,
    },
    /// A completed click, after press/release disambiguation.
    Clicked {
        /// The clicked button.
        button: Button,
        /// Cursor location.
        pos: Point,
        /// Modifiers held at the release.
        mods: Mods,
        /// Combo count: 1 for a single click, 2 for a double, and so on.
        clicks: u8,
    },
    /// Scroll wheel or trackpad scroll, after axis and sign adjustment.
    Scrolled {
        /// Horizontal scroll amount.
        dx: f32,
        /// Vertical scroll amount.
        dy: f32,
        /// Modifiers held while scrolling.
        mods: Mods,
    },
    /// Primary-button movement first crossed the drag threshold.
    ///
    /// Handling this event cancels the drag: no further drag events fire
    /// for the rest of the press.
    DragStarted {
        /// Location of the originating press.
        origin: Point,
        /// Current cursor location.
        pos: Point,
    },
    /// Cursor moved during an active drag.
    Dragged {
        /// Location of the originating press.
        origin: Point,
        /// Current cursor location.
        pos: Point,
    },
    /// Primary button released during an active drag.
    ///
    /// Handling this event suppresses the click that would otherwise
    /// follow the release.
    DragEnded {
        /// Location of the originating press.
        origin: Point,
        /// Release location.
        pos: Point,
    },
}

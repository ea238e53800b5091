//! This module contains the core primitives to represent keyboard input.
use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Held modifier keys, one bit per physical key.
    ///
    /// Left and right sides are tracked separately; the `SHIFT`/`CTRL`/`ALT`/
    /// `META` composites cover both sides of a pair. Hosts feed the
    /// platform's primary shortcut modifier through the ctrl pair (Command on
    /// macOS) and the secondary through the alt pair, so binds written
    /// against `CTRL` behave the same on every platform.
    #[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct Mods: u8 {
        /// Left shift.
        const LSHIFT = 1 << 0;
        /// Right shift.
        const RSHIFT = 1 << 1;
        /// Left primary (control, or Command on macOS).
        const LCTRL = 1 << 2;
        /// Right primary.
        const RCTRL = 1 << 3;
        /// Left secondary (alt/option).
        const LALT = 1 << 4;
        /// Right secondary.
        const RALT = 1 << 5;
        /// Left meta.
        const LMETA = 1 << 6;
        /// Right meta.
        const RMETA = 1 << 7;

        /// Either shift key.
        const SHIFT = Self::LSHIFT.bits() | Self::RSHIFT.bits();
        /// Either primary key.
        const CTRL = Self::LCTRL.bits() | Self::RCTRL.bits();
        /// Either secondary key.
        const ALT = Self::LALT.bits() | Self::RALT.bits();
        /// Either meta key.
        const META = Self::LMETA.bits() | Self::RMETA.bits();
    }
}

/// The four left/right pairs, with display labels.
const PAIRS: [(&str, Mods); 4] = [
    ("Ctrl", Mods::CTRL),
    ("Alt", Mods::ALT),
    ("Shift", Mods::SHIFT),
    ("Meta", Mods::META),
];

impl Mods {
    /// Number of held modifier bits.
    pub const fn len(self) -> u32 {
        self.bits().count_ones()
    }

    /// Any shift key held.
    pub const fn shift(self) -> bool {
        self.intersects(Self::SHIFT)
    }

    /// Any primary key held.
    pub const fn ctrl(self) -> bool {
        self.intersects(Self::CTRL)
    }

    /// Any secondary key held.
    pub const fn alt(self) -> bool {
        self.intersects(Self::ALT)
    }

    /// Any meta key held.
    pub const fn meta(self) -> bool {
        self.intersects(Self::META)
    }

    /// Collapse to the lenient form: any held side of a pair sets both sides.
    pub fn lenient(self) -> Self {
        let mut out = Self::empty();
        for (_, pair) in PAIRS {
            if self.intersects(pair) {
                out |= pair;
            }
        }
        out
    }

    /// Equality after collapsing left/right pairs.
    pub fn equal_lenient(self, other: Self) -> bool {
        self.lenient() == other.lenient()
    }

    /// Whether `held` satisfies this set as a requirement, pair by pair.
    ///
    /// A pair with both sides set is satisfied by either held side; a lone
    /// left or right bit requires that exact side. `held` may carry extra
    /// modifiers beyond the requirement.
    pub fn contained_by(self, held: Self) -> bool {
        PAIRS.iter().all(|&(_, pair)| {
            let want = self.intersection(pair);
            if want.is_empty() {
                true
            } else if want == pair {
                held.intersects(pair)
            } else {
                held.contains(want)
            }
        })
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (label, pair) in PAIRS {
            if self.intersects(pair) {
                if !first {
                    write!(f, " + ")?;
                }
                write!(f, "{label}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Logical key codes for the mapped, layout-independent keys.
///
/// Character keys travel as [`Key::Char`]; anything the platform cannot map
/// takes the unmapped raw-code path instead and never appears here.
#[derive(Debug, PartialOrd, Ord, PartialEq, Hash, Eq, Clone, Copy)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Tab key.
    Tab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up key.
    PageUp,
    /// Page down key.
    PageDown,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// F key.
    ///
    /// `Key::F(1)` represents the F1 key, etc.
    F(u8),
    /// A character key.
    ///
    /// `Key::Char('s')` represents the S key, etc.
    Char(char),
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl PartialEq<char> for Key {
    fn eq(&self, other: &char) -> bool {
        matches!(self, Self::Char(c) if c == other)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Escape => write!(f, "Esc"),
            Self::Enter => write!(f, "Enter"),
            Self::Backspace => write!(f, "Backspace"),
            Self::Tab => write!(f, "Tab"),
            Self::Delete => write!(f, "Delete"),
            Self::Insert => write!(f, "Insert"),
            Self::Home => write!(f, "Home"),
            Self::End => write!(f, "End"),
            Self::PageUp => write!(f, "PageUp"),
            Self::PageDown => write!(f, "PageDown"),
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
            Self::F(n) => write!(f, "F{n}"),
            Self::Char(c) => write!(f, "{}", c.to_uppercase()),
        }
    }
}

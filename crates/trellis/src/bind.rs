//! A single keybind: match criteria plus a fire state machine.
use std::{collections::BTreeSet, fmt, time::Duration};

use crate::event::{key::Key, key::Mods, mouse::Button};

/// The action invoked when a bind fires.
///
/// Called with `true` on activation and `false` on deactivation. The return
/// value reports whether the action consumed the input, which callers use to
/// swallow the underlying UI event.
pub type Action = Box<dyn FnMut(bool) -> bool>;

/// A mapping from simultaneously held keys, buttons and modifiers to an
/// action.
///
/// Each axis is optional: `None` means that axis does not constrain the
/// match. A bind with no keys, no buttons and no modifiers never matches.
/// With a nonzero hold duration the bind fires only after the chord has been
/// held that long, accumulated across update ticks; otherwise it fires on
/// the press edge that completes the chord.
pub struct Bind {
    /// Required raw scan codes, or `None` for don't-care.
    pub(crate) raw: Option<BTreeSet<u32>>,
    /// Required mapped keys, or `None` for don't-care.
    pub(crate) keys: Option<BTreeSet<Key>>,
    /// Required mouse buttons, or `None` for don't-care.
    pub(crate) mouse: Option<BTreeSet<Button>>,
    /// Required modifiers.
    pub(crate) mods: Mods,
    /// Minimum hold duration before firing. Zero means edge-triggered.
    pub(crate) hold: Duration,
    /// The user action.
    pub(crate) action: Action,

    /// Accumulated hold time for the current match run.
    pub(crate) time: Duration,
    /// Whether the action has fired for the current match run.
    pub(crate) ran: bool,
    /// Muted binds never fire; used while a bind is being recorded.
    pub(crate) muted: bool,
}

impl Bind {
    /// Create an unbound bind wrapping an action.
    ///
    /// Populate the match criteria with the `with_` builder methods, or by
    /// recording.
    pub fn new(action: impl FnMut(bool) -> bool + 'static) -> Self {
        Self {
            raw: None,
            keys: None,
            mouse: None,
            mods: Mods::empty(),
            hold: Duration::ZERO,
            action: Box::new(action),
            time: Duration::ZERO,
            ran: false,
            muted: false,
        }
    }

    /// Require these mapped keys.
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys = Some(keys.into_iter().collect());
        self
    }

    /// Require these mouse buttons.
    pub fn with_mouse(mut self, mouse: impl IntoIterator<Item = Button>) -> Self {
        self.mouse = Some(mouse.into_iter().collect());
        self
    }

    /// Require these raw scan codes.
    pub fn with_raw(mut self, raw: impl IntoIterator<Item = u32>) -> Self {
        self.raw = Some(raw.into_iter().collect());
        self
    }

    /// Require these modifiers.
    pub fn with_mods(mut self, mods: Mods) -> Self {
        self.mods = mods;
        self
    }

    /// Require the chord to be held this long before firing.
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// The required mapped keys, if constrained.
    pub fn keys(&self) -> Option<&BTreeSet<Key>> {
        self.keys.as_ref()
    }

    /// The required mouse buttons, if constrained.
    pub fn mouse(&self) -> Option<&BTreeSet<Button>> {
        self.mouse.as_ref()
    }

    /// The required raw scan codes, if constrained.
    pub fn raw(&self) -> Option<&BTreeSet<u32>> {
        self.raw.as_ref()
    }

    /// The required modifiers.
    pub fn mods(&self) -> Mods {
        self.mods
    }

    /// The minimum hold duration.
    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// True while the bind is being recorded.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Number of required elements across all axes, modifier bits included.
    pub fn len(&self) -> usize {
        self.element_count() + self.mods.len() as usize
    }

    /// True if no axis constrains the match. Unbound binds never fire.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of required keys, buttons and scan codes, without modifiers.
    pub(crate) fn element_count(&self) -> usize {
        self.raw.as_ref().map_or(0, BTreeSet::len)
            + self.keys.as_ref().map_or(0, BTreeSet::len)
            + self.mouse.as_ref().map_or(0, BTreeSet::len)
    }

    /// Whether the held sets satisfy this bind's criteria.
    ///
    /// Binds with keys or buttons tolerate extra modifiers beyond their
    /// requirement. Modifier-only binds match the held modifiers exactly,
    /// up to left/right leniency.
    fn matches(
        &self,
        raw: &BTreeSet<u32>,
        keys: &BTreeSet<Key>,
        mouse: &BTreeSet<Button>,
        held: Mods,
    ) -> bool {
        if self.is_empty() {
            return false;
        }
        if !self.raw.as_ref().is_none_or(|r| r.is_subset(raw)) {
            return false;
        }
        if !self.keys.as_ref().is_none_or(|k| k.is_subset(keys)) {
            return false;
        }
        if !self.mouse.as_ref().is_none_or(|m| m.is_subset(mouse)) {
            return false;
        }
        if self.element_count() > 0 {
            self.mods.contained_by(held)
        } else {
            self.mods.equal_lenient(held)
        }
    }

    /// Advance the state machine against the current held sets.
    ///
    /// `delta` is nonzero only for time ticks; edge updates pass zero with
    /// `down` reporting the edge direction. Returns whether the action
    /// consumed the transition.
    pub fn update(
        &mut self,
        raw: &BTreeSet<u32>,
        keys: &BTreeSet<Key>,
        mouse: &BTreeSet<Button>,
        held: Mods,
        delta: Duration,
        down: bool,
    ) -> bool {
        if self.muted {
            return false;
        }
        // Edge-triggered binds do not react to time ticks.
        if self.hold.is_zero() && !delta.is_zero() {
            return false;
        }
        if !self.matches(raw, keys, mouse, held) {
            self.time = Duration::ZERO;
            if self.ran {
                self.ran = false;
                return (self.action)(false);
            }
            return false;
        }
        if !self.hold.is_zero() {
            self.time += delta;
            if !self.ran && self.time >= self.hold {
                self.ran = true;
                return (self.action)(true);
            }
            false
        } else if down && !self.ran {
            self.ran = true;
            (self.action)(true)
        } else {
            false
        }
    }

    /// Force the bind back to idle, deactivating it if it had fired.
    pub fn reset_state(&mut self) -> bool {
        self.time = Duration::ZERO;
        if self.ran {
            self.ran = false;
            return (self.action)(false);
        }
        false
    }

    /// Replace the match criteria with a recorded capture.
    pub(crate) fn set_capture(
        &mut self,
        raw: BTreeSet<u32>,
        keys: BTreeSet<Key>,
        mouse: BTreeSet<Button>,
        mods: Mods,
    ) {
        self.raw = (!raw.is_empty()).then_some(raw);
        self.keys = (!keys.is_empty()).then_some(keys);
        self.mouse = (!mouse.is_empty()).then_some(mouse);
        self.mods = mods;
    }
}

/// Structural equality over the match criteria, for duplicate detection.
/// The action and transient fire state never participate.
impl PartialEq for Bind {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
            && self.keys == other.keys
            && self.mouse == other.mouse
            && self.mods.equal_lenient(other.mods)
    }
}

impl fmt::Debug for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bind")
            .field("raw", &self.raw)
            .field("keys", &self.keys)
            .field("mouse", &self.mouse)
            .field("mods", &self.mods)
            .field("hold", &self.hold)
            .field("ran", &self.ran)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

/// Renders the chord the way a keybind configuration UI would show it, e.g.
/// `Ctrl + Shift + S`.
impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if !self.mods.is_empty() {
            parts.push(self.mods.to_string());
        }
        if let Some(keys) = &self.keys {
            parts.extend(keys.iter().map(Key::to_string));
        }
        if let Some(mouse) = &self.mouse {
            parts.extend(mouse.iter().map(Button::to_string));
        }
        if let Some(raw) = &self.raw {
            parts.extend(raw.iter().map(|c| format!("0x{c:x}")));
        }
        if parts.is_empty() {
            write!(f, "unbound")
        } else {
            write!(f, "{}", parts.join(" + "))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    /// An action that logs its activations and consumes them.
    fn logging_action(log: &Rc<RefCell<Vec<bool>>>) -> impl FnMut(bool) -> bool + 'static {
        let log = Rc::clone(log);
        move |on| {
            log.borrow_mut().push(on);
            true
        }
    }

    fn keyset(keys: &[Key]) -> BTreeSet<Key> {
        keys.iter().copied().collect()
    }

    const NO_RAW: BTreeSet<u32> = BTreeSet::new();
    const NO_MOUSE: BTreeSet<Button> = BTreeSet::new();

    #[test]
    fn instant_bind_fires_once_per_match_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bind = Bind::new(logging_action(&log)).with_keys([Key::Char('s')]);

        let held = keyset(&[Key::Char('s')]);
        assert!(bind.update(&NO_RAW, &held, &NO_MOUSE, Mods::empty(), Duration::ZERO, true));
        // A second matching edge does not re-fire.
        assert!(!bind.update(&NO_RAW, &held, &NO_MOUSE, Mods::empty(), Duration::ZERO, true));
        assert_eq!(*log.borrow(), vec![true]);

        // The match breaks: exactly one deactivation.
        let empty = keyset(&[]);
        assert!(bind.update(&NO_RAW, &empty, &NO_MOUSE, Mods::empty(), Duration::ZERO, false));
        assert!(!bind.update(&NO_RAW, &empty, &NO_MOUSE, Mods::empty(), Duration::ZERO, false));
        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn instant_bind_ignores_ticks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bind = Bind::new(logging_action(&log)).with_keys([Key::Char('s')]);
        let held = keyset(&[Key::Char('s')]);
        assert!(!bind.update(
            &NO_RAW,
            &held,
            &NO_MOUSE,
            Mods::empty(),
            Duration::from_millis(16),
            false
        ));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn hold_bind_accumulates_to_threshold() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bind = Bind::new(logging_action(&log))
            .with_keys([Key::Char('q')])
            .with_hold(Duration::from_millis(100));
        let held = keyset(&[Key::Char('q')]);

        // The press edge alone does not fire.
        assert!(!bind.update(&NO_RAW, &held, &NO_MOUSE, Mods::empty(), Duration::ZERO, true));
        for _ in 0..4 {
            assert!(!bind.update(
                &NO_RAW,
                &held,
                &NO_MOUSE,
                Mods::empty(),
                Duration::from_millis(20),
                false
            ));
        }
        assert!(log.borrow().is_empty());
        // The tick that reaches 100ms fires.
        assert!(bind.update(
            &NO_RAW,
            &held,
            &NO_MOUSE,
            Mods::empty(),
            Duration::from_millis(20),
            false
        ));
        assert_eq!(*log.borrow(), vec![true]);
    }

    #[test]
    fn hold_bind_resets_on_mismatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bind = Bind::new(logging_action(&log))
            .with_keys([Key::Char('q')])
            .with_hold(Duration::from_millis(100));
        let held = keyset(&[Key::Char('q')]);
        let empty = keyset(&[]);

        bind.update(&NO_RAW, &held, &NO_MOUSE, Mods::empty(), Duration::from_millis(80), false);
        // Key released mid-accumulation: time restarts from zero.
        bind.update(&NO_RAW, &empty, &NO_MOUSE, Mods::empty(), Duration::from_millis(20), false);
        bind.update(&NO_RAW, &held, &NO_MOUSE, Mods::empty(), Duration::from_millis(80), false);
        assert!(log.borrow().is_empty());
        assert!(bind.update(
            &NO_RAW,
            &held,
            &NO_MOUSE,
            Mods::empty(),
            Duration::from_millis(20),
            false
        ));
        assert_eq!(*log.borrow(), vec![true]);
    }

    #[test]
    fn modifier_rules() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut keyed = Bind::new(logging_action(&log))
            .with_keys([Key::Char('s')])
            .with_mods(Mods::CTRL);
        let held = keyset(&[Key::Char('s')]);

        // Extra modifiers are tolerated when the bind has keys.
        assert!(keyed.update(
            &NO_RAW,
            &held,
            &NO_MOUSE,
            Mods::LCTRL | Mods::LSHIFT,
            Duration::ZERO,
            true
        ));

        let mods_only = Rc::new(RefCell::new(Vec::new()));
        let mut strict = Bind::new(logging_action(&mods_only)).with_mods(Mods::CTRL);
        let empty = keyset(&[]);
        // A modifier-only bind rejects extras.
        assert!(!strict.update(
            &NO_RAW,
            &empty,
            &NO_MOUSE,
            Mods::LCTRL | Mods::LSHIFT,
            Duration::ZERO,
            true
        ));
        assert!(strict.update(&NO_RAW, &empty, &NO_MOUSE, Mods::RCTRL, Duration::ZERO, true));
    }

    #[test]
    fn unbound_and_muted_never_fire() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut unbound = Bind::new(logging_action(&log));
        let empty = keyset(&[]);
        assert!(unbound.is_empty());
        assert!(!unbound.update(&NO_RAW, &empty, &NO_MOUSE, Mods::empty(), Duration::ZERO, true));

        let mut muted = Bind::new(logging_action(&log)).with_keys([Key::Enter]);
        muted.muted = true;
        let held = keyset(&[Key::Enter]);
        assert!(!muted.update(&NO_RAW, &held, &NO_MOUSE, Mods::empty(), Duration::ZERO, true));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn reset_state_deactivates() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bind = Bind::new(logging_action(&log)).with_keys([Key::Char('s')]);
        let held = keyset(&[Key::Char('s')]);
        bind.update(&NO_RAW, &held, &NO_MOUSE, Mods::empty(), Duration::ZERO, true);
        assert!(bind.reset_state());
        assert!(!bind.reset_state());
        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn structural_equality() {
        let a = Bind::new(|_| true).with_keys([Key::Char('s')]).with_mods(Mods::LCTRL);
        let b = Bind::new(|_| false).with_keys([Key::Char('s')]).with_mods(Mods::RCTRL);
        let c = Bind::new(|_| true).with_keys([Key::Char('x')]).with_mods(Mods::LCTRL);
        // Actions and left/right sides do not affect identity.
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut held = Bind::new(|_| true).with_keys([Key::Char('s')]).with_mods(Mods::LCTRL);
        held.hold = Duration::from_secs(1);
        // Hold duration is not part of the identity either.
        assert_eq!(a, held);
    }

    #[test]
    fn display_chord() {
        let bind = Bind::new(|_| true)
            .with_keys([Key::Char('s')])
            .with_mods(Mods::CTRL | Mods::SHIFT);
        assert_eq!(bind.to_string(), "Ctrl + Shift + S");
        assert_eq!(Bind::new(|_| true).to_string(), "unbound");

        let clicky = Bind::new(|_| true).with_mouse([Button::Middle]).with_mods(Mods::ALT);
        assert_eq!(clicky.to_string(), "Alt + MMB");
    }
}

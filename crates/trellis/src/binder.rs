//! The keybind registry and live-recording machinery.
use std::{collections::BTreeSet, time::Duration};

use tracing::debug;

use crate::{
    bind::Bind,
    event::{
        Event, FocusEvent,
        key::{Key, Mods},
        mouse::{Button, MouseEvent},
    },
};

/// Completion callback for a recording: the populated bind, or `None` if the
/// recording was cancelled.
pub type RecordingDone = Box<dyn FnOnce(Option<Bind>)>;

/// An in-flight recording: the bind under construction plus the latest
/// captured candidate chord.
///
/// Every press refreshes the candidate from the down-sets and the modifiers
/// held at that instant; the first release commits it.
struct Recording {
    /// The bind being populated, muted for the duration.
    bind: Bind,
    /// Invoked once with the outcome.
    on_done: RecordingDone,
    /// Whether any press has been captured since the recording began.
    captured: bool,
    /// Candidate raw scan codes.
    raw: BTreeSet<u32>,
    /// Candidate mapped keys.
    keys: BTreeSet<Key>,
    /// Candidate mouse buttons.
    mouse: BTreeSet<Button>,
    /// Modifiers held at the last captured press.
    mods: Mods,
}

/// Owns the registered binds and the currently-down input state.
///
/// The router offers it every bindable event before the tree sees it. At
/// most one recording is active at a time; starting another cancels the
/// first.
#[derive(Default)]
pub struct Binder {
    /// Registered binds, in registration order.
    binds: Vec<Bind>,
    /// Raw scan codes currently held.
    down_raw: BTreeSet<u32>,
    /// Mapped keys currently held.
    down_keys: BTreeSet<Key>,
    /// Mouse buttons currently held.
    down_mouse: BTreeSet<Button>,
    /// Cached: any registered bind has a hold duration. Pure time ticks
    /// skip the bind walk entirely when this is false.
    has_hold_binds: bool,
    /// The exclusive in-flight recording, if any.
    recording: Option<Recording>,
}

impl Binder {
    /// Create an empty binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bind.
    ///
    /// Duplicates are accepted; check [`Binder::duplicates`] first when that
    /// matters.
    pub fn add(&mut self, bind: Bind) {
        self.has_hold_binds = self.has_hold_binds || !bind.hold().is_zero();
        self.binds.push(bind);
    }

    /// Register several binds.
    pub fn extend(&mut self, binds: impl IntoIterator<Item = Bind>) {
        for bind in binds {
            self.add(bind);
        }
    }

    /// Remove the first registered bind structurally equal to `bind`.
    pub fn remove(&mut self, bind: &Bind) -> Option<Bind> {
        let idx = self.binds.iter().position(|b| b == bind)?;
        let removed = self.binds.remove(idx);
        self.has_hold_binds = self.binds.iter().any(|b| !b.hold().is_zero());
        Some(removed)
    }

    /// The registered binds, in registration order.
    pub fn binds(&self) -> &[Bind] {
        &self.binds
    }

    /// Registered binds structurally equal to `bind`.
    ///
    /// Callers check this before committing a recorded bind; registration
    /// itself never blocks duplicates.
    pub fn duplicates(&self, bind: &Bind) -> Vec<&Bind> {
        self.binds.iter().filter(|b| *b == bind).collect()
    }

    /// True while a recording is in flight.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Offer a bindable event to the binder.
    ///
    /// Mouse press/release and key press/release maintain the down-sets and
    /// either feed an active recording or run an edge update across the
    /// registered binds. Returns whether the binder consumed the event.
    pub fn accept(&mut self, event: &Event, mods: Mods) -> bool {
        match event {
            Event::Mouse(MouseEvent::Pressed { button, .. }) => {
                self.button_edge(*button, true, mods)
            }
            Event::Mouse(MouseEvent::Released { button, .. }) => {
                self.button_edge(*button, false, mods)
            }
            Event::Focus(FocusEvent::KeyDown { key, .. }) => self.key_edge(*key, true, mods),
            Event::Focus(FocusEvent::KeyUp { key, .. }) => self.key_edge(*key, false, mods),
            _ => false,
        }
    }

    /// The unmapped-key path: feed a raw scan code edge.
    pub fn accept_raw(&mut self, code: u32, down: bool, mods: Mods) -> bool {
        if down {
            self.down_raw.insert(code);
            if self.recording.is_some() {
                self.snapshot(mods);
                return true;
            }
            self.update(Duration::ZERO, mods, true)
        } else {
            self.down_raw.remove(&code);
            if self.recording.is_some() {
                self.try_complete();
                return true;
            }
            self.update(Duration::ZERO, mods, false)
        }
    }

    /// Feed a modifier edge.
    ///
    /// `mods` is the full modifier state after the change. This is the path
    /// that lets modifier-only binds fire and be recorded.
    pub fn modifiers_changed(&mut self, mods: Mods, down: bool) -> bool {
        if self.recording.is_some() {
            if down {
                self.snapshot(mods);
            } else {
                self.try_complete();
            }
            return true;
        }
        self.update(Duration::ZERO, mods, down)
    }

    /// Run every registered bind against the current down state.
    ///
    /// A nonzero `delta` marks a pure time tick, which short-circuits when
    /// no bind has a hold duration. Returns whether any action consumed the
    /// update.
    pub fn update(&mut self, delta: Duration, mods: Mods, down: bool) -> bool {
        if !delta.is_zero() && !self.has_hold_binds {
            return false;
        }
        let mut consumed = false;
        for bind in &mut self.binds {
            consumed |= bind.update(
                &self.down_raw,
                &self.down_keys,
                &self.down_mouse,
                mods,
                delta,
                down,
            );
        }
        consumed
    }

    /// Begin exclusive capture of a new chord for `bind`.
    ///
    /// Any prior recording is cancelled first and its callback receives
    /// `None`. The bind is muted and all down-state cleared, so capture
    /// starts from a clean slate. On completion the populated bind is handed
    /// to `on_done`; it is never registered automatically.
    pub fn record(&mut self, mut bind: Bind, on_done: impl FnOnce(Option<Bind>) + 'static) {
        if self.recording.is_some() {
            self.cancel_record("superseded by a new recording");
        }
        debug!("keybind recording started");
        bind.muted = true;
        bind.reset_state();
        self.release();
        self.recording = Some(Recording {
            bind,
            on_done: Box::new(on_done),
            captured: false,
            raw: BTreeSet::new(),
            keys: BTreeSet::new(),
            mouse: BTreeSet::new(),
            mods: Mods::empty(),
        });
    }

    /// Cancel any in-flight recording, invoking its callback with `None`.
    pub fn cancel_record(&mut self, reason: &str) {
        if let Some(rec) = self.recording.take() {
            debug!(reason, "keybind recording cancelled");
            (rec.on_done)(None);
            self.release();
        }
    }

    /// Clear all down-state and force every bind back to idle.
    ///
    /// Binds that had fired get their deactivation callback, so no action is
    /// left stuck on after a window focus loss.
    pub fn release(&mut self) {
        self.down_raw.clear();
        self.down_keys.clear();
        self.down_mouse.clear();
        for bind in &mut self.binds {
            bind.reset_state();
        }
    }

    /// Handle a mouse button edge.
    fn button_edge(&mut self, button: Button, down: bool, mods: Mods) -> bool {
        if down {
            if self.recording.is_some() {
                if button == Button::Left && mods.is_empty() {
                    // The click falls through to the UI underneath.
                    self.cancel_record("cannot bind a bare left click");
                    return false;
                }
                self.down_mouse.insert(button);
                self.snapshot(mods);
                return true;
            }
            self.down_mouse.insert(button);
            self.update(Duration::ZERO, mods, true)
        } else {
            self.down_mouse.remove(&button);
            if self.recording.is_some() {
                self.try_complete();
                return true;
            }
            self.update(Duration::ZERO, mods, false)
        }
    }

    /// Handle a mapped key edge.
    fn key_edge(&mut self, key: Key, down: bool, mods: Mods) -> bool {
        if down {
            if self.recording.is_some() {
                if key == Key::Escape {
                    self.cancel_record("escape pressed");
                    return true;
                }
                self.down_keys.insert(key);
                self.snapshot(mods);
                return true;
            }
            self.down_keys.insert(key);
            self.update(Duration::ZERO, mods, true)
        } else {
            self.down_keys.remove(&key);
            if self.recording.is_some() {
                self.try_complete();
                return true;
            }
            self.update(Duration::ZERO, mods, false)
        }
    }

    /// Refresh the recording candidate from the down-sets and `mods`.
    fn snapshot(&mut self, mods: Mods) {
        if let Some(rec) = self.recording.as_mut() {
            rec.raw = self.down_raw.clone();
            rec.keys = self.down_keys.clone();
            rec.mouse = self.down_mouse.clone();
            rec.mods = mods;
            rec.captured = true;
        }
    }

    /// Commit the recording if a candidate has been captured.
    ///
    /// The captured modifiers are collapsed to their lenient form when the
    /// chord includes keys or buttons; a modifier-only chord keeps its exact
    /// physical sides.
    fn try_complete(&mut self) {
        if self.recording.as_ref().is_none_or(|r| !r.captured) {
            return;
        }
        let Some(rec) = self.recording.take() else {
            return;
        };
        let keyed = !(rec.raw.is_empty() && rec.keys.is_empty() && rec.mouse.is_empty());
        let mods = if keyed { rec.mods.lenient() } else { rec.mods };
        let mut bind = rec.bind;
        bind.set_capture(rec.raw, rec.keys, rec.mouse, mods);
        bind.muted = false;
        debug!(chord = %bind, "keybind recorded");
        (rec.on_done)(Some(bind));
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn key_down(key: Key, mods: Mods) -> Event {
        Event::Focus(FocusEvent::KeyDown { key, mods })
    }

    fn key_up(key: Key, mods: Mods) -> Event {
        Event::Focus(FocusEvent::KeyUp { key, mods })
    }

    fn pressed(button: Button, mods: Mods) -> Event {
        Event::Mouse(MouseEvent::Pressed {
            button,
            pos: crate::geom::Point::default(),
            mods,
        })
    }

    /// A recording callback writing its outcome into a shared slot.
    type Outcome = Rc<RefCell<Option<Option<Bind>>>>;

    fn outcome_slot() -> (Outcome, impl FnOnce(Option<Bind>) + 'static) {
        let slot: Outcome = Rc::new(RefCell::new(None));
        let writer = Rc::clone(&slot);
        (slot, move |bind| {
            *writer.borrow_mut() = Some(bind);
        })
    }

    #[test]
    fn edge_updates_drive_binds() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut binder = Binder::new();
        binder.add(Bind::new(move |on| {
            sink.borrow_mut().push(on);
            true
        }).with_keys([Key::Char('s')]));

        assert!(binder.accept(&key_down(Key::Char('s'), Mods::empty()), Mods::empty()));
        assert!(binder.accept(&key_up(Key::Char('s'), Mods::empty()), Mods::empty()));
        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn record_captures_chord_and_lenient_mods() {
        let mut binder = Binder::new();
        let (slot, on_done) = outcome_slot();
        binder.record(Bind::new(|_| true), on_done);
        assert!(binder.is_recording());

        binder.modifiers_changed(Mods::LCTRL, true);
        assert!(binder.accept(&key_down(Key::Char('s'), Mods::LCTRL), Mods::LCTRL));
        // First release commits.
        assert!(binder.accept(&key_up(Key::Char('s'), Mods::LCTRL), Mods::LCTRL));

        let bind = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(
            bind.keys().unwrap(),
            &[Key::Char('s')].into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(bind.mods(), Mods::CTRL);
        assert!(!bind.is_muted());
        assert!(!binder.is_recording());
        // Nothing was auto-registered.
        assert!(binder.binds().is_empty());
    }

    #[test]
    fn record_captures_multiple_keys() {
        let mut binder = Binder::new();
        let (slot, on_done) = outcome_slot();
        binder.record(Bind::new(|_| true), on_done);

        assert!(binder.accept(&key_down(Key::Char('j'), Mods::empty()), Mods::empty()));
        assert!(binder.accept(&key_down(Key::Char('k'), Mods::empty()), Mods::empty()));
        assert!(binder.accept(&key_up(Key::Char('j'), Mods::empty()), Mods::empty()));

        let bind = slot.borrow_mut().take().unwrap().unwrap();
        let want: BTreeSet<_> = [Key::Char('j'), Key::Char('k')].into_iter().collect();
        assert_eq!(bind.keys().unwrap(), &want);
        assert_eq!(bind.mods(), Mods::empty());
    }

    #[test]
    fn record_modifier_only_keeps_physical_side() {
        let mut binder = Binder::new();
        let (slot, on_done) = outcome_slot();
        binder.record(Bind::new(|_| true), on_done);

        binder.modifiers_changed(Mods::LCTRL, true);
        binder.modifiers_changed(Mods::empty(), false);

        let bind = slot.borrow_mut().take().unwrap().unwrap();
        assert!(bind.keys().is_none());
        assert!(bind.mouse().is_none());
        assert_eq!(bind.mods(), Mods::LCTRL);
    }

    #[test]
    fn escape_cancels_recording() {
        let mut binder = Binder::new();
        binder.add(Bind::new(|_| true).with_keys([Key::Enter]));
        let (slot, on_done) = outcome_slot();
        binder.record(Bind::new(|_| true), on_done);

        assert!(binder.accept(&key_down(Key::Escape, Mods::empty()), Mods::empty()));
        assert_eq!(slot.borrow_mut().take(), Some(None));
        assert!(!binder.is_recording());
        // The registered list is untouched.
        assert_eq!(binder.binds().len(), 1);
    }

    #[test]
    fn bare_left_click_cancels_without_consuming() {
        let mut binder = Binder::new();
        let (slot, on_done) = outcome_slot();
        binder.record(Bind::new(|_| true), on_done);

        assert!(!binder.accept(&pressed(Button::Left, Mods::empty()), Mods::empty()));
        assert_eq!(slot.borrow_mut().take(), Some(None));

        // A modified left press is a valid capture.
        let (slot, on_done) = outcome_slot();
        binder.record(Bind::new(|_| true), on_done);
        assert!(binder.accept(&pressed(Button::Left, Mods::LALT), Mods::LALT));
        assert!(binder.modifiers_changed(Mods::LALT, true));
        assert!(slot.borrow().is_none());
    }

    #[test]
    fn new_recording_supersedes_old() {
        let mut binder = Binder::new();
        let (first, on_first) = outcome_slot();
        binder.record(Bind::new(|_| true), on_first);
        let (second, on_second) = outcome_slot();
        binder.record(Bind::new(|_| true), on_second);

        assert_eq!(first.borrow_mut().take(), Some(None));
        assert!(second.borrow().is_none());
        assert!(binder.is_recording());
    }

    #[test]
    fn release_unsticks_fired_binds() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut binder = Binder::new();
        binder.add(Bind::new(move |on| {
            sink.borrow_mut().push(on);
            true
        }).with_keys([Key::Char('s')]));

        binder.accept(&key_down(Key::Char('s'), Mods::empty()), Mods::empty());
        binder.release();
        assert_eq!(*log.borrow(), vec![true, false]);

        // Down-state was cleared too, so the same press fires afresh.
        binder.accept(&key_down(Key::Char('s'), Mods::empty()), Mods::empty());
        assert_eq!(*log.borrow(), vec![true, false, true]);
    }

    #[test]
    fn remove_by_structure() {
        let mut binder = Binder::new();
        binder.add(Bind::new(|_| true).with_keys([Key::Char('s')]).with_mods(Mods::LCTRL));
        binder.add(Bind::new(|_| true).with_keys([Key::Char('x')]));

        let probe = Bind::new(|_| false).with_keys([Key::Char('s')]).with_mods(Mods::RCTRL);
        assert_eq!(binder.duplicates(&probe).len(), 1);
        assert!(binder.remove(&probe).is_some());
        assert!(binder.remove(&probe).is_none());
        assert_eq!(binder.binds().len(), 1);
    }

    #[test]
    fn raw_codes_record_and_fire() {
        let mut binder = Binder::new();
        let (slot, on_done) = outcome_slot();
        binder.record(Bind::new(|_| true), on_done);
        assert!(binder.accept_raw(0x38, true, Mods::empty()));
        assert!(binder.accept_raw(0x38, false, Mods::empty()));
        let bind = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(bind.raw().unwrap(), &[0x38].into_iter().collect::<BTreeSet<_>>());

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut bind = bind;
        bind.action = Box::new(move |on| {
            sink.borrow_mut().push(on);
            true
        });
        binder.add(bind);
        assert!(binder.accept_raw(0x38, true, Mods::empty()));
        assert!(binder.accept_raw(0x38, false, Mods::empty()));
        assert_eq!(*log.borrow(), vec![true, false]);
    }
}

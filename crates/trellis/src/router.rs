//! The input router: raw platform callbacks in, typed widget events out.
use std::{path::PathBuf, time::Duration};

use tracing::{debug, trace};

use crate::{
    binder::Binder,
    event::{
        Event, FocusEvent,
        key::{Key, Mods},
        mouse::{Button, MouseEvent},
    },
    focus::FocusManager,
    geom::Point,
    id::NodeId,
    settings::Settings,
    state::InputState,
    tree::Tree,
};

/// Routes raw input to the widget tree.
///
/// The router owns the cursor position, hover and press tracking, the
/// drag and click-combo state machines, the modifier byte, the focus chain
/// and the [`Binder`]. The host feeds it one platform callback at a time;
/// each is processed synchronously to completion. All time comes from
/// [`InputRouter::update`] deltas, never from the wall clock.
///
/// Entry points return whether the UI consumed the input, so hosts can
/// decide whether to swallow the platform event.
pub struct InputRouter {
    /// Input tuning knobs.
    pub(crate) settings: Settings,
    /// The keybind registry, offered every bindable event first.
    pub(crate) binder: Binder,

    /// Current cursor position.
    pub(crate) mouse: Point,
    /// The topmost input-accepting node under the cursor.
    pub(crate) mouse_over: Option<NodeId>,
    /// Whether the primary button is held.
    pub(crate) mouse_down: bool,
    /// Whether the current press has become a drag.
    pub(crate) dragging: bool,
    /// Set when a drag-start dispatch was consumed: no further drag events
    /// fire for the rest of the press.
    pub(crate) drag_cancelled: bool,
    /// Position of the last primary press, for the drag threshold.
    pub(crate) press_origin: Point,

    /// Button of the running click combo.
    pub(crate) combo_button: Option<Button>,
    /// Length of the running click combo.
    pub(crate) combo_count: u8,
    /// Clock timestamp of the last release in the combo.
    pub(crate) combo_at: Duration,
    /// Internal clock, advanced only by update deltas.
    pub(crate) clock: Duration,

    /// Currently held modifiers.
    pub(crate) mods: Mods,
    /// Leaf of the focus chain.
    pub(crate) focused: Option<NodeId>,
}

impl InputRouter {
    /// Create a router with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            binder: Binder::new(),
            mouse: Point::default(),
            mouse_over: None,
            mouse_down: false,
            dragging: false,
            drag_cancelled: false,
            press_origin: Point::default(),
            combo_button: None,
            combo_count: 0,
            combo_at: Duration::ZERO,
            clock: Duration::ZERO,
            mods: Mods::empty(),
            focused: None,
        }
    }

    /// The active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access to the settings.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The keybind registry.
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// Mutable access to the keybind registry.
    pub fn binder_mut(&mut self) -> &mut Binder {
        &mut self.binder
    }

    /// Current cursor position.
    pub fn mouse_pos(&self) -> Point {
        self.mouse
    }

    /// The topmost input-accepting node under the cursor, if any.
    pub fn mouse_over(&self) -> Option<NodeId> {
        self.mouse_over
    }

    /// Whether the primary button is held.
    pub fn is_mouse_down(&self) -> bool {
        self.mouse_down
    }

    /// Whether the current press has become a drag.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Currently held modifiers.
    pub fn mods(&self) -> Mods {
        self.mods
    }

    /// The leaf of the focus chain, if any.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Handle cursor movement to an absolute position.
    ///
    /// While a primary press is in progress the hover target is frozen:
    /// movement feeds the drag state machine instead, firing a drag-start
    /// on the first threshold crossing and drag updates afterwards.
    pub fn mouse_moved(&mut self, tree: &mut Tree, x: f32, y: f32) -> bool {
        let pos = Point::new(x, y);
        if pos == self.mouse {
            return false;
        }
        self.mouse = pos;
        if self.mouse_down {
            if self.dragging {
                let ev = MouseEvent::Dragged {
                    origin: self.press_origin,
                    pos,
                };
                return self.dispatch(tree, &ev.into(), false, self.mouse_over);
            }
            if !self.drag_cancelled && self.press_origin.distance(pos) > self.settings.drag_threshold
            {
                trace!("drag threshold crossed");
                self.dragging = true;
                let ev = MouseEvent::DragStarted {
                    origin: self.press_origin,
                    pos,
                };
                let consumed = self.dispatch(tree, &ev.into(), false, self.mouse_over);
                if consumed {
                    self.dragging = false;
                    self.drag_cancelled = true;
                }
                return consumed;
            }
            return false;
        }
        self.recalculate(tree);
        let ev = MouseEvent::Moved { pos };
        self.dispatch(tree, &ev.into(), false, self.mouse_over)
    }

    /// Handle a button press.
    pub fn mouse_pressed(&mut self, tree: &mut Tree, button: Button) -> bool {
        self.recalculate(tree);
        if button == Button::Left {
            self.mouse_down = true;
            self.dragging = false;
            self.drag_cancelled = false;
            self.press_origin = self.mouse;
            if let Some(over) = self.mouse_over {
                tree.set_input_state(over, InputState::Pressed);
            }
        }
        let ev = MouseEvent::Pressed {
            button,
            pos: self.mouse,
            mods: self.mods,
        };
        self.dispatch(tree, &ev.into(), true, self.mouse_over)
    }

    /// Handle a button release.
    ///
    /// Performs combo bookkeeping, ends any active drag, resolves the
    /// release-site checks and synthesizes the click.
    pub fn mouse_released(&mut self, tree: &mut Tree, button: Button) -> bool {
        self.track_combo(button);
        if let Some(over) = self.mouse_over
            && tree.input_state(over) == InputState::Pressed
        {
            tree.set_input_state(over, InputState::Hovered);
        }
        let pos = self.mouse;
        let mods = self.mods;
        let released = Event::from(MouseEvent::Released { button, pos, mods });
        // The binder must see every release edge, even when an early return
        // below skips the tree dispatch, or its down-state would stick.
        let release_bound = self.binder.accept(&released, mods);
        if button == Button::Left {
            self.mouse_down = false;
            if self.dragging {
                self.dragging = false;
                let ev = MouseEvent::DragEnded {
                    origin: self.press_origin,
                    pos,
                };
                // A consumed drag end suppresses the click entirely.
                if self.dispatch(tree, &ev.into(), false, self.mouse_over) {
                    return true;
                }
            }
            // The press wandered off the hovered node: no click.
            if let Some(over) = self.mouse_over
                && !tree.contains_point(over, pos)
            {
                self.set_mouse_over(tree, None);
                return release_bound;
            }
            // Clicking away from the focused node dismisses it.
            if let Some(focused) = self.focused
                && !tree.contains_point(focused, pos)
            {
                self.unfocus(tree);
            }
            if self.combo_count == 1 && mods.is_empty() {
                return self.simple_click(tree, release_bound, pos);
            }
        }
        let mut consumed = release_bound || walk(tree, &released, self.mouse_over);
        let clicks = if self.mouse_over.is_some_and(|id| tree.accepts_multi_click(id)) {
            self.combo_count
        } else {
            // Single-click listeners see each release of a combo as a
            // discrete click.
            1
        };
        let clicked = MouseEvent::Clicked {
            button,
            pos,
            mods,
            clicks,
        };
        consumed |= self.dispatch(tree, &clicked.into(), false, self.mouse_over);
        consumed
    }

    /// The unmodified single-click path: release, click, then click-to-focus
    /// when the click went unhandled.
    fn simple_click(&mut self, tree: &mut Tree, release_bound: bool, pos: Point) -> bool {
        let released = MouseEvent::Released {
            button: Button::Left,
            pos,
            mods: Mods::empty(),
        };
        let release_consumed = release_bound || walk(tree, &released.into(), self.mouse_over);
        let clicked = MouseEvent::Clicked {
            button: Button::Left,
            pos,
            mods: Mods::empty(),
            clicks: 1,
        };
        let click_consumed = self.dispatch(tree, &clicked.into(), false, self.mouse_over);
        if !click_consumed && let Some(over) = self.mouse_over {
            self.safe_focus(tree, Some(over));
        }
        release_consumed || click_consumed
    }

    /// Handle scroll input.
    ///
    /// Applies the natural-scrolling flip, the shift axis swap and the
    /// per-axis multiplier before dispatch.
    pub fn mouse_scrolled(&mut self, tree: &mut Tree, dx: f32, dy: f32) -> bool {
        let (mut dx, mut dy) = (dx, dy);
        if self.settings.natural_scrolling {
            dx = -dx;
            dy = -dy;
        }
        if self.mods.shift() {
            std::mem::swap(&mut dx, &mut dy);
        }
        dx *= self.settings.scroll_multiplier.0;
        dy *= self.settings.scroll_multiplier.1;
        let ev = MouseEvent::Scrolled {
            dx,
            dy,
            mods: self.mods,
        };
        self.dispatch(tree, &ev.into(), false, self.mouse_over)
    }

    /// Handle a typed printable character.
    ///
    /// Delivered to the focused node only; no walk and no binder.
    pub fn key_typed(&self, tree: &mut Tree, ch: char) -> bool {
        let Some(focused) = self.focused else {
            return false;
        };
        tree.on_event(focused, &Event::Focus(FocusEvent::Typed(ch)))
            .is_handled()
    }

    /// Handle a mapped key press.
    ///
    /// Escape dismisses an active focus instead of propagating; with no
    /// focus it flows through like any other key, so it can cancel a
    /// recording or drive a bind.
    pub fn key_down(&mut self, tree: &mut Tree, key: Key) -> bool {
        if key == Key::Escape && self.focused.is_some() {
            self.unfocus(tree);
            return true;
        }
        let ev = FocusEvent::KeyDown {
            key,
            mods: self.mods,
        };
        self.dispatch(tree, &ev.into(), true, self.focused)
    }

    /// Handle a mapped key release.
    pub fn key_up(&mut self, tree: &mut Tree, key: Key) -> bool {
        let ev = FocusEvent::KeyUp {
            key,
            mods: self.mods,
        };
        self.dispatch(tree, &ev.into(), true, self.focused)
    }

    /// Handle a press of a key the platform could not map.
    pub fn raw_key_down(&mut self, tree: &mut Tree, code: u32) -> bool {
        if self.binder.accept_raw(code, true, self.mods) {
            return true;
        }
        let ev = FocusEvent::RawKey { code, down: true };
        walk(tree, &ev.into(), self.focused)
    }

    /// Handle a release of a key the platform could not map.
    pub fn raw_key_up(&mut self, tree: &mut Tree, code: u32) -> bool {
        if self.binder.accept_raw(code, false, self.mods) {
            return true;
        }
        let ev = FocusEvent::RawKey { code, down: false };
        walk(tree, &ev.into(), self.focused)
    }

    /// Handle files dropped onto the window, delivered along the focus
    /// chain.
    pub fn files_dropped(&mut self, tree: &mut Tree, paths: Vec<PathBuf>) -> bool {
        let ev = FocusEvent::FileDrop(paths);
        self.dispatch(tree, &ev.into(), false, self.focused)
    }

    /// A modifier key went down.
    pub fn add_modifier(&mut self, mods: Mods) {
        self.mods |= mods;
        self.binder.modifiers_changed(self.mods, true);
    }

    /// A modifier key came up.
    pub fn remove_modifier(&mut self, mods: Mods) {
        self.mods &= !mods;
        self.binder.modifiers_changed(self.mods, false);
    }

    /// Advance time by `delta`.
    ///
    /// Drives hold-duration binds and the click-combo clock. The router
    /// never reads the wall clock.
    pub fn update(&mut self, delta: Duration) -> bool {
        self.clock += delta;
        self.binder.update(delta, self.mods, false)
    }

    /// Recompute the hover target under the current cursor position.
    ///
    /// Hosts call this after layout changes move nodes under a stationary
    /// cursor.
    pub fn recalculate(&mut self, tree: &mut Tree) {
        let hit = tree.node_at(self.mouse);
        self.set_mouse_over(tree, hit);
    }

    /// Dispatch an event, offering it to the binder first when `bindable`,
    /// then walking from `target` up the parent chain until handled.
    pub fn dispatch(
        &mut self,
        tree: &mut Tree,
        event: &Event,
        bindable: bool,
        target: Option<NodeId>,
    ) -> bool {
        if bindable && self.binder.accept(event, self.mods) {
            return true;
        }
        walk(tree, event, target)
    }

    /// Hard-reset all transient input state.
    ///
    /// For host-detected desync such as an OS-level focus loss. Hover,
    /// press, drag, combo, modifier and focus state all return to their
    /// initial values and held binds are deactivated. Registered binds and
    /// any in-flight recording survive.
    pub fn reset(&mut self, tree: &mut Tree) {
        debug!("input state reset");
        tree.clear_transient();
        self.mouse_over = None;
        self.mouse_down = false;
        self.dragging = false;
        self.drag_cancelled = false;
        self.combo_button = None;
        self.combo_count = 0;
        self.combo_at = Duration::ZERO;
        self.mods = Mods::empty();
        self.focused = None;
        self.binder.release();
    }

    /// Forget any references into the subtree rooted at `id`, without
    /// dispatching anything.
    ///
    /// Call this before removing the subtree from the tree.
    pub fn forget(&mut self, tree: &Tree, id: NodeId) {
        let in_subtree = |n: NodeId| n == id || tree.is_ancestor(id, n);
        if self.mouse_over.is_some_and(in_subtree) {
            self.mouse_over = None;
        }
        if self.focused.is_some_and(in_subtree) {
            self.focused = None;
        }
    }

    /// Move the hover target, settling the outgoing node's state.
    ///
    /// A displaced node still marked pressed receives a synthetic release
    /// first, so no node is left stuck pressed when the cursor teleports or
    /// z-order shifts mid-press.
    pub(crate) fn set_mouse_over(&mut self, tree: &mut Tree, new: Option<NodeId>) {
        if self.mouse_over == new {
            return;
        }
        if let Some(old) = self.mouse_over {
            if tree.input_state(old) == InputState::Pressed {
                let ev = Event::Mouse(MouseEvent::Released {
                    button: Button::Left,
                    pos: self.mouse,
                    mods: self.mods,
                });
                tree.on_event(old, &ev);
            }
            tree.set_input_state(old, InputState::Idle);
        }
        if let Some(id) = new {
            tree.set_input_state(id, InputState::Hovered);
        }
        self.mouse_over = new;
    }

    /// Update the click-combo counter for a release of `button`.
    fn track_combo(&mut self, button: Button) {
        let now = self.clock;
        let within = now.saturating_sub(self.combo_at) <= self.settings.combo_max_interval;
        if self.combo_button == Some(button) && within {
            self.combo_count = self.combo_count.saturating_add(1);
            if self.combo_count > self.settings.max_combo_size {
                self.combo_count = if self.settings.clear_combo_when_maxed {
                    1
                } else {
                    self.settings.max_combo_size
                };
            }
        } else {
            self.combo_button = Some(button);
            self.combo_count = 1;
        }
        self.combo_at = now;
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Walk an event from `target` up the parent chain until a node handles it.
///
/// Focus-category events skip focusable nodes other than the walk's own
/// starting target: they are meant for the focus target's handling, not for
/// reinterpretation by focusable ancestors.
fn walk(tree: &mut Tree, event: &Event, target: Option<NodeId>) -> bool {
    let start = target;
    let mut current = target;
    while let Some(id) = current {
        if event.is_focus() && start != Some(id) && tree.accept_focus(id) {
            current = tree.parent(id);
            continue;
        }
        if tree.on_event(id, event).is_handled() {
            return true;
        }
        current = tree.parent(id);
    }
    false
}

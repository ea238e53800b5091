//! Focus-chain operations, implemented on the router.
use tracing::debug;

use crate::{
    error::{Error, Result},
    event::{Event, FocusEvent},
    id::NodeId,
    router::InputRouter,
    tree::Tree,
};

/// Trait for managing the focus chain.
///
/// The chain is the set of focus-flagged ancestors above the focused leaf.
/// Focusing a node related to the current focus leaves the rest of the
/// chain intact, which is what makes nested focus scopes work; focusing an
/// unrelated node tears the old chain down first.
pub trait FocusManager {
    /// Focus a node, or clear all focus with `None`.
    ///
    /// A no-op when the target is already focused. Errors if the target is
    /// gone or its widget does not accept focus. When moving to an
    /// unrelated target the previous chain is unfocused leaf-to-root, each
    /// focused node receiving [`FocusEvent::Lost`], before the new target
    /// is flagged and receives [`FocusEvent::Gained`].
    fn focus(&mut self, tree: &mut Tree, target: Option<NodeId>) -> Result<()>;

    /// Non-erroring focus, used for implicit click-to-focus.
    ///
    /// Ineligible targets are ignored.
    fn safe_focus(&mut self, tree: &mut Tree, target: Option<NodeId>);

    /// Drop the focused leaf and promote the nearest still-focused
    /// ancestor, if any.
    ///
    /// The leaf receives [`FocusEvent::Lost`]; a promoted ancestor was
    /// already focused, so no [`FocusEvent::Gained`] is re-dispatched.
    fn unfocus(&mut self, tree: &mut Tree);

    /// Check whether a node lies on the path from the focused leaf to the
    /// root.
    fn is_on_focus_path(&self, tree: &Tree, node: NodeId) -> bool;
}

impl FocusManager for InputRouter {
    fn focus(&mut self, tree: &mut Tree, target: Option<NodeId>) -> Result<()> {
        if self.focused == target {
            return Ok(());
        }
        match target {
            None => {
                clear_chain(self, tree);
                Ok(())
            }
            Some(t) => {
                if !tree.contains(t) {
                    return Err(Error::NodeNotFound(t));
                }
                if !tree.accept_focus(t) {
                    let name = tree.node_name(t).map_or_else(String::new, |n| n.to_string());
                    return Err(Error::Focus(format!("{name} does not accept focus")));
                }
                apply_focus(self, tree, t);
                Ok(())
            }
        }
    }

    fn safe_focus(&mut self, tree: &mut Tree, target: Option<NodeId>) {
        match target {
            None => clear_chain(self, tree),
            Some(t) => {
                if self.focused != Some(t) && tree.contains(t) && tree.accept_focus(t) {
                    apply_focus(self, tree, t);
                }
            }
        }
    }

    fn unfocus(&mut self, tree: &mut Tree) {
        let Some(leaf) = self.focused.take() else {
            return;
        };
        debug!("unfocus");
        tree.set_focus_flag(leaf, false);
        tree.on_event(leaf, &Event::Focus(FocusEvent::Lost));
        let mut current = tree.parent(leaf);
        while let Some(id) = current {
            if tree.is_focused(id) {
                self.focused = Some(id);
                return;
            }
            current = tree.parent(id);
        }
    }

    fn is_on_focus_path(&self, tree: &Tree, node: NodeId) -> bool {
        let mut current = self.focused;
        while let Some(id) = current {
            if id == node {
                return true;
            }
            current = tree.parent(id);
        }
        false
    }
}

/// Unfocus the entire chain, leaf to root.
pub(crate) fn clear_chain(router: &mut InputRouter, tree: &mut Tree) {
    let mut current = router.focused.take();
    while let Some(id) = current {
        if tree.is_focused(id) {
            tree.set_focus_flag(id, false);
            tree.on_event(id, &Event::Focus(FocusEvent::Lost));
        }
        current = tree.parent(id);
    }
}

/// Flag and notify a validated focus target.
///
/// Tears down the old chain first when the target is unrelated to it.
pub(crate) fn apply_focus(router: &mut InputRouter, tree: &mut Tree, target: NodeId) {
    if let Some(current) = router.focused
        && !tree.is_related(current, target)
    {
        clear_chain(router, tree);
    }
    if let Some(name) = tree.node_name(target) {
        debug!(node = %name, "focus");
    }
    tree.set_focus_flag(target, true);
    router.focused = Some(target);
    tree.on_event(target, &Event::Focus(FocusEvent::Gained));
}

//! Integration tests for the focus chain and for events routed along it.

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use trellis::{
        Button, EventOutcome, FocusManager, Key,
        error::{Error, Result},
        testing::ttree::{Ba, BaLa, Bb, get_state, reset_state, run_ttree, set_outcome},
    };

    #[test]
    fn focus_flags_and_notifies_the_target() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a_a))?;
            assert_eq!(router.focused(), Some(tt.a_a));
            assert!(tree.is_focused(tt.a_a));
            assert!(!tree.is_focused(tt.a));
            assert_eq!(get_state().path, vec!["ba_la@gained->ignore"]);
            Ok(())
        })
    }

    #[test]
    fn refocusing_the_same_target_is_a_noop() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            router.focus(tree, Some(tt.a_a))?;
            assert!(get_state().path.is_empty());
            Ok(())
        })
    }

    #[test]
    fn focusing_a_descendant_extends_the_chain() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a))?;
            reset_state();
            router.focus(tree, Some(tt.a_a))?;
            assert_eq!(router.focused(), Some(tt.a_a));
            assert!(tree.is_focused(tt.a));
            assert!(tree.is_focused(tt.a_a));
            // No teardown on the way down.
            assert_eq!(get_state().path, vec!["ba_la@gained->ignore"]);
            Ok(())
        })
    }

    #[test]
    fn focusing_an_unrelated_node_tears_down_the_chain() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a))?;
            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            router.focus(tree, Some(tt.b_a))?;
            // Loss notifications run leaf to root, then the new node hears.
            assert_eq!(
                get_state().path,
                vec![
                    "ba_la@lost->ignore",
                    "ba@lost->ignore",
                    "bb_la@gained->ignore",
                ]
            );
            assert!(!tree.is_focused(tt.a_a));
            assert!(!tree.is_focused(tt.a));
            assert!(tree.is_focused(tt.b_a));
            Ok(())
        })
    }

    #[test]
    fn unfocus_promotes_the_nearest_focused_ancestor() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a))?;
            router.focus(tree, Some(tt.a_a))?;
            reset_state();

            router.unfocus(tree);
            assert_eq!(router.focused(), Some(tt.a));
            assert!(!tree.is_focused(tt.a_a));
            assert!(tree.is_focused(tt.a));
            // The ancestor resumes without a fresh gained notification.
            assert_eq!(get_state().path, vec!["ba_la@lost->ignore"]);

            reset_state();
            router.unfocus(tree);
            assert_eq!(router.focused(), None);
            assert_eq!(get_state().path, vec!["ba@lost->ignore"]);
            Ok(())
        })
    }

    #[test]
    fn clearing_focus_unwinds_the_whole_chain() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a))?;
            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            router.focus(tree, None)?;
            assert_eq!(router.focused(), None);
            assert_eq!(
                get_state().path,
                vec!["ba_la@lost->ignore", "ba@lost->ignore"]
            );
            Ok(())
        })
    }

    #[test]
    fn focus_rejects_missing_and_refusing_targets() -> Result<()> {
        run_ttree(|router, tree, tt| {
            let stale = tt.b_b;
            tree.remove(tt.b_b)?;
            assert_eq!(
                router.focus(tree, Some(stale)),
                Err(Error::NodeNotFound(stale))
            );

            tree.widget_mut::<Bb>(tt.b).unwrap().focusable = false;
            assert!(matches!(
                router.focus(tree, Some(tt.b)),
                Err(Error::Focus(_))
            ));

            // The lenient variant swallows both.
            router.safe_focus(tree, Some(stale));
            router.safe_focus(tree, Some(tt.b));
            assert_eq!(router.focused(), None);
            assert!(get_state().path.is_empty());
            Ok(())
        })
    }

    #[test]
    fn focus_path_membership() -> Result<()> {
        run_ttree(|router, tree, tt| {
            assert!(!router.is_on_focus_path(tree, tt.a_a));
            router.focus(tree, Some(tt.a_a))?;
            assert!(router.is_on_focus_path(tree, tt.a_a));
            assert!(router.is_on_focus_path(tree, tt.a));
            assert!(router.is_on_focus_path(tree, tt.root));
            assert!(!router.is_on_focus_path(tree, tt.b));
            assert!(!router.is_on_focus_path(tree, tt.a_b));
            Ok(())
        })
    }

    #[test]
    fn clicking_away_dismisses_before_the_new_click() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.mouse_moved(tree, 25.0, 25.0);
            router.mouse_pressed(tree, Button::Left);
            router.mouse_released(tree, Button::Left);
            assert_eq!(router.focused(), Some(tt.a_a));

            // Let the click combo lapse so the second click stands alone.
            router.update(Duration::from_millis(600));
            router.mouse_moved(tree, 75.0, 25.0);
            reset_state();
            router.mouse_pressed(tree, Button::Left);
            router.mouse_released(tree, Button::Left);
            assert_eq!(router.focused(), Some(tt.b_a));
            assert_eq!(
                get_state().path,
                vec![
                    "bb_la@pressed->ignore",
                    "bb@pressed->ignore",
                    "r@pressed->ignore",
                    "ba_la@lost->ignore",
                    "bb_la@released->ignore",
                    "bb@released->ignore",
                    "r@released->ignore",
                    "bb_la@clicked:1->ignore",
                    "bb@clicked:1->ignore",
                    "r@clicked:1->ignore",
                    "bb_la@gained->ignore",
                ]
            );
            Ok(())
        })
    }

    #[test]
    fn escape_dismisses_focus_first() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            assert!(router.key_down(tree, Key::Escape));
            assert_eq!(router.focused(), None);
            assert_eq!(get_state().path, vec!["ba_la@lost->ignore"]);

            // With nothing focused, escape flows on like any other key.
            reset_state();
            assert!(!router.key_down(tree, Key::Escape));
            assert!(get_state().path.is_empty());
            Ok(())
        })
    }

    #[test]
    fn keys_deliver_along_the_focus_chain() -> Result<()> {
        run_ttree(|router, tree, tt| {
            // No focus, nowhere to deliver.
            assert!(!router.key_down(tree, Key::Char('x')));
            assert!(get_state().path.is_empty());

            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            assert!(!router.key_down(tree, Key::Char('x')));
            assert!(!router.key_up(tree, Key::Char('x')));
            // Focusable ancestors do not reinterpret the key.
            assert_eq!(
                get_state().path,
                vec!["ba_la@key_down->ignore", "ba_la@key_up->ignore"]
            );

            // A non-focusable ancestor is fair game for fallthrough.
            tree.widget_mut::<Ba>(tt.a).unwrap().focusable = false;
            reset_state();
            assert!(!router.key_down(tree, Key::Char('y')));
            assert_eq!(
                get_state().path,
                vec!["ba_la@key_down->ignore", "ba@key_down->ignore"]
            );
            Ok(())
        })
    }

    #[test]
    fn typed_characters_reach_only_the_focused_node() -> Result<()> {
        run_ttree(|router, tree, tt| {
            assert!(!router.key_typed(tree, 'x'));
            assert!(get_state().path.is_empty());

            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            assert!(!router.key_typed(tree, 'x'));
            assert_eq!(get_state().path, vec!["ba_la@typed->ignore"]);

            set_outcome::<BaLa>(tree, tt.a_a, EventOutcome::Handle);
            assert!(router.key_typed(tree, 'x'));
            Ok(())
        })
    }

    #[test]
    fn file_drops_deliver_along_the_focus_chain() -> Result<()> {
        run_ttree(|router, tree, tt| {
            assert!(!router.files_dropped(tree, vec![PathBuf::from("a.txt")]));
            assert!(get_state().path.is_empty());

            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            assert!(!router.files_dropped(tree, vec![PathBuf::from("a.txt")]));
            assert_eq!(get_state().path, vec!["ba_la@file_drop->ignore"]);
            Ok(())
        })
    }

    #[test]
    fn raw_keys_walk_the_focus_chain_when_unbound() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            assert!(!router.raw_key_down(tree, 0x38));
            assert!(!router.raw_key_up(tree, 0x38));
            assert_eq!(
                get_state().path,
                vec!["ba_la@raw_key->ignore", "ba_la@raw_key->ignore"]
            );
            Ok(())
        })
    }

    #[test]
    fn reset_clears_focus_without_notifications() -> Result<()> {
        run_ttree(|router, tree, tt| {
            router.focus(tree, Some(tt.a))?;
            router.focus(tree, Some(tt.a_a))?;
            reset_state();
            router.reset(tree);
            assert_eq!(router.focused(), None);
            assert!(!tree.is_focused(tt.a_a));
            assert!(!tree.is_focused(tt.a));
            assert!(get_state().path.is_empty());
            Ok(())
        })
    }
}

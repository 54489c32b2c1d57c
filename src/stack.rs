//! Ordered recipe stack with a single-slot undo and a session favorite set.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::candidate::Candidate;
use crate::collaborators::{fire, HapticKind, Haptics, NoHaptics, NoopCallbacks, StackCallbacks};
use crate::error::StackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    /// No list has been supplied yet.
    Loading,
    Ready,
    /// Every card has been decided; show a refresh affordance.
    Empty,
}

pub struct CardStackController {
    stack: Vec<Candidate>,
    undo_slot: Option<Candidate>,
    favorites: HashSet<String>,
    /// Candidates in the current list plus favorites carried over from
    /// earlier lists, so toggling a card that already left the stack still
    /// reaches the callback with its data.
    seen: HashMap<String, Candidate>,
    loaded: bool,
    window_size: usize,
    callbacks: Rc<dyn StackCallbacks>,
    haptics: Rc<dyn Haptics>,
}

impl CardStackController {
    pub fn new(window_size: usize) -> Self {
        Self::with_collaborators(window_size, Rc::new(NoopCallbacks), Rc::new(NoHaptics))
    }

    pub fn with_collaborators(
        window_size: usize,
        callbacks: Rc<dyn StackCallbacks>,
        haptics: Rc<dyn Haptics>,
    ) -> Self {
        Self {
            stack: Vec::new(),
            undo_slot: None,
            favorites: HashSet::new(),
            seen: HashMap::new(),
            loaded: false,
            window_size,
            callbacks,
            haptics,
        }
    }

    pub fn status(&self) -> StackStatus {
        if !self.loaded {
            StackStatus::Loading
        } else if self.stack.is_empty() {
            StackStatus::Empty
        } else {
            StackStatus::Ready
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.stack.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn top(&self) -> Option<&Candidate> {
        self.stack.first()
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.stack.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// The first `window_size` cards, top first.
    pub fn visible_window(&self) -> &[Candidate] {
        &self.stack[..self.stack.len().min(self.window_size)]
    }

    pub fn undo_slot(&self) -> Option<&Candidate> {
        self.undo_slot.as_ref()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn favorites(&self) -> &HashSet<String> {
        &self.favorites
    }

    /// Removes the card and keeps it as the one recoverable dismissal.
    pub fn dismiss(&mut self, id: &str) -> Result<(), StackError> {
        let removed = self.remove(id, "dismiss")?;
        debug!("Dismissed '{}'", removed.id);
        self.undo_slot = Some(removed);
        Ok(())
    }

    /// Removes the card for good and hands it to `on_accept`.
    pub fn accept(&mut self, id: &str) -> Result<(), StackError> {
        let accepted = self.remove(id, "accept")?;
        debug!("Accepted '{}'", accepted.id);
        self.callbacks.on_accept(&accepted);
        Ok(())
    }

    /// Flips favorite membership; returns whether the card is now a favorite.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let favorited = if self.favorites.remove(id) {
            false
        } else {
            self.favorites.insert(id.to_owned());
            true
        };

        fire(self.haptics.as_ref(), HapticKind::Favorite);
        match self.seen.get(id) {
            Some(candidate) => self.callbacks.on_favorite_toggled(candidate, favorited),
            None => debug!("Favorite toggled for unknown card '{}'", id),
        }
        favorited
    }

    pub fn bring_to_front(&mut self, id: &str) -> Result<(), StackError> {
        let index = self.locate(id, "bring_to_front")?;
        if index > 0 {
            let card = self.stack.remove(index);
            self.stack.insert(0, card);
        }
        Ok(())
    }

    pub fn inspect(&self, id: &str) -> Result<(), StackError> {
        let index = self.locate(id, "inspect")?;
        self.callbacks.on_inspect(&self.stack[index]);
        Ok(())
    }

    /// Puts the last dismissed card back on top. Returns `false` when there
    /// was nothing to restore.
    pub fn undo(&mut self) -> bool {
        let Some(candidate) = self.undo_slot.take() else {
            return false;
        };
        debug!("Restored '{}'", candidate.id);
        self.stack.insert(0, candidate);
        true
    }

    /// Replaces the stack with `candidates`; favorites survive, undo does not.
    pub fn refresh(&mut self, candidates: Vec<Candidate>) {
        let favorites = &self.favorites;
        self.seen.retain(|id, _| favorites.contains(id));

        let mut ids = HashSet::new();
        let mut stack = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if ids.insert(candidate.id.clone()) {
                self.seen.insert(candidate.id.clone(), candidate.clone());
                stack.push(candidate);
            } else {
                warn!("Dropping duplicate card '{}' from refreshed list", candidate.id);
            }
        }

        self.stack = stack;
        self.undo_slot = None;
        self.loaded = true;
    }

    /// Asks the host for more cards; only honoured once the stack is empty.
    pub fn request_refresh(&self) -> bool {
        if self.status() != StackStatus::Empty {
            return false;
        }
        self.callbacks.on_refresh_requested();
        true
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.stack.iter().position(|c| c.id == id)
    }

    fn locate(&self, id: &str, operation: &str) -> Result<usize, StackError> {
        self.position(id).ok_or_else(|| {
            warn!("Ignoring {} for '{}': card is not in the stack", operation, id);
            StackError::NotInStack(id.to_owned())
        })
    }

    fn remove(&mut self, id: &str, operation: &str) -> Result<Candidate, StackError> {
        let index = self.locate(id, operation)?;
        Ok(self.stack.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        accepted: RefCell<Vec<String>>,
        favorites: RefCell<Vec<(String, bool)>>,
        inspected: RefCell<Vec<String>>,
        refreshes: RefCell<u32>,
    }

    impl StackCallbacks for Recorder {
        fn on_accept(&self, candidate: &Candidate) {
            self.accepted.borrow_mut().push(candidate.id.clone());
        }

        fn on_favorite_toggled(&self, candidate: &Candidate, favorited: bool) {
            self.favorites
                .borrow_mut()
                .push((candidate.id.clone(), favorited));
        }

        fn on_inspect(&self, candidate: &Candidate) {
            self.inspected.borrow_mut().push(candidate.id.clone());
        }

        fn on_refresh_requested(&self) {
            *self.refreshes.borrow_mut() += 1;
        }
    }

    fn cards(ids: &[&str]) -> Vec<Candidate> {
        ids.iter().map(|id| Candidate::new(*id, id.to_uppercase())).collect()
    }

    fn controller(ids: &[&str]) -> (CardStackController, Rc<Recorder>) {
        let recorder = Rc::new(Recorder::default());
        let mut stack =
            CardStackController::with_collaborators(3, recorder.clone(), Rc::new(NoHaptics));
        stack.refresh(cards(ids));
        (stack, recorder)
    }

    #[test]
    fn dismiss_then_undo_puts_card_on_top() {
        let (mut stack, _) = controller(&["a", "b", "c"]);
        stack.dismiss("b").unwrap();
        assert_eq!(stack.ids(), vec!["a", "c"]);
        assert_eq!(stack.undo_slot().map(|c| c.id.as_str()), Some("b"));

        assert!(stack.undo());
        assert_eq!(stack.ids(), vec!["b", "a", "c"]);
        assert!(stack.undo_slot().is_none());
    }

    #[test]
    fn undo_of_top_dismissal_restores_order() {
        let (mut stack, _) = controller(&["a", "b", "c"]);
        stack.dismiss("a").unwrap();
        stack.undo();
        assert_eq!(stack.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn undo_slot_holds_only_latest_dismissal() {
        let (mut stack, _) = controller(&["a", "b", "c"]);
        stack.dismiss("a").unwrap();
        stack.dismiss("b").unwrap();
        assert!(stack.undo());
        assert_eq!(stack.ids(), vec!["b", "c"]);
        assert!(!stack.undo());
        assert_eq!(stack.ids(), vec!["b", "c"]);
    }

    #[test]
    fn accepted_cards_cannot_be_undone() {
        let (mut stack, recorder) = controller(&["a", "b"]);
        stack.accept("a").unwrap();
        assert!(!stack.undo());
        assert!(!stack.contains("a"));
        assert_eq!(*recorder.accepted.borrow(), vec!["a"]);

        stack.dismiss("b").unwrap();
        stack.accept("b").unwrap_err();
        stack.undo();
        assert_eq!(stack.ids(), vec!["b"]);
    }

    #[test]
    fn accept_does_not_touch_undo_slot() {
        let (mut stack, _) = controller(&["a", "b"]);
        stack.dismiss("a").unwrap();
        stack.accept("b").unwrap();
        assert_eq!(stack.undo_slot().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn favorites_toggle_back_and_outlive_the_stack() {
        let (mut stack, recorder) = controller(&["a", "b"]);
        assert!(stack.toggle_favorite("a"));
        assert!(!stack.toggle_favorite("a"));
        assert!(stack.favorites().is_empty());

        stack.toggle_favorite("b");
        stack.dismiss("b").unwrap();
        assert!(stack.is_favorite("b"));
        stack.refresh(cards(&["x"]));
        assert!(stack.is_favorite("b"));

        assert!(!stack.toggle_favorite("b"));
        assert_eq!(
            *recorder.favorites.borrow(),
            vec![
                ("a".to_owned(), true),
                ("a".to_owned(), false),
                ("b".to_owned(), true),
                ("b".to_owned(), false),
            ]
        );
    }

    #[test]
    fn bring_to_front_keeps_relative_order() {
        let (mut stack, _) = controller(&["a", "b", "c", "d"]);
        stack.bring_to_front("c").unwrap();
        assert_eq!(stack.ids(), vec!["c", "a", "b", "d"]);
        stack.bring_to_front("c").unwrap();
        assert_eq!(stack.ids(), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn missing_ids_are_noops() {
        let (mut stack, recorder) = controller(&["a", "b"]);
        assert_eq!(
            stack.dismiss("zz"),
            Err(StackError::NotInStack("zz".to_owned()))
        );
        assert!(stack.accept("zz").is_err());
        assert!(stack.bring_to_front("zz").is_err());
        assert!(stack.inspect("zz").is_err());
        assert_eq!(stack.ids(), vec!["a", "b"]);
        assert!(stack.undo_slot().is_none());
        assert!(recorder.accepted.borrow().is_empty());
    }

    #[test]
    fn refresh_replaces_stack_and_clears_undo() {
        let (mut stack, _) = controller(&["a", "b"]);
        stack.dismiss("a").unwrap();
        stack.refresh(cards(&["x", "y", "x"]));
        assert_eq!(stack.ids(), vec!["x", "y"]);
        assert!(!stack.undo());
    }

    #[test]
    fn refresh_forgets_cards_that_are_not_favorites() {
        let (mut stack, recorder) = controller(&["a", "b"]);
        stack.toggle_favorite("a");
        stack.refresh(cards(&["x"]));
        stack.refresh(cards(&["y"]));

        assert!(!stack.toggle_favorite("a"));
        // "b" was never a favorite, so nothing is left to report it with.
        assert!(stack.toggle_favorite("b"));
        assert!(stack.toggle_favorite("y"));
        assert_eq!(
            *recorder.favorites.borrow(),
            vec![
                ("a".to_owned(), true),
                ("a".to_owned(), false),
                ("y".to_owned(), true)
            ]
        );
        assert_eq!(stack.seen.len(), 2);
    }

    #[test]
    fn status_distinguishes_loading_from_empty() {
        let mut stack = CardStackController::new(3);
        assert_eq!(stack.status(), StackStatus::Loading);
        assert!(!stack.request_refresh());

        stack.refresh(cards(&["a"]));
        assert_eq!(stack.status(), StackStatus::Ready);
        stack.dismiss("a").unwrap();
        assert_eq!(stack.status(), StackStatus::Empty);
    }

    #[test]
    fn refresh_request_only_when_empty() {
        let (mut stack, recorder) = controller(&["a"]);
        assert!(!stack.request_refresh());
        stack.accept("a").unwrap();
        assert!(stack.request_refresh());
        assert_eq!(*recorder.refreshes.borrow(), 1);
    }

    #[test]
    fn visible_window_is_first_three() {
        let (stack, recorder) = controller(&["a", "b", "c", "d"]);
        let window: Vec<&str> = stack.visible_window().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(window, vec!["a", "b", "c"]);

        stack.inspect("d").unwrap();
        assert_eq!(*recorder.inspected.borrow(), vec!["d"]);
    }
}

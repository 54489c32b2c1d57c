use log::debug;

use crate::candidate::Candidate;
use crate::error::HapticError;

/// Hooks into the rest of the app. All methods default to doing nothing.
pub trait StackCallbacks {
    /// A card was swiped right; usually starts cooking it.
    fn on_accept(&self, _candidate: &Candidate) {}

    fn on_favorite_toggled(&self, _candidate: &Candidate, _favorited: bool) {}

    fn on_inspect(&self, _candidate: &Candidate) {}

    /// The stack ran out and the user asked for more recipes.
    fn on_refresh_requested(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

impl StackCallbacks for NoopCallbacks {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticKind {
    /// Light tap when a drag starts.
    DragStart,
    /// Firmer pulse when a release commits a decision.
    Decision,
    Favorite,
}

pub trait Haptics {
    fn trigger(&self, kind: HapticKind) -> Result<(), HapticError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn trigger(&self, _kind: HapticKind) -> Result<(), HapticError> {
        Ok(())
    }
}

/// Fire-and-forget haptic; failures are logged and otherwise ignored.
pub fn fire(haptics: &dyn Haptics, kind: HapticKind) {
    if let Err(err) = haptics.trigger(kind) {
        debug!("Ignoring haptic failure for {:?}: {}", kind, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Broken {
        attempts: Cell<u32>,
    }

    impl Haptics for Broken {
        fn trigger(&self, _kind: HapticKind) -> Result<(), HapticError> {
            self.attempts.set(self.attempts.get() + 1);
            Err(HapticError("motor unavailable".into()))
        }
    }

    #[test]
    fn failing_haptics_are_swallowed() {
        let haptics = Broken {
            attempts: Cell::new(0),
        };
        fire(&haptics, HapticKind::DragStart);
        fire(&haptics, HapticKind::Decision);
        assert_eq!(haptics.attempts.get(), 2);
    }
}

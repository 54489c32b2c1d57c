//! Drag handling for the top card of the stack.
//!
//! The controller turns pointer deltas into live geometry, classifies the
//! release and animates the card either off screen or back to the origin.
//! Structural changes are never made here: a decisive release only yields a
//! [`Commit`] once the throw animation has settled.

use log::debug;
use std::rc::Rc;

use crate::classifier::{classify, Decision};
use crate::collaborators::{fire, HapticKind, Haptics, NoHaptics};
use crate::config::EngineConfig;
use crate::interpolate::{interpolate, Extrapolate};
use crate::observable::{Observable, SubscriptionId};
use crate::spring::{SpringAnimation, SpringConfig};

pub type PointerId = i32;

/// Offset and tilt of the top card relative to its resting place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveGeometry {
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
}

impl LiveGeometry {
    pub fn is_at_rest(&self) -> bool {
        *self == LiveGeometry::default()
    }
}

/// A decision that is ready to be applied to the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub card_id: String,
    pub decision: Decision,
}

#[derive(Debug, Clone)]
struct DragSession {
    card_id: String,
    pointer_id: PointerId,
    baseline: LiveGeometry,
}

#[derive(Debug, Clone)]
struct Settle {
    card_id: String,
    decision: Decision,
    animation: SpringAnimation,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Dragging(DragSession),
    Settling(Settle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    /// Springing back to the origin after an undecided release.
    Returning,
    /// Flying off screen; a commit follows once it settles.
    Leaving,
}

pub struct GestureDragController {
    config: EngineConfig,
    attached: Option<String>,
    live: Observable<LiveGeometry>,
    phase: Phase,
    haptics: Rc<dyn Haptics>,
}

impl GestureDragController {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_haptics(config, Rc::new(NoHaptics))
    }

    pub fn with_haptics(config: EngineConfig, haptics: Rc<dyn Haptics>) -> Self {
        Self {
            config,
            attached: None,
            live: Observable::new(LiveGeometry::default()),
            phase: Phase::Idle,
            haptics,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold()
    }

    pub fn live(&self) -> LiveGeometry {
        self.live.get()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&LiveGeometry) + 'static) -> SubscriptionId {
        self.live.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.live.unsubscribe(id)
    }

    pub fn attached(&self) -> Option<&str> {
        self.attached.as_deref()
    }

    pub fn phase(&self) -> GesturePhase {
        match &self.phase {
            Phase::Idle => GesturePhase::Idle,
            Phase::Dragging(_) => GesturePhase::Dragging,
            Phase::Settling(settle) if settle.decision.is_decisive() => GesturePhase::Leaving,
            Phase::Settling(_) => GesturePhase::Returning,
        }
    }

    /// True while a pointer is down or an animation is still running.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Points the controller at the current top card. Ignored while a
    /// gesture is in flight; the card under it cannot change until then.
    pub fn attach(&mut self, card_id: Option<&str>) {
        if self.is_active() || self.attached.as_deref() == card_id {
            return;
        }
        self.attached = card_id.map(str::to_owned);
        self.live.set(LiveGeometry::default());
    }

    pub fn on_drag_start(&mut self, pointer_id: PointerId) -> bool {
        let Some(card_id) = self.attached.clone() else {
            return false;
        };

        // A card that is springing back can be caught mid-flight; one that is
        // leaving cannot.
        let baseline = match &self.phase {
            Phase::Idle => self.live.get(),
            Phase::Settling(settle) if !settle.decision.is_decisive() => self.live.get(),
            _ => return false,
        };

        debug!("Drag started on '{}' with pointer {}", card_id, pointer_id);
        self.phase = Phase::Dragging(DragSession {
            card_id,
            pointer_id,
            baseline,
        });
        fire(self.haptics.as_ref(), HapticKind::DragStart);
        true
    }

    pub fn on_drag_update(&mut self, pointer_id: PointerId, dx: f64, dy: f64) -> bool {
        let Some(session) = self.session(pointer_id) else {
            return false;
        };
        let x = session.baseline.x + dx;
        let y = session.baseline.y + dy;
        let next = LiveGeometry {
            x,
            y,
            rotation_deg: self.rotation_for(x),
        };
        self.live.set(next);
        true
    }

    /// Classifies the release by its horizontal travel and starts the
    /// matching animation. Returns `None` for a pointer that is not dragging.
    pub fn on_drag_end(&mut self, pointer_id: PointerId, dx: f64) -> Option<Decision> {
        let session = self.session(pointer_id)?.clone();
        let travel = session.baseline.x + dx;
        let decision = classify(travel, self.threshold());
        debug!("Released '{}' at {:.1}px: {:?}", session.card_id, travel, decision);

        if decision.is_decisive() {
            fire(self.haptics.as_ref(), HapticKind::Decision);
        }
        self.settle(session.card_id, decision);
        Some(decision)
    }

    /// Lost pointer capture; behaves like an undecided release.
    pub fn on_drag_cancel(&mut self, pointer_id: PointerId) -> bool {
        let Some(session) = self.session(pointer_id) else {
            return false;
        };
        let card_id = session.card_id.clone();
        self.settle(card_id, Decision::Neutral);
        true
    }

    /// Throws the attached card without a drag, as the swipe buttons do.
    pub fn throw(&mut self, decision: Decision) -> bool {
        if !decision.is_decisive() || self.is_active() {
            return false;
        }
        let Some(card_id) = self.attached.clone() else {
            return false;
        };
        fire(self.haptics.as_ref(), HapticKind::Decision);
        self.settle(card_id, decision);
        true
    }

    /// Advances any running animation by `dt` seconds. Returns the commit of
    /// a decisive release once its throw has settled.
    pub fn tick(&mut self, dt: f64) -> Option<Commit> {
        let Phase::Settling(settle) = &mut self.phase else {
            return None;
        };

        let settled = settle.animation.step(dt);
        let current = settle.animation.current();
        self.live.set(current);
        if !settled {
            return None;
        }

        let Phase::Settling(settle) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return None;
        };
        if !settle.decision.is_decisive() {
            return None;
        }

        debug!("'{}' left the screen: {:?}", settle.card_id, settle.decision);
        self.attached = None;
        self.live.set(LiveGeometry::default());
        Some(Commit {
            card_id: settle.card_id,
            decision: settle.decision,
        })
    }

    fn session(&self, pointer_id: PointerId) -> Option<&DragSession> {
        match &self.phase {
            Phase::Dragging(session) if session.pointer_id == pointer_id => Some(session),
            _ => None,
        }
    }

    fn rotation_for(&self, x: f64) -> f64 {
        let half = self.config.viewport_width / 2.0;
        let max = self.config.max_rotation_deg;
        interpolate(x, &[-half, half], &[-max, max], Extrapolate::Clamp)
    }

    fn settle(&mut self, card_id: String, decision: Decision) {
        let from = self.live.get();
        let (target, spring): (LiveGeometry, SpringConfig) = if decision.is_decisive() {
            (
                LiveGeometry {
                    x: decision.direction() * self.config.throw_distance(),
                    y: from.y,
                    rotation_deg: from.rotation_deg,
                },
                self.config.throw_spring,
            )
        } else {
            (LiveGeometry::default(), self.config.return_spring)
        };

        self.phase = Phase::Settling(Settle {
            card_id,
            decision,
            animation: SpringAnimation::new(from, target, spring, self.config.rest_epsilon),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HapticError;
    use std::cell::RefCell;

    const FRAME: f64 = 1.0 / 60.0;

    fn controller() -> GestureDragController {
        let mut gesture = GestureDragController::new(EngineConfig::default());
        gesture.attach(Some("a"));
        gesture
    }

    fn run_until_settled(gesture: &mut GestureDragController) -> Option<Commit> {
        for _ in 0..1200 {
            if let Some(commit) = gesture.tick(FRAME) {
                return Some(commit);
            }
            if !gesture.is_active() {
                return None;
            }
        }
        panic!("animation never settled");
    }

    #[test]
    fn drag_update_tracks_offset_and_rotation() {
        let mut gesture = controller();
        assert!(gesture.on_drag_start(1));
        gesture.on_drag_update(1, 100.0, 12.0);
        let live = gesture.live();
        assert_eq!(live.x, 100.0);
        assert_eq!(live.y, 12.0);
        assert!((live.rotation_deg - 5.0).abs() < 1e-9);

        gesture.on_drag_update(1, -900.0, 0.0);
        assert_eq!(gesture.live().rotation_deg, -10.0);
    }

    #[test]
    fn other_pointers_are_ignored() {
        let mut gesture = controller();
        gesture.on_drag_start(1);
        assert!(!gesture.on_drag_start(2));
        assert!(!gesture.on_drag_update(2, 50.0, 0.0));
        assert_eq!(gesture.on_drag_end(2, 500.0), None);
        assert_eq!(gesture.phase(), GesturePhase::Dragging);
    }

    #[test]
    fn reject_commits_only_after_settling() {
        let mut gesture = controller();
        gesture.on_drag_start(1);
        gesture.on_drag_update(1, -130.0, 8.0);
        assert_eq!(gesture.on_drag_end(1, -130.0), Some(Decision::Reject));
        assert_eq!(gesture.phase(), GesturePhase::Leaving);
        assert_eq!(gesture.tick(FRAME), None);

        let commit = run_until_settled(&mut gesture).unwrap();
        assert_eq!(
            commit,
            Commit {
                card_id: "a".to_owned(),
                decision: Decision::Reject
            }
        );
        assert_eq!(gesture.phase(), GesturePhase::Idle);
        assert!(gesture.live().is_at_rest());
        assert_eq!(gesture.attached(), None);
    }

    #[test]
    fn throw_leaves_towards_the_decision() {
        let mut gesture = controller();
        gesture.on_drag_start(1);
        gesture.on_drag_update(1, 150.0, 20.0);
        gesture.on_drag_end(1, 150.0);

        let mut furthest: f64 = 0.0;
        let mut y_values = Vec::new();
        for _ in 0..1200 {
            if gesture.tick(FRAME).is_some() {
                break;
            }
            furthest = furthest.max(gesture.live().x);
            y_values.push(gesture.live().y);
        }
        assert!(furthest > 590.0);
        assert!(y_values.iter().all(|y| (y - 20.0).abs() < 1e-6));
    }

    #[test]
    fn neutral_release_springs_home_without_commit() {
        let mut gesture = controller();
        gesture.on_drag_start(1);
        gesture.on_drag_update(1, 90.0, -30.0);
        assert_eq!(gesture.on_drag_end(1, 90.0), Some(Decision::Neutral));
        assert_eq!(gesture.phase(), GesturePhase::Returning);

        assert_eq!(run_until_settled(&mut gesture), None);
        assert!(gesture.live().is_at_rest());
        assert_eq!(gesture.attached(), Some("a"));
    }

    #[test]
    fn cancel_matches_neutral_release() {
        let mut gesture = controller();
        gesture.on_drag_start(7);
        gesture.on_drag_update(7, -300.0, 0.0);
        assert!(gesture.on_drag_cancel(7));
        assert_eq!(gesture.phase(), GesturePhase::Returning);
        assert_eq!(run_until_settled(&mut gesture), None);
        assert!(gesture.live().is_at_rest());
    }

    #[test]
    fn returning_card_can_be_caught() {
        let mut gesture = controller();
        gesture.on_drag_start(1);
        gesture.on_drag_update(1, 80.0, 0.0);
        gesture.on_drag_end(1, 80.0);
        gesture.tick(FRAME);
        let caught = gesture.live().x;

        assert!(gesture.on_drag_start(2));
        gesture.on_drag_update(2, 10.0, 0.0);
        assert!((gesture.live().x - (caught + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn leaving_card_cannot_be_grabbed() {
        let mut gesture = controller();
        assert!(gesture.throw(Decision::Accept));
        assert!(!gesture.on_drag_start(1));
        assert!(!gesture.throw(Decision::Reject));
        let commit = run_until_settled(&mut gesture).unwrap();
        assert_eq!(commit.decision, Decision::Accept);
    }

    #[test]
    fn nothing_to_drag_without_a_card() {
        let mut gesture = GestureDragController::new(EngineConfig::default());
        assert!(!gesture.on_drag_start(1));
        assert!(!gesture.throw(Decision::Accept));
        assert!(!gesture.throw(Decision::Neutral));
    }

    #[test]
    fn live_geometry_is_observable() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut gesture = controller();
        {
            let seen = seen.clone();
            gesture.subscribe(move |live| seen.borrow_mut().push(live.x));
        }
        gesture.on_drag_start(1);
        gesture.on_drag_update(1, 10.0, 0.0);
        gesture.on_drag_update(1, 20.0, 0.0);
        assert_eq!(*seen.borrow(), vec![10.0, 20.0]);
    }

    struct Recording(RefCell<Vec<HapticKind>>);

    impl Haptics for Recording {
        fn trigger(&self, kind: HapticKind) -> Result<(), HapticError> {
            self.0.borrow_mut().push(kind);
            Err(HapticError("no motor".into()))
        }
    }

    #[test]
    fn haptics_fire_at_start_and_decisive_release() {
        let haptics = Rc::new(Recording(RefCell::new(Vec::new())));
        let mut gesture =
            GestureDragController::with_haptics(EngineConfig::default(), haptics.clone());
        gesture.attach(Some("a"));

        gesture.on_drag_start(1);
        gesture.on_drag_end(1, 40.0);
        run_until_settled(&mut gesture);
        gesture.on_drag_start(1);
        gesture.on_drag_end(1, 200.0);

        assert_eq!(
            *haptics.0.borrow(),
            vec![HapticKind::DragStart, HapticKind::DragStart, HapticKind::Decision]
        );
        assert_eq!(gesture.phase(), GesturePhase::Leaving);

        // The motor failing never holds up the decision.
        let commit = run_until_settled(&mut gesture).expect("accept commits");
        assert_eq!(
            commit,
            Commit {
                card_id: "a".to_owned(),
                decision: Decision::Accept,
            }
        );
        assert_eq!(gesture.phase(), GesturePhase::Idle);
    }
}

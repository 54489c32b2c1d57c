//! The swipe deck: stack state, the top-card gesture and the layout table
//! wired into one interaction loop.
//!
//! Pointer moves only touch the live geometry. The stack changes at two kinds
//! of points: when a thrown card settles (from [`SwipeDeck::tick`]) and on
//! discrete taps. A refresh that arrives mid-gesture is held back until the
//! gesture has settled.

use log::{debug, warn};
use std::rc::Rc;

use crate::candidate::Candidate;
use crate::classifier::Decision;
use crate::collaborators::{Haptics, NoHaptics, NoopCallbacks, StackCallbacks};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::gesture::{Commit, GestureDragController, GesturePhase, LiveGeometry, PointerId};
use crate::layout::{CardSize, CardTransform, LayoutTable};
use crate::observable::SubscriptionId;
use crate::overlay::OverlayOpacity;
use crate::stack::{CardStackController, StackStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// Queued until the gesture in flight settles.
    Deferred,
}

/// Everything needed to draw one card of the visible window.
#[derive(Debug, Clone, PartialEq)]
pub struct CardFrame<'a> {
    pub candidate: &'a Candidate,
    pub transform: CardTransform,
    /// Only present on the top card.
    pub overlay: Option<OverlayOpacity>,
    pub is_top: bool,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy)]
struct PointerOrigin {
    pointer_id: PointerId,
    x: f64,
    y: f64,
}

pub struct SwipeDeck {
    config: EngineConfig,
    stack: CardStackController,
    gesture: GestureDragController,
    table: LayoutTable,
    pointer: Option<PointerOrigin>,
    pending_refresh: Option<Vec<Candidate>>,
}

impl SwipeDeck {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_collaborators(config, Rc::new(NoopCallbacks), Rc::new(NoHaptics))
    }

    pub fn with_collaborators(
        config: EngineConfig,
        callbacks: Rc<dyn StackCallbacks>,
        haptics: Rc<dyn Haptics>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = LayoutTable::new(
            config.window_size,
            CardSize::new(config.card_width, config.card_height),
        );
        Ok(Self {
            stack: CardStackController::with_collaborators(
                config.window_size,
                callbacks,
                haptics.clone(),
            ),
            gesture: GestureDragController::with_haptics(config.clone(), haptics),
            table,
            config,
            pointer: None,
            pending_refresh: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stack(&self) -> &CardStackController {
        &self.stack
    }

    pub fn status(&self) -> StackStatus {
        self.stack.status()
    }

    pub fn live(&self) -> LiveGeometry {
        self.gesture.live()
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    pub fn subscribe_live(&mut self, listener: impl Fn(&LiveGeometry) + 'static) -> SubscriptionId {
        self.gesture.subscribe(listener)
    }

    pub fn unsubscribe_live(&mut self, id: SubscriptionId) -> bool {
        self.gesture.unsubscribe(id)
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.pending_refresh.is_some()
    }

    /// Replaces the stack wholesale, or queues the list while a card is being
    /// dragged or animated. Only the latest queued list is kept.
    pub fn refresh(&mut self, candidates: Vec<Candidate>) -> RefreshOutcome {
        if self.gesture.is_active() {
            warn!(
                "Deferring refresh of {} cards until the current gesture settles",
                candidates.len()
            );
            self.pending_refresh = Some(candidates);
            return RefreshOutcome::Deferred;
        }

        self.stack.refresh(candidates);
        self.sync_attachment();
        RefreshOutcome::Applied
    }

    pub fn request_refresh(&self) -> bool {
        self.stack.request_refresh()
    }

    /// Starts a drag. Only the top card responds.
    pub fn pointer_down(&mut self, card_id: &str, pointer_id: PointerId, x: f64, y: f64) -> bool {
        if self.pointer.is_some() || self.gesture.attached() != Some(card_id) {
            return false;
        }
        if !self.gesture.on_drag_start(pointer_id) {
            return false;
        }
        self.pointer = Some(PointerOrigin { pointer_id, x, y });
        true
    }

    pub fn pointer_move(&mut self, pointer_id: PointerId, x: f64, y: f64) -> bool {
        let Some(origin) = self.origin(pointer_id) else {
            return false;
        };
        self.gesture
            .on_drag_update(pointer_id, x - origin.x, y - origin.y)
    }

    pub fn pointer_up(&mut self, pointer_id: PointerId, x: f64, y: f64) -> Option<Decision> {
        let origin = self.origin(pointer_id)?;
        self.gesture
            .on_drag_update(pointer_id, x - origin.x, y - origin.y);
        self.pointer = None;
        self.gesture.on_drag_end(pointer_id, x - origin.x)
    }

    /// Pointer capture was lost; the card returns home untouched.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) -> bool {
        if self.origin(pointer_id).is_none() {
            return false;
        }
        self.pointer = None;
        self.gesture.on_drag_cancel(pointer_id)
    }

    /// A tap on a card below the top brings it to the front.
    pub fn tap(&mut self, card_id: &str) -> bool {
        if self.gesture.is_active() {
            debug!("Ignoring tap on '{}' during a gesture", card_id);
            return false;
        }
        if self.stack.top().map(|c| c.id.as_str()) == Some(card_id) {
            return false;
        }
        if self.stack.bring_to_front(card_id).is_err() {
            return false;
        }
        self.sync_attachment();
        true
    }

    /// Throws the top card as if it had been swiped, e.g. from a button.
    pub fn swipe(&mut self, decision: Decision) -> bool {
        self.gesture.throw(decision)
    }

    pub fn toggle_favorite(&mut self, card_id: &str) -> bool {
        self.stack.toggle_favorite(card_id)
    }

    pub fn inspect(&self, card_id: &str) -> bool {
        self.stack.inspect(card_id).is_ok()
    }

    /// Restores the last dismissed card. Held off while a gesture is in
    /// flight so the dragged card stays on top.
    pub fn undo(&mut self) -> bool {
        if self.gesture.is_active() {
            debug!("Ignoring undo during a gesture");
            return false;
        }
        let restored = self.stack.undo();
        if restored {
            self.sync_attachment();
        }
        restored
    }

    /// Advances animations by `dt` seconds and applies any decision whose
    /// throw has settled, then any refresh that was waiting on it.
    pub fn tick(&mut self, dt: f64) -> Option<Commit> {
        let commit = self.gesture.tick(dt);
        if let Some(commit) = &commit {
            let applied = match commit.decision {
                Decision::Reject => self.stack.dismiss(&commit.card_id),
                Decision::Accept => self.stack.accept(&commit.card_id),
                Decision::Neutral => Ok(()),
            };
            if let Err(err) = applied {
                debug!("Dropping settled {:?}: {}", commit.decision, err);
            }
        }

        if !self.gesture.is_active() {
            if let Some(candidates) = self.pending_refresh.take() {
                debug!("Applying deferred refresh of {} cards", candidates.len());
                self.stack.refresh(candidates);
            }
            self.sync_attachment();
        }
        commit
    }

    pub fn is_animating(&self) -> bool {
        matches!(
            self.gesture.phase(),
            GesturePhase::Returning | GesturePhase::Leaving
        )
    }

    /// Transforms and overlay state for the visible window, top card first.
    pub fn frame(&self) -> Vec<CardFrame<'_>> {
        let live = self.gesture.live();
        let threshold = self.config.threshold();

        self.stack
            .visible_window()
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let transform = self.table.resolve(index, live)?;
                let is_top = index == 0;
                Some(CardFrame {
                    candidate,
                    transform,
                    overlay: is_top.then(|| OverlayOpacity::from_offset(live.x, threshold)),
                    is_top,
                    is_favorite: self.stack.is_favorite(&candidate.id),
                })
            })
            .collect()
    }

    fn origin(&self, pointer_id: PointerId) -> Option<PointerOrigin> {
        self.pointer.filter(|origin| origin.pointer_id == pointer_id)
    }

    fn sync_attachment(&mut self) {
        let top = self.stack.top().map(|c| c.id.as_str());
        self.gesture.attach(top);
    }
}

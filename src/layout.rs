//! Per-card geometry for the visible window of the stack.
//!
//! Cards further down the stack are drawn smaller. Scaling happens around the
//! card centre, which would pull each shrunk card's bottom-left corner inwards;
//! a corrective translation moves it back so every card shares the anchor of
//! the full-size top card.

use crate::gesture::LiveGeometry;
use crate::interpolate::{interpolate, Extrapolate};

const DEPTH_STOPS: [f64; 3] = [0.0, 1.0, 2.0];
const DEPTH_SCALES: [f64; 3] = [0.8, 0.9, 1.0];
const BASE_Z_ORDER: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSize {
    pub width: f64,
    pub height: f64,
}

impl CardSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub scale: f64,
    pub corrective_x: f64,
    pub corrective_y: f64,
    pub z_order: i32,
    /// Live drag offset; always zero below the top card.
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation_deg: f64,
}

impl CardTransform {
    /// Horizontal offset applied after scaling (screen axes, y grows down).
    pub fn offset_x(&self) -> f64 {
        self.translate_x - self.corrective_x
    }

    pub fn offset_y(&self) -> f64 {
        self.translate_y + self.corrective_y
    }

    /// Adds the live drag geometry of the top card.
    pub fn compose_live(mut self, live: LiveGeometry) -> Self {
        self.translate_x = live.x;
        self.translate_y = live.y;
        self.rotation_deg = live.rotation_deg;
        self
    }

    /// Bottom-left corner of a card laid out at the origin once this
    /// transform (scale about the centre, then offset) is applied.
    pub fn bottom_left_anchor(&self, size: CardSize) -> (f64, f64) {
        let x = size.width / 2.0 - size.width * self.scale / 2.0 + self.offset_x();
        let y = size.height / 2.0 + size.height * self.scale / 2.0 + self.offset_y();
        (x, y)
    }

    pub fn to_css(&self) -> String {
        format!(
            "transform: translate({:.1}px, {:.1}px) rotate({:.2}deg) scale({:.3}); z-index: {};",
            self.offset_x(),
            self.offset_y(),
            self.rotation_deg,
            self.scale,
            self.z_order
        )
    }
}

/// Static transform of the card at `index` (0 = top) in a window of
/// `window_size` cards.
pub fn layout(index: usize, window_size: usize, size: CardSize) -> CardTransform {
    // Indices past the window are drawn in its last slot.
    let slot = index.min(window_size.saturating_sub(1)) as i32;
    let depth = (DEPTH_STOPS.len() - 1) as f64 - f64::from(slot);
    let scale = interpolate(depth, &DEPTH_STOPS, &DEPTH_SCALES, Extrapolate::Clamp);
    let z_order = BASE_Z_ORDER - slot;

    CardTransform {
        scale,
        corrective_x: (size.width - size.width * scale) / 2.0,
        corrective_y: (size.height - size.height * scale) / 2.0,
        z_order,
        translate_x: 0.0,
        translate_y: 0.0,
        rotation_deg: 0.0,
    }
}

/// Transforms for every slot of the window, computed once per card size.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTable {
    size: CardSize,
    slots: Vec<CardTransform>,
}

impl LayoutTable {
    pub fn new(window_size: usize, size: CardSize) -> Self {
        let slots = (0..window_size)
            .map(|index| layout(index, window_size, size))
            .collect();
        Self { size, slots }
    }

    pub fn size(&self) -> CardSize {
        self.size
    }

    pub fn window_size(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<CardTransform> {
        self.slots.get(index).copied()
    }

    /// Transform for `index`, with the live geometry composed onto the top card.
    pub fn resolve(&self, index: usize, live: LiveGeometry) -> Option<CardTransform> {
        let transform = self.get(index)?;
        if index == 0 {
            Some(transform.compose_live(live))
        } else {
            Some(transform)
        }
    }
}

use crate::interpolate::{interpolate, Extrapolate};

/// Opacity of the pass/accept badges on the top card, derived from the live
/// horizontal offset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayOpacity {
    pub pass: f64,
    pub accept: f64,
}

impl OverlayOpacity {
    pub fn from_offset(dx: f64, threshold: f64) -> Self {
        if threshold <= 0.0 {
            return Self {
                pass: if dx < 0.0 { 1.0 } else { 0.0 },
                accept: if dx > 0.0 { 1.0 } else { 0.0 },
            };
        }

        Self {
            pass: interpolate(dx, &[-threshold, 0.0], &[1.0, 0.0], Extrapolate::Clamp),
            accept: interpolate(dx, &[0.0, threshold], &[0.0, 1.0], Extrapolate::Clamp),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.pass == 0.0 && self.accept == 0.0
    }
}

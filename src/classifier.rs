/// Outcome of a released drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Reject,
    Accept,
    Neutral,
}

impl Decision {
    pub fn is_decisive(self) -> bool {
        !matches!(self, Decision::Neutral)
    }

    /// Horizontal direction a decisive card leaves in: -1 left, +1 right.
    pub fn direction(self) -> f64 {
        match self {
            Decision::Reject => -1.0,
            Decision::Accept => 1.0,
            Decision::Neutral => 0.0,
        }
    }
}

/// Classifies a release by its horizontal travel. Travel of exactly
/// `±threshold` is not decisive.
pub fn classify(dx: f64, threshold: f64) -> Decision {
    if dx < -threshold {
        Decision::Reject
    } else if dx > threshold {
        Decision::Accept
    } else {
        Decision::Neutral
    }
}

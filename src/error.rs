use thiserror::Error;

/// Raised by stack operations that name a card the stack does not hold.
///
/// These are inconsistencies, not failures: the controller logs them and
/// leaves its state untouched, so callers are free to discard the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("card '{0}' is not in the stack")]
    NotInStack(String),
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("deck is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("deck does not contain any recipes")]
    Empty,
    #[error("could not fetch deck: {0}")]
    Network(String),
}

impl DeckError {
    pub fn network<E: std::fmt::Display>(err: E) -> Self {
        Self::Network(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("haptic trigger failed: {0}")]
pub struct HapticError(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("threshold_ratio must be in (0, 1], got {0}")]
    ThresholdRatio(f64),
    #[error("window_size must be between 1 and {max}, got {value}")]
    WindowSize { value: usize, max: usize },
    #[error("{spring}.{field} must be positive, got {value}")]
    Spring {
        spring: &'static str,
        field: &'static str,
        value: f64,
    },
}

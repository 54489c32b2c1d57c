use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spring::SpringConfig;

/// Fraction of the viewport width a release must travel to count as a decision.
pub const DEFAULT_THRESHOLD_RATIO: f64 = 0.3;

/// Number of cards rendered from the top of the stack.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// The depth scale only has stops for three cards; deeper slots would
/// collapse onto the last one.
pub const MAX_WINDOW_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport_width: f64,
    pub card_width: f64,
    pub card_height: f64,
    pub threshold_ratio: f64,
    pub window_size: usize,
    /// Rotation reached when the card is dragged half a viewport sideways.
    pub max_rotation_deg: f64,
    /// How far past the origin a thrown card travels, in viewport widths.
    pub throw_distance_ratio: f64,
    pub throw_spring: SpringConfig,
    pub return_spring: SpringConfig,
    /// Distance (and speed) under which an animation counts as settled.
    pub rest_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport_width: 400.0,
            card_width: 340.0,
            card_height: 480.0,
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            window_size: DEFAULT_WINDOW_SIZE,
            max_rotation_deg: 10.0,
            throw_distance_ratio: 1.5,
            throw_spring: SpringConfig::THROW,
            return_spring: SpringConfig::RETURN,
            rest_epsilon: 0.5,
        }
    }
}

impl EngineConfig {
    pub fn with_viewport_width(mut self, viewport_width: f64) -> Self {
        self.viewport_width = viewport_width;
        self
    }

    pub fn with_card_size(mut self, width: f64, height: f64) -> Self {
        self.card_width = width;
        self.card_height = height;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold_ratio * self.viewport_width
    }

    pub fn throw_distance(&self) -> f64 {
        self.throw_distance_ratio * self.viewport_width
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("viewport_width", self.viewport_width),
            ("card_width", self.card_width),
            ("card_height", self.card_height),
            ("throw_distance_ratio", self.throw_distance_ratio),
            ("rest_epsilon", self.rest_epsilon),
        ];
        for (field, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.threshold_ratio > 0.0 && self.threshold_ratio <= 1.0) {
            return Err(ConfigError::ThresholdRatio(self.threshold_ratio));
        }
        if !(1..=MAX_WINDOW_SIZE).contains(&self.window_size) {
            return Err(ConfigError::WindowSize {
                value: self.window_size,
                max: MAX_WINDOW_SIZE,
            });
        }
        self.throw_spring.validate("throw_spring")?;
        self.return_spring.validate("return_spring")

    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_thirty_percent_of_viewport() {
        let config = EngineConfig::default();
        assert!((config.threshold() - 120.0).abs() < 1e-9);
        assert!((config.throw_distance() - 600.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "viewport_width": 1000.0 }"#).unwrap();
        assert_eq!(config.window_size, DEFAULT_WINDOW_SIZE);
        assert!((config.threshold() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_values() {
        let config = EngineConfig::default().with_viewport_width(0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "viewport_width",
                ..
            })
        ));

        let mut config = EngineConfig::default();
        config.threshold_ratio = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::ThresholdRatio(1.5)));

        let mut config = EngineConfig::default();
        config.window_size = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::WindowSize { value: 0, max: 3 })
        );

        let mut config = EngineConfig::default();
        config.window_size = usize::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WindowSize { .. })
        ));
    }

    #[test]
    fn rejects_springs_that_never_settle() {
        let config = EngineConfig::from_json(
            r#"{ "throw_spring": { "stiffness": 0.0, "damping": 26.0, "mass": 1.0 } }"#,
        )
        .unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::Spring {
                spring: "throw_spring",
                field: "stiffness",
                value: 0.0,
            })
        );

        let mut config = EngineConfig::default();
        config.return_spring.damping = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Spring {
                spring: "return_spring",
                field: "damping",
                ..
            })
        ));

        let mut config = EngineConfig::default();
        config.return_spring.mass = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Spring { field: "mass", .. })
        ));
    }

    #[test]
    fn partial_spring_falls_back_per_field() {
        let config =
            EngineConfig::from_json(r#"{ "throw_spring": { "stiffness": 150.0 } }"#).unwrap();
        assert_eq!(config.throw_spring.stiffness, 150.0);
        assert_eq!(config.throw_spring.damping, SpringConfig::default().damping);
        assert_eq!(config.throw_spring.mass, 1.0);
        assert!(config.validate().is_ok());
    }
}

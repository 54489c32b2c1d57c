use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gesture::LiveGeometry;

const MAX_STEP: f64 = 1.0 / 120.0;

/// Missing fields in a partial spring take their value from `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringConfig {
    /// Near-critical spring for cards thrown off screen after a decisive release.
    pub const THROW: SpringConfig = SpringConfig {
        stiffness: 200.0,
        damping: 26.0,
        mass: 1.0,
    };

    /// Slightly bouncy spring for snapping a card back to the origin.
    pub const RETURN: SpringConfig = SpringConfig {
        stiffness: 300.0,
        damping: 22.0,
        mass: 1.0,
    };

    pub fn critical_damping(stiffness: f64, mass: f64) -> f64 {
        2.0 * (stiffness * mass).sqrt()
    }

    /// A spring without positive stiffness, damping and mass never comes to
    /// rest, so the settle that commits a decision would never arrive.
    pub fn validate(&self, spring: &'static str) -> Result<(), ConfigError> {
        let fields = [
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("mass", self.mass),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Spring {
                    spring,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::RETURN
    }
}

#[derive(Debug, Clone)]
pub struct DampedSpring {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
    config: SpringConfig,
}

impl DampedSpring {
    pub fn new(position: f64, target: f64, config: SpringConfig) -> Self {
        Self {
            position,
            velocity: 0.0,
            target,
            config,
        }
    }

    fn update(&mut self, dt: f64) {
        let mass = self.config.mass.max(f64::EPSILON);
        let displacement = self.position - self.target;
        let spring_force = -self.config.stiffness * displacement;
        let damping_force = -self.config.damping * self.velocity;
        let acceleration = (spring_force + damping_force) / mass;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advances by `dt` seconds, sub-stepping so long frames stay stable.
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        if dt <= MAX_STEP {
            self.update(dt);
            return;
        }

        let steps = (dt / MAX_STEP).ceil() as usize;
        let sub_dt = dt / steps as f64;
        for _ in 0..steps {
            self.update(sub_dt);
        }
    }

    pub fn is_settled(&self, epsilon: f64) -> bool {
        (self.position - self.target).abs() < epsilon && self.velocity.abs() < epsilon
    }

    pub fn snap_to_target(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
    }
}

/// Drives the three live channels of a card (x, y, rotation) towards a target
/// and reports when all of them have settled.
#[derive(Debug, Clone)]
pub struct SpringAnimation {
    x: DampedSpring,
    y: DampedSpring,
    rotation: DampedSpring,
    epsilon: f64,
}

impl SpringAnimation {
    pub fn new(from: LiveGeometry, to: LiveGeometry, config: SpringConfig, epsilon: f64) -> Self {
        Self {
            x: DampedSpring::new(from.x, to.x, config),
            y: DampedSpring::new(from.y, to.y, config),
            rotation: DampedSpring::new(from.rotation_deg, to.rotation_deg, config),
            epsilon,
        }
    }

    pub fn target(&self) -> LiveGeometry {
        LiveGeometry {
            x: self.x.target,
            y: self.y.target,
            rotation_deg: self.rotation.target,
        }
    }

    pub fn current(&self) -> LiveGeometry {
        LiveGeometry {
            x: self.x.position,
            y: self.y.position,
            rotation_deg: self.rotation.position,
        }
    }

    /// Advances the animation; once every channel is within `epsilon` of its
    /// target the channels snap exactly onto it and `true` is returned.
    pub fn step(&mut self, dt: f64) -> bool {
        self.x.step(dt);
        self.y.step(dt);
        self.rotation.step(dt);

        if self.is_settled() {
            self.x.snap_to_target();
            self.y.snap_to_target();
            self.rotation.snap_to_target();
            true
        } else {
            false
        }
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled(self.epsilon)
            && self.y.is_settled(self.epsilon)
            && self.rotation.is_settled(self.epsilon)
    }
}

//! Per-entity physics rule set ("DNA").
//!
//! DNA is a plain value owned by its entity. Every field has a hard range,
//! and [`Dna::clamp`] restores those ranges after any mutation.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometric_utils::vec2;

/// Bounds for the gravity components.
pub const GRAVITY_LIMIT: f32 = 1000.0;
/// Lowest friction factor (strongest damping).
pub const FRICTION_MIN: f32 = 0.90;
/// Highest friction factor (slight energy gain).
pub const FRICTION_MAX: f32 = 1.01;
/// Friction factor treated as frictionless.
pub const FRICTIONLESS: f32 = 1.0;
/// Bounds for the perception radius.
pub const PERCEPTION_RANGE: (f32, f32) = (10.0, 400.0);
/// Bounds for the behavioral speed cap.
pub const MAX_SPEED_RANGE: (f32, f32) = (10.0, 1000.0);
/// Bounds for the behavioral force cap.
pub const MAX_FORCE_RANGE: (f32, f32) = (1.0, 1000.0);

/// Mutable physics constants carried by one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dna {
    /// Gravity acceleration. Positive y pulls down, negative y is buoyant.
    pub gravity: Array1<f32>,
    /// Multiplicative velocity factor applied every step.
    pub friction: f32,
    /// Bounciness, 0 fully inelastic to 1 perfectly elastic.
    pub restitution: f32,
    /// Radius within which neighbors influence behavior.
    pub perception_radius: f32,
    /// Speed the steering behaviors aim for.
    pub max_speed: f32,
    /// Largest steering force a single behavior may apply.
    pub max_force: f32,
}

impl Default for Dna {
    /// Earth-like rules: downward gravity, light damping, moderate bounce.
    fn default() -> Self {
        Self {
            gravity: vec2(0.0, 200.0),
            friction: 0.995,
            restitution: 0.7,
            perception_radius: 80.0,
            max_speed: 250.0,
            max_force: 150.0,
        }
    }
}

impl Dna {
    /// Earth-like defaults with small per-entity variation in bounce and
    /// perception.
    pub fn new_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut dna = Self {
            restitution: rng.random_range(0.5..0.9),
            perception_radius: rng.random_range(60.0..100.0),
            ..Self::default()
        };
        dna.clamp();
        dna
    }

    /// Restores every field to its legal range. Non-finite values fall back
    /// to the defaults before clamping.
    pub fn clamp(&mut self) {
        let defaults = Self::default();
        for axis in 0..2 {
            let g = self.gravity[axis];
            self.gravity[axis] = if g.is_finite() {
                g.clamp(-GRAVITY_LIMIT, GRAVITY_LIMIT)
            } else {
                defaults.gravity[axis]
            };
        }
        self.friction = clamp_or(self.friction, FRICTION_MIN, FRICTION_MAX, defaults.friction);
        self.restitution = clamp_or(self.restitution, 0.0, 1.0, defaults.restitution);
        self.perception_radius = clamp_or(
            self.perception_radius,
            PERCEPTION_RANGE.0,
            PERCEPTION_RANGE.1,
            defaults.perception_radius,
        );
        self.max_speed = clamp_or(
            self.max_speed,
            MAX_SPEED_RANGE.0,
            MAX_SPEED_RANGE.1,
            defaults.max_speed,
        );
        self.max_force = clamp_or(
            self.max_force,
            MAX_FORCE_RANGE.0,
            MAX_FORCE_RANGE.1,
            defaults.max_force,
        );
    }

    /// Checks that every field already lies in its legal range.
    pub fn is_within_bounds(&self) -> bool {
        self.gravity.len() == 2
            && self
                .gravity
                .iter()
                .all(|g| g.is_finite() && g.abs() <= GRAVITY_LIMIT)
            && (FRICTION_MIN..=FRICTION_MAX).contains(&self.friction)
            && (0.0..=1.0).contains(&self.restitution)
            && (PERCEPTION_RANGE.0..=PERCEPTION_RANGE.1).contains(&self.perception_radius)
            && (MAX_SPEED_RANGE.0..=MAX_SPEED_RANGE.1).contains(&self.max_speed)
            && (MAX_FORCE_RANGE.0..=MAX_FORCE_RANGE.1).contains(&self.max_force)
    }

    /// True when gravity pushes the entity upward.
    pub fn is_buoyant(&self) -> bool {
        self.gravity[1] < 0.0
    }

    /// True when gravity pulls the entity downward.
    pub fn is_heavy(&self) -> bool {
        self.gravity[1] > 0.0
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

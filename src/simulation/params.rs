//! Simulation parameters.
//!
//! A single flat struct holds every tunable constant. It round-trips through
//! JSON so runs can be configured from a file.

use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};
use super::events::DEFAULT_EVENT_CAPACITY;
use super::spatial::{DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH};

/// Simulation parameters that control world behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Simulation area width.
    pub world_width: f32,
    /// Simulation area height.
    pub world_height: f32,
    /// Largest population `initialize` accepts.
    pub max_entities: usize,

    /// Smallest radius of a freshly spawned entity.
    pub min_radius: f32,
    /// Largest radius of a freshly spawned entity.
    pub max_radius: f32,
    /// Mass per unit of disc area (`mass = mass_per_area * π * r²`).
    pub mass_per_area: f32,
    /// Fraction of spawned entities that are predators.
    pub predator_ratio: f32,
    /// Number of recent positions kept for trails.
    pub trail_length: usize,

    /// Energy an entity starts with and can never exceed.
    pub max_energy: f32,
    /// Energy lost by every entity each step.
    pub metabolic_cost: f32,
    /// Energy a predator gains from one catch.
    pub predation_energy: f32,
    /// Probability that a removed entity is replaced by a fresh one.
    pub respawn_probability: f32,

    /// Largest timestep a single step will integrate (seconds).
    pub max_dt: f32,
    /// Hard speed cap applied during integration.
    pub max_velocity: f32,

    /// Entries a quadtree node holds before subdividing.
    pub quadtree_capacity: usize,
    /// Depth at which quadtree nodes stop subdividing.
    pub quadtree_max_depth: usize,
    /// Fraction of penetration removed per step by positional correction.
    pub correction_percent: f32,
    /// Penetration tolerated without positional correction.
    pub correction_slop: f32,

    /// Fraction each colliding DNA moves toward the pairwise average.
    pub mix_rate: f32,
    /// Per-entity probability of a random gravity jitter after mixing.
    pub mutation_chance: f32,
    /// Largest gravity jitter per axis.
    pub mutation_magnitude: f32,

    /// Radius around an impulse position that gets disturbed.
    pub interaction_radius: f32,
    /// Gravity change per unit of vertical drag.
    pub interaction_gravity_rate: f32,
    /// Horizontal drag speed above which friction trends frictionless.
    pub interaction_friction_threshold: f32,
    /// Fraction friction moves toward frictionless per fast drag.
    pub interaction_friction_rate: f32,

    /// Weight of the alignment steering force.
    pub alignment_weight: f32,
    /// Weight of the cohesion steering force.
    pub cohesion_weight: f32,
    /// Weight of the separation steering force.
    pub separation_weight: f32,
    /// Weight of a predator's pull toward prey.
    pub chase_weight: f32,
    /// Weight of a prey's push away from predators.
    pub flee_weight: f32,
    /// Extra gap beyond touching at which a predator catches prey.
    pub contact_margin: f32,

    /// Maximum number of undrained events kept; the oldest are dropped.
    pub event_capacity: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            world_width: 1200.0,
            world_height: 800.0,
            max_entities: 2000,

            min_radius: 4.0,
            max_radius: 12.0,
            mass_per_area: 0.02,
            predator_ratio: 0.1,
            trail_length: 10,

            max_energy: 100.0,
            metabolic_cost: 0.02,
            predation_energy: 40.0,
            respawn_probability: 0.9,

            max_dt: 0.05,
            max_velocity: 2000.0,

            quadtree_capacity: DEFAULT_CAPACITY,
            quadtree_max_depth: DEFAULT_MAX_DEPTH,
            correction_percent: 0.2,
            correction_slop: 0.01,

            mix_rate: 0.1,
            mutation_chance: 0.05,
            mutation_magnitude: 50.0,

            interaction_radius: 120.0,
            interaction_gravity_rate: 0.5,
            interaction_friction_threshold: 300.0,
            interaction_friction_rate: 0.1,

            alignment_weight: 1.0,
            cohesion_weight: 0.8,
            separation_weight: 1.5,
            chase_weight: 2.0,
            flee_weight: 3.0,
            contact_margin: 1.0,

            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Params {
    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("mass_per_area", self.mass_per_area),
            ("max_energy", self.max_energy),
            ("max_dt", self.max_dt),
            ("max_velocity", self.max_velocity),
            ("interaction_radius", self.interaction_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        let fractions = [
            ("predator_ratio", self.predator_ratio),
            ("respawn_probability", self.respawn_probability),
            ("correction_percent", self.correction_percent),
            ("mix_rate", self.mix_rate),
            ("mutation_chance", self.mutation_chance),
            ("interaction_friction_rate", self.interaction_friction_rate),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::invalid(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }

        let non_negative = [
            ("metabolic_cost", self.metabolic_cost),
            ("predation_energy", self.predation_energy),
            ("correction_slop", self.correction_slop),
            ("mutation_magnitude", self.mutation_magnitude),
            ("interaction_gravity_rate", self.interaction_gravity_rate),
            (
                "interaction_friction_threshold",
                self.interaction_friction_threshold,
            ),
            ("alignment_weight", self.alignment_weight),
            ("cohesion_weight", self.cohesion_weight),
            ("separation_weight", self.separation_weight),
            ("chase_weight", self.chase_weight),
            ("flee_weight", self.flee_weight),
            ("contact_margin", self.contact_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }

        if self.min_radius > self.max_radius {
            return Err(SimError::invalid(format!(
                "min_radius {} exceeds max_radius {}",
                self.min_radius, self.max_radius
            )));
        }
        if self.max_radius * 2.0 >= self.world_width.min(self.world_height) {
            return Err(SimError::invalid(
                "world must be wider and taller than the largest entity",
            ));
        }
        if self.quadtree_capacity == 0 {
            return Err(SimError::invalid("quadtree_capacity must be at least 1"));
        }
        if self.trail_length == 0 {
            return Err(SimError::invalid("trail_length must be at least 1"));
        }
        Ok(())
    }

    /// Loads parameters from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Writes the parameters to a JSON file.
    pub fn to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use super::entity::{Entity, Kind};

/// Population summary for dashboards and headless reports.
///
/// Counts split entities by the sign of their vertical gravity (the dominant
/// visible trait) and by kind. Means are zero for an empty world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    /// Total entity count.
    pub total: usize,
    /// Entities with gravity.y < 0.
    pub buoyant: usize,
    /// Entities with gravity.y > 0.
    pub heavy: usize,
    /// Entities with gravity.y == 0.
    pub neutral: usize,
    /// Number of predators.
    pub predators: usize,
    /// Number of prey.
    pub prey: usize,
    /// Mean vertical gravity.
    pub mean_gravity_y: f32,
    /// Mean friction.
    pub mean_friction: f32,
    /// Mean energy.
    pub mean_energy: f32,
    /// Highest age in steps.
    pub oldest_age: u64,
}

impl WorldStats {
    /// Collects statistics over a set of entities.
    pub fn collect(entities: &[Entity]) -> Self {
        let mut stats = Self {
            total: entities.len(),
            ..Self::default()
        };
        if entities.is_empty() {
            return stats;
        }

        let mut gravity_sum = 0.0;
        let mut friction_sum = 0.0;
        let mut energy_sum = 0.0;

        for entity in entities {
            if entity.dna.is_buoyant() {
                stats.buoyant += 1;
            } else if entity.dna.is_heavy() {
                stats.heavy += 1;
            } else {
                stats.neutral += 1;
            }

            match entity.kind {
                Kind::Predator => stats.predators += 1,
                Kind::Prey => stats.prey += 1,
            }

            gravity_sum += entity.dna.gravity[1];
            friction_sum += entity.dna.friction;
            energy_sum += entity.energy;
            stats.oldest_age = stats.oldest_age.max(entity.age);
        }

        let n = entities.len() as f32;
        stats.mean_gravity_y = gravity_sum / n;
        stats.mean_friction = friction_sum / n;
        stats.mean_energy = energy_sum / n;
        stats
    }

    /// Fraction of entities that are buoyant, or 0 for an empty world.
    pub fn buoyant_fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.buoyant as f32 / self.total as f32
        }
    }
}

//! Persistent world state.
//!
//! A snapshot is a flat list of entity records plus world bookkeeping. Trails,
//! pending forces, colors and undrained events are transient and are not
//! saved; colors are recomputed from the DNA on restore.

use std::collections::HashSet;
use std::collections::VecDeque;

use chrono::Utc;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::dna::Dna;
use super::entity::{Entity, Kind};
use super::error::{Result, SimError};
use super::params::Params;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Saved state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity ID.
    pub id: usize,
    /// Center position.
    pub pos: [f32; 2],
    /// Velocity.
    pub vel: [f32; 2],
    /// Mass.
    pub mass: f32,
    /// Collision radius.
    pub radius: f32,
    /// Full DNA.
    pub dna: Dna,
    /// Predator or prey.
    pub kind: Kind,
    /// Energy.
    pub energy: f32,
    /// Age in steps.
    pub age: u64,
}

impl EntityRecord {
    /// Captures the persistent part of an entity.
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            pos: [entity.pos[0], entity.pos[1]],
            vel: [entity.vel[0], entity.vel[1]],
            mass: entity.mass,
            radius: entity.radius,
            dna: entity.dna.clone(),
            kind: entity.kind,
            energy: entity.energy,
            age: entity.age,
        }
    }

    /// Rebuilds a live entity. Call [`EntityRecord::validate`] first.
    pub fn to_entity(&self, params: &Params) -> Entity {
        let mut entity = Entity::new(
            self.id,
            Array1::from_vec(self.pos.to_vec()),
            self.radius,
            self.kind,
            params,
        );
        entity.vel = Array1::from_vec(self.vel.to_vec());
        entity.mass = self.mass;
        entity.dna = self.dna.clone();
        entity.energy = self.energy;
        entity.age = self.age;
        entity.trail = VecDeque::with_capacity(params.trail_length);
        entity.refresh_color();
        entity
    }

    /// Checks that the record describes a legal entity for `params`.
    pub fn validate(&self, params: &Params) -> Result<()> {
        let numbers = [
            self.pos[0],
            self.pos[1],
            self.vel[0],
            self.vel[1],
            self.mass,
            self.radius,
            self.energy,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return Err(SimError::snapshot(format!(
                "entity {} has non-finite state",
                self.id
            )));
        }
        if self.radius <= 0.0 || self.mass <= 0.0 {
            return Err(SimError::snapshot(format!(
                "entity {} must have positive radius and mass",
                self.id
            )));
        }
        if self.energy > params.max_energy {
            return Err(SimError::snapshot(format!(
                "entity {} energy {} exceeds max {}",
                self.id, self.energy, params.max_energy
            )));
        }
        if !self.dna.is_within_bounds() {
            return Err(SimError::snapshot(format!(
                "entity {} has out-of-range DNA",
                self.id
            )));
        }
        Ok(())
    }
}

/// Complete saved world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Format version, see [`SNAPSHOT_VERSION`].
    pub version: u32,
    /// RFC 3339 timestamp of when the snapshot was taken.
    pub saved_at: String,
    /// Simulated time in seconds.
    pub time: f32,
    /// Steps taken so far.
    pub step_count: u64,
    /// Next entity ID to hand out.
    pub next_id: usize,
    /// World width the entities were simulated in.
    pub world_width: f32,
    /// World height the entities were simulated in.
    pub world_height: f32,
    /// All entities.
    pub entities: Vec<EntityRecord>,
}

impl WorldSnapshot {
    /// Creates a snapshot stamped with the current time.
    pub fn new(
        time: f32,
        step_count: u64,
        next_id: usize,
        params: &Params,
        entities: &[Entity],
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            time,
            step_count,
            next_id,
            world_width: params.world_width,
            world_height: params.world_height,
            entities: entities.iter().map(EntityRecord::from_entity).collect(),
        }
    }

    /// Checks the whole snapshot against `params` without changing anything.
    pub fn validate(&self, params: &Params) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SimError::snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(SimError::snapshot(format!(
                "invalid simulated time {}",
                self.time
            )));
        }
        if self.world_width != params.world_width || self.world_height != params.world_height {
            return Err(SimError::snapshot(format!(
                "snapshot world is {}x{}, current world is {}x{}",
                self.world_width, self.world_height, params.world_width, params.world_height
            )));
        }
        if self.entities.len() > params.max_entities {
            return Err(SimError::snapshot(format!(
                "snapshot holds {} entities, limit is {}",
                self.entities.len(),
                params.max_entities
            )));
        }

        let mut ids = HashSet::with_capacity(self.entities.len());
        for record in &self.entities {
            record.validate(params)?;
            if !ids.insert(record.id) {
                return Err(SimError::snapshot(format!("duplicate entity id {}", record.id)));
            }
            if record.id >= self.next_id {
                return Err(SimError::snapshot(format!(
                    "entity id {} is not below next_id {}",
                    record.id, self.next_id
                )));
            }
        }
        Ok(())
    }

    /// Writes the snapshot as pretty JSON.
    pub fn to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a snapshot from a JSON file. Contents are not validated here.
    pub fn from_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&json)?;
        Ok(snapshot)
    }
}

//! The simulation world and its control surface.
//!
//! A [`World`] exclusively owns its entities, obstacles and event queue. One
//! call to [`World::step`] runs the phases in a fixed order:
//!
//! 0. cleanup: entities with energy <= 0 are removed and maybe replaced
//! 1. integration
//! 2. entity-entity collisions (with DNA mixing)
//! 3. obstacle constraints, then the world edges once more
//! 4. ecosystem forces and bookkeeping
//!
//! Renderers, audio and UI only ever see read-only entity slices and drained
//! events.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::collision::resolve_collisions;
use super::ecosystem;
use super::entity::{Entity, Kind};
use super::environment::{Environment, Obstacle};
use super::error::{Result, SimError};
use super::events::{EventQueue, SimulationEvent};
use super::evolution::evolve_from_interaction;
use super::geometric_utils::{distance, is_finite, limit_mut};
use super::integrator::{clamp_timestep, constrain_to_bounds, integrate_all};
use super::params::Params;
use super::snapshot::WorldSnapshot;
use super::stats::WorldStats;

/// What one step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Timestep actually integrated after clamping.
    pub dt: f32,
    /// Entity-entity impacts resolved.
    pub impacts: usize,
    /// Entity-obstacle contacts resolved.
    pub contacts: usize,
    /// Entities removed during cleanup.
    pub removed: usize,
    /// Replacement entities spawned during cleanup.
    pub spawned: usize,
    /// Prey caught by predators.
    pub predations: usize,
}

/// A running simulation.
#[derive(Debug, Clone)]
pub struct World {
    params: Params,
    entities: Vec<Entity>,
    environment: Environment,
    events: EventQueue,
    time: f32,
    step_count: u64,
    next_id: usize,
    corrupted: Option<String>,
}

impl World {
    /// Creates an empty world after validating `params`.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        let events = EventQueue::new(params.event_capacity);
        Ok(Self {
            params,
            entities: Vec::new(),
            environment: Environment::default(),
            events,
            time: 0.0,
            step_count: 0,
            next_id: 0,
            corrupted: None,
        })
    }

    /// Replaces the population with `count` random entities.
    ///
    /// Obstacles are kept. Fails without touching the world when `count`
    /// exceeds `max_entities`.
    pub fn initialize(&mut self, count: usize) -> Result<()> {
        if count > self.params.max_entities {
            warn!(
                count,
                max = self.params.max_entities,
                "rejected initialize request"
            );
            return Err(SimError::invalid(format!(
                "entity count {} exceeds max_entities {}",
                count, self.params.max_entities
            )));
        }

        self.reset();
        let mut rng = rand::rng();
        self.entities.reserve(count);
        for _ in 0..count {
            let entity = Entity::new_random(self.next_id, &self.params, &mut rng);
            self.next_id += 1;
            self.entities.push(entity);
        }
        info!(count, "world initialized");
        Ok(())
    }

    /// Adds one entity at rest with default DNA.
    ///
    /// # Returns
    ///
    /// The new entity's ID.
    pub fn add_entity(&mut self, pos: Array1<f32>, radius: f32, kind: Kind) -> Result<usize> {
        if self.entities.len() >= self.params.max_entities {
            return Err(SimError::invalid(format!(
                "world is full ({} entities)",
                self.params.max_entities
            )));
        }
        if pos.len() != 2 || !is_finite(&pos) {
            return Err(SimError::invalid("entity position must be a finite 2D vector"));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::invalid(format!(
                "entity radius must be positive, got {radius}"
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entities
            .push(Entity::new(id, pos, radius, kind, &self.params));
        Ok(id)
    }

    /// Advances the world by `dt` seconds.
    ///
    /// `dt` is clamped to `max_dt`; non-finite or negative values integrate
    /// nothing. Fails if a previous step corrupted the world, or if this one
    /// leaves any entity with non-finite state.
    pub fn step(&mut self, dt: f32) -> Result<StepSummary> {
        if let Some(reason) = &self.corrupted {
            return Err(SimError::corrupted(reason.clone()));
        }

        let clamped = clamp_timestep(dt, self.params.max_dt);
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "invalid timestep treated as 0");
        } else if clamped < dt {
            debug!(dt, clamped, "timestep spike clamped");
        }

        let mut rng = rand::rng();
        let mut summary = StepSummary {
            dt: clamped,
            ..StepSummary::default()
        };

        let (removed, spawned) = self.cleanup(&mut rng);
        summary.removed = removed;
        summary.spawned = spawned;

        integrate_all(&mut self.entities, &self.params, clamped);
        // stop before a bad value spreads to neighbors through contacts
        self.check_finite()?;

        summary.impacts =
            resolve_collisions(&mut self.entities, &self.params, &mut rng, &mut self.events);
        summary.contacts = self.environment.constrain_all(&mut self.entities);
        // contact corrections may have pushed entities across a wall
        for entity in &mut self.entities {
            constrain_to_bounds(entity, self.params.world_width, self.params.world_height);
        }
        summary.predations = ecosystem::update(&mut self.entities, &self.params, &mut self.events);

        self.check_finite()?;
        self.time += clamped;
        self.step_count += 1;

        Ok(summary)
    }

    /// Flags the world as corrupted if any entity holds a non-finite value.
    fn check_finite(&mut self) -> Result<()> {
        let Some(bad) = self.entities.iter().find(|e| !entity_is_finite(e)) else {
            return Ok(());
        };
        let reason = format!(
            "entity {} has non-finite state in step {}",
            bad.id,
            self.step_count + 1
        );
        error!(entity = bad.id, step = self.step_count + 1, "world corrupted");
        self.corrupted = Some(reason.clone());
        Err(SimError::corrupted(reason))
    }

    /// Removes dead entities and respawns replacements.
    fn cleanup<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (usize, usize) {
        let (alive, dead): (Vec<Entity>, Vec<Entity>) = std::mem::take(&mut self.entities)
            .into_iter()
            .partition(Entity::is_alive);
        self.entities = alive;

        let mut spawned = 0;
        for corpse in &dead {
            self.events.push(SimulationEvent::EntityDied {
                entity_id: corpse.id,
                kind: corpse.kind,
                pos: [corpse.pos[0], corpse.pos[1]],
            });

            if self.entities.len() < self.params.max_entities
                && rng.random::<f32>() < self.params.respawn_probability
            {
                let entity = Entity::new_random(self.next_id, &self.params, rng);
                self.next_id += 1;
                self.events.push(SimulationEvent::EntitySpawned {
                    entity_id: entity.id,
                });
                self.entities.push(entity);
                spawned += 1;
            }
        }

        if !dead.is_empty() {
            debug!(removed = dead.len(), spawned, "cleanup");
        }
        (dead.len(), spawned)
    }

    /// Clears entities, events, time and the corrupted flag. Obstacles stay.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.events.clear();
        self.time = 0.0;
        self.step_count = 0;
        self.next_id = 0;
        self.corrupted = None;
    }

    /// Disturbs every entity within `interaction_radius` of `position`.
    ///
    /// The push falls off linearly with distance, acts as an impulse (scaled
    /// by inverse mass), and bends the DNA of each touched entity.
    ///
    /// # Returns
    ///
    /// Number of entities affected.
    pub fn apply_impulse(&mut self, position: &Array1<f32>, force: &Array1<f32>) -> Result<usize> {
        if position.len() != 2 || !is_finite(position) {
            return Err(SimError::invalid("impulse position must be a finite 2D vector"));
        }
        if force.len() != 2 || !is_finite(force) {
            return Err(SimError::invalid("impulse force must be a finite 2D vector"));
        }

        let radius = self.params.interaction_radius;
        let mut affected = 0;
        for entity in &mut self.entities {
            let dist = distance(&entity.pos, position);
            if dist > radius {
                continue;
            }
            let scaled = force * (1.0 - dist / radius);

            entity.vel += &(&scaled * entity.inverse_mass());
            limit_mut(&mut entity.vel, self.params.max_velocity);
            evolve_from_interaction(&mut entity.dna, &scaled, &self.params);
            entity.refresh_color();
            affected += 1;
        }

        debug!(affected, "impulse applied");
        Ok(affected)
    }

    /// Replaces all obstacles. Nothing changes if any obstacle is invalid.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) -> Result<()> {
        let count = obstacles.len();
        self.environment = Environment::new(obstacles).inspect_err(|e| {
            warn!(error = %e, "rejected obstacle list");
        })?;
        debug!(count, "obstacles replaced");
        Ok(())
    }

    /// Current obstacles.
    pub fn obstacles(&self) -> &[Obstacle] {
        self.environment.obstacles()
    }

    /// Read-only view of every entity.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable view of every entity, for tools and tests.
    ///
    /// Changes made here bypass validation; a non-finite value will be caught
    /// by the next step.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Takes every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        self.events.drain().collect()
    }

    /// Events lost because nobody drained the queue in time.
    pub fn dropped_events(&self) -> u64 {
        self.events.dropped()
    }

    /// Population statistics.
    pub fn stats(&self) -> WorldStats {
        WorldStats::collect(&self.entities)
    }

    /// Parameters the world runs with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Simulated seconds since the last reset.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Steps taken since the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// True once a step produced non-finite state; cleared by [`World::reset`].
    pub fn is_corrupted(&self) -> bool {
        self.corrupted.is_some()
    }

    /// Captures the persistent world state.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::new(
            self.time,
            self.step_count,
            self.next_id,
            &self.params,
            &self.entities,
        )
    }

    /// Replaces the world state with a snapshot.
    ///
    /// The snapshot is validated completely first; on error the world is
    /// left untouched.
    pub fn restore(&mut self, snapshot: &WorldSnapshot) -> Result<()> {
        snapshot.validate(&self.params)?;

        self.entities = snapshot
            .entities
            .iter()
            .map(|record| record.to_entity(&self.params))
            .collect();
        self.time = snapshot.time;
        self.step_count = snapshot.step_count;
        self.next_id = snapshot.next_id;
        self.events.clear();
        self.corrupted = None;

        info!(
            entities = self.entities.len(),
            saved_at = %snapshot.saved_at,
            "world restored"
        );
        Ok(())
    }

    /// Saves the world state to a JSON file.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        self.snapshot().to_file(path)?;
        info!(path, entities = self.entities.len(), "world saved");
        Ok(())
    }

    /// Loads world state from a JSON file. On error the world is untouched.
    pub fn load_from_file(&mut self, path: &str) -> Result<()> {
        let snapshot = WorldSnapshot::from_file(path)?;
        self.restore(&snapshot)
    }
}

fn entity_is_finite(entity: &Entity) -> bool {
    is_finite(&entity.pos)
        && is_finite(&entity.vel)
        && is_finite(&entity.force)
        && entity.energy.is_finite()
}

//! Entity state and lifecycle.
//!
//! Entities are circles with their own DNA. They are exclusively owned by the
//! world; other components only borrow them for the duration of a phase.

use std::collections::VecDeque;

use ndarray::Array1;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::dna::{Dna, FRICTION_MAX, FRICTION_MIN, GRAVITY_LIMIT};
use super::geometric_utils::vec2;
use super::locatable::Locatable;
use super::params::Params;

/// Energy value marking an entity that was eaten this step.
pub const CONSUMED_ENERGY: f32 = -1.0;

/// Biological role of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Hunts prey and gains energy from catches.
    Predator,
    /// Flocks and flees from predators.
    Prey,
}

/// A simulated particle.
///
/// Entities:
/// - Integrate their own DNA gravity and friction
/// - Bounce off each other, the world edges and obstacles
/// - Mix DNA with whatever they collide with
/// - Flock, hunt or flee depending on their [`Kind`]
/// - Die when energy reaches zero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier within a world.
    pub id: usize,
    /// Center position.
    pub pos: Array1<f32>,
    /// Velocity in units per second.
    pub vel: Array1<f32>,
    /// Force accumulated since the last integration.
    pub force: Array1<f32>,
    /// Collision radius.
    pub radius: f32,
    /// Mass, derived from the radius.
    pub mass: f32,
    /// Physics rule set.
    pub dna: Dna,
    /// Predator or prey.
    pub kind: Kind,
    /// Current energy (removed when <= 0).
    pub energy: f32,
    /// Steps survived.
    pub age: u64,
    /// Recent positions, oldest first.
    pub trail: VecDeque<[f32; 2]>,
    /// Display color derived from the DNA.
    pub color: [f32; 3],
}

impl Entity {
    /// Creates an entity at rest with default DNA and full energy.
    pub fn new(id: usize, pos: Array1<f32>, radius: f32, kind: Kind, params: &Params) -> Self {
        let mut entity = Self {
            id,
            pos,
            vel: Array1::zeros(2),
            force: Array1::zeros(2),
            radius,
            mass: mass_for_radius(radius, params.mass_per_area),
            dna: Dna::default(),
            kind,
            energy: params.max_energy,
            age: 0,
            trail: VecDeque::with_capacity(params.trail_length),
            color: [0.0; 3],
        };
        entity.refresh_color();
        entity
    }

    /// Creates an entity with random position, velocity, size, kind and DNA.
    pub fn new_random<R: Rng + ?Sized>(id: usize, params: &Params, rng: &mut R) -> Self {
        let radius = if params.max_radius > params.min_radius {
            rng.random_range(params.min_radius..params.max_radius)
        } else {
            params.min_radius
        };

        // spawn fully inside the walls
        let span = vec2(
            params.world_width - 2.0 * radius,
            params.world_height - 2.0 * radius,
        );
        let pos = Array1::random(2, Uniform::new(0.0_f32, 1.0)) * span + radius;

        let kind = if rng.random::<f32>() < params.predator_ratio {
            Kind::Predator
        } else {
            Kind::Prey
        };

        let mut entity = Self::new(id, pos, radius, kind, params);
        entity.vel = vec2(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
        entity.dna = Dna::new_random(rng);
        entity.refresh_color();
        entity
    }

    /// Inverse mass used by impulse resolution.
    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    /// Adds a force to be consumed by the next integration.
    pub fn apply_force(&mut self, force: &Array1<f32>) {
        self.force += force;
    }

    /// Checks if the entity is alive.
    ///
    /// # Returns
    ///
    /// `true` if energy > 0, `false` otherwise.
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    /// Reduces the entity's energy.
    pub fn consume_energy(&mut self, amount: f32) {
        self.energy -= amount;
    }

    /// Increases the entity's energy up to a maximum.
    ///
    /// # Arguments
    ///
    /// * `amount` - Energy to add
    /// * `max_energy` - Maximum energy cap
    pub fn gain_energy(&mut self, amount: f32, max_energy: f32) {
        self.energy = (self.energy + amount).min(max_energy);
    }

    /// Marks the entity as eaten. It is removed during the next cleanup.
    pub fn kill(&mut self) {
        self.energy = CONSUMED_ENERGY;
    }

    /// Advances the age counter by one step.
    pub fn grow_older(&mut self) {
        self.age += 1;
    }

    /// Appends the current position to the trail, dropping the oldest entries
    /// beyond `max_len`.
    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.push_back([self.pos[0], self.pos[1]]);
        while self.trail.len() > max_len {
            self.trail.pop_front();
        }
    }

    /// Recomputes the display color from the DNA.
    ///
    /// Heavy entities drift toward red, buoyant ones toward blue; the green
    /// channel tracks how little friction slows them down.
    pub fn refresh_color(&mut self) {
        let heaviness = (self.dna.gravity[1] / GRAVITY_LIMIT).clamp(-1.0, 1.0);
        let slipperiness = ((self.dna.friction - FRICTION_MIN) / (FRICTION_MAX - FRICTION_MIN))
            .clamp(0.0, 1.0);
        self.color = [
            0.5 + 0.5 * heaviness,
            0.2 + 0.6 * slipperiness,
            0.5 - 0.5 * heaviness,
        ];
    }
}

impl Locatable for Entity {
    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        &mut self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Mass of a disc of the given radius.
pub fn mass_for_radius(radius: f32, mass_per_area: f32) -> f32 {
    mass_per_area * std::f32::consts::PI * radius * radius
}

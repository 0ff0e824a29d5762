//! # dnasandbox - Physics That Evolves On Contact
//!
//! A 2D particle world in which every entity carries its own physics
//! constants ("DNA"): gravity, friction and bounce. When two entities collide
//! their DNA drifts toward each other, so local rule sets spread and compete.
//! Flocking and predator/prey behavior run on top of the physics.
//!
//! ## Features
//!
//! - Per-entity gravity, friction and restitution
//! - Quadtree broad phase with inverse-mass impulse resolution
//! - Collision-driven DNA mixing with random mutation
//! - Reynolds flocking, chasing and fleeing via a kd-tree perception index
//! - Static circle and rectangle obstacles
//! - Bounded event queue for audio and effects
//! - Save/load simulation state
//!
//! ## Core Modules
//!
//! - [`simulation::world`] - World ownership and the step pipeline
//! - [`simulation::entity`] - Entity state and lifecycle
//! - [`simulation::dna`] - Mutable physics constants
//! - [`simulation::collision`] - Collision detection and resolution
//! - [`simulation::ecosystem`] - Flocking, predation and metabolism
//! - [`simulation::events`] - Observable simulation events

/// Core simulation logic and data structures.
pub mod simulation {
    /// Entity-entity collision detection and resolution.
    pub mod collision;
    /// Physics constants carried by each entity.
    pub mod dna;
    /// Flocking and predator/prey behavior.
    pub mod ecosystem;
    /// Entity state, kinds and lifecycle.
    pub mod entity;
    /// Static obstacles and obstacle constraints.
    pub mod environment;
    /// Error types for world operations.
    pub mod error;
    /// Observable events and the bounded event queue.
    pub mod events;
    /// DNA mutation from interaction and collisions.
    pub mod evolution;
    /// Geometric utility functions for vectors and regions.
    pub mod geometric_utils;
    /// Physics integration and world edges.
    pub mod integrator;
    /// Trait for round bodies with a position.
    ///
    /// The [`locatable::Locatable`] trait is what the spatial indices are
    /// built from.
    pub mod locatable;
    /// Simulation parameters.
    pub mod params;
    /// Save/load snapshots of world state.
    pub mod snapshot;
    /// Quadtree and kd-tree spatial indices.
    pub mod spatial;
    /// Population statistics.
    pub mod stats;
    /// The simulation world.
    pub mod world;
}

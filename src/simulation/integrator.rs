//! Physics integration and world-edge handling.
//!
//! Each entity is advanced with its own DNA: gravity becomes a mass-scaled
//! force, friction is a per-step velocity factor, and restitution decides how
//! hard it bounces off the walls.

use super::entity::Entity;
use super::geometric_utils::{is_finite, limit_mut};
use super::params::Params;

/// Clamps a wall-clock delta into a usable timestep.
///
/// Non-finite or negative deltas become 0; spikes are capped at `max_dt`.
pub fn clamp_timestep(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt)
}

/// Advances one entity by `dt`, then applies the world edges.
pub fn integrate(entity: &mut Entity, params: &Params, dt: f32) {
    let gravity_force = &entity.dna.gravity * entity.mass;
    entity.force += &gravity_force;

    let acceleration = &entity.force / entity.mass;
    let mut vel = &entity.vel + &(acceleration * dt);
    vel *= entity.dna.friction;
    limit_mut(&mut vel, params.max_velocity);

    // a non-finite force must not leak into the state
    if is_finite(&vel) {
        entity.vel = vel;
    }
    entity.pos += &(&entity.vel * dt);
    entity.force.fill(0.0);

    constrain_to_bounds(entity, params.world_width, params.world_height);
    entity.record_trail(params.trail_length);
}

/// Advances every entity by `dt`.
pub fn integrate_all(entities: &mut [Entity], params: &Params, dt: f32) {
    for entity in entities.iter_mut() {
        integrate(entity, params, dt);
    }
}

/// Keeps an entity's inflated bounds inside the world.
///
/// On contact with an edge the position is clamped and the perpendicular
/// velocity component is reflected and scaled by the entity's restitution.
pub fn constrain_to_bounds(entity: &mut Entity, width: f32, height: f32) {
    let extents = [width, height];
    let restitution = entity.dna.restitution;
    for (axis, &extent) in extents.iter().enumerate() {
        let low = entity.radius.min(extent / 2.0);
        let high = (extent - entity.radius).max(extent / 2.0);
        if entity.pos[axis] < low {
            entity.pos[axis] = low;
            if entity.vel[axis] < 0.0 {
                entity.vel[axis] *= -restitution;
            }
        } else if entity.pos[axis] > high {
            entity.pos[axis] = high;
            if entity.vel[axis] > 0.0 {
                entity.vel[axis] *= -restitution;
            }
        }
    }
}

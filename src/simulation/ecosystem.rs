//! Flocking and predator/prey behavior layer.
//!
//! Runs as two phases so results do not depend on iteration order:
//! - read phase: every entity looks at an unchanged view of its neighbors
//!   and produces a steering force plus, for predators, a catch claim
//! - write phase: forces are applied, metabolism and aging run, and claims
//!   are settled first come first served
//!
//! Forces land in the accumulator and are consumed by the next integration.

use ndarray::Array1;
use tracing::{debug, warn};

use super::entity::{Entity, Kind};
use super::events::{EventQueue, SimulationEvent};
use super::geometric_utils::{limit_mut, normalize_or_zero};
use super::params::Params;
use super::spatial::{PerceptionIndex, SpatialQueryResult};

/// Steering and catch intent computed for one entity in the read phase.
#[derive(Debug, Clone)]
pub struct Intent {
    /// Total steering acceleration, already weighted.
    pub steering: Array1<f32>,
    /// Index of the prey this predator is touching, if any.
    pub catch: Option<usize>,
}

/// Runs the ecosystem layer over all entities.
///
/// # Returns
///
/// Number of prey caught this step.
pub fn update(entities: &mut [Entity], params: &Params, events: &mut EventQueue) -> usize {
    let index = match PerceptionIndex::build(entities) {
        Ok(index) => Some(index),
        Err(e) => {
            warn!(error = ?e, "perception index unavailable, scanning all pairs");
            None
        }
    };

    let intents: Vec<Intent> = (0..entities.len())
        .map(|i| {
            let neighbors = gather_neighbors(entities, i, index.as_ref());
            compute_intent(entities, i, &neighbors, params)
        })
        .collect();

    for (entity, intent) in entities.iter_mut().zip(&intents) {
        if !entity.is_alive() {
            continue;
        }
        entity.apply_force(&(&intent.steering * entity.mass));
        entity.consume_energy(params.metabolic_cost);
        entity.grow_older();
    }

    let mut catches = 0;
    for (predator_idx, intent) in intents.iter().enumerate() {
        let Some(prey_idx) = intent.catch else {
            continue;
        };
        if !entities[prey_idx].is_alive() || !entities[predator_idx].is_alive() {
            continue; // already claimed, or starved this step
        }

        let pos = [entities[prey_idx].pos[0], entities[prey_idx].pos[1]];
        let prey_id = entities[prey_idx].id;
        entities[prey_idx].kill();

        let predator = &mut entities[predator_idx];
        predator.gain_energy(params.predation_energy, params.max_energy);
        debug!(predator = predator.id, prey = prey_id, "prey consumed");

        events.push(SimulationEvent::PreyConsumed {
            predator_id: predator.id,
            prey_id,
            pos,
        });
        catches += 1;
    }
    catches
}

/// Neighbors of entity `i` within its perception radius, excluding itself.
///
/// Uses the perception index when available and a full scan otherwise.
pub fn gather_neighbors(
    entities: &[Entity],
    i: usize,
    index: Option<&PerceptionIndex>,
) -> SpatialQueryResult {
    let me = &entities[i];
    let radius = me.dna.perception_radius;
    let found = match index {
        Some(index) => index.within(&me.pos, radius),
        None => entities
            .iter()
            .enumerate()
            .map(|(j, other)| {
                let delta = &other.pos - &me.pos;
                (delta.dot(&delta), j)
            })
            .filter(|&(dist_sq, _)| dist_sq <= radius * radius)
            .collect(),
    };
    found
        .into_iter()
        .filter(|&(_, j)| j != i && entities[j].is_alive())
        .collect()
}

/// Computes the steering force and catch claim of entity `i`.
pub fn compute_intent(
    entities: &[Entity],
    i: usize,
    neighbors: &SpatialQueryResult,
    params: &Params,
) -> Intent {
    let me = &entities[i];
    let mut steering = Array1::zeros(2);
    let mut catch = None;

    if neighbors.is_empty() {
        return Intent { steering, catch };
    }

    steering += &(alignment(me, entities, neighbors) * params.alignment_weight);
    steering += &(cohesion(me, entities, neighbors) * params.cohesion_weight);
    steering += &(separation(me, entities, neighbors) * params.separation_weight);

    match me.kind {
        Kind::Predator => {
            let nearest_prey = neighbors
                .iter()
                .filter(|&&(_, j)| entities[j].kind == Kind::Prey)
                .min_by(|a, b| a.0.total_cmp(&b.0));
            if let Some(&(dist_sq, j)) = nearest_prey {
                let prey = &entities[j];
                steering += &(seek(me, &(&prey.pos - &me.pos)) * params.chase_weight);

                let contact = me.radius + prey.radius + params.contact_margin;
                if dist_sq <= contact * contact {
                    catch = Some(j);
                }
            }
        }
        Kind::Prey => {
            let mut away = Array1::zeros(2);
            for &(dist_sq, j) in neighbors {
                let other = &entities[j];
                if other.kind != Kind::Predator || dist_sq <= f32::EPSILON {
                    continue;
                }
                // closer predators push harder
                away += &(normalize_or_zero(&(&me.pos - &other.pos)) / dist_sq.sqrt());
            }
            steering += &(seek(me, &away) * params.flee_weight);
        }
    }

    Intent { steering, catch }
}

/// Reynolds steering toward `direction` at the entity's max speed, limited to
/// its max force. Returns zero for a zero direction.
pub fn seek(me: &Entity, direction: &Array1<f32>) -> Array1<f32> {
    let unit = normalize_or_zero(direction);
    if unit.iter().all(|&v| v == 0.0) {
        return Array1::zeros(2);
    }
    let mut steering = unit * me.dna.max_speed - &me.vel;
    limit_mut(&mut steering, me.dna.max_force);
    steering
}

/// Steer toward the average neighbor velocity.
pub fn alignment(me: &Entity, entities: &[Entity], neighbors: &SpatialQueryResult) -> Array1<f32> {
    let mut sum = Array1::zeros(2);
    for &(_, j) in neighbors {
        sum += &entities[j].vel;
    }
    seek(me, &(sum / neighbors.len() as f32))
}

/// Steer toward the neighbor centroid.
pub fn cohesion(me: &Entity, entities: &[Entity], neighbors: &SpatialQueryResult) -> Array1<f32> {
    let mut centroid = Array1::zeros(2);
    for &(_, j) in neighbors {
        centroid += &entities[j].pos;
    }
    centroid /= neighbors.len() as f32;
    seek(me, &(centroid - &me.pos))
}

/// Steer away from neighbors closer than half the perception radius,
/// weighted by inverse distance.
pub fn separation(
    me: &Entity,
    entities: &[Entity],
    neighbors: &SpatialQueryResult,
) -> Array1<f32> {
    let personal_space = me.dna.perception_radius / 2.0;
    let mut push = Array1::zeros(2);
    for &(dist_sq, j) in neighbors {
        let dist = dist_sq.sqrt();
        if dist <= f32::EPSILON || dist >= personal_space {
            continue;
        }
        push += &(normalize_or_zero(&(&me.pos - &entities[j].pos)) / dist);
    }
    seek(me, &push)
}

//! Entity-entity collision detection and impulse resolution.
//!
//! The broad phase queries a freshly built [`Quadtree`]; the narrow phase
//! resolves each overlapping pair once per step with an inverse-mass
//! weighted impulse, a partial positional correction, and DNA mixing.

use geo::{Rect, coord};
use ndarray::Array1;
use rand::Rng;
use tracing::trace;

use super::entity::Entity;
use super::events::{CollisionEvent, EventQueue, SimulationEvent};
use super::evolution;
use super::geometric_utils::{length, square_around};
use super::params::Params;
use super::spatial::Quadtree;

/// Center distance below which a pair has no usable normal.
pub const MIN_SEPARATION: f32 = 1e-4;

/// What happened when two entities were checked against each other.
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// The circles do not overlap.
    Apart,
    /// The centers (nearly) coincide; the pair is skipped this step.
    Degenerate,
    /// Overlapping but already separating: only positional correction ran.
    Resting,
    /// Overlapping and approaching: an impulse was exchanged.
    Impact {
        /// Impulse magnitude along the normal.
        impulse: f32,
        /// Contact point on the surface of the first entity.
        contact: [f32; 2],
    },
}

/// Resolves the physical overlap of two entities.
///
/// Uses the lesser restitution of the pair. The impulse is skipped when the
/// pair is already separating; positional correction always runs so that
/// overlap shrinks even for resting contacts.
pub fn resolve_overlap(a: &mut Entity, b: &mut Entity, params: &Params) -> PairOutcome {
    let delta = &b.pos - &a.pos;
    let dist = length(&delta);
    let reach = a.radius + b.radius;
    if !dist.is_finite() || dist >= reach {
        return PairOutcome::Apart;
    }
    if dist <= MIN_SEPARATION {
        trace!(a = a.id, b = b.id, "skipping coincident collision pair");
        return PairOutcome::Degenerate;
    }

    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if !inv_sum.is_finite() || inv_sum <= 0.0 {
        return PairOutcome::Degenerate;
    }

    let normal = delta / dist;
    let penetration = reach - dist;
    let contact = [
        a.pos[0] + normal[0] * a.radius,
        a.pos[1] + normal[1] * a.radius,
    ];

    let relative_vel = &b.vel - &a.vel;
    let normal_speed = relative_vel.dot(&normal);

    let mut impulse = None;
    if normal_speed < 0.0 {
        let restitution = a.dna.restitution.min(b.dna.restitution);
        let j = -(1.0 + restitution) * normal_speed / inv_sum;
        let impulse_vec = &normal * j;
        a.vel -= &(&impulse_vec * inv_a);
        b.vel += &(&impulse_vec * inv_b);
        impulse = Some(j);
    }

    let correction_mag =
        (penetration - params.correction_slop).max(0.0) / inv_sum * params.correction_percent;
    let correction: Array1<f32> = &normal * correction_mag;
    a.pos -= &(&correction * inv_a);
    b.pos += &(&correction * inv_b);

    match impulse {
        Some(impulse) => PairOutcome::Impact { impulse, contact },
        None => PairOutcome::Resting,
    }
}

/// Resolves a pair and, on impact, mixes their DNA.
///
/// # Returns
///
/// The collision event to publish, if an impulse was exchanged.
pub fn resolve_pair<R: Rng + ?Sized>(
    a: &mut Entity,
    b: &mut Entity,
    params: &Params,
    rng: &mut R,
) -> Option<CollisionEvent> {
    let PairOutcome::Impact { impulse, contact } = resolve_overlap(a, b, params) else {
        return None;
    };

    let mutations = evolution::mix_on_collision(&mut a.dna, &mut b.dna, params, rng);
    if mutations > 0 {
        trace!(a = a.id, b = b.id, mutations, "random mutation after collision");
    }
    a.refresh_color();
    b.refresh_color();

    Some(CollisionEvent {
        impact_strength: impulse.abs(),
        pos: contact,
        mass: a.mass + b.mass,
    })
}

/// Runs the collision phase over all entities.
///
/// Builds the quadtree, queries a square twice each entity's diameter wide,
/// and resolves every overlapping unordered pair exactly once.
///
/// # Returns
///
/// Number of impacts resolved.
pub fn resolve_collisions<R: Rng + ?Sized>(
    entities: &mut [Entity],
    params: &Params,
    rng: &mut R,
    events: &mut EventQueue,
) -> usize {
    let world = Rect::new(
        coord! { x: 0.0, y: 0.0 },
        coord! { x: params.world_width, y: params.world_height },
    );
    let tree = Quadtree::build(
        world,
        params.quadtree_capacity,
        params.quadtree_max_depth,
        entities,
    );

    let mut impacts = 0;
    for i in 0..entities.len() {
        let region = square_around(&entities[i].pos, entities[i].radius * 2.0);
        let mut candidates = tree.query(&region);
        candidates.sort_unstable();

        for j in candidates.into_iter().filter(|&j| j > i) {
            let (a, b) = pair_mut(entities, i, j);
            if let Some(event) = resolve_pair(a, b, params, rng) {
                events.push(SimulationEvent::Collision(event));
                impacts += 1;
            }
        }
    }
    impacts
}

/// Two disjoint mutable references into a slice. Requires `i < j`.
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert!(i < j, "pair_mut requires i < j");
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

//! DNA mutation engine.
//!
//! DNA changes in two ways:
//! - sustained external interaction (a drag or push) bends gravity and
//!   friction in the direction of the disturbance
//! - collisions blend the DNA of both participants toward their average,
//!   with a small chance of random gravity jitter on each side
//!
//! Both paths only touch DNA and always end with [`Dna::clamp`].

use ndarray::Array1;
use rand::Rng;

use super::dna::{Dna, FRICTIONLESS};
use super::params::Params;

/// Mutates DNA in response to an external drag vector.
///
/// Dragging up (negative y) trends gravity buoyant, dragging down trends it
/// heavy. A fast horizontal drag nudges friction toward frictionless.
///
/// # Arguments
///
/// * `dna` - DNA to mutate (modified in place)
/// * `drag` - Drag or force vector applied to the entity
/// * `params` - Simulation parameters providing the interaction rates
pub fn evolve_from_interaction(dna: &mut Dna, drag: &Array1<f32>, params: &Params) {
    if drag.len() < 2 || !drag.iter().all(|v| v.is_finite()) {
        return;
    }

    dna.gravity[1] += drag[1] * params.interaction_gravity_rate;

    if drag[0].abs() > params.interaction_friction_threshold {
        dna.friction += (FRICTIONLESS - dna.friction) * params.interaction_friction_rate;
    }

    dna.clamp();
}

/// Moves both DNAs a fraction `rate` toward their pairwise average gravity
/// and friction. Swapping `a` and `b` yields the same result.
pub fn blend(a: &mut Dna, b: &mut Dna, rate: f32) {
    let avg_gravity = (&a.gravity + &b.gravity) / 2.0;
    let avg_friction = (a.friction + b.friction) / 2.0;

    let shift_a = (&avg_gravity - &a.gravity) * rate;
    let shift_b = (&avg_gravity - &b.gravity) * rate;
    a.gravity += &shift_a;
    b.gravity += &shift_b;

    a.friction += (avg_friction - a.friction) * rate;
    b.friction += (avg_friction - b.friction) * rate;
}

/// Adds uniform noise in `[-magnitude, magnitude]` to each gravity axis.
pub fn jitter_gravity<R: Rng + ?Sized>(dna: &mut Dna, magnitude: f32, rng: &mut R) {
    if magnitude <= 0.0 {
        return;
    }
    for axis in 0..2 {
        dna.gravity[axis] += rng.random_range(-magnitude..=magnitude);
    }
}

/// Collision mixing between two entities' DNA.
///
/// Blends both toward their average, then gives each side an independent
/// `mutation_chance` of random gravity jitter, and clamps both.
///
/// # Returns
///
/// Number of random mutations that fired (0, 1 or 2).
pub fn mix_on_collision<R: Rng + ?Sized>(
    a: &mut Dna,
    b: &mut Dna,
    params: &Params,
    rng: &mut R,
) -> usize {
    blend(a, b, params.mix_rate);

    let mut mutations = 0;
    for dna in [&mut *a, &mut *b] {
        if params.mutation_chance > 0.0 && rng.random::<f32>() < params.mutation_chance {
            jitter_gravity(dna, params.mutation_magnitude, rng);
            mutations += 1;
        }
    }

    a.clamp();
    b.clamp();
    mutations
}

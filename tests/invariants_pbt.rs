#![allow(missing_docs)]

use dnasandbox::simulation::collision::resolve_overlap;
use dnasandbox::simulation::dna::Dna;
use dnasandbox::simulation::entity::{Entity, Kind};
use dnasandbox::simulation::evolution::{evolve_from_interaction, mix_on_collision};
use dnasandbox::simulation::geometric_utils::vec2;
use dnasandbox::simulation::integrator::integrate;
use dnasandbox::simulation::params::Params;
use dnasandbox::simulation::spatial::Quadtree;
use geo::{Rect, coord};
use proptest::prelude::*;

prop_compose! {
    fn arb_dna()(
        gx in -5000.0f32..5000.0,
        gy in -5000.0f32..5000.0,
        friction in -2.0f32..2.0,
        restitution in -1.0f32..2.0,
        perception in -100.0f32..1000.0,
        max_speed in -100.0f32..5000.0,
        max_force in -100.0f32..5000.0,
    ) -> Dna {
        Dna {
            gravity: vec2(gx, gy),
            friction,
            restitution,
            perception_radius: perception,
            max_speed,
            max_force,
        }
    }
}

prop_compose! {
    fn arb_entity()(
        x in 20.0f32..1180.0,
        y in 20.0f32..780.0,
        vx in -2000.0f32..2000.0,
        vy in -2000.0f32..2000.0,
        radius in 4.0f32..12.0,
        dna in arb_dna(),
    ) -> Entity {
        let mut dna = dna;
        dna.clamp();
        let mut entity = Entity::new(0, vec2(x, y), radius, Kind::Prey, &Params::default());
        entity.vel = vec2(vx, vy);
        entity.dna = dna;
        entity
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_clamp_always_lands_in_bounds(mut dna in arb_dna()) {
        dna.clamp();
        prop_assert!(dna.is_within_bounds());
    }

    #[test]
    fn test_mixing_keeps_dna_in_bounds(
        mut a in arb_dna(),
        mut b in arb_dna(),
        mix_rate in 0.0f32..=1.0,
        mutation_chance in 0.0f32..=1.0,
    ) {
        a.clamp();
        b.clamp();
        let params = Params { mix_rate, mutation_chance, ..Params::default() };
        let mut rng = rand::rng();

        mix_on_collision(&mut a, &mut b, &params, &mut rng);

        prop_assert!(a.is_within_bounds());
        prop_assert!(b.is_within_bounds());
    }

    #[test]
    fn test_interaction_keeps_dna_in_bounds(
        mut dna in arb_dna(),
        dx in -1.0e6f32..1.0e6,
        dy in -1.0e6f32..1.0e6,
    ) {
        dna.clamp();
        evolve_from_interaction(&mut dna, &vec2(dx, dy), &Params::default());
        prop_assert!(dna.is_within_bounds());
    }

    #[test]
    fn test_integration_stays_inside_world(
        mut entity in arb_entity(),
        dt in 0.0f32..0.05,
    ) {
        let params = Params::default();
        for _ in 0..20 {
            integrate(&mut entity, &params, dt);
        }
        prop_assert!(entity.pos[0] >= entity.radius);
        prop_assert!(entity.pos[0] <= params.world_width - entity.radius);
        prop_assert!(entity.pos[1] >= entity.radius);
        prop_assert!(entity.pos[1] <= params.world_height - entity.radius);
        prop_assert!(entity.trail.len() <= params.trail_length);
    }

    #[test]
    fn test_collision_conserves_momentum(
        mut a in arb_entity(),
        mut b in arb_entity(),
        angle in 0.0f32..std::f32::consts::TAU,
        overlap in 0.05f32..0.95,
    ) {
        let params = Params::default();
        // place b overlapping a along a random direction
        let dist = (a.radius + b.radius) * (1.0 - overlap);
        b.pos = vec2(a.pos[0] + dist * angle.cos(), a.pos[1] + dist * angle.sin());

        let before = [
            a.vel[0] * a.mass + b.vel[0] * b.mass,
            a.vel[1] * a.mass + b.vel[1] * b.mass,
        ];
        resolve_overlap(&mut a, &mut b, &params);
        let after = [
            a.vel[0] * a.mass + b.vel[0] * b.mass,
            a.vel[1] * a.mass + b.vel[1] * b.mass,
        ];

        let scale = 1.0
            + (a.vel[0] * a.mass).abs()
            + (a.vel[1] * a.mass).abs()
            + (b.vel[0] * b.mass).abs()
            + (b.vel[1] * b.mass).abs();
        prop_assert!((before[0] - after[0]).abs() <= 1e-3 * scale);
        prop_assert!((before[1] - after[1]).abs() <= 1e-3 * scale);
    }

    #[test]
    fn test_quadtree_returns_every_item(
        points in prop::collection::vec((0.0f32..500.0, 0.0f32..500.0, 0.5f32..10.0), 0..120),
        capacity in 1usize..8,
    ) {
        let params = Params::default();
        let entities: Vec<Entity> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, r))| Entity::new(i, vec2(x, y), r, Kind::Prey, &params))
            .collect();
        let world = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 500.0, y: 500.0 });
        let tree = Quadtree::build(world, capacity, 8, &entities);

        let mut found = tree.query(&world);
        found.sort_unstable();
        let expected: Vec<usize> = (0..entities.len()).collect();
        prop_assert_eq!(found, expected);
    }
}

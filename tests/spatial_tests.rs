#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use dnasandbox::simulation::ecosystem::gather_neighbors;
use dnasandbox::simulation::entity::{Entity, Kind};
use dnasandbox::simulation::geometric_utils::{distance, square_around, vec2};
use dnasandbox::simulation::locatable::Locatable;
use dnasandbox::simulation::params::Params;
use dnasandbox::simulation::spatial::{PerceptionIndex, Quadtree};
use geo::{Rect, coord};
use ndarray::Array1;

struct Ball {
    pos: Array1<f32>,
    radius: f32,
}

impl Ball {
    fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            pos: vec2(x, y),
            radius,
        }
    }
}

impl Locatable for Ball {
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

fn world_rect() -> Rect<f32> {
    Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 400.0, y: 400.0 })
}

fn grid(step: f32, radius: f32) -> Vec<Ball> {
    let mut balls = Vec::new();
    let mut y = radius;
    while y < 400.0 - radius {
        let mut x = radius;
        while x < 400.0 - radius {
            balls.push(Ball::new(x, y, radius));
            x += step;
        }
        y += step;
    }
    balls
}

#[test]
fn test_whole_world_query_finds_every_item_once() {
    let balls = grid(17.0, 5.0);
    let tree = Quadtree::build(world_rect(), 4, 8, &balls);

    assert_eq!(tree.len(), balls.len());

    let mut found = tree.query(&world_rect());
    found.sort_unstable();
    let expected: Vec<usize> = (0..balls.len()).collect();
    assert_eq!(found, expected);
}

#[test]
fn test_every_overlapping_pair_is_a_candidate() {
    // dense enough that many pairs overlap and many straddle quadrant lines
    let balls = grid(11.0, 6.0);
    let tree = Quadtree::build(world_rect(), 4, 8, &balls);

    for (i, a) in balls.iter().enumerate() {
        let candidates = tree.query(&square_around(&a.pos, a.radius * 2.0));
        for (j, b) in balls.iter().enumerate() {
            if i != j && distance(&a.pos, &b.pos) < a.radius + b.radius {
                assert!(
                    candidates.contains(&j),
                    "pair ({i}, {j}) missing from candidates"
                );
            }
        }
    }
}

#[test]
fn test_item_on_subdivision_line_stays_reachable() {
    // capacity 1 forces a split; the last ball straddles both midlines
    let balls = vec![
        Ball::new(50.0, 50.0, 5.0),
        Ball::new(350.0, 50.0, 5.0),
        Ball::new(200.0, 200.0, 5.0),
    ];
    let tree = Quadtree::build(world_rect(), 1, 8, &balls);

    assert_eq!(tree.len(), 3);
    let near_center = Rect::new(coord! { x: 198.0, y: 198.0 }, coord! { x: 202.0, y: 202.0 });
    assert_eq!(tree.query(&near_center), vec![2]);
}

#[test]
fn test_item_outside_world_is_kept() {
    let balls = vec![Ball::new(100.0, 100.0, 5.0), Ball::new(-500.0, 900.0, 5.0)];
    let tree = Quadtree::build(world_rect(), 4, 8, &balls);

    assert_eq!(tree.len(), 2);
    let far_away = square_around(&vec2(-500.0, 900.0), 10.0);
    assert_eq!(tree.query(&far_away), vec![1]);
}

#[test]
fn test_stacked_items_respect_max_depth() {
    let balls: Vec<Ball> = (0..100).map(|_| Ball::new(123.0, 77.0, 1.0)).collect();
    let tree = Quadtree::build(world_rect(), 4, 8, &balls);

    assert_eq!(tree.len(), 100);
    assert!(tree.depth() <= 8);
    assert_eq!(tree.query(&square_around(&vec2(123.0, 77.0), 1.0)).len(), 100);
}

#[test]
fn test_query_of_empty_region() {
    let balls = vec![Ball::new(10.0, 10.0, 2.0)];
    let tree = Quadtree::build(world_rect(), 4, 8, &balls);

    let region = square_around(&vec2(300.0, 300.0), 20.0);
    assert!(tree.query(&region).is_empty());
    assert!(!tree.is_empty());
}

#[test]
fn test_perception_index_radius_query() {
    let balls = vec![
        Ball::new(0.0, 0.0, 1.0),
        Ball::new(3.0, 4.0, 1.0),
        Ball::new(10.0, 0.0, 1.0),
    ];
    let index = PerceptionIndex::build(&balls).expect("finite positions");

    let mut found: Vec<usize> = index
        .within(&vec2(0.0, 0.0), 5.5)
        .into_iter()
        .map(|(_, i)| i)
        .collect();
    found.sort_unstable();
    assert_eq!(found, vec![0, 1]);

    let hit = index
        .within(&vec2(0.0, 0.0), 5.5)
        .into_iter()
        .find(|&(_, i)| i == 1)
        .expect("neighbor within radius");
    assert!((hit.0 - 25.0).abs() < 1e-4);
}

#[test]
fn test_perception_index_rejects_non_finite_position() {
    let balls = vec![Ball::new(f32::NAN, 0.0, 1.0)];
    assert!(PerceptionIndex::build(&balls).is_err());
}

#[test]
fn test_index_and_full_scan_agree() {
    let params = Params::default();
    let entities: Vec<Entity> = (0..60)
        .map(|i| {
            let x = 100.0 + (i % 10) as f32 * 23.0;
            let y = 100.0 + (i / 10) as f32 * 31.0;
            Entity::new(i, vec2(x, y), 6.0, Kind::Prey, &params)
        })
        .collect();
    let index = PerceptionIndex::build(&entities).expect("finite positions");

    for i in 0..entities.len() {
        let mut indexed: Vec<usize> = gather_neighbors(&entities, i, Some(&index))
            .into_iter()
            .map(|(_, j)| j)
            .collect();
        let mut scanned: Vec<usize> = gather_neighbors(&entities, i, None)
            .into_iter()
            .map(|(_, j)| j)
            .collect();
        indexed.sort_unstable();
        scanned.sort_unstable();
        assert_eq!(indexed, scanned, "neighbor sets differ for entity {i}");
        assert!(!indexed.contains(&i));
    }
}

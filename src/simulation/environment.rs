//! Static obstacles and entity-vs-obstacle constraints.
//!
//! Obstacles are immovable: only the entity's position and velocity change
//! when the two overlap.

use geo::{Coord, Rect, coord};
use ndarray::Array1;

use super::entity::Entity;
use super::error::{Result, SimError};
use super::geometric_utils::{closest_point_on_rect, length, vec2};

/// A fixed circle or axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Obstacle {
    /// Solid disc.
    Circle {
        /// Disc center.
        center: Coord<f32>,
        /// Disc radius.
        radius: f32,
    },
    /// Solid axis-aligned rectangle.
    Rect(Rect<f32>),
}

impl Obstacle {
    /// Creates a circular obstacle.
    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self::Circle {
            center: coord! { x: x, y: y },
            radius,
        }
    }

    /// Creates a rectangular obstacle from two opposite corners.
    pub fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::Rect(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }))
    }

    /// Rejects non-finite or degenerate geometry.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Circle { center, radius } => {
                if !center.x.is_finite() || !center.y.is_finite() {
                    return Err(SimError::invalid("circle obstacle center must be finite"));
                }
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(SimError::invalid(format!(
                        "circle obstacle radius must be positive, got {radius}"
                    )));
                }
            }
            Self::Rect(rect) => {
                let corners = [rect.min().x, rect.min().y, rect.max().x, rect.max().y];
                if corners.iter().any(|c| !c.is_finite()) {
                    return Err(SimError::invalid("rect obstacle corners must be finite"));
                }
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return Err(SimError::invalid(format!(
                        "rect obstacle must have positive size, got {}x{}",
                        rect.width(),
                        rect.height()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Contact normal (pointing from the obstacle toward the entity) and
    /// penetration depth, or `None` when the two do not overlap.
    pub fn contact(&self, pos: &Array1<f32>, radius: f32) -> Option<(Array1<f32>, f32)> {
        match self {
            Self::Circle { center, radius: r } => {
                let delta = pos - &vec2(center.x, center.y);
                let dist = length(&delta);
                let reach = radius + r;
                // coincident centers have no usable normal
                if dist >= reach || dist <= f32::EPSILON {
                    return None;
                }
                Some((delta / dist, reach - dist))
            }
            Self::Rect(rect) => {
                let closest = closest_point_on_rect(pos, rect);
                let delta = pos - &closest;
                let dist = length(&delta);
                if dist > f32::EPSILON {
                    if dist >= radius {
                        return None;
                    }
                    return Some((delta / dist, radius - dist));
                }
                // center inside the rectangle: leave through the nearest face
                let faces = [
                    (pos[0] - rect.min().x, vec2(-1.0, 0.0)),
                    (rect.max().x - pos[0], vec2(1.0, 0.0)),
                    (pos[1] - rect.min().y, vec2(0.0, -1.0)),
                    (rect.max().y - pos[1], vec2(0.0, 1.0)),
                ];
                faces
                    .into_iter()
                    .min_by(|a, b| a.0.total_cmp(&b.0))
                    .map(|(depth, normal)| (normal, depth + radius))
            }
        }
    }
}

/// Owns the static obstacles of a world.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    obstacles: Vec<Obstacle>,
}

impl Environment {
    /// Creates an environment after validating every obstacle.
    pub fn new(obstacles: Vec<Obstacle>) -> Result<Self> {
        for obstacle in &obstacles {
            obstacle.validate()?;
        }
        Ok(Self { obstacles })
    }

    /// The current obstacles.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Pushes every entity out of every obstacle it overlaps.
    ///
    /// # Returns
    ///
    /// Number of entity-obstacle contacts resolved.
    pub fn constrain_all(&self, entities: &mut [Entity]) -> usize {
        let mut contacts = 0;
        for entity in entities.iter_mut() {
            for obstacle in &self.obstacles {
                if resolve_obstacle(entity, obstacle) {
                    contacts += 1;
                }
            }
        }
        contacts
    }
}

/// Resolves one entity against one obstacle.
///
/// # Returns
///
/// `true` if the two overlapped and the entity was moved.
pub fn resolve_obstacle(entity: &mut Entity, obstacle: &Obstacle) -> bool {
    let Some((normal, depth)) = obstacle.contact(&entity.pos, entity.radius) else {
        return false;
    };

    entity.pos += &(&normal * depth);

    let normal_speed = entity.vel.dot(&normal);
    if normal_speed < 0.0 {
        // v_n' = -e * v_n
        let change = &normal * (-(1.0 + entity.dna.restitution) * normal_speed);
        entity.vel += &change;
    }
    true
}

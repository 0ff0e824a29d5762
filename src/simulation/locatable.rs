//! Trait for round bodies that have a position in the world.
//!
//! Spatial indices are built from anything implementing [`Locatable`], so
//! entities and test fixtures share the same insertion path.

use geo::Rect;
use ndarray::Array1;

use super::geometric_utils::square_around;

/// Trait for circular bodies with a center and a radius.
pub trait Locatable {
    /// Returns a reference to the body's center.
    fn pos(&self) -> &Array1<f32>;

    /// Returns a mutable reference to the body's center.
    fn pos_mut(&mut self) -> &mut Array1<f32>;

    /// Radius of the body.
    fn radius(&self) -> f32;

    /// Bounding box of the body, i.e. its center inflated by its radius.
    fn bounds(&self) -> Rect<f32> {
        square_around(self.pos(), self.radius())
    }
}

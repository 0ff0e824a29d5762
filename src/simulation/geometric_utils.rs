//! Geometric utility functions for 2D vectors and regions.
//!
//! Vectors are two-element `Array1<f32>` values; regions are `geo::Rect`.

use geo::{Rect, coord};
use ndarray::Array1;

/// Builds a 2D vector.
pub fn vec2(x: f32, y: f32) -> Array1<f32> {
    Array1::from_vec(vec![x, y])
}

/// Euclidean length of a vector.
pub fn length(v: &Array1<f32>) -> f32 {
    v.dot(v).sqrt()
}

/// Euclidean distance between two points.
pub fn distance(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    length(&(a - b))
}

/// Returns `v` scaled to unit length, or a zero vector when `v` is too short
/// to normalize safely.
pub fn normalize_or_zero(v: &Array1<f32>) -> Array1<f32> {
    let len = length(v);
    if len > f32::EPSILON {
        v / len
    } else {
        Array1::zeros(v.len())
    }
}

/// Scales `v` down in place so its length does not exceed `max`.
pub fn limit_mut(v: &mut Array1<f32>, max: f32) {
    let len = length(v);
    if len > max && len > 0.0 {
        *v *= max / len;
    }
}

/// Checks that every component is finite.
pub fn is_finite(v: &Array1<f32>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Axis-aligned square of half-size `half` centered on `center`.
pub fn square_around(center: &Array1<f32>, half: f32) -> Rect<f32> {
    Rect::new(
        coord! { x: center[0] - half, y: center[1] - half },
        coord! { x: center[0] + half, y: center[1] + half },
    )
}

/// Clamps a point onto a rectangle, returning the closest point of the
/// rectangle (the point itself when it lies inside).
pub fn closest_point_on_rect(point: &Array1<f32>, rect: &Rect<f32>) -> Array1<f32> {
    vec2(
        point[0].clamp(rect.min().x, rect.max().x),
        point[1].clamp(rect.min().y, rect.max().y),
    )
}

/// Checks that `inner` lies entirely within `outer` (edges inclusive).
pub fn rect_contains_rect(outer: &Rect<f32>, inner: &Rect<f32>) -> bool {
    inner.min().x >= outer.min().x
        && inner.min().y >= outer.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}

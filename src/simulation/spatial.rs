//! Spatial indexing for efficient neighbor queries.
//!
//! Two indices are rebuilt from scratch every step and dropped at step end:
//! - [`Quadtree`]: region index over radius-inflated bounds, used by the
//!   collision broad phase
//! - [`PerceptionIndex`]: KD-tree over centers, used for exact radius
//!   queries by the ecosystem layer

use geo::{Intersects, Rect, coord};
use kdtree::distance::squared_euclidean;
use kdtree::{ErrorKind as KdTreeError, KdTree};
use ndarray::Array1;

use super::geometric_utils::rect_contains_rect;
use super::locatable::Locatable;

/// Default number of entries a node stores before subdividing.
pub const DEFAULT_CAPACITY: usize = 4;
/// Default depth at which nodes stop subdividing.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Region quadtree storing item indices with their bounds.
///
/// Items descend into the first child quadrant (NE, NW, SE, SW) that fully
/// contains their bounds; items straddling a subdivision line stay in the
/// parent node, so each item is stored exactly once.
#[derive(Debug, Clone)]
pub struct Quadtree {
    boundary: Rect<f32>,
    capacity: usize,
    max_depth: usize,
    depth: usize,
    items: Vec<(usize, Rect<f32>)>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    /// Creates an empty root node covering `boundary`.
    pub fn new(boundary: Rect<f32>, capacity: usize, max_depth: usize) -> Self {
        Self::with_depth(boundary, capacity.max(1), max_depth, 0)
    }

    fn with_depth(boundary: Rect<f32>, capacity: usize, max_depth: usize, depth: usize) -> Self {
        Self {
            boundary,
            capacity,
            max_depth,
            depth,
            items: Vec::with_capacity(capacity),
            children: None,
        }
    }

    /// Builds a tree over `items`, indexed by their position in the slice.
    ///
    /// Items lying outside `boundary` are kept at the root rather than
    /// dropped, so every item can be found again by a query.
    pub fn build<T: Locatable>(
        boundary: Rect<f32>,
        capacity: usize,
        max_depth: usize,
        items: &[T],
    ) -> Self {
        let mut tree = Self::new(boundary, capacity, max_depth);
        for (index, item) in items.iter().enumerate() {
            let bounds = item.bounds();
            if !tree.insert(index, bounds) {
                tree.items.push((index, bounds));
            }
        }
        tree
    }

    /// Region covered by this node.
    pub fn boundary(&self) -> Rect<f32> {
        self.boundary
    }

    /// Inserts an item. Returns `false` when its bounds miss this node.
    pub fn insert(&mut self, index: usize, bounds: Rect<f32>) -> bool {
        if !self.boundary.intersects(&bounds) {
            return false;
        }

        if self.children.is_none() {
            if self.items.len() < self.capacity || self.depth >= self.max_depth {
                self.items.push((index, bounds));
                return true;
            }
            self.subdivide();
        }

        if let Some(child) = self.child_containing(&bounds) {
            return child.insert(index, bounds);
        }
        self.items.push((index, bounds));
        true
    }

    /// Returns every item whose bounds intersect `region`, each exactly once.
    pub fn query(&self, region: &Rect<f32>) -> Vec<usize> {
        let mut found = Vec::new();
        self.query_into(region, &mut found);
        found
    }

    fn query_into(&self, region: &Rect<f32>, found: &mut Vec<usize>) {
        found.extend(
            self.items
                .iter()
                .filter(|(_, bounds)| bounds.intersects(region))
                .map(|(index, _)| *index),
        );

        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.boundary.intersects(region) {
                    child.query_into(region, found);
                }
            }
        }
    }

    /// Total number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map(|children| children.iter().map(Quadtree::len).sum())
                .unwrap_or(0)
    }

    /// Checks if the tree stores no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth of the deepest node below (and including) this one.
    pub fn depth(&self) -> usize {
        self.children
            .as_ref()
            .map(|children| children.iter().map(Quadtree::depth).max().unwrap_or(0))
            .unwrap_or(self.depth)
    }

    fn subdivide(&mut self) {
        let min = self.boundary.min();
        let max = self.boundary.max();
        let mid_x = (min.x + max.x) / 2.0;
        let mid_y = (min.y + max.y) / 2.0;
        let depth = self.depth + 1;
        let node = |x0: f32, y0: f32, x1: f32, y1: f32| {
            Quadtree::with_depth(
                Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }),
                self.capacity,
                self.max_depth,
                depth,
            )
        };

        // y grows downward, so "north" is the low-y half
        let mut children = Box::new([
            node(mid_x, min.y, max.x, mid_y), // NE
            node(min.x, min.y, mid_x, mid_y), // NW
            node(mid_x, mid_y, max.x, max.y), // SE
            node(min.x, mid_y, mid_x, max.y), // SW
        ]);

        // push existing items down where they fit entirely
        let items = std::mem::take(&mut self.items);
        for (index, bounds) in items {
            match children
                .iter_mut()
                .find(|child| rect_contains_rect(&child.boundary, &bounds))
            {
                Some(child) => {
                    child.insert(index, bounds);
                }
                None => self.items.push((index, bounds)),
            }
        }
        self.children = Some(children);
    }

    fn child_containing(&mut self, bounds: &Rect<f32>) -> Option<&mut Quadtree> {
        self.children
            .as_mut()?
            .iter_mut()
            .find(|child| rect_contains_rect(&child.boundary, bounds))
    }
}

/// Type alias for 2D spatial KD-tree used for efficient neighbor queries.
pub type Tree2D = KdTree<f32, usize, Vec<f32>>;

/// Result of a spatial radius query: (`distance_squared`, index) pairs.
pub type SpatialQueryResult = Vec<(f32, usize)>;

/// KD-tree over entity centers for exact radius queries.
pub struct PerceptionIndex {
    tree: Tree2D,
}

impl PerceptionIndex {
    /// Builds the index from a slice of locatable items.
    ///
    /// # Returns
    ///
    /// The index, or an error if an item has a non-finite position.
    pub fn build<T: Locatable>(items: &[T]) -> Result<Self, KdTreeError> {
        let mut tree = KdTree::with_capacity(2, items.len().max(1));
        for (i, item) in items.iter().enumerate() {
            tree.add(item.pos().to_vec(), i)?;
        }
        Ok(Self { tree })
    }

    /// Query items whose centers lie within `radius` of `pos`.
    ///
    /// # Returns
    ///
    /// Vector of (`distance_squared`, index) pairs.
    pub fn within(&self, pos: &Array1<f32>, radius: f32) -> SpatialQueryResult {
        self.tree
            .within(&pos.to_vec(), radius.powi(2), &squared_euclidean)
            .unwrap_or_default()
            .into_iter()
            .map(|(dist, &idx)| (dist, idx))
            .collect()
    }
}

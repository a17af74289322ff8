use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::{BBox, Point};
use crate::object::ObjectId;

/// An entry in the R-tree spatial index, referencing an object by id.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    pub object_id: ObjectId,
    /// Bounding box of the object in world space.
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Bounding-box prefilter for hit-testing. Exact shape tests happen
/// afterwards against the object itself.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Ids of all entries whose bounding box contains the point, edges
    /// included.
    pub fn query_point(&self, point: &Point) -> Vec<ObjectId> {
        let at = AABB::from_point([point.x, point.y]);
        self.tree
            .locate_in_envelope_intersecting(&at)
            .map(|e| e.object_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len()).finish()
    }
}

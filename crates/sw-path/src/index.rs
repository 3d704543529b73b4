//! R-tree index of host objects for nearest lookups.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use sw_core::{ObjectId, Position};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
struct ObjectEntry {
    point: [i32; 2],
    id:    ObjectId,
}

impl RTreeObject for ObjectEntry {
    type Envelope = AABB<[i32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for ObjectEntry {
    /// Squared Euclidean distance in cells.
    fn distance_2(&self, point: &[i32; 2]) -> i32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── ObjectIndex ───────────────────────────────────────────────────────────────

/// Positions of the objects of one zone.
#[derive(Default)]
pub struct ObjectIndex {
    tree: RTree<ObjectEntry>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pos: Position, id: ObjectId) {
        self.tree.insert(ObjectEntry { point: [pos.x, pos.y], id });
    }

    pub fn remove(&mut self, pos: Position, id: ObjectId) -> bool {
        self.tree.remove(&ObjectEntry { point: [pos.x, pos.y], id }).is_some()
    }

    /// Objects ordered by distance from `from`, nearest first.
    pub fn nearest(&self, from: Position) -> impl Iterator<Item = (ObjectId, Position)> + '_ {
        self.tree
            .nearest_neighbor_iter(&[from.x, from.y])
            .map(|e| (e.id, Position::new(e.point[0], e.point[1])))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

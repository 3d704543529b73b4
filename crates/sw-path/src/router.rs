//! Routing trait and default A* implementation.
//!
//! # Pluggability
//!
//! The movement engine is generic over [`Router`], so hosts can swap in a
//! jump-point search or a precomputed flow field without touching the engine.
//! The default [`AStarRouter`] is an 8-connected A* with a Chebyshev
//! heuristic, which is admissible because every step costs at least the
//! cheaper terrain cost.
//!
//! # Goals with range
//!
//! A search succeeds as soon as it reaches any cell within `range` of the
//! goal, so `range = 1` paths end next to a structure instead of on it.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use sw_core::{Direction, Position, Tile};

use crate::grid::{CostMatrix, TileSource};
use crate::{PathError, PathResult};

// ── GridPath ──────────────────────────────────────────────────────────────────

/// The result of a routing query: an origin and the directions to step in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridPath {
    pub origin: Position,
    pub steps:  Vec<Direction>,
    /// Total terrain cost of the search.  Zero for paths decoded from text.
    pub cost:   u32,
}

impl GridPath {
    pub fn empty(origin: Position) -> Self {
        Self { origin, steps: Vec::new(), cost: 0 }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Final cell of the path.
    pub fn end(&self) -> Position {
        self.steps.iter().fold(self.origin, |p, &d| p.step(d))
    }

    /// Every visited cell after the origin, in order.
    pub fn positions(&self) -> Vec<Position> {
        let mut cur = self.origin;
        self.steps
            .iter()
            .map(|&d| {
                cur = cur.step(d);
                cur
            })
            .collect()
    }

    /// Encode the steps as direction digits, e.g. `"3345"`.
    pub fn serialize(&self) -> String {
        self.steps.iter().map(|d| d.as_digit()).collect()
    }

    /// Decode a digit string produced by [`serialize`](Self::serialize).
    pub fn deserialize(origin: Position, text: &str) -> PathResult<Self> {
        let steps = text
            .chars()
            .map(|c| Direction::from_digit(c).ok_or_else(|| PathError::Malformed(text.to_string())))
            .collect::<PathResult<Vec<_>>>()?;
        Ok(Self { origin, steps, cost: 0 })
    }
}

// ── SearchRequest ─────────────────────────────────────────────────────────────

/// Parameters of one path search.
#[derive(Clone, Copy, Debug)]
pub struct SearchRequest<'a> {
    pub from:    Position,
    pub goal:    Position,
    /// Acceptable Chebyshev distance from `goal`.
    pub range:   u32,
    /// Optional overrides; `None` means terrain costs only.
    pub costs:   Option<&'a CostMatrix>,
    /// Node-expansion budget.
    pub max_ops: u32,
}

impl<'a> SearchRequest<'a> {
    pub fn new(from: Position, goal: Position) -> Self {
        Self { from, goal, range: 0, costs: None, max_ops: 4_000 }
    }

    pub fn range(mut self, range: u32) -> Self {
        self.range = range;
        self
    }

    pub fn costs(mut self, costs: &'a CostMatrix) -> Self {
        self.costs = Some(costs);
        self
    }

    pub fn max_ops(mut self, max_ops: u32) -> Self {
        self.max_ops = max_ops;
        self
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable path search.
pub trait Router: Send + Sync {
    /// Find a path satisfying `req` over `tiles`.
    ///
    /// A start already within range yields an empty path rather than an
    /// error.
    fn route(&self, tiles: &dyn TileSource, req: &SearchRequest<'_>) -> PathResult<GridPath>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// 8-connected A* over terrain costs.
///
/// | Tile  | Default cost |
/// |-------|--------------|
/// | Plain | 1            |
/// | Swamp | 5            |
/// | Wall  | impassable   |
#[derive(Clone, Copy, Debug)]
pub struct AStarRouter {
    pub plain_cost: u32,
    pub swamp_cost: u32,
}

impl Default for AStarRouter {
    fn default() -> Self {
        Self { plain_cost: 1, swamp_cost: 5 }
    }
}

impl AStarRouter {
    /// Cost of entering `pos`, or `None` if it cannot be entered.
    #[inline]
    fn step_cost(&self, tiles: &dyn TileSource, costs: Option<&CostMatrix>, pos: Position) -> Option<u32> {
        if !tiles.contains(pos) {
            return None;
        }
        if let Some(c) = costs.and_then(|m| m.get(pos)) {
            if c == CostMatrix::IMPASSABLE {
                return None;
            }
            if c > 0 {
                return Some(c as u32);
            }
        }
        if tiles.is_obstructed(pos) {
            return None;
        }
        match tiles.tile(pos) {
            Tile::Plain => Some(self.plain_cost),
            Tile::Swamp => Some(self.swamp_cost),
            Tile::Wall  => None,
        }
    }

    #[inline]
    fn heuristic(&self, pos: Position, goal: Position, range: u32) -> u32 {
        pos.range_to(goal).saturating_sub(range) * self.plain_cost.min(self.swamp_cost)
    }
}

impl Router for AStarRouter {
    fn route(&self, tiles: &dyn TileSource, req: &SearchRequest<'_>) -> PathResult<GridPath> {
        if !tiles.contains(req.from) {
            return Err(PathError::OutOfBounds(req.from));
        }
        if req.from.in_range_to(req.goal, req.range) {
            return Ok(GridPath::empty(req.from));
        }

        let mut g_score: FxHashMap<Position, u32> = FxHashMap::default();
        let mut came_from: FxHashMap<Position, Direction> = FxHashMap::default();
        g_score.insert(req.from, 0);

        // Min-heap on (f, g, pos).  Position as the last key keeps tie-breaking
        // deterministic.
        let mut open: BinaryHeap<Reverse<(u32, u32, Position)>> = BinaryHeap::new();
        open.push(Reverse((self.heuristic(req.from, req.goal, req.range), 0, req.from)));

        let mut ops = 0u32;
        while let Some(Reverse((_, g, pos))) = open.pop() {
            if g > g_score.get(&pos).copied().unwrap_or(u32::MAX) {
                continue;
            }
            if pos.in_range_to(req.goal, req.range) {
                return Ok(reconstruct(req.from, pos, &came_from, g));
            }
            ops += 1;
            if ops > req.max_ops {
                return Err(PathError::SearchExhausted { ops: req.max_ops });
            }

            for dir in Direction::ALL {
                let next = pos.step(dir);
                let Some(cost) = self.step_cost(tiles, req.costs, next) else {
                    continue;
                };
                let tentative = g.saturating_add(cost);
                if tentative < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                    g_score.insert(next, tentative);
                    came_from.insert(next, dir);
                    let f = tentative.saturating_add(self.heuristic(next, req.goal, req.range));
                    open.push(Reverse((f, tentative, next)));
                }
            }
        }

        Err(PathError::NoPath { from: req.from, to: req.goal })
    }
}

fn reconstruct(
    origin:    Position,
    end:       Position,
    came_from: &FxHashMap<Position, Direction>,
    cost:      u32,
) -> GridPath {
    let mut steps = Vec::new();
    let mut cur = end;
    while cur != origin {
        let Some(&dir) = came_from.get(&cur) else {
            break;
        };
        steps.push(dir);
        cur = cur.step(dir.opposite());
    }
    steps.reverse();
    GridPath { origin, steps, cost }
}

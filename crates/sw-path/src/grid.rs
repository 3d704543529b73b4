//! Tile sources and per-search cost overrides.
//!
//! The router never talks to the host directly; it reads terrain through the
//! [`TileSource`] trait.  [`TerrainGrid`] is the owned, in-memory
//! implementation used by hosts and tests; the movement engine wraps the
//! `World` in its own adapter.

use rustc_hash::FxHashMap;

use sw_core::{Position, Tile};

// ── TileSource ────────────────────────────────────────────────────────────────

/// Read-only terrain access for one zone.
pub trait TileSource {
    /// `(width, height)` of the zone.  Valid cells are `0..width × 0..height`.
    fn size(&self) -> (i32, i32);

    /// Terrain of `pos`.  Callers check [`contains`](Self::contains) first.
    fn tile(&self, pos: Position) -> Tile;

    /// `true` if a blocking object occupies `pos`.
    fn is_obstructed(&self, _pos: Position) -> bool {
        false
    }

    #[inline]
    fn contains(&self, pos: Position) -> bool {
        let (w, h) = self.size();
        pos.x >= 0 && pos.y >= 0 && pos.x < w && pos.y < h
    }
}

// ── TerrainGrid ───────────────────────────────────────────────────────────────

/// Dense row-major terrain of one zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainGrid {
    width:  i32,
    height: i32,
    tiles:  Vec<Tile>,
}

impl TerrainGrid {
    /// A `width × height` grid of plain tiles.
    pub fn new(width: i32, height: i32) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self { width: width.max(0), height: height.max(0), tiles: vec![Tile::Plain; cells] }
    }

    /// Parse a grid from text rows using `.` (plain), `~` (swamp) and `#`
    /// (wall).  Short rows are padded with plain tiles; unknown characters
    /// read as plain.
    ///
    /// ```
    /// use sw_core::{Position, Tile};
    /// use sw_path::{TerrainGrid, TileSource};
    ///
    /// let grid = TerrainGrid::from_rows(&["..#", ".~."]);
    /// assert_eq!(grid.size(), (3, 2));
    /// assert_eq!(grid.tile(Position::new(2, 0)), Tile::Wall);
    /// assert_eq!(grid.tile(Position::new(1, 1)), Tile::Swamp);
    /// ```
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.as_ref().chars().enumerate() {
                grid.set(Position::new(x as i32, y as i32), Tile::from_char(c).unwrap_or_default());
            }
        }
        grid
    }

    /// Overwrite one cell.  Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, tile: Tile) {
        if let Some(i) = self.index(pos) {
            self.tiles[i] = tile;
        }
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| (pos.y * self.width + pos.x) as usize)
    }
}

impl TileSource for TerrainGrid {
    #[inline]
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    #[inline]
    fn tile(&self, pos: Position) -> Tile {
        self.index(pos).map_or(Tile::Wall, |i| self.tiles[i])
    }
}

// ── CostMatrix ────────────────────────────────────────────────────────────────

/// Sparse per-cell cost overrides applied on top of terrain costs.
///
/// A cost of [`CostMatrix::IMPASSABLE`] blocks the cell.  Cells without an
/// override use the router's terrain cost.  The movement engine fills one
/// with the positions of other agents when it has to route around them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CostMatrix {
    costs: FxHashMap<Position, u8>,
}

impl CostMatrix {
    pub const IMPASSABLE: u8 = u8::MAX;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, pos: Position, cost: u8) {
        self.costs.insert(pos, cost);
    }

    /// Mark `pos` impassable.
    pub fn block(&mut self, pos: Position) {
        self.set(pos, Self::IMPASSABLE);
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<u8> {
        self.costs.get(&pos).copied()
    }

    #[inline]
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.get(pos) == Some(Self::IMPASSABLE)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

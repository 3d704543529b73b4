//! `sw-path` — grid routing and path reuse.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                        |
//! |------------|-----------------------------------------------------------------|
//! | [`grid`]   | `TileSource` trait, `TerrainGrid`, `CostMatrix`                 |
//! | [`router`] | `Router` trait, `SearchRequest`, `GridPath`, `AStarRouter`      |
//! | [`cache`]  | `PathCache`, `PathKey` — reuse of computed paths                |
//! | [`index`]  | `ObjectIndex` — R-tree nearest-object lookup                    |
//! | [`error`]  | `PathError`, `PathResult<T>`                                    |
//!
//! # Path encoding
//!
//! A path is stored as its origin plus one digit per step (`'1'..='8'`, see
//! [`sw_core::Direction::as_digit`]).  The same string lives in the shared
//! cache and in each agent's movement record.

pub mod cache;
pub mod error;
pub mod grid;
pub mod index;
pub mod router;


pub use cache::{CacheStats, PathCache, PathKey};
pub use error::{PathError, PathResult};
pub use grid::{CostMatrix, TerrainGrid, TileSource};
pub use index::ObjectIndex;
pub use router::{AStarRouter, GridPath, Router, SearchRequest};

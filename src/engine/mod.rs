// Terrain engine: height field, traversal grid, pathfinding, picking.

pub mod grid;
pub mod heightfield;
pub mod pathfind;
pub mod progress;
pub mod quadtree;
pub mod terrain;

// Re-export the types most callers touch.
pub use grid::{TILE_SIZE, Tile, TileGrid, TileKind};
pub use heightfield::HeightField;
pub use pathfind::SearchScratch;
pub use progress::{NoopProgress, ProgressSink};
pub use quadtree::{Aabb, Quadtree, Ray};
pub use terrain::Terrain;

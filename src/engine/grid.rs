// Tile grid: the coarse traversal grid derived from the height field.
//
// One tile covers TILE_SIZE x TILE_SIZE height-field cells. Construction is
// a strict pipeline — heights, then walkability/cost, then neighbor links,
// then region labels — each stage reading only what earlier stages wrote.
// Region labels must be fully converged before any path query: the path
// finder short-circuits on region-id equality.

use super::heightfield::HeightField;
use glam::{UVec2, Vec3};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Height-field cells per tile edge.
pub const TILE_SIZE: u32 = 2;

/// The 8 compass neighbors in fixed order: NW, N, NE, W, E, SW, S, SE.
/// Slot order is shared between linking and path expansion; slot i and
/// slot 7-i are mirror directions (used by the symmetry test).
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

// ============================================================================
// TILE
// ============================================================================

/// Terrain band, from the layered height thresholds in `classify`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Marsh,
    Grass,
    Rock,
    Snow,
}

/// One cell of the traversal grid.
///
/// Neighbor links are grid coordinates back into the owning grid, never
/// owning references — the grid alone owns tile lifetime. A slot is `Some`
/// only if that neighbor is in bounds and walkable; an unwalkable tile keeps
/// all 8 slots empty. Search state (g/f/open/closed/parent) lives in
/// per-query scratch buffers, not here.
pub struct Tile {
    pub coord: UVec2,
    /// World-space position; y is the sampled terrain height.
    pub position: Vec3,
    pub kind: TileKind,
    pub walkable: bool,
    /// Traversal cost in [0.1, 1.0], from local height variance.
    pub cost: f32,
    pub neighbors: [Option<UVec2>; 8],
    /// Connectivity class. Two walkable tiles are mutually reachable iff
    /// their region ids are equal (after labeling has converged).
    pub region: u32,
}

// ============================================================================
// TILE GRID
// ============================================================================

pub struct TileGrid {
    tiles: Vec<Tile>,
    width: u32,
    height: u32,
}

impl TileGrid {
    /// Build the full grid from a height field: positions and bands, then
    /// walkability/cost, then neighbor links, then region labels.
    pub fn build(field: &HeightField, cell_spacing: f32) -> Self {
        let width = field.width() / TILE_SIZE;
        let height = field.height() / TILE_SIZE;
        let max = field.max_height();

        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let col = (x * TILE_SIZE) as f32;
                let row = (y * TILE_SIZE) as f32;
                let h = field.sample_continuous(col, row);
                tiles.push(Tile {
                    coord: UVec2::new(x, y),
                    position: Vec3::new(col * cell_spacing, h, row * cell_spacing),
                    kind: classify(h, max),
                    walkable: false,
                    cost: 0.0,
                    neighbors: [None; 8],
                    region: 0,
                });
            }
        }

        let mut grid = Self {
            tiles,
            width,
            height,
        };
        grid.compute_walkability();
        grid.link_neighbors();
        grid.label_regions();
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    pub fn idx(&self, coord: UVec2) -> usize {
        (coord.y * self.width + coord.x) as usize
    }

    /// Tile lookup by grid coordinate. Out-of-range → None, never a panic.
    pub fn tile(&self, coord: UVec2) -> Option<&Tile> {
        if self.in_bounds(coord.x as i32, coord.y as i32) {
            Some(&self.tiles[self.idx(coord)])
        } else {
            None
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    // ------------------------------------------------------------------------
    // Walkability & cost
    // ------------------------------------------------------------------------

    /// Cost = variance of height deltas to the in-bounds neighbors, + 0.1,
    /// capped at 1.0. Walkable iff cost < 0.5. Border tiles average over
    /// fewer than 8 samples.
    fn compute_walkability(&mut self) {
        for i in 0..self.tiles.len() {
            let coord = self.tiles[i].coord;
            let own_h = self.tiles[i].position.y;

            let mut sum_sq = 0.0_f32;
            let mut count = 0u32;
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let nx = coord.x as i32 + dx;
                let ny = coord.y as i32 + dy;
                if self.in_bounds(nx, ny) {
                    let ni = self.idx(UVec2::new(nx as u32, ny as u32));
                    let delta = self.tiles[ni].position.y - own_h;
                    sum_sq += delta * delta;
                    count += 1;
                }
            }

            let variance = sum_sq / count as f32;
            let cost = (variance + 0.1).min(1.0);
            self.tiles[i].cost = cost;
            self.tiles[i].walkable = cost < 0.5;
        }
    }

    // ------------------------------------------------------------------------
    // Connectivity
    // ------------------------------------------------------------------------

    /// Fill neighbor slots for every walkable tile. Slot i points at the
    /// NEIGHBOR_OFFSETS[i] neighbor iff that neighbor is in bounds and
    /// walkable. Unwalkable tiles are skipped entirely, leaving their slots
    /// empty.
    fn link_neighbors(&mut self) {
        for i in 0..self.tiles.len() {
            if !self.tiles[i].walkable {
                continue;
            }
            let coord = self.tiles[i].coord;
            for (slot, (dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                let nx = coord.x as i32 + dx;
                let ny = coord.y as i32 + dy;
                if self.in_bounds(nx, ny) {
                    let ncoord = UVec2::new(nx as u32, ny as u32);
                    if self.tiles[self.idx(ncoord)].walkable {
                        self.tiles[i].neighbors[slot] = Some(ncoord);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Region labeling
    // ------------------------------------------------------------------------

    /// Label-propagation to a fixed point: every tile starts with its flat
    /// index as region id, then walkable tiles repeatedly adopt the lowest
    /// region id among their linked neighbors until a full pass changes
    /// nothing. Each connected walkable component converges to the smallest
    /// flat index it contains.
    fn label_regions(&mut self) {
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            tile.region = i as u32;
        }

        let mut passes = 0u32;
        loop {
            let mut changed = false;
            for i in 0..self.tiles.len() {
                if !self.tiles[i].walkable {
                    continue;
                }
                for ncoord in self.tiles[i].neighbors.into_iter().flatten() {
                    let nregion = self.tiles[self.idx(ncoord)].region;
                    if nregion < self.tiles[i].region {
                        self.tiles[i].region = nregion;
                        changed = true;
                    }
                }
            }
            passes += 1;
            if !changed {
                break;
            }
        }
        log::debug!("region labeling converged in {} passes", passes);
    }
}

/// Layered height-band classification: first matching threshold wins.
///
/// `h` never exceeds `max` (it is sampled from the same field `max` was
/// taken from), so the Rock arm absorbs every tile the first two arms
/// reject and the Snow arm cannot fire as ordered. Existing maps were
/// banded with this exact chain; reordering it is a product decision.
fn classify(h: f32, max: f32) -> TileKind {
    if h < 0.15 * max {
        TileKind::Marsh
    } else if h < 0.55 * max {
        TileKind::Grass
    } else if h <= max {
        TileKind::Rock
    } else {
        TileKind::Snow
    }
}

// ============================================================================
// TESTS
// ============================================================================

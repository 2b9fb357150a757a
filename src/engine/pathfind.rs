// A* search over the tile grid.
//
// Search state lives in SearchScratch, parallel arrays indexed by flat tile
// index, not on the tiles themselves — a query only needs &TileGrid plus its
// own scratch, so repeated or externally-parallel queries never interfere.
//
// Two deliberate quirks are preserved from the original behavior:
//   - the per-step terrain penalty is cost(n) * H(best, n), scaling the
//     penalty by the heuristic step distance rather than a fixed 1.0;
//   - closed nodes are relaxed on improvement but never re-queued, which
//     can yield slightly suboptimal (still valid) paths in weighted terrain.

use super::grid::TileGrid;
use glam::UVec2;

const SQRT2: f32 = std::f32::consts::SQRT_2;

// ============================================================================
// SEARCH SCRATCH
// ============================================================================

/// Per-query search state: g/f costs, open/closed membership, parent links.
/// `reset` is O(grid size) and runs at the start of every query.
pub struct SearchScratch {
    g: Vec<f32>,
    f: Vec<f32>,
    open: Vec<bool>,
    closed: Vec<bool>,
    parent: Vec<Option<u32>>,
    /// Open list: flat tile indices, scanned for minimum f on each pop.
    open_list: Vec<u32>,
}

impl SearchScratch {
    pub fn new(len: usize) -> Self {
        Self {
            g: vec![f32::INFINITY; len],
            f: vec![f32::INFINITY; len],
            open: vec![false; len],
            closed: vec![false; len],
            parent: vec![None; len],
            open_list: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.g.fill(f32::INFINITY);
        self.f.fill(f32::INFINITY);
        self.open.fill(false);
        self.closed.fill(false);
        self.parent.fill(None);
        self.open_list.clear();
    }
}

// ============================================================================
// HEURISTIC
// ============================================================================

/// Octile distance: exact step count for 8-directional unit movement, so it
/// never overestimates the true path cost. Always non-negative.
pub fn octile(a: UVec2, b: UVec2) -> f32 {
    let dx = (a.x as f32 - b.x as f32).abs();
    let dy = (a.y as f32 - b.y as f32).abs();
    let h = (dx + dy) + (SQRT2 - 2.0) * dx.min(dy);
    debug_assert!(h >= 0.0, "octile distance went negative: {h}");
    h
}

// ============================================================================
// A* SEARCH
// ============================================================================

/// Shortest path from `start` to `goal`, start-exclusive, goal-inclusive.
///
/// Every precondition failure is the same empty result, not an error:
/// start == goal, either coordinate out of bounds, either tile unwalkable,
/// or the two tiles in different regions (known unreachable, no search).
pub fn find_path(grid: &TileGrid, start: UVec2, goal: UVec2, scratch: &mut SearchScratch) -> Vec<UVec2> {
    debug_assert_eq!(scratch.g.len(), grid.len(), "scratch sized for a different grid");

    if start == goal {
        return Vec::new();
    }
    let (Some(start_tile), Some(goal_tile)) = (grid.tile(start), grid.tile(goal)) else {
        return Vec::new();
    };
    if !start_tile.walkable || !goal_tile.walkable {
        return Vec::new();
    }
    if start_tile.region != goal_tile.region {
        return Vec::new();
    }

    scratch.reset();

    let start_idx = grid.idx(start) as u32;
    scratch.g[start_idx as usize] = 0.0;
    scratch.f[start_idx as usize] = octile(start, goal);
    scratch.open[start_idx as usize] = true;
    scratch.open_list.push(start_idx);

    while !scratch.open_list.is_empty() {
        // Linear min-f scan; ties keep the first-found entry.
        let mut best_pos = 0;
        for (pos, &idx) in scratch.open_list.iter().enumerate().skip(1) {
            if scratch.f[idx as usize] < scratch.f[scratch.open_list[best_pos] as usize] {
                best_pos = pos;
            }
        }
        let best_idx = scratch.open_list.swap_remove(best_pos);
        scratch.open[best_idx as usize] = false;
        scratch.closed[best_idx as usize] = true;

        let best_tile = &grid.tiles()[best_idx as usize];
        if best_tile.coord == goal {
            return reconstruct(grid, scratch, start_idx, best_idx);
        }

        let best_g = scratch.g[best_idx as usize];
        for ncoord in best_tile.neighbors.into_iter().flatten() {
            let n_idx = grid.idx(ncoord);
            let n_tile = &grid.tiles()[n_idx];

            let new_g = best_g + 1.0;
            let new_f = new_g + octile(ncoord, goal) + n_tile.cost * octile(best_tile.coord, ncoord);

            if !scratch.open[n_idx] && !scratch.closed[n_idx] {
                scratch.g[n_idx] = new_g;
                scratch.f[n_idx] = new_f;
                scratch.parent[n_idx] = Some(best_idx);
                scratch.open[n_idx] = true;
                scratch.open_list.push(n_idx as u32);
            } else if new_f < scratch.f[n_idx] {
                // Improvement: take the better values. A closed node keeps
                // its closed status and is not re-queued.
                scratch.g[n_idx] = new_g;
                scratch.f[n_idx] = new_f;
                scratch.parent[n_idx] = Some(best_idx);
            }
        }
    }

    // Open set exhausted without reaching the goal. With converged region
    // labels this should not happen; the labels said the goal was reachable.
    log::debug!("search exhausted without reaching {goal:?} from {start:?}");
    Vec::new()
}

/// Follow parent links from the goal back to (not including) the start,
/// then reverse into start→goal order.
fn reconstruct(grid: &TileGrid, scratch: &SearchScratch, start_idx: u32, goal_idx: u32) -> Vec<UVec2> {
    let mut path = Vec::new();
    let mut current = goal_idx;
    while current != start_idx {
        path.push(grid.tiles()[current as usize].coord);
        current = scratch.parent[current as usize]
            .expect("parent chain must reach the start tile");
    }
    path.reverse();
    path
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::heightfield::HeightField;

    fn flat_grid() -> TileGrid {
        let field = HeightField::from_samples(16, 16, vec![0.0; 256]);
        TileGrid::build(&field, 1.0)
    }

    fn walled_grid() -> TileGrid {
        let mut samples = vec![0.0_f32; 256];
        for row in 0..16u32 {
            for col in 6..=9u32 {
                samples[(row * 16 + col) as usize] = 30.0;
            }
        }
        TileGrid::build(&HeightField::from_samples(16, 16, samples), 1.0)
    }

    fn run(grid: &TileGrid, start: UVec2, goal: UVec2) -> Vec<UVec2> {
        let mut scratch = SearchScratch::new(grid.len());
        find_path(grid, start, goal, &mut scratch)
    }

    #[test]
    fn octile_matches_known_values() {
        assert_eq!(octile(UVec2::new(0, 0), UVec2::new(0, 0)), 0.0);
        assert_eq!(octile(UVec2::new(0, 0), UVec2::new(3, 0)), 3.0);
        assert!((octile(UVec2::new(0, 0), UVec2::new(1, 1)) - SQRT2).abs() < 1e-6);
        // 3 diagonal steps + 2 straight steps.
        let h = octile(UVec2::new(0, 0), UVec2::new(5, 3));
        assert!((h - (2.0 + 3.0 * SQRT2)).abs() < 1e-5);
    }

    #[test]
    fn octile_is_non_negative_everywhere() {
        for ax in 0..8 {
            for ay in 0..8 {
                for bx in 0..8 {
                    for by in 0..8 {
                        assert!(octile(UVec2::new(ax, ay), UVec2::new(bx, by)) >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn diagonal_path_across_flat_terrain() {
        // 4x4 corner of the flat grid: (0,0) -> (3,3) is 3 diagonal steps.
        let grid = flat_grid();
        let path = run(&grid, UVec2::new(0, 0), UVec2::new(3, 3));
        assert_eq!(path, vec![UVec2::new(1, 1), UVec2::new(2, 2), UVec2::new(3, 3)]);
    }

    #[test]
    fn path_excludes_start_and_ends_at_goal() {
        let grid = flat_grid();
        let start = UVec2::new(1, 2);
        let goal = UVec2::new(6, 5);
        let path = run(&grid, start, goal);
        assert!(!path.is_empty());
        assert_ne!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
    }

    #[test]
    fn consecutive_path_tiles_are_grid_neighbors() {
        let grid = flat_grid();
        let start = UVec2::new(0, 7);
        let path = run(&grid, start, UVec2::new(7, 0));
        let mut prev = start;
        for &coord in &path {
            let dx = (coord.x as i32 - prev.x as i32).abs();
            let dy = (coord.y as i32 - prev.y as i32).abs();
            assert!(dx <= 1 && dy <= 1 && (dx, dy) != (0, 0), "{prev:?} -> {coord:?} is not a step");
            prev = coord;
        }
    }

    #[test]
    fn preconditions_yield_empty_paths() {
        let grid = walled_grid();
        // Start == goal.
        assert!(run(&grid, UVec2::new(1, 1), UVec2::new(1, 1)).is_empty());
        // Out of bounds, either side.
        assert!(run(&grid, UVec2::new(50, 0), UVec2::new(1, 1)).is_empty());
        assert!(run(&grid, UVec2::new(1, 1), UVec2::new(0, 50)).is_empty());
        // Unwalkable endpoint (the wall sits at tile x = 3..=4).
        assert!(run(&grid, UVec2::new(3, 3), UVec2::new(0, 0)).is_empty());
        assert!(run(&grid, UVec2::new(0, 0), UVec2::new(4, 4)).is_empty());
    }

    #[test]
    fn disjoint_regions_short_circuit_to_empty() {
        let grid = walled_grid();
        // Both walkable, separated by the unwalkable band.
        assert!(run(&grid, UVec2::new(0, 0), UVec2::new(7, 7)).is_empty());
        assert!(run(&grid, UVec2::new(1, 4), UVec2::new(6, 4)).is_empty());
    }

    #[test]
    fn path_stays_within_one_side_of_the_wall() {
        let grid = walled_grid();
        let path = run(&grid, UVec2::new(0, 0), UVec2::new(1, 7));
        assert!(!path.is_empty());
        assert_eq!(*path.last().unwrap(), UVec2::new(1, 7));
        for coord in &path {
            assert!(coord.x <= 1, "path strayed into the wall at {coord:?}");
        }
    }

    #[test]
    fn octile_equals_optimal_eight_direction_distance() {
        // The best 8-directional route is min(dx,dy) diagonals plus
        // |dx-dy| straight steps; octile must match that geometric length
        // exactly, so it can never overestimate 8-directional movement.
        for dx in 0..10u32 {
            for dy in 0..10u32 {
                let diagonals = dx.min(dy) as f32;
                let straights = (dx as i32 - dy as i32).unsigned_abs() as f32;
                let expected = straights + SQRT2 * diagonals;
                let h = octile(UVec2::new(0, 0), UVec2::new(dx, dy));
                assert!((h - expected).abs() < 1e-5, "octile({dx},{dy}) = {h}, want {expected}");
            }
        }
    }

    #[test]
    fn scratch_reuse_across_queries_is_clean() {
        let grid = flat_grid();
        let mut scratch = SearchScratch::new(grid.len());
        let first = find_path(&grid, UVec2::new(0, 0), UVec2::new(3, 3), &mut scratch);
        let second = find_path(&grid, UVec2::new(0, 0), UVec2::new(3, 3), &mut scratch);
        assert_eq!(first, second);
    }
}

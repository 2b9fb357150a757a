// Terrain facade: one struct owning the height field, the tile grid, and
// the quadtree, exposing the queries consumers actually call.
//
// Construction is a strict pipeline — the grid build (heights, walkability,
// links, region labels) must complete before any path query, and the
// quadtree before any pick. Terrain::new enforces that by finishing both
// before returning. Queries take &self; each path query owns its scratch.

use super::grid::{TILE_SIZE, Tile, TileGrid};
use super::heightfield::HeightField;
use super::pathfind::{self, SearchScratch};
use super::progress::ProgressSink;
use super::quadtree::{Quadtree, Ray};
use glam::{UVec2, Vec3};

pub struct Terrain {
    field: HeightField,
    grid: TileGrid,
    tree: Quadtree,
    cell_spacing: f32,
}

impl Terrain {
    pub fn new(field: HeightField, cell_spacing: f32, progress: &mut dyn ProgressSink) -> Self {
        progress.report(0.0, "tile grid");
        let grid = TileGrid::build(&field, cell_spacing);
        log::info!(
            "tile grid ready: {}x{} tiles, {} walkable",
            grid.width(),
            grid.height(),
            grid.tiles().iter().filter(|t| t.walkable).count()
        );

        progress.report(0.6, "spatial partition");
        let tree = Quadtree::build(&field, cell_spacing);

        progress.report(1.0, "ready");
        Self {
            field,
            grid,
            tree,
            cell_spacing,
        }
    }

    /// World-space width (along x), from grid dimensions and cell spacing.
    pub fn width(&self) -> f32 {
        (self.grid.width() * TILE_SIZE) as f32 * self.cell_spacing
    }

    /// World-space depth (along z).
    pub fn depth(&self) -> f32 {
        (self.grid.height() * TILE_SIZE) as f32 * self.cell_spacing
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Continuous terrain height at a world (x, z). Positions past the
    /// border clamp to the border sample.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        self.field
            .sample_continuous(x / self.cell_spacing, z / self.cell_spacing)
    }

    /// Tile lookup by grid coordinate; out of range is None.
    pub fn tile(&self, coord: UVec2) -> Option<&Tile> {
        self.grid.tile(coord)
    }

    /// Path from start to goal as tile coordinates, start-exclusive.
    /// Unreachable or invalid queries return an empty path.
    pub fn find_path(&self, start: UVec2, goal: UVec2) -> Vec<UVec2> {
        let mut scratch = SearchScratch::new(self.grid.len());
        pathfind::find_path(&self.grid, start, goal, &mut scratch)
    }

    /// As `find_path`, reusing a caller-owned scratch across queries.
    pub fn find_path_with(&self, start: UVec2, goal: UVec2, scratch: &mut SearchScratch) -> Vec<UVec2> {
        pathfind::find_path(&self.grid, start, goal, scratch)
    }

    // ------------------------------------------------------------------------
    // Picking
    // ------------------------------------------------------------------------

    /// World point where the ray meets the terrain, height-corrected by a
    /// direct terrain sample (the quadtree box height is approximate).
    pub fn pick_point(&self, ray: &Ray) -> Option<Vec3> {
        self.pick(ray).map(|(point, _)| point)
    }

    /// Height-corrected hit point plus the tile it landed on.
    pub fn pick(&self, ray: &Ray) -> Option<(Vec3, UVec2)> {
        let (t, tile) = self.tree.intersect(ray)?;
        let mut point = ray.origin + ray.dir * t;
        point.y = self.height(point.x, point.z);
        Some((point, tile))
    }

    /// Just the tile under the ray.
    pub fn pick_tile(&self, ray: &Ray) -> Option<UVec2> {
        self.tree.intersect(ray).map(|(_, tile)| tile)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::NoopProgress;

    fn ramp_terrain() -> Terrain {
        // 16x16 field, height = row * 0.1 (a gentle north-south slope).
        let mut samples = vec![0.0_f32; 256];
        for row in 0..16u32 {
            for col in 0..16u32 {
                samples[(row * 16 + col) as usize] = row as f32 * 0.1;
            }
        }
        let field = HeightField::from_samples(16, 16, samples);
        Terrain::new(field, 1.0, &mut NoopProgress)
    }

    #[test]
    fn planar_dimensions_come_from_grid_and_spacing() {
        let terrain = ramp_terrain();
        assert_eq!(terrain.width(), 16.0);
        assert_eq!(terrain.depth(), 16.0);
    }

    #[test]
    fn height_matches_samples_at_aligned_coordinates() {
        let terrain = ramp_terrain();
        for row in 0..16u32 {
            for col in 0..16u32 {
                let expected = terrain.field().sample(row, col);
                let got = terrain.height(col as f32, row as f32);
                assert_eq!(got, expected, "mismatch at field ({row},{col})");
            }
        }
    }

    #[test]
    fn picked_point_height_comes_from_the_terrain_sample() {
        let terrain = ramp_terrain();
        let ray = Ray {
            origin: Vec3::new(4.4, 50.0, 6.4),
            dir: Vec3::new(0.0, -1.0, 0.0),
        };
        let (point, tile) = terrain.pick(&ray).expect("downward ray must hit");
        assert_eq!(point.x, 4.4);
        assert_eq!(point.z, 6.4);
        assert!((point.y - terrain.height(4.4, 6.4)).abs() < 1e-6);
        assert_eq!(tile, UVec2::new(2, 3));
        assert_eq!(terrain.pick_tile(&ray), Some(tile));
        assert_eq!(terrain.pick_point(&ray), Some(point));
    }

    #[test]
    fn pick_miss_is_none() {
        let terrain = ramp_terrain();
        let away = Ray {
            origin: Vec3::new(4.0, 50.0, 4.0),
            dir: Vec3::new(0.0, 1.0, 0.0),
        };
        assert!(terrain.pick(&away).is_none());
        assert!(terrain.pick_point(&away).is_none());
        assert!(terrain.pick_tile(&away).is_none());
    }

    #[test]
    fn path_query_through_the_facade() {
        let terrain = ramp_terrain();
        let path = terrain.find_path(UVec2::new(0, 0), UVec2::new(3, 3));
        assert_eq!(path.len(), 3);
        assert_eq!(*path.last().unwrap(), UVec2::new(3, 3));
    }

    #[test]
    fn progress_reports_are_ordered_and_finish_at_one() {
        struct Recording(Vec<(f32, String)>);
        impl ProgressSink for Recording {
            fn report(&mut self, fraction: f32, label: &str) {
                self.0.push((fraction, label.to_string()));
            }
        }

        let field = HeightField::from_samples(16, 16, vec![0.0; 256]);
        let mut sink = Recording(Vec::new());
        let _ = Terrain::new(field, 1.0, &mut sink);

        assert!(!sink.0.is_empty());
        let fractions: Vec<f32> = sink.0.iter().map(|(f, _)| *f).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*fractions.last().unwrap(), 1.0);
    }
}

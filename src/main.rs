// Demo driver: generate a random height field, build the terrain, then
// exercise the two query surfaces — a path query and a ray pick.
// Run with RUST_LOG=info for build milestones and query results.

mod engine;

use engine::{HeightField, ProgressSink, Ray, Terrain};
use glam::{UVec2, Vec3};

const FIELD_SIZE: u32 = 64;
const HILLS: u32 = 24;
const MAX_HEIGHT: f32 = 12.0;
const CELL_SPACING: f32 = 1.0;

/// Progress sink that forwards milestones to the log.
struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, fraction: f32, label: &str) {
        log::info!("build {:>3.0}% — {}", fraction * 100.0, label);
    }
}

fn main() {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let field = HeightField::generate(FIELD_SIZE, FIELD_SIZE, HILLS, MAX_HEIGHT, &mut rng);
    log::info!(
        "height field: {}x{} samples, peak {:.2}",
        field.width(),
        field.height(),
        field.max_height()
    );

    let start_time = std::time::Instant::now();
    let terrain = Terrain::new(field, CELL_SPACING, &mut LogProgress);
    log::info!(
        "terrain ready in {:.1?}: {:.0}x{:.0} world units",
        start_time.elapsed(),
        terrain.width(),
        terrain.depth()
    );

    // Path query between opposite corners of the tile grid. Hilly terrain
    // can leave the corners in different regions; an empty path is a valid
    // answer, not a failure.
    let grid = terrain.grid();
    let start = UVec2::new(0, 0);
    let goal = UVec2::new(grid.width() - 1, grid.height() - 1);
    let path = terrain.find_path(start, goal);
    if path.is_empty() {
        log::info!("no path from {:?} to {:?} (disjoint regions or blocked endpoint)", start, goal);
    } else {
        log::info!("path {:?} -> {:?}: {} steps", start, goal, path.len());
    }

    // Pick straight down at the middle of the terrain.
    let ray = Ray {
        origin: Vec3::new(terrain.width() * 0.5, MAX_HEIGHT * 2.0, terrain.depth() * 0.5),
        dir: Vec3::new(0.0, -1.0, 0.0),
    };
    match terrain.pick(&ray) {
        Some((point, tile)) => {
            log::info!("pick at center: tile {:?}, surface point {:.2?}", tile, point);
        }
        None => log::info!("pick at center missed the terrain volume"),
    }

    println!(
        "terrain {}x{} tiles, {} walkable, demo path {} steps",
        grid.width(),
        grid.height(),
        grid.tiles().iter().filter(|t| t.walkable).count(),
        path.len()
    );
}

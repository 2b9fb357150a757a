// Quadtree over the height field for terrain picking.
//
// The tree recursively quarters the field's index space until a region is
// smaller than one tile edge in both dimensions; each leaf references the
// tile at its region's center. Node boxes are padded outward by a fixed
// tolerance so adjoining nodes overlap slightly instead of leaving seams a
// ray could slip through. Box height is approximate — callers re-sample the
// terrain at the hit point instead of trusting the box intersection's y.

use super::grid::TILE_SIZE;
use super::heightfield::HeightField;
use glam::{UVec2, Vec3};

/// Outward padding applied to every node box, in world units.
const BOX_TOLERANCE: f32 = 0.01;

// ============================================================================
// RAY & BOX
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Axis-aligned box with a height range.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Slab test. Returns the entry distance along the ray, 0.0 when the
    /// origin is already inside, None on a miss.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_enter = 0.0_f32;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.dir[axis];
            if dir.abs() < 1e-8 {
                // Parallel to this slab: must already be between the planes.
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
            } else {
                let inv = 1.0 / dir;
                let mut t0 = (self.min[axis] - origin) * inv;
                let mut t1 = (self.max[axis] - origin) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_enter = t_enter.max(t0);
                t_exit = t_exit.min(t1);
                if t_enter > t_exit {
                    return None;
                }
            }
        }

        Some(t_enter)
    }
}

// ============================================================================
// QUADTREE
// ============================================================================

/// Either 4 children or a leaf's tile coordinate, never both.
struct Node {
    bounds: Aabb,
    children: Option<Box<[Node; 4]>>,
    tile: Option<UVec2>,
}

pub struct Quadtree {
    root: Node,
}

impl Quadtree {
    /// Build over the field's full index space `[0, w-1] x [0, h-1]`.
    pub fn build(field: &HeightField, cell_spacing: f32) -> Self {
        let root = build_node(field, cell_spacing, 0, 0, field.width() - 1, field.height() - 1);
        Self { root }
    }

    /// Nearest leaf the ray hits: entry distance plus the leaf's tile.
    /// A ray that misses the whole volume yields None.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, UVec2)> {
        intersect_node(&self.root, ray)
    }
}

fn build_node(field: &HeightField, cell_spacing: f32, x1: u32, z1: u32, x2: u32, z2: u32) -> Node {
    // Full scan of the sub-region for the height range; the box must bound
    // every sample the region covers.
    let mut min_h = f32::INFINITY;
    let mut max_h = f32::NEG_INFINITY;
    for row in z1..=z2 {
        for col in x1..=x2 {
            let h = field.sample(row, col);
            min_h = min_h.min(h);
            max_h = max_h.max(h);
        }
    }

    let pad = Vec3::splat(BOX_TOLERANCE);
    let bounds = Aabb {
        min: Vec3::new(x1 as f32 * cell_spacing, min_h, z1 as f32 * cell_spacing) - pad,
        max: Vec3::new(x2 as f32 * cell_spacing, max_h, z2 as f32 * cell_spacing) + pad,
    };

    if x2 - x1 < TILE_SIZE && z2 - z1 < TILE_SIZE {
        let center = UVec2::new((x1 + x2) / 2, (z1 + z2) / 2);
        return Node {
            bounds,
            children: None,
            tile: Some(center / TILE_SIZE),
        };
    }

    // Children share the midlines, which together with the box padding
    // gives the required overlap between siblings.
    let mx = (x1 + x2) / 2;
    let mz = (z1 + z2) / 2;
    let children = Box::new([
        build_node(field, cell_spacing, x1, z1, mx, mz),
        build_node(field, cell_spacing, mx, z1, x2, mz),
        build_node(field, cell_spacing, x1, mz, mx, z2),
        build_node(field, cell_spacing, mx, mz, x2, z2),
    ]);

    Node {
        bounds,
        children: Some(children),
        tile: None,
    }
}

fn intersect_node(node: &Node, ray: &Ray) -> Option<(f32, UVec2)> {
    let t = node.bounds.intersect(ray)?;

    let Some(children) = &node.children else {
        let tile = node.tile.expect("leaf node without a tile reference");
        return Some((t, tile));
    };

    let mut nearest: Option<(f32, UVec2)> = None;
    for child in children.iter() {
        if let Some(hit) = intersect_node(child, ray) {
            if nearest.is_none_or(|(best, _)| hit.0 < best) {
                nearest = Some(hit);
            }
        }
    }
    nearest
}

// ============================================================================
// TESTS
// ============================================================================

// Height field: dense raster of elevation samples.
//
// Storage is a flat row-major Vec<f32> indexed (row, col). The field is
// immutable once built; everything downstream (tile grid, quadtree) samples
// it read-only. `sample_continuous` is the one continuous height query the
// whole engine uses — its triangle split is load-bearing for slope behavior
// and must stay consistent between terrain queries and pick correction.

use rand::Rng;

// ============================================================================
// HEIGHT FIELD
// ============================================================================

pub struct HeightField {
    samples: Vec<f32>,
    width: u32,
    height: u32,
    max_height: f32,
}

impl HeightField {
    /// Wrap an existing raster. `samples.len()` must equal `width * height`.
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len(), (width * height) as usize);
        let max_height = samples.iter().copied().fold(0.0_f32, f32::max);
        Self {
            samples,
            width,
            height,
            max_height,
        }
    }

    /// Procedural generation by hill summation: drop `hills` random
    /// raised-cosine bumps onto a flat field, then rescale so the tallest
    /// sample equals `max_height`.
    pub fn generate(width: u32, height: u32, hills: u32, max_height: f32, rng: &mut impl Rng) -> Self {
        let mut samples = vec![0.0_f32; (width * height) as usize];

        for _ in 0..hills {
            let cx = rng.gen_range(0.0..width as f32);
            let cz = rng.gen_range(0.0..height as f32);
            let radius = rng.gen_range(width.min(height) as f32 * 0.1..width.min(height) as f32 * 0.4);
            let amplitude = rng.gen_range(0.2..1.0);

            for row in 0..height {
                for col in 0..width {
                    let dx = col as f32 - cx;
                    let dz = row as f32 - cz;
                    let d = (dx * dx + dz * dz).sqrt();
                    if d < radius {
                        // Raised cosine: amplitude at center, 0 at the rim.
                        let falloff = 0.5 * (1.0 + (std::f32::consts::PI * d / radius).cos());
                        samples[(row * width + col) as usize] += amplitude * falloff;
                    }
                }
            }
        }

        let peak = samples.iter().copied().fold(0.0_f32, f32::max);
        if peak > 0.0 {
            let scale = max_height / peak;
            for s in &mut samples {
                *s *= scale;
            }
        }

        Self::from_samples(width, height, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tallest sample in the field. 0.0 for an all-flat field.
    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Direct sample read. Callers validate indices (grid construction and
    /// the quadtree only ever pass in-range indices).
    #[inline]
    pub fn sample(&self, row: u32, col: u32) -> f32 {
        self.samples[(row * self.width + col) as usize]
    }

    /// Continuous height at fractional field coordinates.
    ///
    /// The cell around (col_f, row_f) is split along its diagonal: with
    /// fractions s (column) and t (row), `s + t <= 1` selects the triangle
    /// anchored at the cell's origin sample, otherwise the far triangle.
    /// At integer coordinates this returns the exact sample value.
    /// Coordinates past the last row/column clamp to the border sample.
    pub fn sample_continuous(&self, col_f: f32, row_f: f32) -> f32 {
        let col_f = col_f.clamp(0.0, (self.width - 1) as f32);
        let row_f = row_f.clamp(0.0, (self.height - 1) as f32);

        let col = col_f as u32;
        let row = row_f as u32;
        let s = col_f - col as f32;
        let t = row_f - row as f32;

        let col1 = (col + 1).min(self.width - 1);
        let row1 = (row + 1).min(self.height - 1);

        let h00 = self.sample(row, col);
        let h10 = self.sample(row, col1);
        let h01 = self.sample(row1, col);
        let h11 = self.sample(row1, col1);

        if s + t <= 1.0 {
            h00 + s * (h10 - h00) + t * (h01 - h00)
        } else {
            h11 + (1.0 - s) * (h01 - h11) + (1.0 - t) * (h10 - h11)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

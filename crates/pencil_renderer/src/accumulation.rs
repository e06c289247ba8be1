//! Progressive per-pixel accumulation.

use pencil_math::{Color, Vec4};

use crate::bucket::BucketResult;

/// Running radiance sums, one cell per pixel.
///
/// Each cell stores the summed radiance in `xyz` and the summed sample
/// weight in `w`.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    width: u32,
    height: u32,
    cells: Vec<Vec4>,
}

impl AccumulationBuffer {
    /// Create an empty buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec4::ZERO; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the raw cell at (x, y).
    pub fn cell(&self, x: u32, y: u32) -> Vec4 {
        self.cells[self.index(x, y)]
    }

    /// Add one radiance sample with unit weight.
    pub fn add_sample(&mut self, x: u32, y: u32, radiance: Color) {
        let idx = self.index(x, y);
        self.cells[idx] += radiance.extend(1.0);
    }

    /// Add every sample of a rendered bucket.
    pub fn add_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, radiance) in result.samples.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.add_sample(bucket.x + local_x, bucket.y + local_y, *radiance);
        }
    }

    /// Mean radiance at (x, y); black before the first sample.
    pub fn average(&self, x: u32, y: u32) -> Color {
        let cell = self.cell(x, y);
        if cell.w > 0.0 {
            cell.truncate() / cell.w
        } else {
            Color::ZERO
        }
    }

    /// Drop all accumulated samples.
    pub fn reset(&mut self) {
        self.cells.fill(Vec4::ZERO);
    }

    /// Cells in row-major order, row 0 at the top.
    pub fn cells(&self) -> &[Vec4] {
        &self.cells
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

//! Particle field geometry
//!
//! A field is a brick-pattern grid of points centered on the origin. Its
//! `x`/`y` coordinates are fixed at generation; only `z` and the per-vertex
//! color ratio change afterwards (see `tick::update_field`).

use crate::consts::NEUTRAL_COLOR_RATIO;

/// A vertex read back from a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color_ratio: f32,
}

/// Grid dimensions `(rows, cols)` for an area and spacing
pub fn grid_dims(area_w: f32, area_h: f32, spacing: f32) -> (usize, usize) {
    let usable = spacing > 0.0 && spacing.is_finite() && area_w.is_finite() && area_h.is_finite();
    if !usable {
        return (0, 0);
    }
    let rows = (area_h / spacing).ceil().max(0.0) as usize;
    let cols = (area_w / spacing).ceil().max(0.0) as usize;
    (rows, cols)
}

/// Point-cloud geometry plus per-vertex color blend
#[derive(Debug, Clone)]
pub struct ParticleField {
    /// Interleaved `x, y, z` (length `3 * len`)
    positions: Vec<f32>,
    /// Blend between color A (0) and color B (1)
    color_ratios: Vec<f32>,
    rows: usize,
    cols: usize,
    spacing: f32,
    generation: u64,
    disposed: bool,
}

impl ParticleField {
    /// Lay out `ceil(area_h / spacing)` rows of `ceil(area_w / spacing)`
    /// points. Odd rows shift by half a spacing on x.
    pub fn generate(area_w: f32, area_h: f32, spacing: f32, generation: u64) -> Self {
        let (rows, cols) = grid_dims(area_w, area_h, spacing);
        let count = rows * cols;

        let mut positions = Vec::with_capacity(count * 3);
        for row in 0..rows {
            let offset = (row % 2) as f32 * (spacing / 2.0);
            let y = -area_h / 2.0 + row as f32 * spacing;
            for col in 0..cols {
                let x = -area_w / 2.0 + col as f32 * spacing + offset;
                positions.extend_from_slice(&[x, y, 0.0]);
            }
        }

        Self {
            positions,
            color_ratios: vec![NEUTRAL_COLOR_RATIO; count],
            rows,
            cols,
            spacing,
            generation,
            disposed: false,
        }
    }

    /// Release the buffers. Further reads see an empty field and updates are
    /// skipped until a replacement is generated.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.positions = Vec::new();
        self.color_ratios = Vec::new();
        self.disposed = true;
        log::debug!(
            "Disposed field #{} ({}x{})",
            self.generation,
            self.rows,
            self.cols
        );
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Regeneration counter this field was built for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Vertex count
    pub fn len(&self) -> usize {
        self.color_ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.color_ratios.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn color_ratios(&self) -> &[f32] {
        &self.color_ratios
    }

    pub fn vertex(&self, index: usize) -> Option<Vertex> {
        let p = self.positions.get(index * 3..index * 3 + 3)?;
        Some(Vertex {
            x: p[0],
            y: p[1],
            z: p[2],
            color_ratio: self.color_ratios[index],
        })
    }

    /// Mutable buffers for the per-frame pass; `None` once disposed
    pub(crate) fn buffers_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        if self.disposed {
            return None;
        }
        Some((&mut self.positions, &mut self.color_ratios))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_counts() {
        let field = ParticleField::generate(10.0, 10.0, 1.0, 0);
        assert_eq!((field.rows(), field.cols()), (10, 10));
        assert_eq!(field.len(), 100);
        assert_eq!(field.positions().len(), 300);

        let field = ParticleField::generate(10.0, 10.0, 2.0, 1);
        assert_eq!((field.rows(), field.cols()), (5, 5));
        assert_eq!(field.len(), 25);
    }

    #[test]
    fn test_partial_cells_round_up() {
        let (rows, cols) = grid_dims(10.5, 3.2, 1.0);
        assert_eq!((rows, cols), (4, 11));
    }

    #[test]
    fn test_brick_offset() {
        let field = ParticleField::generate(10.0, 10.0, 2.0, 0);
        let row0 = field.vertex(0).unwrap();
        let row1 = field.vertex(field.cols()).unwrap();
        assert_eq!(row1.x - row0.x, 1.0);
        assert_eq!(row1.y - row0.y, 2.0);
        // Row 2 is back in line with row 0
        let row2 = field.vertex(2 * field.cols()).unwrap();
        assert_eq!(row2.x, row0.x);
    }

    #[test]
    fn test_centered_at_origin() {
        let field = ParticleField::generate(10.0, 6.0, 1.0, 0);
        let first = field.vertex(0).unwrap();
        assert_eq!((first.x, first.y), (-5.0, -3.0));
    }

    #[test]
    fn test_initial_depth_and_ratio() {
        let field = ParticleField::generate(4.0, 4.0, 0.5, 0);
        for i in 0..field.len() {
            let v = field.vertex(i).unwrap();
            assert_eq!(v.z, 0.0);
            assert_eq!(v.color_ratio, 0.5);
        }
    }

    #[test]
    fn test_dispose_releases_and_blocks_updates() {
        let mut field = ParticleField::generate(10.0, 10.0, 1.0, 3);
        field.dispose();
        assert!(field.is_disposed());
        assert!(field.is_empty());
        assert!(field.positions().is_empty());
        assert!(field.buffers_mut().is_none());
        assert!(field.vertex(0).is_none());

        // Idempotent
        field.dispose();
        assert!(field.is_disposed());
    }

    #[test]
    fn test_degenerate_spacing_gives_empty_field() {
        assert!(ParticleField::generate(10.0, 10.0, 0.0, 0).is_empty());
        assert!(ParticleField::generate(10.0, 10.0, -1.0, 0).is_empty());
        assert!(ParticleField::generate(f32::NAN, 10.0, 1.0, 0).is_empty());
        assert!(ParticleField::generate(10.0, 10.0, f32::NAN, 0).is_empty());
        assert!(ParticleField::generate(10.0, 10.0, f32::INFINITY, 0).is_empty());
        assert!(ParticleField::generate(10.0, f32::INFINITY, 1.0, 0).is_empty());
    }
}

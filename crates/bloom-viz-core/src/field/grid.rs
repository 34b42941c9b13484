//! Spatial energy field: a lattice of points that glow with
//! distance-weighted band energy, brightest at the center.
//!
//! Cell `(col, row)` sits on the lattice point `(col, row) * CELL_SIZE`.

use nannou::prelude::*;

use crate::audio::BandEnergies;
use crate::viewport::Viewport;

/// Lattice spacing in pixels
pub const CELL_SIZE: f32 = 20.0;

/// Applied to the summed band energies
const TARGET_GAIN: f32 = 0.5;
const BEAT_BOOST: f32 = 0.8;
const SMOOTHING: f32 = 0.1;
const DECAY: f32 = 0.95;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridCell {
    pub energy: f32,
    pub target: f32,
}

#[derive(Clone, Debug)]
pub struct EnergyGrid {
    cols: usize,
    rows: usize,
    cells: Vec<GridCell>,
    /// Normalized distance falloff per cell, fixed per viewport
    falloff: Vec<f32>,
    /// Highest cell energy after the last update
    peak: f32,
}

impl EnergyGrid {
    pub fn new(viewport: &Viewport) -> Self {
        let mut grid = Self {
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            falloff: Vec::new(),
            peak: 0.0,
        };
        grid.rebuild(viewport);
        grid
    }

    /// Throws away all cells and lays out a fresh grid for `viewport`.
    pub fn rebuild(&mut self, viewport: &Viewport) {
        self.cols = (viewport.width / CELL_SIZE).ceil() as usize;
        self.rows = (viewport.height / CELL_SIZE).ceil() as usize;
        self.cells = vec![GridCell::default(); self.cols * self.rows];
        self.peak = 0.0;

        let center = viewport.center();
        let max_dist = viewport.max_dim();
        let cols = self.cols;
        self.falloff = (0..self.rows)
            .flat_map(|row| (0..cols).map(move |col| (col, row)))
            .map(|(col, row)| {
                let d = Self::cell_point(col, row).distance(center);
                (1.0 - d / max_dist).max(0.0)
            })
            .collect();
    }

    /// Without bands only the beat boost drives the targets.
    pub fn update(&mut self, bands: Option<&BandEnergies>, beat: bool) {
        let level = bands.map_or(0.0, |b| b.bass + b.mid + b.treble);
        self.peak = 0.0;
        for (cell, &falloff) in self.cells.iter_mut().zip(self.falloff.iter()) {
            let mut target = level * falloff * TARGET_GAIN;
            if beat {
                target += BEAT_BOOST;
            }
            cell.target = target.min(1.0);
            cell.energy += (cell.target - cell.energy) * SMOOTHING;
            cell.energy *= DECAY;
            self.peak = self.peak.max(cell.energy);
        }
    }

    pub fn cell_point(col: usize, row: usize) -> Vec2 {
        vec2(col as f32 * CELL_SIZE, row as f32 * CELL_SIZE)
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<GridCell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Row-major index and lattice point of the cell nearest to `point`.
    pub fn nearest(&self, point: Vec2) -> Option<(usize, Vec2)> {
        let col = (point.x / CELL_SIZE).round();
        let row = (point.y / CELL_SIZE).round();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some((row * self.cols + col, Self::cell_point(col, row)))
    }

    /// Lattice point and energy of every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let col = i % self.cols.max(1);
            let row = i / self.cols.max(1);
            (Self::cell_point(col, row), cell.energy)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANDS: BandEnergies = BandEnergies {
        bass: 0.8,
        mid: 0.5,
        treble: 0.3,
    };

    #[test]
    fn test_rebuild_matches_viewport() {
        let mut grid = EnergyGrid::new(&Viewport::new(800.0, 600.0));
        assert_eq!(grid.dims(), (40, 30));

        grid.rebuild(&Viewport::new(1920.0, 1080.0));
        assert_eq!(grid.dims(), (96, 54));
        assert_eq!(grid.cells().count(), 96 * 54);
        assert!(grid.cells().all(|(_, e)| e == 0.0));
    }

    #[test]
    fn test_target_is_half_band_sum_scaled_by_distance() {
        let mut grid = EnergyGrid::new(&Viewport::new(800.0, 600.0));
        grid.update(Some(&BANDS), false);

        // Lattice point (400, 300) is the center: no falloff
        let center = grid.cell(20, 15).unwrap();
        assert!((center.target - 1.6 * 0.5).abs() < 1e-5);
        assert!((center.energy - 0.08 * 0.95).abs() < 1e-5);

        // (200, 100) is sqrt(2) * 200 from the center, over max(w, h) = 800
        let off = grid.cell(10, 5).unwrap();
        let falloff = 1.0 - (2.0f32).sqrt() * 200.0 / 800.0;
        assert!((off.target - 1.6 * falloff * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_beat_boost_and_missing_bands() {
        let mut grid = EnergyGrid::new(&Viewport::new(800.0, 600.0));
        grid.update(None, true);
        assert!(grid.cells.iter().all(|c| (c.target - 0.8).abs() < 1e-6));

        grid.update(None, false);
        assert!(grid.cells.iter().all(|c| c.target == 0.0));
    }

    #[test]
    fn test_center_cells_glow_brighter() {
        let mut grid = EnergyGrid::new(&Viewport::new(800.0, 600.0));
        for _ in 0..30 {
            grid.update(Some(&BANDS), false);
        }

        let energies: Vec<f32> = grid.cells().map(|(_, e)| e).collect();
        let corner = energies[0];
        let middle = energies[15 * 40 + 20];
        assert!(middle > corner);
        assert!(energies.iter().all(|&e| (0.0..=1.0).contains(&e)));
        assert_eq!(grid.peak(), middle);
    }

    #[test]
    fn test_nearest_snaps_to_lattice() {
        let grid = EnergyGrid::new(&Viewport::new(800.0, 600.0));
        let (index, point) = grid.nearest(vec2(409.0, 291.0)).unwrap();
        assert_eq!(point, vec2(400.0, 300.0));
        assert_eq!(index, 15 * 40 + 20);
        assert!(grid.nearest(vec2(-15.0, 10.0)).is_none());
        assert!(grid.nearest(vec2(2000.0, 10.0)).is_none());
    }
}

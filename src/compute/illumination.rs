//! Illuminance sampling over the room's sensor grid.
//!
//! Sample points sit at the centres of square cells of side `spacing`. The
//! cells are centred in the room, so the leftover `width mod spacing` is split
//! evenly between both walls.

use crate::schema::{Layout, RoomConfig, SensorGridConfig};

/// Per-cell illuminance accumulated from every powered fixture.
#[derive(Debug, Clone)]
pub struct IlluminationGrid {
    /// Cells along the room width.
    pub rows: usize,
    /// Cells along the room length.
    pub cols: usize,
    /// Row-major cell values (`row * cols + col`).
    pub cells: Vec<f64>,
}

/// Neighbour offsets (row, col) of the 8-connected neighbourhood.
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl IlluminationGrid {
    /// Project a layout onto the sensor grid of `room`.
    pub fn build(layout: &Layout, room: &RoomConfig, grid: &SensorGridConfig) -> Self {
        let (rows, cols) = grid_dims(room, grid);
        let mut cells = vec![0.0; rows * cols];

        for fixture in layout.powered() {
            let fx = f64::from(fixture.x());
            let fy = f64::from(fixture.y());
            let intensity = fixture.luminous_intensity();

            for row in 0..rows {
                for col in 0..cols {
                    let (px, py) = sample_point(room, grid, row, col);
                    let d = (px - fx).hypot(py - fy);
                    if d > grid.max_throw {
                        continue;
                    }
                    cells[row * cols + col] += if d < grid.near_field {
                        intensity
                    } else {
                        intensity / d
                    };
                }
            }
        }

        Self { rows, cols, cells }
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.cols + col]
    }

    /// Sum of all cell values.
    pub fn total_intensity(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Sum over every cell of the absolute differences with each existing
    /// 8-connected neighbour. Each neighbouring pair is counted from both sides.
    pub fn total_variation(&self) -> f64 {
        let mut variation = 0.0;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let v = self.get(row, col);
                for (dr, dc) in NEIGHBORS {
                    let (Some(r), Some(c)) =
                        (row.checked_add_signed(dr), col.checked_add_signed(dc))
                    else {
                        continue;
                    };
                    if r < self.rows && c < self.cols {
                        variation += (v - self.get(r, c)).abs();
                    }
                }
            }
        }
        variation
    }
}

/// Grid dimensions `(rows, cols)` for a room.
pub fn grid_dims(room: &RoomConfig, grid: &SensorGridConfig) -> (usize, usize) {
    let rows = (f64::from(room.width) / grid.spacing).floor() as usize;
    let cols = (f64::from(room.length) / grid.spacing).floor() as usize;
    (rows, cols)
}

/// Room coordinates of the sample point for cell `(row, col)`.
pub fn sample_point(
    room: &RoomConfig,
    grid: &SensorGridConfig,
    row: usize,
    col: usize,
) -> (f64, f64) {
    let offset_x = f64::from(room.width) % grid.spacing / 2.0;
    let offset_y = f64::from(room.length) % grid.spacing / 2.0;
    let half = grid.spacing / 2.0;
    (
        offset_x + row as f64 * grid.spacing + half,
        offset_y + col as f64 * grid.spacing + half,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Fixture;

    fn room(width: u32, length: u32) -> RoomConfig {
        RoomConfig { width, length }
    }

    #[test]
    fn test_grid_dims_and_offsets() {
        let grid = SensorGridConfig::default();
        assert_eq!(grid_dims(&room(96, 100), &grid), (8, 8));
        assert_eq!(grid_dims(&room(11, 11), &grid), (0, 0));

        // 100 mod 12 = 4, so the y offset is 2.
        let (px, py) = sample_point(&room(96, 100), &grid, 0, 0);
        assert!((px - 6.0).abs() < 1e-12);
        assert!((py - 8.0).abs() < 1e-12);

        let (px, _) = sample_point(&room(96, 100), &grid, 7, 0);
        assert!((px - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_near_field_uses_full_intensity() {
        let grid = SensorGridConfig::default();
        let layout = Layout::new(vec![Fixture::new(6, 6, 4, true)]);
        let illum = IlluminationGrid::build(&layout, &room(12, 12), &grid);

        assert_eq!((illum.rows, illum.cols), (1, 1));
        assert!((illum.get(0, 0) - 970.4033438).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_distance_falloff() {
        let grid = SensorGridConfig::default();
        // Sample point at (6, 6); fixture 10 units away.
        let layout = Layout::new(vec![Fixture::new(12, 14, 0, true)]);
        let illum = IlluminationGrid::build(&layout, &room(12, 12), &grid);

        assert!((illum.get(0, 0) - 167.9544249 / 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_throw_contributes_nothing() {
        let grid = SensorGridConfig::default();
        let layout = Layout::new(vec![Fixture::new(400, 400, 4, true)]);
        let illum = IlluminationGrid::build(&layout, &room(400, 400), &grid);

        // Cell (0, 0) is ~557 units away, far beyond the throw radius.
        assert_eq!(illum.get(0, 0), 0.0);
        assert!(illum.total_intensity() > 0.0);
    }

    #[test]
    fn test_off_fixtures_ignored() {
        let grid = SensorGridConfig::default();
        let layout = Layout::new(vec![Fixture::new(48, 48, 4, false)]);
        let illum = IlluminationGrid::build(&layout, &room(96, 96), &grid);

        assert_eq!(illum.total_intensity(), 0.0);
    }

    #[test]
    fn test_total_variation_neighbour_counts() {
        // 3x3 grid with a single lit centre: the centre sees 8 neighbours
        // differing by 1 and each border cell sees the centre once.
        let mut cells = vec![0.0; 9];
        cells[4] = 1.0;
        let grid = IlluminationGrid {
            rows: 3,
            cols: 3,
            cells,
        };
        assert!((grid.total_variation() - 16.0).abs() < 1e-12);

        // A lit corner has 3 neighbours.
        let mut cells = vec![0.0; 9];
        cells[0] = 1.0;
        let grid = IlluminationGrid {
            rows: 3,
            cols: 3,
            cells,
        };
        assert!((grid.total_variation() - 6.0).abs() < 1e-12);

        // A lit edge cell has 5 neighbours.
        let mut cells = vec![0.0; 9];
        cells[1] = 1.0;
        let grid = IlluminationGrid {
            rows: 3,
            cols: 3,
            cells,
        };
        assert!((grid.total_variation() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_grid_has_no_variation() {
        let grid = IlluminationGrid {
            rows: 4,
            cols: 5,
            cells: vec![3.5; 20],
        };
        assert_eq!(grid.total_variation(), 0.0);
        assert!((grid.total_intensity() - 70.0).abs() < 1e-12);
    }
}

use crate::grid::Grid;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Separable standing wave on a rectangular membrane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Membrane {
    pub amplitude: f64,
    pub kx: f64, // wavenumber along x (rad/m)
    pub ky: f64, // wavenumber along y (rad/m)
}

impl Default for Membrane {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            kx: 2.0 * PI,
            ky: 2.0 * PI,
        }
    }
}

impl Membrane {
    /// `Z(x, y, t) = A sin(kx x) sin(ky y) sin(2π f t)`
    pub fn displacement(&self, x: f64, y: f64, frequency: f64, t: f64) -> f64 {
        let omega = 2.0 * PI * frequency;
        self.amplitude * (self.kx * x).sin() * (self.ky * y).sin() * (omega * t).sin()
    }

    /// Field over `grid`, indexed `[[j, i]]` (row = y, column = x) like an image.
    pub fn field(&self, grid: &Grid, frequency: f64, t: f64) -> Array2<f64> {
        let mut z = Array2::<f64>::zeros((grid.ny, grid.nx));
        // The time factor is shared by every point
        let temporal = (2.0 * PI * frequency * t).sin();

        Zip::indexed(&mut z).par_for_each(|(j, i), value| {
            let x = grid.x_coord(i);
            let y = grid.y_coord(j);
            *value = self.amplitude * (self.kx * x).sin() * (self.ky * y).sin() * temporal;
        });
        z
    }

    /// Largest displacement the field can reach, for a fixed colour scale.
    pub fn peak(&self) -> f64 {
        self.amplitude.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> Grid {
        Grid::spanning(100, 100, (0.0, 1.0), (0.0, 1.0))
    }

    #[test]
    fn field_is_zero_at_start() {
        let membrane = Membrane::default();
        let z = membrane.field(&unit_grid(), 250.0, 0.0);
        assert!(z.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn nodal_lines_stay_still() {
        let membrane = Membrane::default();
        // x = 0.5 and y = 0.5 are nodes of sin(2π x)
        for t in [0.01, 0.1, 0.37] {
            for y in [0.1, 0.3, 0.9] {
                assert!(membrane.displacement(0.5, y, 3.0, t).abs() < 1e-12);
                assert!(membrane.displacement(y, 0.5, 3.0, t).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn grid_matches_pointwise_formula() {
        let membrane = Membrane::default();
        let grid = Grid::spanning(17, 11, (0.0, 1.0), (0.0, 1.0));
        let z = membrane.field(&grid, 1.0, 0.2);
        assert_eq!(z.dim(), (11, 17));
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let expected = membrane.displacement(grid.x_coord(i), grid.y_coord(j), 1.0, 0.2);
                assert!((z[[j, i]] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn antinode_reaches_amplitude() {
        let membrane = Membrane::default();
        // sin(2π · 1 · 0.25) = 1
        let z = membrane.displacement(0.25, 0.25, 1.0, 0.25);
        assert!((z - 1.0).abs() < 1e-12);
    }
}

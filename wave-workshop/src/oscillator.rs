use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainPositions {
    pub a: f64,
    pub c: f64,
    pub b: f64,
}

impl ChainPositions {
    pub fn springs(&self) -> [(f64, f64); 2] {
        [(self.a, self.c), (self.c, self.b)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Symmetric,
    Antisymmetric,
}

impl Mode {
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Symmetric => "Symmetric Mode (ψa = -ψb)",
            Mode::Antisymmetric => "Antisymmetric Mode (ψa = ψb)",
        }
    }
}

// Three-body chain a - c - b joined by two equal springs
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoupledOscillator {
    pub outer_mass: f64,  // m
    pub centre_mass: f64, // M
    pub stiffness: f64,   // k
    pub amplitude: f64,   // A
    pub equilibrium: [f64; 3], // a, c, b
}

impl Default for CoupledOscillator {
    fn default() -> Self {
        Self {
            outer_mass: 16.0,
            centre_mass: 12.0,
            stiffness: 1.0,
            amplitude: 0.2,
            equilibrium: [-1.0, 0.0, 1.0],
        }
    }
}

impl CoupledOscillator {
    /// `sqrt(k / m)`
    pub fn omega_symmetric(&self) -> f64 {
        (self.stiffness / self.outer_mass).sqrt()
    }

    /// `sqrt(k (2m + M) / (M m))`
    pub fn omega_antisymmetric(&self) -> f64 {
        let (m, big_m, k) = (self.outer_mass, self.centre_mass, self.stiffness);
        (k * (2.0 * m + big_m) / (big_m * m)).sqrt()
    }

    /// Centre/outer displacement ratio in the antisymmetric mode, from the
    /// outer body's force balance `(k - m ω²) x_a = k x_c`.
    pub fn centre_coefficient(&self) -> f64 {
        let omega_sq = self.omega_antisymmetric().powi(2);
        (self.stiffness - self.outer_mass * omega_sq) / self.stiffness
    }

    pub fn omega(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Symmetric => self.omega_symmetric(),
            Mode::Antisymmetric => self.omega_antisymmetric(),
        }
    }

    pub fn displacement(&self, mode: Mode, t: f64) -> f64 {
        self.amplitude * (self.omega(mode) * t).cos()
    }

    pub fn symmetric(&self, t: f64) -> ChainPositions {
        // Outer bodies mirror each other, the centre stays put
        let [a_eq, c_eq, b_eq] = self.equilibrium;
        let x = self.displacement(Mode::Symmetric, t);
        ChainPositions {
            a: a_eq + x,
            c: c_eq,
            b: b_eq - x,
        }
    }

    pub fn antisymmetric(&self, t: f64) -> ChainPositions {
        let [a_eq, c_eq, b_eq] = self.equilibrium;
        let x = self.displacement(Mode::Antisymmetric, t);
        ChainPositions {
            a: a_eq + x,
            c: c_eq + self.centre_coefficient() * x,
            b: b_eq + x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classroom_frequencies() {
        let osc = CoupledOscillator::default();
        assert!((osc.omega_symmetric() - 0.25).abs() < 1e-12);
        assert!((osc.omega_antisymmetric() - (44.0_f64 / 192.0).sqrt()).abs() < 1e-12);
        assert!((osc.centre_coefficient() + 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_mode_starts_at_full_amplitude() {
        let osc = CoupledOscillator::default();
        assert_eq!(osc.displacement(Mode::Symmetric, 0.0), osc.amplitude);
        let p = osc.symmetric(0.0);
        assert!((p.a - -0.8).abs() < 1e-12);
        assert_eq!(p.c, 0.0);
        assert!((p.b - 0.8).abs() < 1e-12);
    }

    #[test]
    fn symmetric_mode_is_mirror_image() {
        let osc = CoupledOscillator::default();
        for i in 0..50 {
            let p = osc.symmetric(i as f64 * 0.37);
            assert!((p.a + p.b).abs() < 1e-12);
        }
    }

    #[test]
    fn antisymmetric_outer_bodies_move_together() {
        let osc = CoupledOscillator::default();
        let p = osc.antisymmetric(1.3);
        assert!(((p.a + 1.0) - (p.b - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn springs_join_neighbours() {
        let p = ChainPositions { a: -1.0, c: 0.1, b: 0.9 };
        assert_eq!(p.springs(), [(-1.0, 0.1), (0.1, 0.9)]);
    }
}

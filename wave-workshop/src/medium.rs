use serde::{Deserialize, Serialize};

/// Homogeneous propagation medium.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    pub density: f64,     // kg/m³
    pub sound_speed: f64, // m/s
}

impl Medium {
    pub const AIR_DENSITY: f64 = 1.225;
    pub const AIR_SOUND_SPEED: f64 = 340.0;

    pub fn new(density: f64, sound_speed: f64) -> Self {
        Self { density, sound_speed }
    }

    /// Still air at sea level.
    pub fn air() -> Self {
        Self::new(Self::AIR_DENSITY, Self::AIR_SOUND_SPEED)
    }

    /// Medium whose speed is fixed by a wave's dispersion relation `c = ω / k`.
    pub fn from_dispersion(density: f64, omega: f64, wavenumber: f64) -> Self {
        Self::new(density, omega / wavenumber)
    }

    /// Characteristic acoustic impedance `Z = ρ c` (Pa·s/m).
    pub fn impedance(&self) -> f64 {
        self.density * self.sound_speed
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::air()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispersion_sets_speed() {
        let medium = Medium::from_dispersion(1.225, 1980.0, 6.0);
        assert!((medium.sound_speed - 330.0).abs() < 1e-12);
        assert!((medium.impedance() - 404.25).abs() < 1e-9);
    }

    #[test]
    fn air_defaults() {
        let air = Medium::default();
        assert_eq!(air.sound_speed, 340.0);
        assert_eq!(air.density, 1.225);
    }
}

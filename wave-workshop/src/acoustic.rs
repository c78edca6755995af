use crate::medium::Medium;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

const CM_PER_M: f64 = 100.0;

/// Traveling sinusoid `y(t, x) = A sin(ωt − kx)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneWave {
    pub amplitude: f64, // m
    pub omega: f64,     // rad/s
    pub wavenumber: f64, // rad/m
    pub density: f64,   // kg/m³
}

impl Default for PlaneWave {
    fn default() -> Self {
        Self {
            amplitude: 0.05 / CM_PER_M,
            omega: 1980.0,
            wavenumber: 6.0,
            density: Medium::AIR_DENSITY,
        }
    }
}

impl PlaneWave {
    /// Displacement in metres.
    pub fn displacement(&self, t: f64, x: f64) -> f64 {
        self.amplitude * (self.omega * t - self.wavenumber * x).sin()
    }

    pub fn displacement_cm(&self, t: f64, x: f64) -> f64 {
        self.displacement(t, x) * CM_PER_M
    }

    /// Waveform at time `t` over `xs`, in cm.
    pub fn profile_cm(&self, t: f64, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.displacement_cm(t, x)).collect()
    }

    pub fn medium(&self) -> Medium {
        Medium::from_dispersion(self.density, self.omega, self.wavenumber)
    }

    /// Phase speed `ω / k`.
    pub fn speed(&self) -> f64 {
        self.omega / self.wavenumber
    }

    pub fn frequency(&self) -> f64 {
        self.omega / (2.0 * PI)
    }

    pub fn wavelength(&self) -> f64 {
        2.0 * PI / self.wavenumber
    }

    /// Peak particle velocity `A ω`.
    pub fn particle_velocity_amplitude(&self) -> f64 {
        self.amplitude * self.omega
    }

    /// Peak pressure `ρ c ω A`.
    pub fn pressure_amplitude(&self) -> f64 {
        self.medium().impedance() * self.omega * self.amplitude
    }

    pub fn report(&self) -> WaveReport {
        WaveReport {
            frequency: self.frequency(),
            speed: self.speed(),
            wavelength: self.wavelength(),
            amplitude: self.amplitude,
            particle_velocity: self.particle_velocity_amplitude(),
            pressure: self.pressure_amplitude(),
        }
    }
}

/// Derived quantities printed before the plot opens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveReport {
    pub frequency: f64,
    pub speed: f64,
    pub wavelength: f64,
    pub amplitude: f64,
    pub particle_velocity: f64,
    pub pressure: f64,
}

impl fmt::Display for WaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frequency f = {:.2} Hz", self.frequency)?;
        writeln!(f, "Propagation speed v = {:.2} m/s", self.speed)?;
        writeln!(f, "Wavelength λ = {:.4} m", self.wavelength)?;
        writeln!(
            f,
            "Oscillation amplitude A = {} mm ({} cm)",
            self.amplitude * 1000.0,
            self.amplitude * CM_PER_M
        )?;
        writeln!(f, "Particle velocity amplitude u_amp = {:.2} m/s", self.particle_velocity)?;
        write!(f, "Pressure amplitude Δp = {:.2} Pa", self.pressure)
    }
}

/// What a slider change has to redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redraw {
    Nothing,
    /// Position moved: marker and readout only.
    Marker,
    /// Time moved: the whole waveform, marker and readout.
    Waveform,
}

/// One evaluated view of the wave: the curve, the probed point and its readout.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveView {
    pub t: f64,
    pub x: f64,
    pub xs: Vec<f64>,
    pub ys_cm: Vec<f64>,
    pub marker_cm: f64,
}

impl WaveView {
    pub fn evaluate(wave: &PlaneWave, xs: &[f64], t: f64, x: f64) -> Self {
        Self {
            t,
            x,
            xs: xs.to_vec(),
            ys_cm: wave.profile_cm(t, xs),
            marker_cm: wave.displacement_cm(t, x),
        }
    }

    pub fn readout(&self) -> String {
        format!("t={:.4}s, x={:.2}m, y={:.5} cm", self.t, self.x, self.marker_cm)
    }

    /// Applies new slider values, recomputing only what the change affects.
    pub fn update(&mut self, wave: &PlaneWave, t: f64, x: f64) -> Redraw {
        if t != self.t {
            self.t = t;
            self.x = x;
            self.ys_cm = wave.profile_cm(t, &self.xs);
            self.marker_cm = wave.displacement_cm(t, x);
            Redraw::Waveform
        } else if x != self.x {
            self.x = x;
            self.marker_cm = wave.displacement_cm(t, x);
            Redraw::Marker
        } else {
            Redraw::Nothing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::linspace;

    #[test]
    fn literal_displacement() {
        let wave = PlaneWave::default();
        let y = wave.displacement(0.001, 0.5);
        let expected = 0.0005 * (1.98_f64 - 3.0).sin();
        assert!((y - expected).abs() < 1e-15);
        assert!((y - -4.2605e-4).abs() < 1e-7);
    }

    #[test]
    fn derived_quantities() {
        let wave = PlaneWave::default();
        assert!((wave.speed() - 330.0).abs() < 1e-12);
        assert!((wave.frequency() - 315.1268).abs() < 1e-4);
        assert!((wave.wavelength() - 1.0471976).abs() < 1e-6);
        assert!((wave.particle_velocity_amplitude() - 0.99).abs() < 1e-12);
        assert!((wave.pressure_amplitude() - 400.2075).abs() < 1e-9);
    }

    #[test]
    fn report_formats_values() {
        let text = PlaneWave::default().report().to_string();
        assert!(text.contains("Frequency f = 315.13 Hz"));
        assert!(text.contains("Propagation speed v = 330.00 m/s"));
        assert!(text.contains("Wavelength λ = 1.0472 m"));
        assert!(text.contains("Pressure amplitude Δp = 400.2"));
    }

    #[test]
    fn moving_x_only_touches_marker() {
        let wave = PlaneWave::default();
        let xs = linspace(0.0, 2.0, 200);
        let mut view = WaveView::evaluate(&wave, &xs, 0.001, 0.5);
        let curve = view.ys_cm.clone();

        assert_eq!(view.update(&wave, 0.001, 1.25), Redraw::Marker);
        assert_eq!(view.ys_cm, curve);
        assert!((view.marker_cm - wave.displacement_cm(0.001, 1.25)).abs() < 1e-15);

        assert_eq!(view.update(&wave, 0.002, 1.25), Redraw::Waveform);
        assert_ne!(view.ys_cm, curve);
        assert_eq!(view.update(&wave, 0.002, 1.25), Redraw::Nothing);
    }

    #[test]
    fn readout_format() {
        let wave = PlaneWave::default();
        let view = WaveView::evaluate(&wave, &linspace(0.0, 2.0, 200), 0.001, 0.5);
        assert_eq!(view.readout(), "t=0.0010s, x=0.50m, y=-0.04261 cm");
    }
}

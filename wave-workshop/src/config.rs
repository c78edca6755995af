use crate::acoustic::PlaneWave;
use crate::doppler::{Scenario, View};
use crate::membrane::Membrane;
use crate::medium::Medium;
use crate::oscillator::CoupledOscillator;
use crate::slider::SliderEvent;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Output configuration shared by every scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Render one frame in every `render_every`
    #[serde(default = "default_render_every")]
    pub render_every: usize,
    /// How many progress lines a run logs
    #[serde(default = "default_report_period")]
    pub report_period: usize,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_fps() -> f64 {
    30.0
}

fn default_render_every() -> usize {
    1
}

fn default_report_period() -> usize {
    10
}

fn default_image_width() -> u32 {
    800
}

fn default_image_height() -> u32 {
    800
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            fps: default_fps(),
            render_every: default_render_every(),
            report_period: default_report_period(),
            image_width: default_image_width(),
            image_height: default_image_height(),
        }
    }
}

impl VisualizationConfig {
    fn validate(&self) -> Result<()> {
        if !(self.fps > 0.0) || !self.fps.is_finite() {
            return Err(anyhow!("fps must be positive, got {}", self.fps));
        }
        if self.render_every == 0 {
            return Err(anyhow!("render_every must be at least 1"));
        }
        if self.report_period == 0 {
            return Err(anyhow!("report_period must be at least 1"));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(anyhow!(
                "Image dimensions must be positive (width={}, height={})",
                self.image_width,
                self.image_height
            ));
        }
        Ok(())
    }
}

/// Three-body chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorConfig {
    pub outer_mass: f64,
    pub centre_mass: f64,
    pub stiffness: f64,
    pub amplitude: f64,
    /// Asked for on stdin when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<f64>,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        let model = CoupledOscillator::default();
        Self {
            outer_mass: model.outer_mass,
            centre_mass: model.centre_mass,
            stiffness: model.stiffness,
            amplitude: model.amplitude,
            total_time: None,
        }
    }
}

impl OscillatorConfig {
    fn validate(&self) -> Result<()> {
        if self.outer_mass <= 0.0 || self.centre_mass <= 0.0 || self.stiffness <= 0.0 {
            return Err(anyhow!(
                "Masses and stiffness must be positive (m={}, M={}, k={})",
                self.outer_mass,
                self.centre_mass,
                self.stiffness
            ));
        }
        if let Some(total) = self.total_time {
            if !(total > 0.0) || !total.is_finite() {
                return Err(anyhow!("oscillator total_time must be positive, got {}", total));
            }
        }
        Ok(())
    }

    pub fn model(&self) -> CoupledOscillator {
        CoupledOscillator {
            outer_mass: self.outer_mass,
            centre_mass: self.centre_mass,
            stiffness: self.stiffness,
            amplitude: self.amplitude,
            ..CoupledOscillator::default()
        }
    }
}

/// Rectangular membrane
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MembraneConfig {
    pub amplitude: f64,
    pub kx: f64,
    pub ky: f64,
    pub nx: usize,
    pub ny: usize,
    /// Length of one animation loop (s)
    pub duration: f64,
    /// Number of times the loop plays
    pub repeat: usize,
    /// Initial slider frequency (Hz)
    pub frequency: f64,
    pub events: Vec<SliderEvent>,
}

impl Default for MembraneConfig {
    fn default() -> Self {
        let model = Membrane::default();
        Self {
            amplitude: model.amplitude,
            kx: model.kx,
            ky: model.ky,
            nx: 100,
            ny: 100,
            duration: 1.0,
            repeat: 1,
            frequency: 1.0,
            events: Vec::new(),
        }
    }
}

impl MembraneConfig {
    fn validate(&self) -> Result<()> {
        if self.nx < 2 || self.ny < 2 {
            return Err(anyhow!("Membrane grid needs at least 2x2 points (nx={}, ny={})", self.nx, self.ny));
        }
        if !(self.duration > 0.0) {
            return Err(anyhow!("membrane duration must be positive, got {}", self.duration));
        }
        if self.repeat == 0 {
            return Err(anyhow!("membrane repeat must be at least 1"));
        }
        Ok(())
    }

    pub fn model(&self) -> Membrane {
        Membrane {
            amplitude: self.amplitude,
            kx: self.kx,
            ky: self.ky,
        }
    }
}

/// Plane acoustic wave
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcousticConfig {
    pub amplitude_cm: f64,
    pub omega: f64,
    pub wavenumber: f64,
    pub density: f64,
    pub domain_length: f64,
    pub samples: usize,
    /// Initial slider values
    pub time: f64,
    pub position: f64,
    pub time_events: Vec<SliderEvent>,
    pub position_events: Vec<SliderEvent>,
}

impl Default for AcousticConfig {
    fn default() -> Self {
        Self {
            amplitude_cm: 0.05,
            omega: 1980.0,
            wavenumber: 6.0,
            density: Medium::AIR_DENSITY,
            domain_length: 2.0,
            samples: 200,
            time: 0.001,
            position: 0.5,
            time_events: Vec::new(),
            position_events: Vec::new(),
        }
    }
}

impl AcousticConfig {
    fn validate(&self) -> Result<()> {
        if self.amplitude_cm <= 0.0 {
            return Err(anyhow!("amplitude_cm must be positive, got {}", self.amplitude_cm));
        }
        if self.omega <= 0.0 || self.wavenumber <= 0.0 || self.density <= 0.0 {
            return Err(anyhow!(
                "Wave parameters must be positive (omega={}, k={}, rho={})",
                self.omega,
                self.wavenumber,
                self.density
            ));
        }
        if self.samples < 2 || self.domain_length <= 0.0 {
            return Err(anyhow!(
                "Acoustic domain needs positive length and at least 2 samples (length={}, samples={})",
                self.domain_length,
                self.samples
            ));
        }
        Ok(())
    }

    pub fn model(&self) -> PlaneWave {
        PlaneWave {
            amplitude: self.amplitude_cm / 100.0,
            omega: self.omega,
            wavenumber: self.wavenumber,
            density: self.density,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub title: String,
    pub source_start: f64,
    pub receiver: f64,
}

impl From<&ScenarioConfig> for Scenario {
    fn from(cfg: &ScenarioConfig) -> Self {
        Scenario {
            title: cfg.title.clone(),
            source_start: cfg.source_start,
            receiver: cfg.receiver,
        }
    }
}

/// Moving source approaching a wall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DopplerConfig {
    pub sound_speed: f64,
    pub frequency: f64,
    pub wall: f64,
    /// Initial slider speed (m/s)
    pub speed: f64,
    pub dt: f64,
    pub max_frames: usize,
    pub arc_points: usize,
    /// Upper bound on live wavefronts per scenario
    pub capacity: usize,
    pub view_x_min: f64,
    pub view_height: f64,
    pub scenarios: Vec<ScenarioConfig>,
    pub events: Vec<SliderEvent>,
}

impl Default for DopplerConfig {
    fn default() -> Self {
        Self {
            sound_speed: Medium::AIR_SOUND_SPEED,
            frequency: 440.0,
            wall: 10.0,
            speed: 1.0,
            dt: 1.0 / 30.0,
            max_frames: 5000,
            arc_points: 50,
            capacity: 4096,
            view_x_min: -410.0,
            view_height: 5.0,
            scenarios: vec![
                ScenarioConfig {
                    title: "Case 1:\nReceiver between source and wall".to_string(),
                    source_start: -400.0,
                    receiver: 6.0,
                },
                ScenarioConfig {
                    title: "Case 2:\nSource between receiver and wall".to_string(),
                    source_start: -400.0,
                    receiver: 1.0,
                },
            ],
            events: Vec::new(),
        }
    }
}

impl DopplerConfig {
    fn validate(&self) -> Result<()> {
        if self.sound_speed <= 0.0 || self.frequency <= 0.0 {
            return Err(anyhow!(
                "sound_speed and frequency must be positive (c={}, f={})",
                self.sound_speed,
                self.frequency
            ));
        }
        if !(self.dt > 0.0) {
            return Err(anyhow!("doppler dt must be positive, got {}", self.dt));
        }
        if self.view_x_min >= self.wall + 1.0 {
            return Err(anyhow!(
                "view_x_min ({}) must lie left of the wall ({})",
                self.view_x_min,
                self.wall
            ));
        }
        if self.view_height <= 0.0 {
            return Err(anyhow!("view_height must be positive, got {}", self.view_height));
        }
        if self.arc_points < 2 {
            return Err(anyhow!("arc_points must be at least 2, got {}", self.arc_points));
        }
        if self.capacity == 0 {
            return Err(anyhow!("capacity must be at least 1"));
        }
        if self.scenarios.is_empty() {
            return Err(anyhow!("At least one doppler scenario must be defined"));
        }
        for s in &self.scenarios {
            if s.source_start >= self.wall {
                warn!(scenario = %s.title, "source starts at or past the wall, it will halt immediately");
            }
        }
        Ok(())
    }

    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }

    pub fn medium(&self) -> Medium {
        Medium::new(Medium::AIR_DENSITY, self.sound_speed)
    }

    pub fn view(&self) -> View {
        View {
            x_min: self.view_x_min,
            x_max: self.wall + 1.0,
            y_min: 0.0,
            y_max: self.view_height,
        }
    }
}

/// Complete workshop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub visualization: VisualizationConfig,
    #[serde(default)]
    pub oscillator: OscillatorConfig,
    #[serde(default)]
    pub membrane: MembraneConfig,
    #[serde(default)]
    pub acoustic: AcousticConfig,
    #[serde(default)]
    pub doppler: DopplerConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
        // Validate before returning
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.visualization.validate().context("[visualization]")?;
        self.oscillator.validate().context("[oscillator]")?;
        self.membrane.validate().context("[membrane]")?;
        self.acoustic.validate().context("[acoustic]")?;
        self.doppler.validate().context("[doppler]")?;
        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let vis = &self.visualization;
        println!("=== Workshop Configuration ===");
        println!(
            "Output: {} ({}x{} px, {} fps, every {} frame(s))",
            vis.output_dir, vis.image_width, vis.image_height, vis.fps, vis.render_every
        );
        let osc = &self.oscillator;
        let model = osc.model();
        println!(
            "Oscillator: m={}, M={}, k={}, A={} (ω_sym={:.4} rad/s, ω_anti={:.4} rad/s)",
            osc.outer_mass,
            osc.centre_mass,
            osc.stiffness,
            osc.amplitude,
            model.omega_symmetric(),
            model.omega_antisymmetric()
        );
        match osc.total_time {
            Some(t) => println!("  Total time: {} s", t),
            None => println!("  Total time: asked at start"),
        }
        let mem = &self.membrane;
        println!(
            "Membrane: {}x{} grid, A={}, kx={:.4}, ky={:.4}, f0={} Hz, {} s x{}",
            mem.nx, mem.ny, mem.amplitude, mem.kx, mem.ky, mem.frequency, mem.duration, mem.repeat
        );
        if !mem.events.is_empty() {
            println!("  Frequency events: {}", mem.events.len());
        }
        let ac = &self.acoustic;
        println!(
            "Acoustic: A={} cm, ω={} rad/s, k={} rad/m, ρ={} kg/m³, t0={} s, x0={} m",
            ac.amplitude_cm, ac.omega, ac.wavenumber, ac.density, ac.time, ac.position
        );
        let dop = &self.doppler;
        println!(
            "Doppler: c={} m/s, f={} Hz, wall at {} m, u0={} m/s, dt={:.4} s, max {} frames",
            dop.sound_speed, dop.frequency, dop.wall, dop.speed, dop.dt, dop.max_frames
        );
        for (i, s) in dop.scenarios.iter().enumerate() {
            println!(
                "  Scenario {}: source from {} m, receiver at {} m",
                i,
                s.source_start,
                s.receiver
            );
        }
        println!("==============================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_classroom_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.visualization.fps, 30.0);
        assert_eq!(config.oscillator.outer_mass, 16.0);
        assert!(config.oscillator.total_time.is_none());
        assert_eq!(config.membrane.nx, 100);
        assert_eq!(config.acoustic.omega, 1980.0);
        assert_eq!(config.doppler.scenarios.len(), 2);
        assert_eq!(config.doppler.scenarios[1].receiver, 1.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [doppler]
            speed = 4.5
            events = [{ frame = 30, value = 9.0 }]

            [membrane]
            frequency = 120.0
            "#,
        )
        .unwrap();
        assert_eq!(config.doppler.speed, 4.5);
        assert_eq!(config.doppler.frequency, 440.0);
        assert_eq!(config.doppler.events, vec![SliderEvent { frame: 30, value: 9.0 }]);
        assert_eq!(config.membrane.frequency, 120.0);
        assert_eq!(config.membrane.ny, 100);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = Config::from_toml("[visualization]\nfps = 0.0\n").unwrap_err();
        assert!(format!("{err:#}").contains("fps must be positive"));

        let err = Config::from_toml("[oscillator]\ntotal_time = -1.0\n").unwrap_err();
        assert!(format!("{err:#}").contains("total_time"));

        let err = Config::from_toml("[doppler]\nscenarios = []\n").unwrap_err();
        assert!(format!("{err:#}").contains("At least one doppler scenario"));
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[acoustic]\ntime = 0.005\nposition = 1.5").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.acoustic.time, 0.005);
        assert_eq!(config.acoustic.position, 1.5);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Config::from_file(Path::new("/nonexistent/workshop.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/workshop.toml"));
    }

    #[test]
    fn doppler_view_extends_past_wall() {
        let view = DopplerConfig::default().view();
        assert_eq!(view.x_min, -410.0);
        assert_eq!(view.x_max, 11.0);
        assert_eq!(view.y_max, 5.0);
    }
}

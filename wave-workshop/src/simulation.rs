use crate::acoustic::{PlaneWave, Redraw, WaveView};
use crate::config::{AcousticConfig, DopplerConfig, MembraneConfig};
use crate::doppler::{observed_frequency, Scenario, Track, View};
use crate::grid::{linspace, FrameClock, Grid};
use crate::membrane::Membrane;
use crate::medium::Medium;
use crate::oscillator::CoupledOscillator;
use crate::slider::{Slider, SliderError, Timeline};
use crate::visualisation::{ChainFrame, DopplerPanel, DrawResult, WavefieldVisualiser};
use ndarray::Array2;
use std::path::Path;
use tracing::{info, warn};

/// What the runner should do after a frame has been evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameOutcome {
    /// The frame differs from the last drawn one
    pub redraw: bool,
    /// No further frames should be evaluated
    pub halt: bool,
}

impl FrameOutcome {
    pub const CONTINUE: Self = Self { redraw: true, halt: false };
}

/// A frame-by-frame animation. Each call to `advance` evaluates one frame
/// from the scene's own state; sliders live inside the scene.
pub trait Scene {
    fn name(&self) -> &str;

    /// Upper bound on frames; a scene may halt earlier.
    fn frame_count(&self) -> usize;

    fn advance(&mut self, frame: usize) -> FrameOutcome;

    fn render(&self, visualiser: &WavefieldVisualiser, path: &Path) -> DrawResult;

    /// Simulation time of the last evaluated frame.
    fn time(&self) -> f64;

    /// Whether `render_every` thins the drawn frames. Scenes whose frames are
    /// slider changes rather than time steps draw every change.
    fn throttled(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub render_every: usize,
    /// How many progress lines to log over the run
    pub report_period: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { render_every: 1, report_period: 10 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub rendered: usize,
    pub failed: usize,
    pub halted: bool,
}

/// Drives `scene` to completion, drawing frames through `visualiser` when given.
pub fn run<S: Scene>(scene: &mut S, visualiser: Option<&WavefieldVisualiser>, options: RunOptions) -> RunSummary {
    let total = scene.frame_count();
    let render_every = options.render_every.max(1);
    let report_every = (total / options.report_period.max(1)).max(1);

    info!("Starting {} ({} frames max)", scene.name(), total);
    if let Some(vis) = visualiser {
        info!("Rendering every {} frame(s) to {}", render_every, vis.output_dir().display());
    }

    let mut summary = RunSummary::default();
    for frame in 0..total {
        let outcome = scene.advance(frame);
        summary.frames += 1;

        // The last frame before a halt is always drawn
        let due = !scene.throttled() || frame % render_every == 0 || outcome.halt;
        if let Some(vis) = visualiser.filter(|_| outcome.redraw && due) {
            match render_frame(scene, vis, frame) {
                Ok(()) => summary.rendered += 1,
                Err(e) => {
                    warn!("Failed to render {} frame {}: {}", scene.name(), frame, e);
                    summary.failed += 1;
                }
            }
        }

        if frame % report_every == 0 {
            info!("Frame {}/{} (t={:.4}s)", frame, total, scene.time());
        }

        if outcome.halt {
            info!("{} halted at frame {} (t={:.3}s)", scene.name(), frame, scene.time());
            summary.halted = true;
            break;
        }
    }

    info!(
        "{} complete: {} frame(s) evaluated, {} rendered",
        scene.name(),
        summary.frames,
        summary.rendered
    );
    summary
}

fn render_frame<S: Scene>(scene: &S, vis: &WavefieldVisualiser, frame: usize) -> DrawResult {
    let path = vis.frame_path(scene.name(), frame)?;
    scene.render(vis, &path)
}

// Coupled oscillator

pub struct OscillatorScene {
    model: CoupledOscillator,
    times: Vec<f64>,
    current: ChainFrame,
}

impl OscillatorScene {
    /// `floor(total_time * fps)` frames spread over `[0, total_time]`.
    pub fn new(model: CoupledOscillator, total_time: f64, fps: f64) -> Self {
        let clock = FrameClock::for_duration(total_time, fps);
        let current = ChainFrame {
            t: 0.0,
            symmetric: model.symmetric(0.0),
            antisymmetric: model.antisymmetric(0.0),
        };
        Self {
            model,
            times: clock.sample_times(total_time),
            current,
        }
    }

    pub fn current(&self) -> &ChainFrame {
        &self.current
    }
}

impl Scene for OscillatorScene {
    fn name(&self) -> &str {
        "oscillator"
    }

    fn frame_count(&self) -> usize {
        self.times.len()
    }

    fn advance(&mut self, frame: usize) -> FrameOutcome {
        let t = self.times[frame];
        self.current = ChainFrame {
            t,
            symmetric: self.model.symmetric(t),
            antisymmetric: self.model.antisymmetric(t),
        };
        FrameOutcome::CONTINUE
    }

    fn render(&self, visualiser: &WavefieldVisualiser, path: &Path) -> DrawResult {
        visualiser.plot_chain(path, &self.current)
    }

    fn time(&self) -> f64 {
        self.current.t
    }
}

// Membrane

pub struct MembraneScene {
    model: Membrane,
    grid: Grid,
    clock: FrameClock,
    repeat: usize,
    frequency: Slider,
    timeline: Timeline,
    t: f64,
    field: Array2<f64>,
}

impl MembraneScene {
    pub fn from_config(cfg: &MembraneConfig, fps: f64) -> Result<Self, SliderError> {
        let frequency = Slider::new("Frequency (Hz)", -500.0, 500.0, 1.0, cfg.frequency)?;
        let grid = Grid::spanning(cfg.nx, cfg.ny, (0.0, 1.0), (0.0, 1.0));
        Ok(Self {
            model: cfg.model(),
            field: Array2::zeros((grid.ny, grid.nx)),
            grid,
            clock: FrameClock::for_duration(cfg.duration, fps),
            repeat: cfg.repeat,
            frequency,
            timeline: Timeline::new(cfg.events.clone()),
            t: 0.0,
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency.value()
    }

    pub fn field(&self) -> &Array2<f64> {
        &self.field
    }

    pub fn readout(&self) -> String {
        format!("Frequency: {:.1} Hz", self.frequency.value())
    }
}

impl Scene for MembraneScene {
    fn name(&self) -> &str {
        "membrane"
    }

    fn frame_count(&self) -> usize {
        self.clock.frames * self.repeat
    }

    fn advance(&mut self, frame: usize) -> FrameOutcome {
        if self.timeline.apply_until(frame, &mut self.frequency) {
            info!("{}", self.readout());
        }
        // The loop restarts its clock on every repeat
        self.t = self.clock.time(frame % self.clock.frames.max(1));
        self.field = self.model.field(&self.grid, self.frequency.value(), self.t);
        FrameOutcome::CONTINUE
    }

    fn render(&self, visualiser: &WavefieldVisualiser, path: &Path) -> DrawResult {
        visualiser.plot_field(
            path,
            &self.field,
            &self.grid,
            self.model.peak(),
            "2D Membrane Vibration",
            &self.readout(),
        )
    }

    fn time(&self) -> f64 {
        self.t
    }
}

// Acoustic wave

pub struct AcousticScene {
    wave: PlaneWave,
    time: Slider,
    position: Slider,
    time_events: Timeline,
    position_events: Timeline,
    view: WaveView,
    steps: usize,
}

impl AcousticScene {
    pub fn from_config(cfg: &AcousticConfig) -> Result<Self, SliderError> {
        let wave = cfg.model();
        let time = Slider::new("t (s)", 0.0, 0.01, 0.0001, cfg.time)?;
        let position = Slider::new("x (m)", 0.0, cfg.domain_length, 0.01, cfg.position)?;
        let xs = linspace(0.0, cfg.domain_length, cfg.samples);
        let view = WaveView::evaluate(&wave, &xs, time.value(), position.value());

        let time_events = Timeline::new(cfg.time_events.clone());
        let position_events = Timeline::new(cfg.position_events.clone());
        // One step for the initial figure plus one per scripted frame
        let last_event = time_events
            .events()
            .iter()
            .chain(position_events.events())
            .map(|e| e.frame)
            .max();
        let steps = last_event.map_or(1, |f| f + 1);

        Ok(Self {
            wave,
            time,
            position,
            time_events,
            position_events,
            view,
            steps,
        })
    }

    pub fn wave(&self) -> &PlaneWave {
        &self.wave
    }

    pub fn view(&self) -> &WaveView {
        &self.view
    }

    /// Fixed y limit so the curve keeps its scale across redraws.
    pub fn y_limit_cm(&self) -> f64 {
        self.wave.amplitude * 100.0
    }
}

impl Scene for AcousticScene {
    fn name(&self) -> &str {
        "acoustic"
    }

    fn frame_count(&self) -> usize {
        self.steps
    }

    fn advance(&mut self, frame: usize) -> FrameOutcome {
        self.time_events.apply_until(frame, &mut self.time);
        self.position_events.apply_until(frame, &mut self.position);

        let redraw = self.view.update(&self.wave, self.time.value(), self.position.value());
        if redraw != Redraw::Nothing {
            info!("{}", self.view.readout());
        }
        FrameOutcome {
            redraw: frame == 0 || redraw != Redraw::Nothing,
            halt: false,
        }
    }

    fn render(&self, visualiser: &WavefieldVisualiser, path: &Path) -> DrawResult {
        visualiser.plot_wave(path, &self.view, self.y_limit_cm())
    }

    fn time(&self) -> f64 {
        self.view.t
    }

    fn throttled(&self) -> bool {
        false
    }
}

// Doppler wavefronts

pub struct DopplerScene {
    medium: Medium,
    frequency: f64,
    wall: f64,
    dt: f64,
    max_frames: usize,
    arc_points: usize,
    view: View,
    speed: Slider,
    timeline: Timeline,
    tracks: Vec<Track>,
    t: f64,
}

impl DopplerScene {
    pub fn from_config(cfg: &DopplerConfig) -> Result<Self, SliderError> {
        let speed = Slider::new("Speed u (m/s)", 0.0, 10.0, 0.1, cfg.speed)?;
        let tracks = cfg
            .scenarios
            .iter()
            .map(|s| Track::new(Scenario::from(s), cfg.period(), cfg.capacity))
            .collect();
        Ok(Self {
            medium: cfg.medium(),
            frequency: cfg.frequency,
            wall: cfg.wall,
            dt: cfg.dt,
            max_frames: cfg.max_frames,
            arc_points: cfg.arc_points,
            view: cfg.view(),
            speed,
            timeline: Timeline::new(cfg.events.clone()),
            tracks,
            t: 0.0,
        })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn speed(&self) -> f64 {
        self.speed.value()
    }

    pub fn readout(&self, track: &Track) -> String {
        let heard = observed_frequency(
            self.frequency,
            self.medium.sound_speed,
            self.speed.value(),
            track.source_x(),
            track.scenario.receiver,
        );
        format!(
            "t={:.3}s, u={:.1} m/s, f'={:.1} Hz",
            self.t,
            self.speed.value(),
            heard
        )
    }

    pub fn panels(&self) -> Vec<DopplerPanel> {
        self.tracks
            .iter()
            .map(|track| DopplerPanel {
                title: track.scenario.title.clone(),
                receiver: track.scenario.receiver,
                source_x: track.source_x(),
                wall: self.wall,
                arcs: track.arcs(self.medium.sound_speed, self.t, self.arc_points),
                readout: self.readout(track),
            })
            .collect()
    }
}

impl Scene for DopplerScene {
    fn name(&self) -> &str {
        "doppler"
    }

    fn frame_count(&self) -> usize {
        self.max_frames
    }

    fn advance(&mut self, frame: usize) -> FrameOutcome {
        self.timeline.apply_until(frame, &mut self.speed);
        self.t = frame as f64 * self.dt;

        let u = self.speed.value();
        for track in &mut self.tracks {
            track.advance(self.t, u, &self.medium, &self.view);
        }

        FrameOutcome {
            redraw: true,
            halt: self.tracks.iter().all(|track| track.reached(self.wall)),
        }
    }

    fn render(&self, visualiser: &WavefieldVisualiser, path: &Path) -> DrawResult {
        visualiser.plot_wavefronts(path, &self.panels(), &self.view)
    }

    fn time(&self) -> f64 {
        self.t
    }
}

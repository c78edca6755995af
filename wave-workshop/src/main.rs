use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wave_workshop::config::Config;
use wave_workshop::prompt;
use wave_workshop::simulation::{self, AcousticScene, DopplerScene, MembraneScene, OscillatorScene, RunOptions, Scene};
use wave_workshop::visualisation::WavefieldVisualiser;

/// Animated wave and oscillation demonstrations.
///
/// Frames are written as PNG files under the output directory, one
/// sub-directory per scene. Join them into a video with e.g.
/// `ffmpeg -framerate 30 -pattern_type glob -i 'output/doppler/*.png' doppler.mp4`.
#[derive(Parser, Debug)]
#[command(name = "wave-workshop", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', env = "WAVE_WORKSHOP_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for rendered frames
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Render one frame in every N
    #[arg(long)]
    render_every: Option<usize>,

    /// Evaluate the scene without drawing any frame
    #[arg(long)]
    no_render: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normal modes of a three-body mass-spring chain
    Oscillator {
        /// Total simulation time in seconds (asked for when omitted)
        #[arg(long, short = 't')]
        total_time: Option<f64>,
    },
    /// Standing wave on a square membrane
    Membrane {
        /// Initial slider frequency in Hz
        #[arg(long, short = 'f', allow_hyphen_values = true)]
        frequency: Option<f64>,
    },
    /// Traveling acoustic plane wave
    Acoustic {
        /// Initial time slider value in seconds
        #[arg(long)]
        time: Option<f64>,
        /// Initial position slider value in metres
        #[arg(long)]
        position: Option<f64>,
    },
    /// Wavefronts of a moving source approaching a wall
    Doppler {
        /// Initial source speed in m/s
        #[arg(long, short = 'u')]
        speed: Option<f64>,
        /// Stop after this many frames even if the wall isn't reached
        #[arg(long)]
        max_frames: Option<usize>,
    },
    /// Print the effective configuration
    Summary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.output {
        config.visualization.output_dir = dir.display().to_string();
    }
    if let Some(n) = cli.render_every {
        config.visualization.render_every = n;
    }

    match cli.command {
        Command::Oscillator { total_time } => {
            if total_time.is_some() {
                config.oscillator.total_time = total_time;
            }
            config.validate()?;
            let total_time = match config.oscillator.total_time {
                Some(t) => t,
                None => prompt::ask_total_time().context("Could not read the total simulation time")?,
            };
            let mut scene = OscillatorScene::new(config.oscillator.model(), total_time, config.visualization.fps);
            animate(&mut scene, &config, cli.no_render)
        }
        Command::Membrane { frequency } => {
            if let Some(f) = frequency {
                config.membrane.frequency = f;
            }
            config.validate()?;
            let mut scene = MembraneScene::from_config(&config.membrane, config.visualization.fps)?;
            info!("{}", scene.readout());
            animate(&mut scene, &config, cli.no_render)
        }
        Command::Acoustic { time, position } => {
            if let Some(t) = time {
                config.acoustic.time = t;
            }
            if let Some(x) = position {
                config.acoustic.position = x;
            }
            config.validate()?;
            let mut scene = AcousticScene::from_config(&config.acoustic)?;
            println!("{}", scene.wave().report());
            animate(&mut scene, &config, cli.no_render)
        }
        Command::Doppler { speed, max_frames } => {
            if let Some(u) = speed {
                config.doppler.speed = u;
            }
            if let Some(n) = max_frames {
                config.doppler.max_frames = n;
            }
            config.validate()?;
            let mut scene = DopplerScene::from_config(&config.doppler)?;
            animate(&mut scene, &config, cli.no_render)
        }
        Command::Summary => {
            config.validate()?;
            config.print_summary();
            Ok(())
        }
    }
}

fn animate<S: Scene>(scene: &mut S, config: &Config, no_render: bool) -> Result<()> {
    let vis = &config.visualization;
    let visualiser = if no_render {
        None
    } else {
        Some(WavefieldVisualiser::new(
            PathBuf::from(&vis.output_dir).as_path(),
            vis.image_width,
            vis.image_height,
        )?)
    };

    let options = RunOptions {
        render_every: vis.render_every,
        report_period: vis.report_period,
    };
    let summary = simulation::run(scene, visualiser.as_ref(), options);
    if summary.failed > 0 {
        anyhow::bail!("{} of {} frame(s) failed to render", summary.failed, summary.frames);
    }
    if visualiser.is_some() {
        println!("Frames saved to {}/{}", vis.output_dir, scene.name());
    }
    Ok(())
}

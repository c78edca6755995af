use crate::acoustic::WaveView;
use crate::doppler::View;
use crate::grid::Grid;
use crate::oscillator::{ChainPositions, Mode};
use anyhow::{Context, Result};
use ndarray::Array2;
use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::debug;

pub type DrawResult = std::result::Result<(), Box<dyn Error>>;

const BODY_RADIUS: i32 = 8;
const WALL_DASHES: usize = 20;

/// Both normal modes at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainFrame {
    pub t: f64,
    pub symmetric: ChainPositions,
    pub antisymmetric: ChainPositions,
}

/// One Doppler scenario as drawn in its own panel.
#[derive(Clone, Debug, PartialEq)]
pub struct DopplerPanel {
    pub title: String,
    pub receiver: f64,
    pub source_x: f64,
    pub wall: f64,
    pub arcs: Vec<Vec<(f64, f64)>>,
    pub readout: String,
}

pub struct WavefieldVisualiser {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    // Store as a boxed trait object
    gradient: Box<dyn colorgrad::Gradient>,
}

impl WavefieldVisualiser {
    pub fn new(output_dir: &Path, width: u32, height: u32) -> Result<Self> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

        let gradient = Box::new(colorgrad::preset::viridis());

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            width,
            height,
            gradient,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `{output}/{scene}/{scene}_{frame:06}.png`, creating the scene directory.
    pub fn frame_path(&self, scene: &str, frame: usize) -> Result<PathBuf> {
        let dir = self.output_dir.join(scene);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create frame directory '{}'", dir.display()))?;
        Ok(dir.join(format!("{}_{:06}.png", scene, frame)))
    }

    pub fn plot_chain(&self, path: &Path, frame: &ChainFrame) -> DrawResult {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((2, 1));

        let modes = [
            (Mode::Symmetric, frame.symmetric, RED, BLACK),
            (Mode::Antisymmetric, frame.antisymmetric, BLUE, GREEN),
        ];
        for (area, (mode, pos, outer, centre)) in panels.iter().zip(modes) {
            let mut chart = ChartBuilder::on(area)
                .caption(mode.title(), ("sans-serif", 22))
                .margin(10)
                .x_label_area_size(35)
                .y_label_area_size(40)
                .build_cartesian_2d(-2.0..2.0, -0.5..0.5)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("Position")
                .draw()?;

            for (from, to) in pos.springs() {
                chart.draw_series(LineSeries::new(vec![(from, 0.0), (to, 0.0)], &BLACK))?;
            }
            chart.draw_series([
                Circle::new((pos.a, 0.0), BODY_RADIUS, outer.filled()),
                Circle::new((pos.c, 0.0), BODY_RADIUS, centre.filled()),
                Circle::new((pos.b, 0.0), BODY_RADIUS, outer.filled()),
            ])?;
            chart.draw_series(std::iter::once(Text::new(
                format!("t={:.2}s", frame.t),
                (-1.9, 0.42),
                ("sans-serif", 16),
            )))?;
        }

        root.present()?;
        debug!("Saved frame: {}", path.display());
        Ok(())
    }

    pub fn plot_field(
        &self,
        path: &Path,
        data: &Array2<f64>,
        grid: &Grid,
        peak: f64,
        title: &str,
        readout: &str,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (body, footer) = root.split_vertically(self.height.saturating_sub(50));

        let (ny, nx) = data.dim();
        let (x0, x1) = grid.x_range();
        let (y0, y1) = grid.y_range();
        let cell_w = (x1 - x0) / nx as f64;
        let cell_h = (y1 - y0) / ny as f64;

        let mut chart = ChartBuilder::on(&body)
            .caption(title, ("sans-serif", 26))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        chart.configure_mesh().disable_mesh().x_desc("X").y_desc("Y").draw()?;

        // Fixed symmetric scale so the colours don't flicker between frames
        chart.draw_series(data.indexed_iter().map(|((j, i), &value)| {
            let x = x0 + i as f64 * cell_w;
            let y = y0 + j as f64 * cell_h;
            let color = self.value_to_color(value, -peak, peak);
            Rectangle::new([(x, y), (x + cell_w, y + cell_h)], color.filled())
        }))?;

        footer.draw(&Text::new(
            readout.to_string(),
            ((self.width / 2) as i32 - 80, 15),
            ("sans-serif", 18),
        ))?;

        root.present()?;
        debug!("Saved frame: {}", path.display());
        Ok(())
    }

    pub fn plot_wave(&self, path: &Path, view: &WaveView, y_limit_cm: f64) -> DrawResult {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let x_max = view.xs.last().copied().unwrap_or(1.0);
        let x_min = view.xs.first().copied().unwrap_or(0.0);
        let mut chart = ChartBuilder::on(&root)
            .caption("Acoustic Wave", ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, -y_limit_cm..y_limit_cm)?;

        chart.configure_mesh().x_desc("x (m)").y_desc("y (cm)").draw()?;

        chart
            .draw_series(LineSeries::new(
                view.xs.iter().copied().zip(view.ys_cm.iter().copied()),
                &BLUE,
            ))?
            .label("Wave")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .draw_series(std::iter::once(Circle::new((view.x, view.marker_cm), 5, RED.filled())))?
            .label("Point (x,t)")
            .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.filled()));

        chart.draw_series(std::iter::once(Text::new(
            view.readout(),
            (x_min + 0.3 * (x_max - x_min), 0.85 * y_limit_cm),
            ("sans-serif", 18),
        )))?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        debug!("Saved frame: {}", path.display());
        Ok(())
    }

    pub fn plot_wavefronts(&self, path: &Path, panels: &[DopplerPanel], view: &View) -> DrawResult {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let areas = root.split_evenly((1, panels.len().max(1)));

        for (area, panel) in areas.iter().zip(panels) {
            let mut chart = ChartBuilder::on(area)
                .caption(panel.title.replace('\n', " "), ("sans-serif", 18))
                .margin(10)
                .x_label_area_size(35)
                .y_label_area_size(35)
                .build_cartesian_2d(view.x_min..view.x_max, view.y_min..view.y_max)?;

            chart.configure_mesh().x_desc("x (m)").y_desc("y (m)").draw()?;

            for arc in &panel.arcs {
                chart.draw_series(LineSeries::new(arc.iter().copied(), &BLACK))?;
            }

            chart
                .draw_series(std::iter::once(Circle::new((panel.receiver, 0.0), 5, RED.filled())))?
                .label("Receiver")
                .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.filled()));
            chart
                .draw_series(std::iter::once(Circle::new((panel.source_x, 0.0), 5, GREEN.filled())))?
                .label("Source")
                .legend(|(x, y)| Circle::new((x + 10, y), 4, GREEN.filled()));
            chart
                .draw_series((0..WALL_DASHES).step_by(2).map(|k| {
                    let dash = (view.y_max - view.y_min) / WALL_DASHES as f64;
                    let y = view.y_min + k as f64 * dash;
                    PathElement::new(vec![(panel.wall, y), (panel.wall, y + dash)], BLUE)
                }))?
                .label("Wall")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

            let span = view.x_max - view.x_min;
            let height = view.y_max - view.y_min;
            chart.draw_series(std::iter::once(Text::new(
                panel.readout.clone(),
                (view.x_min + 0.05 * span, view.y_min + 0.92 * height),
                ("sans-serif", 14),
            )))?;

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        debug!("Saved frame: {}", path.display());
        Ok(())
    }

    fn value_to_color(&self, value: f64, min_val: f64, max_val: f64) -> RGBColor {
        let normalized = if max_val > min_val {
            (value - min_val) / (max_val - min_val)
        } else {
            0.5
        };
        let normalized = normalized.clamp(0.0, 1.0);
        let color_rgba = self.gradient.at(normalized as f32).to_rgba8();
        RGBColor(color_rgba[0], color_rgba[1], color_rgba[2])
    }
}

/// `n` evenly spaced samples over `[start, stop]`, endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            // Pin the last sample so it is exactly `stop`
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Uniform 2D grid over `[x0, x0 + width] x [y0, y0 + height]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub nx: usize, // Number of points in x direction
    pub ny: usize, // Number of points in y direction
    pub x0: f64,
    pub y0: f64,
    pub dx: f64, // Grid spacing in x (meters)
    pub dy: f64, // Grid spacing in y (meters)
}

impl Grid {
    pub fn new(nx: usize, ny: usize, x0: f64, y0: f64, dx: f64, dy: f64) -> Self {
        Grid { nx, ny, x0, y0, dx, dy }
    }

    /// Grid of `nx` x `ny` points spanning the given extents, endpoints included.
    pub fn spanning(nx: usize, ny: usize, (x_min, x_max): (f64, f64), (y_min, y_max): (f64, f64)) -> Self {
        let dx = if nx > 1 { (x_max - x_min) / (nx - 1) as f64 } else { 0.0 };
        let dy = if ny > 1 { (y_max - y_min) / (ny - 1) as f64 } else { 0.0 };
        Grid::new(nx, ny, x_min, y_min, dx, dy)
    }

    pub fn x_coord(&self, i: usize) -> f64 {
        // Convert grid index i to physical x coordinate
        self.x0 + self.dx * (i as f64)
    }

    pub fn y_coord(&self, j: usize) -> f64 {
        self.y0 + self.dy * (j as f64)
    }

    pub fn width(&self) -> f64 {
        // Total width of domain in x direction
        self.nx.saturating_sub(1) as f64 * self.dx
    }

    pub fn height(&self) -> f64 {
        self.ny.saturating_sub(1) as f64 * self.dy
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x0, self.x0 + self.width())
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.y0, self.y0 + self.height())
    }
}

/// Maps frame indices to simulation time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    pub fps: f64,
    pub frames: usize,
}

impl FrameClock {
    pub fn new(fps: f64, frames: usize) -> Self {
        Self { fps, frames }
    }

    /// `floor(total_time * fps)` frames.
    pub fn for_duration(total_time: f64, fps: f64) -> Self {
        let frames = (total_time * fps).floor().max(0.0) as usize;
        Self::new(fps, frames)
    }

    /// Time of frame `n` at a fixed step of `1 / fps`.
    pub fn time(&self, frame: usize) -> f64 {
        frame as f64 / self.fps
    }

    /// Sample times stretched so the last frame lands on `total_time`.
    pub fn sample_times(&self, total_time: f64) -> Vec<f64> {
        linspace(0.0, total_time, self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_endpoints() {
        let xs = linspace(0.0, 2.0, 200);
        assert_eq!(xs.len(), 200);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[199], 2.0);
        assert!((xs[1] - 2.0 / 199.0).abs() < 1e-12);
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 5.0, 1), vec![3.0]);
    }

    #[test]
    fn spanning_grid_covers_unit_square() {
        let grid = Grid::spanning(100, 100, (0.0, 1.0), (0.0, 1.0));
        assert_eq!(grid.x_coord(0), 0.0);
        assert!((grid.x_coord(99) - 1.0).abs() < 1e-12);
        assert!((grid.width() - 1.0).abs() < 1e-12);
        assert_eq!(grid.x_range(), (0.0, grid.width()));
    }

    #[test]
    fn clock_counts_whole_frames() {
        let clock = FrameClock::for_duration(1.0, 30.0);
        assert_eq!(clock.frames, 30);
        assert!((clock.time(15) - 0.5).abs() < 1e-12);

        let clock = FrameClock::for_duration(2.05, 30.0);
        assert_eq!(clock.frames, 61);
        let times = clock.sample_times(2.05);
        assert_eq!(times.len(), 61);
        assert_eq!(*times.last().unwrap(), 2.05);
    }
}

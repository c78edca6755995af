use crate::medium::Medium;
use rayon::prelude::*;
use std::collections::VecDeque;
use std::f64::consts::PI;
use tracing::{debug, warn};

// Slack for deciding whether a period boundary has been reached
const EMIT_EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wavefront {
    pub t_emit: f64,
    pub x_emit: f64,
}

impl Wavefront {
    /// `max(0, c (t - t_emit))`
    pub fn radius(&self, sound_speed: f64, t: f64) -> f64 {
        (sound_speed * (t - self.t_emit)).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl View {
    /// Distance from `(x, 0)` to the farthest corner. A wavefront centred
    /// there with a larger radius no longer crosses the view.
    pub fn farthest_corner(&self, x: f64) -> f64 {
        let dx = (x - self.x_min).abs().max((x - self.x_max).abs());
        let dy = self.y_min.abs().max(self.y_max.abs());
        dx.hypot(dy)
    }
}

#[derive(Clone, Debug)]
pub struct Emitter {
    period: f64,
    capacity: usize,
    first_emit: Option<f64>,
    last_emit: Option<f64>,
    emitted: u64,
    evicted: u64,
    wavefronts: VecDeque<Wavefront>,
}

impl Emitter {
    pub fn new(period: f64, capacity: usize) -> Self {
        Self {
            period,
            capacity: capacity.max(1),
            first_emit: None,
            last_emit: None,
            emitted: 0,
            evicted: 0,
            wavefronts: VecDeque::new(),
        }
    }

    /// Total emission events since the start, including evicted ones.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn wavefronts(&self) -> &VecDeque<Wavefront> {
        &self.wavefronts
    }

    /// Emits every wavefront due up to time `t`. The source travelled from
    /// `from = (t_prev, x_prev)` at constant `speed`; emission positions are
    /// taken on that segment. The very first call emits immediately at `t`.
    pub fn advance(&mut self, from: (f64, f64), speed: f64, t: f64) {
        let (t_prev, x_prev) = from;
        let position = |t_emit: f64| x_prev + speed * (t_emit - t_prev);

        let first = match self.first_emit {
            Some(first) => first,
            None => {
                self.first_emit = Some(t);
                self.push(Wavefront { t_emit: t, x_emit: position(t) });
                return;
            }
        };

        // Count emissions by index so rounding drift can't change how many are due
        let due = ((t - first) / self.period + EMIT_EPS).floor();
        if due < 0.0 {
            return;
        }
        let due = due as u64 + 1;
        while self.emitted < due {
            let mut t_emit = first + self.emitted as f64 * self.period;
            if let Some(last) = self.last_emit {
                // first + n*T can round to less than a period after the previous emission
                t_emit = t_emit.max(last + self.period);
                while t_emit - last < self.period {
                    t_emit = next_up(t_emit);
                }
            }
            self.push(Wavefront { t_emit, x_emit: position(t_emit) });
        }
    }

    fn push(&mut self, wavefront: Wavefront) {
        if self.wavefronts.len() == self.capacity {
            // Hitting capacity means the view is larger than the capacity allows for
            if self.evicted == 0 {
                warn!(capacity = self.capacity, "wavefront capacity reached, dropping oldest");
            }
            self.wavefronts.pop_front();
            self.evicted += 1;
        }
        self.last_emit = Some(wavefront.t_emit);
        self.wavefronts.push_back(wavefront);
        self.emitted += 1;
    }

    /// Drops the oldest wavefronts once they have expanded past `view`.
    pub fn evict_outside(&mut self, view: &View, sound_speed: f64, t: f64) -> usize {
        let mut dropped = 0;
        while let Some(front) = self.wavefronts.front() {
            if front.radius(sound_speed, t) <= view.farthest_corner(front.x_emit) {
                break;
            }
            self.wavefronts.pop_front();
            dropped += 1;
        }
        self.evicted += dropped as u64;
        dropped
    }

    /// Wavefronts to draw at `t` with their radius; zero-radius ones are skipped.
    pub fn visible(&self, sound_speed: f64, t: f64) -> Vec<(Wavefront, f64)> {
        self.wavefronts
            .iter()
            .filter_map(|wf| {
                let r = wf.radius(sound_speed, t);
                (r > 0.0).then_some((*wf, r))
            })
            .collect()
    }
}

// Smallest f64 above `x`
fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    f64::from_bits(if x > 0.0 { bits + 1 } else { bits - 1 })
}

/// Upper half of the circle of `radius` around `(x_center, 0)`, `points` samples.
pub fn arc_points(x_center: f64, radius: f64, points: usize) -> Vec<(f64, f64)> {
    let n = points.max(2);
    (0..n)
        .map(|i| {
            let theta = PI * i as f64 / (n - 1) as f64;
            (x_center + radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// Frequency heard at `receiver` from a source at `source` moving along +x.
pub fn observed_frequency(frequency: f64, sound_speed: f64, speed: f64, source: f64, receiver: f64) -> f64 {
    if speed == 0.0 || source == receiver {
        frequency
    } else if source < receiver {
        frequency * sound_speed / (sound_speed - speed)
    } else {
        frequency * sound_speed / (sound_speed + speed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub title: String,
    pub source_start: f64,
    pub receiver: f64,
}

#[derive(Clone, Debug)]
pub struct Track {
    pub scenario: Scenario,
    source_x: f64,
    last_time: Option<f64>,
    emitter: Emitter,
}

impl Track {
    pub fn new(scenario: Scenario, period: f64, capacity: usize) -> Self {
        let source_x = scenario.source_start;
        Self {
            scenario,
            source_x,
            last_time: None,
            emitter: Emitter::new(period, capacity),
        }
    }

    pub fn source_x(&self) -> f64 {
        self.source_x
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Moves the source to time `t` at `speed` and emits what is due.
    pub fn advance(&mut self, t: f64, speed: f64, medium: &Medium, view: &View) {
        let from = match self.last_time {
            Some(t_prev) => (t_prev, self.source_x),
            // The source sits at its start until the first frame
            None => (t, self.source_x),
        };
        self.source_x = from.1 + speed * (t - from.0);
        self.last_time = Some(t);

        self.emitter.advance(from, speed, t);
        let dropped = self.emitter.evict_outside(view, medium.sound_speed, t);
        if dropped > 0 {
            debug!(
                scenario = %self.scenario.title,
                dropped,
                evicted = self.emitter.evicted(),
                live = self.emitter.wavefronts().len(),
                "evicted wavefronts"
            );
        }
    }

    pub fn reached(&self, wall: f64) -> bool {
        self.source_x >= wall
    }

    /// Semicircles to draw at `t`.
    pub fn arcs(&self, sound_speed: f64, t: f64, points: usize) -> Vec<Vec<(f64, f64)>> {
        self.emitter
            .visible(sound_speed, t)
            .par_iter()
            .map(|(wf, r)| arc_points(wf.x_emit, *r, points))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: f64 = 340.0;

    fn wide_view() -> View {
        View { x_min: -1e9, x_max: 1e9, y_min: 0.0, y_max: 1e9 }
    }

    #[test]
    fn first_call_emits_immediately() {
        let mut emitter = Emitter::new(0.25, 100);
        emitter.advance((0.0, -5.0), 1.0, 0.0);
        assert_eq!(emitter.emitted(), 1);
        assert_eq!(emitter.wavefronts()[0], Wavefront { t_emit: 0.0, x_emit: -5.0 });
    }

    #[test]
    fn catches_up_on_missed_periods() {
        let mut emitter = Emitter::new(0.25, 100);
        emitter.advance((0.0, 0.0), 2.0, 0.0);
        emitter.advance((0.0, 0.0), 2.0, 1.1);
        // Emissions at 0, 0.25, 0.5, 0.75, 1.0
        assert_eq!(emitter.emitted(), 5);
        let xs: Vec<f64> = emitter.wavefronts().iter().map(|w| w.x_emit).collect();
        assert_eq!(xs, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn emission_count_follows_elapsed_periods() {
        let period = 1.0 / 440.0;
        let mut emitter = Emitter::new(period, 10_000);
        let dt = 1.0 / 30.0;
        let frames = 15;
        for frame in 0..=frames {
            let t = frame as f64 * dt;
            emitter.advance((t, 0.0), 0.0, t);
        }
        let t_total = frames as f64 * dt;
        assert_eq!(emitter.emitted(), (t_total / period).floor() as u64 + 1);
    }

    #[test]
    fn emissions_never_closer_than_a_period() {
        let period = 1.0 / 440.0;
        let mut emitter = Emitter::new(period, usize::MAX);
        let dt = 1.0 / 30.0;
        let mut x = -400.0;
        let mut t_prev = 0.0;
        for frame in 0..=600 {
            let t = frame as f64 * dt;
            emitter.advance((t_prev, x), 1.0, t);
            x += t - t_prev;
            t_prev = t;
        }
        let times: Vec<f64> = emitter.wavefronts().iter().map(|w| w.t_emit).collect();
        assert!(times.windows(2).all(|p| p[1] - p[0] >= period));
        assert_eq!(emitter.emitted(), (t_prev / period + EMIT_EPS).floor() as u64 + 1);
    }

    #[test]
    fn next_up_steps_one_ulp() {
        assert!(next_up(1.0) > 1.0);
        assert_eq!(next_up(1.0), 1.0 + f64::EPSILON);
        assert!(next_up(-1.0) > -1.0);
        assert!(next_up(0.0) > 0.0);
    }

    #[test]
    fn radius_is_clamped_at_zero() {
        let wf = Wavefront { t_emit: 2.0, x_emit: 0.0 };
        assert_eq!(wf.radius(C, 1.0), 0.0);
        assert_eq!(wf.radius(C, 2.0), 0.0);
        assert!((wf.radius(C, 2.5) - 170.0).abs() < 1e-12);
    }

    #[test]
    fn fresh_wavefront_is_not_drawn() {
        let mut emitter = Emitter::new(0.5, 10);
        emitter.advance((0.0, 0.0), 0.0, 0.0);
        assert!(emitter.visible(C, 0.0).is_empty());
        assert_eq!(emitter.visible(C, 0.1).len(), 1);
    }

    #[test]
    fn eviction_drops_only_wavefronts_beyond_view() {
        let view = View { x_min: -10.0, x_max: 10.0, y_min: 0.0, y_max: 5.0 };
        let mut emitter = Emitter::new(0.01, 1000);
        for i in 0..=100 {
            let t = i as f64 * 0.01;
            emitter.advance((t, 0.0), 0.0, t);
        }
        let t = 1.0;
        emitter.evict_outside(&view, C, t);
        let limit = view.farthest_corner(0.0);
        assert!(emitter.wavefronts().iter().all(|w| w.radius(C, t) <= limit));
        assert!(emitter.wavefronts().len() < 101);
        assert_eq!(emitter.emitted(), 101);
        assert_eq!(emitter.evicted() as usize + emitter.wavefronts().len(), 101);
    }

    #[test]
    fn capacity_bounds_the_list() {
        let mut emitter = Emitter::new(0.1, 4);
        for i in 0..=20 {
            let t = i as f64 * 0.1;
            emitter.advance((t, 0.0), 0.0, t);
        }
        assert_eq!(emitter.wavefronts().len(), 4);
        assert_eq!(emitter.emitted(), 21);
    }

    #[test]
    fn arc_is_a_semicircle() {
        let arc = arc_points(3.0, 2.0, 50);
        assert_eq!(arc.len(), 50);
        assert!((arc[0].0 - 5.0).abs() < 1e-12);
        assert!((arc[49].0 - 1.0).abs() < 1e-12);
        for (x, y) in arc {
            assert!(y >= -1e-12);
            assert!(((x - 3.0).hypot(y) - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn doppler_shift_direction() {
        let f = 440.0;
        assert_eq!(observed_frequency(f, C, 0.0, -10.0, 6.0), f);
        let approaching = observed_frequency(f, C, 10.0, -10.0, 6.0);
        let receding = observed_frequency(f, C, 10.0, 8.0, 6.0);
        assert!((approaching - 440.0 * 340.0 / 330.0).abs() < 1e-9);
        assert!((receding - 440.0 * 340.0 / 350.0).abs() < 1e-9);
    }

    #[test]
    fn track_moves_linearly_and_reaches_wall() {
        let scenario = Scenario { title: "t".into(), source_start: 8.0, receiver: 6.0 };
        let mut track = Track::new(scenario, 1.0 / 440.0, 1000);
        let medium = Medium::air();
        track.advance(0.0, 1.0, &medium, &wide_view());
        assert_eq!(track.source_x(), 8.0);
        track.advance(1.0, 1.0, &medium, &wide_view());
        assert!((track.source_x() - 9.0).abs() < 1e-12);
        assert!(!track.reached(10.0));
        // Slider raised: the slope changes from here on
        track.advance(2.0, 5.0, &medium, &wide_view());
        assert!((track.source_x() - 14.0).abs() < 1e-12);
        assert!(track.reached(10.0));
    }

    #[test]
    fn arcs_skip_unborn_wavefronts() {
        let scenario = Scenario { title: "t".into(), source_start: 0.0, receiver: 6.0 };
        let mut track = Track::new(scenario, 0.5, 100);
        let medium = Medium::air();
        track.advance(0.0, 0.0, &medium, &wide_view());
        assert!(track.arcs(C, 0.0, 50).is_empty());
        track.advance(1.0, 0.0, &medium, &wide_view());
        // t_emit = 0, 0.5, 1.0 -> only the first two have grown
        assert_eq!(track.arcs(C, 1.0, 50).len(), 2);
    }
}

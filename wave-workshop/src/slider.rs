use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SliderError {
    #[error("slider '{label}': range is empty (min={min}, max={max})")]
    EmptyRange { label: String, min: f64, max: f64 },

    #[error("slider '{label}': step must be positive, got {step}")]
    InvalidStep { label: String, step: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    label: String,
    min: f64,
    max: f64,
    step: f64,
    value: f64,
}

impl Slider {
    pub fn new(label: &str, min: f64, max: f64, step: f64, initial: f64) -> Result<Self, SliderError> {
        if !(min < max) {
            return Err(SliderError::EmptyRange { label: label.to_string(), min, max });
        }
        if !(step > 0.0) || !step.is_finite() {
            return Err(SliderError::InvalidStep { label: label.to_string(), step });
        }
        let mut slider = Self { label: label.to_string(), min, max, step, value: min };
        slider.value = slider.snap(initial);
        Ok(slider)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Nearest admissible value: clamped to the range, rounded to the step grid.
    pub fn snap(&self, raw: f64) -> f64 {
        if raw.is_nan() {
            return self.value;
        }
        let clamped = raw.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        // Rounding can overshoot max when the range isn't a whole number of steps
        let snapped = if snapped > self.max { snapped - self.step } else { snapped };
        // Trim float noise such as 0.30000000000000004
        let decimals = (-self.step.log10()).ceil().max(0.0) as i32 + 1;
        let scale = 10f64.powi(decimals);
        (snapped * scale).round() / scale
    }

    /// Moves the slider. Returns `true` when the stored value changed.
    pub fn set(&mut self, raw: f64) -> bool {
        let next = self.snap(raw);
        if next == self.value {
            return false;
        }
        debug!(slider = %self.label, from = self.value, to = next, "slider moved");
        self.value = next;
        true
    }
}

/// One scripted slider movement, applied before frame `frame` is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderEvent {
    pub frame: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    events: Vec<SliderEvent>,
    cursor: usize,
}

impl Timeline {
    pub fn new(mut events: Vec<SliderEvent>) -> Self {
        // Stable sort keeps file order for events on the same frame
        events.sort_by_key(|e| e.frame);
        Self { events, cursor: 0 }
    }

    pub fn events(&self) -> &[SliderEvent] {
        &self.events
    }

    /// Applies every pending event scheduled at or before `frame`.
    pub fn apply_until(&mut self, frame: usize, slider: &mut Slider) -> bool {
        let mut changed = false;
        while let Some(event) = self.events.get(self.cursor) {
            if event.frame > frame {
                break;
            }
            changed |= slider.set(event.value);
            self.cursor += 1;
        }
        changed
    }
}

//! Classroom wave and oscillation animations.
//!
//! Four scenes share one pattern: a parameter set, a uniform sampler, a pure
//! field evaluator and a frame renderer. See [`simulation::run`] for the
//! frame loop and the scene types it drives.

pub mod acoustic;
pub mod config;
pub mod doppler;
pub mod grid;
pub mod medium;
pub mod membrane;
pub mod oscillator;
pub mod prompt;
pub mod simulation;
pub mod slider;
pub mod visualisation;

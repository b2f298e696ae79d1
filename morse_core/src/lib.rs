#![forbid(unsafe_code)]

//! Core timing, playback scheduling and curriculum logic for the Morse trainer.
//!
//! This crate provides:
//! - Domain types (marks, patterns, scheduled events, lessons, exercises)
//! - Symbol codec and canned progressions
//! - Timing model (PARIS + Farnsworth) and playback scheduler
//! - Tone/haptic emitter seams and a clocked realization engine
//! - Curriculum generation
//! - Learner progress persistence

pub mod types;
pub mod error;
pub mod codec;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod timing;
pub mod scheduler;
pub mod emitter;
pub mod render;
pub mod drill;
pub mod narrative;
pub mod curriculum;
pub mod export;
pub mod progress;
pub mod state;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use codec::{display_glyphs, to_pattern};
pub use catalog::{get_method_plan, MethodPlan};
pub use config::Config;
pub use timing::derive_timings;
pub use scheduler::{haptic_pattern, schedule, Envelope};
pub use emitter::{ClockedToneEmitter, HapticEmitter, Player, ToneEmitter, ToneSink};
pub use drill::{Drill, DrillOrder, DrillRunner};
pub use curriculum::{generate, generate_for_plan};
pub use progress::LearnerProgress;
pub use state::ProgressStore;

//! Timing model: words-per-minute to element and gap durations.
//!
//! Uses the PARIS standard (50 dot units per word), so a dot lasts
//! `1.2 / wpm` seconds. Farnsworth timing keeps element durations at the
//! character speed and stretches only the inter-character and inter-word
//! silences to reach the slower effective speed.

use crate::types::TimingProfile;
use crate::{Error, Result};

/// Seconds per dot unit at 1 WPM
const PARIS_DOT_SECONDS: f64 = 1.2;

/// Derive absolute durations from character speed and effective speed
///
/// `effective_speed` above `char_speed` is clamped to `char_speed` (no
/// stretching) and logged. Non-positive or non-finite speeds are rejected.
pub fn derive_timings(char_speed: f64, effective_speed: f64) -> Result<TimingProfile> {
    check_speed("character speed", char_speed)?;
    check_speed("effective speed", effective_speed)?;

    let effective_speed = if effective_speed > char_speed {
        tracing::warn!(
            "Effective speed {} WPM exceeds character speed {} WPM, clamping to {} WPM",
            effective_speed,
            char_speed,
            char_speed
        );
        char_speed
    } else {
        effective_speed
    };

    let dot = PARIS_DOT_SECONDS / char_speed;
    let dash = 3.0 * dot;
    let symbol_gap = dot;

    let (char_gap, word_gap) = if effective_speed < char_speed {
        let ratio = char_speed / effective_speed;
        (3.0 * dot * ratio, 7.0 * dot * ratio)
    } else {
        (3.0 * dot, 7.0 * dot)
    };

    tracing::debug!(
        "Timings for {}/{} WPM: dot={:.4}s char_gap={:.4}s word_gap={:.4}s",
        char_speed,
        effective_speed,
        dot,
        char_gap,
        word_gap
    );

    Ok(TimingProfile {
        dot,
        dash,
        symbol_gap,
        char_gap,
        word_gap,
    })
}

fn check_speed(name: &str, wpm: f64) -> Result<()> {
    if !wpm.is_finite() || wpm <= 0.0 {
        return Err(Error::Timing(format!(
            "{} must be a positive number of WPM, got {}",
            name, wpm
        )));
    }
    Ok(())
}

impl TimingProfile {
    /// True when the gaps are stretched beyond the standard 3/7 dot units
    pub fn is_farnsworth(&self) -> bool {
        self.char_gap > 3.0 * self.dot
    }
}

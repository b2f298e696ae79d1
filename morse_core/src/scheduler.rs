//! Playback scheduler: patterns to tone/silence events and haptic pulses.
//!
//! Everything here is a pure function of its inputs. Realizing the events on
//! a device is the emitters' job (see [`crate::emitter`]).

use crate::codec;
use crate::types::{EventKind, Mark, Pattern, PlaybackToken, ScheduledEvent, TimingProfile};
use crate::{Error, Result};

/// Longest onset/offset ramp applied to a tone
pub const MAX_RAMP_SECONDS: f64 = 0.003;

/// Parse pattern text into playback tokens
///
/// Accepts `.`/`-` (or the `•`/`−` display glyphs) for marks, `' '` for an
/// inter-character gap and `'/'` for an inter-word gap. Any other symbol is a
/// caller bug and is rejected.
pub fn parse_pattern_text(text: &str) -> Result<Vec<PlaybackToken>> {
    text.chars()
        .enumerate()
        .map(|(position, symbol)| match symbol {
            ' ' => Ok(PlaybackToken::CharGap),
            '/' => Ok(PlaybackToken::WordGap),
            _ => Mark::from_symbol(symbol)
                .map(PlaybackToken::Mark)
                .ok_or(Error::MalformedPattern { symbol, position }),
        })
        .collect()
}

/// Encode plain text through the codec
///
/// Characters within a word are separated by a char gap, words by a word gap.
pub fn encode_text(text: &str) -> Result<Vec<PlaybackToken>> {
    let mut tokens = Vec::new();
    for (w, word) in text.split_whitespace().enumerate() {
        if w > 0 {
            tokens.push(PlaybackToken::WordGap);
        }
        for (c, ch) in word.chars().enumerate() {
            let pattern = codec::to_pattern(ch).ok_or(Error::UnknownCharacter(ch))?;
            if c > 0 {
                tokens.push(PlaybackToken::CharGap);
            }
            tokens.extend(pattern_tokens(&pattern));
        }
    }
    Ok(tokens)
}

/// Tokens for a single pattern, with no surrounding gaps
pub fn pattern_tokens(pattern: &Pattern) -> Vec<PlaybackToken> {
    pattern
        .marks()
        .iter()
        .copied()
        .map(PlaybackToken::Mark)
        .collect()
}

/// Lay out tokens as contiguous events starting at offset 0
///
/// A symbol gap separates consecutive marks only; nothing trails the last
/// mark. Explicit gap tokens become silences of the matching length.
pub fn schedule(tokens: &[PlaybackToken], timings: &TimingProfile) -> Vec<ScheduledEvent> {
    let mut events = Vec::with_capacity(tokens.len() * 2);
    let mut offset = 0.0;
    let mut previous_was_mark = false;

    let mut push = |events: &mut Vec<ScheduledEvent>, duration: f64, kind: EventKind| {
        events.push(ScheduledEvent {
            offset,
            duration,
            kind,
        });
        offset += duration;
    };

    for token in tokens {
        match token {
            PlaybackToken::Mark(mark) => {
                if previous_was_mark {
                    push(&mut events, timings.symbol_gap, EventKind::Silence);
                }
                let duration = match mark {
                    Mark::Dot => timings.dot,
                    Mark::Dash => timings.dash,
                };
                push(&mut events, duration, EventKind::Tone);
                previous_was_mark = true;
            }
            PlaybackToken::CharGap => {
                push(&mut events, timings.char_gap, EventKind::Silence);
                previous_was_mark = false;
            }
            PlaybackToken::WordGap => {
                push(&mut events, timings.word_gap, EventKind::Silence);
                previous_was_mark = false;
            }
        }
    }

    events
}

/// Schedule a single character pattern
pub fn schedule_pattern(pattern: &Pattern, timings: &TimingProfile) -> Vec<ScheduledEvent> {
    schedule(&pattern_tokens(pattern), timings)
}

/// Parse and schedule pattern text in one step
pub fn schedule_text(text: &str, timings: &TimingProfile) -> Result<Vec<ScheduledEvent>> {
    Ok(schedule(&parse_pattern_text(text)?, timings))
}

/// Linear attack/hold/release amplitude for one tone event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub duration: f64,
    pub ramp: f64,
    pub level: f64,
}

impl Envelope {
    /// Envelope for a tone of `duration` seconds at `level` (0.0..=1.0)
    pub fn for_event(duration: f64, level: f64) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            ramp: MAX_RAMP_SECONDS.min(duration / 3.0),
            level: level.clamp(0.0, 1.0),
        }
    }

    /// Amplitude at `t` seconds after the event's onset
    ///
    /// Exactly zero at and outside both boundaries.
    pub fn amplitude_at(&self, t: f64) -> f64 {
        if t <= 0.0 || t >= self.duration || self.ramp <= 0.0 {
            return 0.0;
        }
        if t < self.ramp {
            self.level * t / self.ramp
        } else if t > self.duration - self.ramp {
            self.level * (self.duration - t) / self.ramp
        } else {
            self.level
        }
    }
}

/// Convert a 0-100 volume setting into a gain fraction
pub fn volume_fraction(percent: u8) -> f64 {
    f64::from(percent.min(100)) / 100.0
}

/// Vibration pattern in milliseconds: pulse, rest, pulse, ...
///
/// No trailing rest follows the final pulse.
pub fn haptic_pattern(pattern: &Pattern, timings: &TimingProfile) -> Vec<u32> {
    let dot_ms = to_millis(timings.dot);
    let dash_ms = to_millis(timings.dash);
    let gap_ms = to_millis(timings.symbol_gap);

    let mut pulses = Vec::with_capacity(pattern.len() * 2);
    for (i, mark) in pattern.marks().iter().enumerate() {
        if i > 0 {
            pulses.push(gap_ms);
        }
        pulses.push(match mark {
            Mark::Dot => dot_ms,
            Mark::Dash => dash_ms,
        });
    }
    pulses
}

fn to_millis(seconds: f64) -> u32 {
    (seconds * 1000.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::derive_timings;
    use crate::types::total_duration;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn assert_event(event: &ScheduledEvent, offset: f64, duration: f64, kind: EventKind) {
        assert!(
            (event.offset - offset).abs() < EPS && (event.duration - duration).abs() < EPS,
            "expected ({}, {}), got ({}, {})",
            offset,
            duration,
            event.offset,
            event.duration
        );
        assert_eq!(event.kind, kind);
    }

    #[test]
    fn test_schedule_k_at_20_wpm() {
        let timings = derive_timings(20.0, 20.0).unwrap();
        let k = codec::to_pattern('K').unwrap();
        let events = schedule_pattern(&k, &timings);

        assert_eq!(events.len(), 5);
        assert_event(&events[0], 0.0, 0.18, EventKind::Tone);
        assert_event(&events[1], 0.18, 0.06, EventKind::Silence);
        assert_event(&events[2], 0.24, 0.06, EventKind::Tone);
        assert_event(&events[3], 0.30, 0.06, EventKind::Silence);
        assert_event(&events[4], 0.36, 0.18, EventKind::Tone);
        assert!((total_duration(&events) - 0.54).abs() < EPS);
    }

    #[test]
    fn test_gaps_between_characters_and_words() {
        let timings = derive_timings(20.0, 15.0).unwrap();
        let events = schedule_text(". -/.", &timings).unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Tone,
                EventKind::Silence,
                EventKind::Tone,
                EventKind::Silence,
                EventKind::Tone
            ]
        );
        assert!((events[1].duration - timings.char_gap).abs() < EPS);
        assert!((events[3].duration - timings.word_gap).abs() < EPS);
    }

    #[test]
    fn test_glyph_text_is_accepted() {
        let timings = derive_timings(20.0, 20.0).unwrap();
        let ascii = schedule_text("-.-", &timings).unwrap();
        let glyphs = schedule_text("−•−", &timings).unwrap();
        assert_eq!(ascii, glyphs);
    }

    #[test]
    fn test_malformed_pattern_fails_loudly() {
        let err = parse_pattern_text(".-x").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedPattern {
                symbol: 'x',
                position: 2
            }
        ));
    }

    #[test]
    fn test_encode_text() {
        let tokens = encode_text("et a").unwrap();
        assert_eq!(
            tokens,
            vec![
                PlaybackToken::Mark(Mark::Dot),
                PlaybackToken::CharGap,
                PlaybackToken::Mark(Mark::Dash),
                PlaybackToken::WordGap,
                PlaybackToken::Mark(Mark::Dot),
                PlaybackToken::Mark(Mark::Dash),
            ]
        );
        assert!(matches!(
            encode_text("E#"),
            Err(Error::UnknownCharacter('#'))
        ));
    }

    #[test]
    fn test_empty_input_schedules_nothing() {
        let timings = derive_timings(20.0, 20.0).unwrap();
        assert!(schedule(&[], &timings).is_empty());
    }

    #[test]
    fn test_haptic_pattern_for_k() {
        let timings = derive_timings(20.0, 15.0).unwrap();
        let k = codec::to_pattern('K').unwrap();
        assert_eq!(haptic_pattern(&k, &timings), vec![180, 60, 60, 60, 180]);

        let e = codec::to_pattern('E').unwrap();
        assert_eq!(haptic_pattern(&e, &timings), vec![60]);
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = Envelope::for_event(0.06, 0.7);
        assert_eq!(envelope.ramp, 0.003);
        assert_eq!(envelope.amplitude_at(0.0), 0.0);
        assert_eq!(envelope.amplitude_at(0.06), 0.0);
        assert!((envelope.amplitude_at(0.0015) - 0.35).abs() < EPS);
        assert_eq!(envelope.amplitude_at(0.03), 0.7);
    }

    #[test]
    fn test_envelope_ramp_shrinks_for_short_tones() {
        let envelope = Envelope::for_event(0.006, 1.0);
        assert!((envelope.ramp - 0.002).abs() < EPS);
    }

    #[test]
    fn test_volume_fraction() {
        assert_eq!(volume_fraction(70), 0.7);
        assert_eq!(volume_fraction(250), 1.0);
    }

    proptest! {
        #[test]
        fn prop_schedule_is_contiguous_and_idempotent(
            text in "[.\\- /]{0,24}",
            char_speed in 5.0f64..50.0,
        ) {
            let timings = derive_timings(char_speed, char_speed * 0.75).unwrap();
            let first = schedule_text(&text, &timings).unwrap();
            let second = schedule_text(&text, &timings).unwrap();
            prop_assert_eq!(&first, &second);

            let mut expected_offset = 0.0;
            for event in &first {
                prop_assert!((event.offset - expected_offset).abs() < EPS);
                prop_assert!(event.duration > 0.0);
                expected_offset = event.end();
            }
        }

        #[test]
        fn prop_envelope_is_zero_at_tone_boundaries(
            text in "[.\\-]{1,12}",
            char_speed in 5.0f64..120.0,
            level in 0.0f64..1.0,
        ) {
            let timings = derive_timings(char_speed, char_speed).unwrap();
            for event in schedule_text(&text, &timings).unwrap().iter().filter(|e| e.is_tone()) {
                let envelope = Envelope::for_event(event.duration, level);
                prop_assert_eq!(envelope.amplitude_at(0.0), 0.0);
                prop_assert_eq!(envelope.amplitude_at(event.duration), 0.0);
            }
        }
    }
}

//! Core domain types for the Morse trainer.
//!
//! This module defines the fundamental types used throughout the system:
//! - Marks and patterns
//! - Timing profiles and scheduled playback events
//! - Learning methods and progressions
//! - Lessons and exercises emitted by the curriculum generator

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

// ============================================================================
// Patterns
// ============================================================================

/// A single element of a Morse pattern
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Dot,
    Dash,
}

impl Mark {
    /// ASCII symbol used in pattern tables
    pub fn symbol(self) -> char {
        match self {
            Mark::Dot => '.',
            Mark::Dash => '-',
        }
    }

    /// Presentation glyph
    pub fn glyph(self) -> char {
        match self {
            Mark::Dot => '•',
            Mark::Dash => '−',
        }
    }

    /// Accepts both the ASCII symbols and the presentation glyphs
    pub fn from_symbol(symbol: char) -> Option<Mark> {
        match symbol {
            '.' | '•' => Some(Mark::Dot),
            '-' | '−' => Some(Mark::Dash),
            _ => None,
        }
    }
}

/// The ordered marks making up one character
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<Mark>);

impl Pattern {
    pub fn new(marks: Vec<Mark>) -> Self {
        Self(marks)
    }

    pub fn marks(&self) -> &[Mark] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render with `•`/`−` glyphs
    pub fn to_glyphs(&self) -> String {
        self.0.iter().map(|m| m.glyph()).collect()
    }

    /// Parse a glyph string produced by [`Pattern::to_glyphs`]
    ///
    /// ASCII `.`/`-` are accepted too. Anything else is rejected.
    pub fn from_glyphs(glyphs: &str) -> Result<Self> {
        glyphs
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                Mark::from_symbol(symbol).ok_or(Error::MalformedPattern { symbol, position })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mark in &self.0 {
            write!(f, "{}", mark.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_glyphs(s)
    }
}

/// One item of a playback request: a mark or an explicit gap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackToken {
    Mark(Mark),
    /// Silence between characters (`' '` in pattern text)
    CharGap,
    /// Silence between words (`'/'` in pattern text)
    WordGap,
}

// ============================================================================
// Timing and Scheduling
// ============================================================================

/// Absolute element and gap durations, all in seconds
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimingProfile {
    pub dot: f64,
    pub dash: f64,
    pub symbol_gap: f64,
    pub char_gap: f64,
    pub word_gap: f64,
}

/// Whether a scheduled span sounds or stays silent
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Tone,
    Silence,
}

/// A span of tone or silence relative to the start of a playback request
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduledEvent {
    pub offset: f64,
    pub duration: f64,
    pub kind: EventKind,
}

impl ScheduledEvent {
    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }

    pub fn is_tone(&self) -> bool {
        self.kind == EventKind::Tone
    }
}

/// Total length of an event list
pub fn total_duration(events: &[ScheduledEvent]) -> f64 {
    events.last().map(ScheduledEvent::end).unwrap_or(0.0)
}

// ============================================================================
// Learning Methods and Progressions
// ============================================================================

/// Selectable character introduction order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearningMethod {
    #[default]
    Audhd,
    Koch,
    Logical,
}

impl LearningMethod {
    pub const ALL: [LearningMethod; 3] = [
        LearningMethod::Audhd,
        LearningMethod::Koch,
        LearningMethod::Logical,
    ];

    /// Human label embedded in generated lesson text
    pub fn label(self) -> &'static str {
        match self {
            LearningMethod::Audhd => "AuDHD",
            LearningMethod::Koch => "Koch",
            LearningMethod::Logical => "Logical",
        }
    }
}

impl fmt::Display for LearningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LearningMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "audhd" => Ok(LearningMethod::Audhd),
            "koch" => Ok(LearningMethod::Koch),
            "logical" => Ok(LearningMethod::Logical),
            other => Err(Error::Config(format!("Unknown learning method: {}", other))),
        }
    }
}

/// An ordered, duplicate-free sequence of supported characters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<char>", into = "Vec<char>")]
pub struct Progression(Vec<char>);

impl Progression {
    /// Build a progression, rejecting duplicates and unsupported characters
    ///
    /// Letters are stored uppercase, the form the codec and lesson text use.
    pub fn new(chars: Vec<char>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(chars.len());
        for ch in chars {
            if crate::codec::to_pattern(ch).is_none() {
                return Err(Error::UnknownCharacter(ch));
            }
            let upper = ch.to_ascii_uppercase();
            if !seen.insert(upper) {
                return Err(Error::Curriculum(format!(
                    "Duplicate character {:?} in progression",
                    ch
                )));
            }
            normalized.push(upper);
        }
        Ok(Self(normalized))
    }

    /// Build from a static table without checks; the catalog validates these
    pub(crate) fn from_table(chars: &[char]) -> Self {
        Self(chars.to_vec())
    }

    pub fn chars(&self) -> &[char] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.0.contains(&ch.to_ascii_uppercase())
    }
}

impl TryFrom<Vec<char>> for Progression {
    type Error = Error;

    fn try_from(chars: Vec<char>) -> Result<Self> {
        Self::new(chars)
    }
}

impl From<Progression> for Vec<char> {
    fn from(progression: Progression) -> Self {
        progression.0
    }
}

// ============================================================================
// Lessons and Exercises
// ============================================================================

/// What a lesson is for, in generation order terms
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LessonKind {
    Introduction { ch: char },
    NewCharacter { ch: char, index: usize },
    ReviewCycle { cycle: usize },
    FinalReview,
}

/// One step of a lesson, fixed at generation time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Exercise {
    Intro {
        title: String,
        content: String,
        duration_minutes: u32,
    },
    Technique {
        title: String,
        content: String,
        duration_minutes: u32,
    },
    Character {
        ch: char,
        glyphs: String,
        mnemonic: String,
        description: Option<String>,
        duration_minutes: u32,
    },
    FlashPractice {
        chars: Vec<char>,
        reps: u32,
        interval_seconds: u32,
        duration_minutes: u32,
    },
    Comprehension {
        chars: Vec<char>,
        sets: u32,
        duration_minutes: u32,
    },
    ContrastPractice {
        chars: Vec<char>,
        sets: u32,
        duration_minutes: u32,
    },
    MultiCharPractice {
        chars: Vec<char>,
        sets: u32,
        duration_minutes: u32,
    },
    Review {
        chars: Vec<char>,
        reps: u32,
        duration_minutes: u32,
    },
    Reward {
        title: String,
        content: String,
        points: u32,
        badge: String,
        duration_minutes: u32,
    },
    PatternIntro {
        title: String,
        content: String,
        duration_minutes: u32,
    },
    AudioRecognition {
        title: String,
        content: String,
        duration_minutes: u32,
    },
}

impl Exercise {
    /// Stable snake_case tag, identical to the serialized `type` field
    pub fn kind_name(&self) -> &'static str {
        match self {
            Exercise::Intro { .. } => "intro",
            Exercise::Technique { .. } => "technique",
            Exercise::Character { .. } => "character",
            Exercise::FlashPractice { .. } => "flash_practice",
            Exercise::Comprehension { .. } => "comprehension",
            Exercise::ContrastPractice { .. } => "contrast_practice",
            Exercise::MultiCharPractice { .. } => "multi_char_practice",
            Exercise::Review { .. } => "review",
            Exercise::Reward { .. } => "reward",
            Exercise::PatternIntro { .. } => "pattern_intro",
            Exercise::AudioRecognition { .. } => "audio_recognition",
        }
    }

    /// Characters this exercise plays or asks about
    pub fn characters(&self) -> &[char] {
        match self {
            Exercise::Character { ch, .. } => std::slice::from_ref(ch),
            Exercise::FlashPractice { chars, .. }
            | Exercise::Comprehension { chars, .. }
            | Exercise::ContrastPractice { chars, .. }
            | Exercise::MultiCharPractice { chars, .. }
            | Exercise::Review { chars, .. } => chars,
            Exercise::Intro { .. }
            | Exercise::Technique { .. }
            | Exercise::Reward { .. }
            | Exercise::PatternIntro { .. }
            | Exercise::AudioRecognition { .. } => &[],
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        match self {
            Exercise::Intro { duration_minutes, .. }
            | Exercise::Technique { duration_minutes, .. }
            | Exercise::Character { duration_minutes, .. }
            | Exercise::FlashPractice { duration_minutes, .. }
            | Exercise::Comprehension { duration_minutes, .. }
            | Exercise::ContrastPractice { duration_minutes, .. }
            | Exercise::MultiCharPractice { duration_minutes, .. }
            | Exercise::Review { duration_minutes, .. }
            | Exercise::Reward { duration_minutes, .. }
            | Exercise::PatternIntro { duration_minutes, .. }
            | Exercise::AudioRecognition { duration_minutes, .. } => *duration_minutes,
        }
    }

    /// Repetition count (reps or sets), if the exercise has one
    pub fn repetitions(&self) -> Option<u32> {
        match self {
            Exercise::FlashPractice { reps, .. } | Exercise::Review { reps, .. } => Some(*reps),
            Exercise::Comprehension { sets, .. }
            | Exercise::ContrastPractice { sets, .. }
            | Exercise::MultiCharPractice { sets, .. } => Some(*sets),
            _ => None,
        }
    }
}

/// A day's worth of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lesson {
    pub day: u32,
    pub kind: LessonKind,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub exercises: Vec<Exercise>,
    pub total_points: u32,
}

impl Lesson {
    /// Every character touched by any exercise in this lesson
    pub fn characters(&self) -> BTreeSet<char> {
        self.exercises
            .iter()
            .flat_map(|e| e.characters().iter().copied())
            .collect()
    }
}

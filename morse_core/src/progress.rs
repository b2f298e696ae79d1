//! Learner progress bookkeeping.
//!
//! Tracks the current day, points, streak, earned badges and per-character
//! mastery. Persistence lives in [`crate::state`].

use crate::types::{Exercise, LearningMethod, Lesson, Progression};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Mastery gained per completed lesson touching a character
pub const MASTERY_STEP: f64 = 0.2;

/// Per-character learning state
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CharacterMastery {
    pub introduced: bool,
    pub attempts: u32,
    pub correct: u32,
    /// 0.0 to 1.0
    pub mastery: f64,
}

/// Everything the trainer remembers between sessions
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LearnerProgress {
    #[serde(default)]
    pub method: LearningMethod,
    #[serde(default = "default_day")]
    pub current_day: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub last_completed: Option<NaiveDate>,
    #[serde(default)]
    pub badges: BTreeSet<String>,
    #[serde(default)]
    pub mastery: BTreeMap<char, CharacterMastery>,
}

fn default_day() -> u32 {
    1
}

impl Default for LearnerProgress {
    fn default() -> Self {
        Self {
            method: LearningMethod::default(),
            current_day: default_day(),
            points: 0,
            streak_days: 0,
            last_completed: None,
            badges: BTreeSet::new(),
            mastery: BTreeMap::new(),
        }
    }
}

impl LearnerProgress {
    /// Fresh progress with an untouched mastery entry for every character
    pub fn new(method: LearningMethod, progression: &Progression) -> Self {
        Self {
            method,
            mastery: fresh_mastery(progression),
            ..Self::default()
        }
    }

    /// Characters marked as introduced, in progression order when given
    pub fn introduced(&self, progression: &Progression) -> Vec<char> {
        progression
            .chars()
            .iter()
            .copied()
            .filter(|ch| self.mastery.get(ch).is_some_and(|m| m.introduced))
            .collect()
    }

    /// Credit a single finished exercise
    ///
    /// Only rewards carry points and badges.
    pub fn complete_exercise(&mut self, exercise: &Exercise) {
        if let Exercise::Reward { points, badge, .. } = exercise {
            self.points += points;
            if self.badges.insert(badge.clone()) {
                tracing::info!("Badge earned: {}", badge);
            }
        }
    }

    /// Credit a finished lesson and advance to the next day
    pub fn complete_lesson(&mut self, lesson: &Lesson, today: NaiveDate) {
        self.points += lesson.total_points;
        self.streak_days += 1;
        self.last_completed = Some(today);

        for ch in lesson.characters() {
            let entry = self.mastery.entry(ch).or_default();
            entry.mastery = (entry.mastery + MASTERY_STEP).min(1.0);
            entry.attempts += 1;
            entry.correct += 1;
            entry.introduced = true;
        }

        self.current_day = self.current_day.max(lesson.day) + 1;
        tracing::info!(
            "Completed day {} ({}), {} points total",
            lesson.day,
            lesson.title,
            self.points
        );
    }

    /// Change learning method
    ///
    /// Mastery survives only if every tracked character is still part of the
    /// new progression; otherwise it starts over for the new one.
    pub fn switch_method(&mut self, method: LearningMethod, progression: &Progression) {
        self.method = method;
        let compatible = self.mastery.keys().all(|&ch| progression.contains(ch));
        if compatible {
            for &ch in progression.chars() {
                self.mastery.entry(ch).or_default();
            }
        } else {
            tracing::info!("Switching to {} method resets character mastery", method);
            self.mastery = fresh_mastery(progression);
        }
    }
}

fn fresh_mastery(progression: &Progression) -> BTreeMap<char, CharacterMastery> {
    progression
        .chars()
        .iter()
        .map(|&ch| (ch, CharacterMastery::default()))
        .collect()
}

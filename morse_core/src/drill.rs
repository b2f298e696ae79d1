//! Repetition drills: finite, restartable sequences of characters to play.
//!
//! A [`Drill`] is a description; each call to [`Drill::iter`] starts a fresh
//! pass that yields the same items in the same order. [`DrillRunner`] plays a
//! drill through a [`Player`] with a pause between items, and a newer run (or
//! an explicit [`SessionToken::restart`]) cancels any older one.

use crate::codec;
use crate::emitter::Player;
use crate::types::{Exercise, Pattern};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Number of items in a micro-burst session
pub const MICRO_BURST_COUNT: usize = 20;

/// Pause between micro-bursts
pub const MICRO_BURST_INTERVAL: Duration = Duration::from_secs(2);

/// How items are picked from the drill's character set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillOrder {
    /// Cycle through the characters in order
    Sequential,
    /// Uniform random picks, reproducible from the seed
    Shuffled { seed: u64 },
}

/// A fixed number of repetitions over a set of characters
#[derive(Clone, Debug)]
pub struct Drill {
    items: Vec<(char, Pattern)>,
    reps: usize,
    order: DrillOrder,
}

impl Drill {
    /// Resolve every character through the codec up front
    pub fn new(chars: &[char], reps: usize, order: DrillOrder) -> Result<Self> {
        if chars.is_empty() {
            return Err(Error::Curriculum("A drill needs at least one character".into()));
        }
        let items = chars
            .iter()
            .map(|&ch| {
                codec::to_pattern(ch)
                    .map(|p| (ch, p))
                    .ok_or(Error::UnknownCharacter(ch))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items, reps, order })
    }

    /// Drill for a practice exercise, or `None` for narrative exercises
    pub fn for_exercise(exercise: &Exercise, order: DrillOrder) -> Option<Result<Self>> {
        let reps = exercise.repetitions()?;
        let chars = exercise.characters();
        if chars.is_empty() {
            return None;
        }
        Some(Self::new(chars, reps as usize, order))
    }

    /// Random bursts over the introduced characters
    ///
    /// Falls back to `first` when nothing has been introduced yet.
    pub fn micro_burst(introduced: &[char], first: char, seed: u64) -> Result<Self> {
        let chars = if introduced.is_empty() {
            vec![first]
        } else {
            introduced.to_vec()
        };
        Self::new(&chars, MICRO_BURST_COUNT, DrillOrder::Shuffled { seed })
    }

    /// Same characters and order, different repetition count
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    pub fn len(&self) -> usize {
        self.reps
    }

    pub fn is_empty(&self) -> bool {
        self.reps == 0
    }

    /// Start a new pass over the drill
    pub fn iter(&self) -> DrillIter<'_> {
        DrillIter {
            drill: self,
            emitted: 0,
            rng: match self.order {
                DrillOrder::Sequential => None,
                DrillOrder::Shuffled { seed } => Some(StdRng::seed_from_u64(seed)),
            },
        }
    }
}

impl<'a> IntoIterator for &'a Drill {
    type Item = (char, Pattern);
    type IntoIter = DrillIter<'a>;

    fn into_iter(self) -> DrillIter<'a> {
        self.iter()
    }
}

/// One pass over a [`Drill`]
pub struct DrillIter<'a> {
    drill: &'a Drill,
    emitted: usize,
    rng: Option<StdRng>,
}

impl Iterator for DrillIter<'_> {
    type Item = (char, Pattern);

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.drill.reps {
            return None;
        }
        let count = self.drill.items.len();
        let index = match self.rng.as_mut() {
            Some(rng) => rng.gen_range(0..count),
            None => self.emitted % count,
        };
        self.emitted += 1;
        Some(self.drill.items[index].clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.drill.reps - self.emitted;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DrillIter<'_> {}

// ============================================================================
// Session token
// ============================================================================

/// Generation counter shared between a running drill and whoever may cancel it
#[derive(Clone, Default)]
pub struct SessionToken {
    generation: Arc<Mutex<u64>>,
    condvar: Arc<Condvar>,
}

/// Proof of being the current session at the time it was issued
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTicket(u64);

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every outstanding ticket and issue a fresh one
    pub fn restart(&self) -> SessionTicket {
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        *generation += 1;
        self.condvar.notify_all();
        SessionTicket(*generation)
    }

    pub fn is_current(&self, ticket: SessionTicket) -> bool {
        *self.generation.lock().unwrap_or_else(|e| e.into_inner()) == ticket.0
    }

    /// Sleep for up to `timeout`; returns false as soon as `ticket` goes stale
    pub fn wait(&self, ticket: SessionTicket, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        while *generation == ticket.0 {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            generation = match self.condvar.wait_timeout(generation, deadline - now) {
                Ok((guard, _)) => guard,
                Err(e) => e.into_inner().0,
            };
        }
        false
    }
}

/// How a drill run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrillOutcome {
    pub played: usize,
    pub cancelled: bool,
}

/// Plays drills one item at a time with a fixed pause between items
pub struct DrillRunner {
    token: SessionToken,
    interval: Duration,
}

impl DrillRunner {
    pub fn new(interval: Duration) -> Self {
        Self {
            token: SessionToken::new(),
            interval,
        }
    }

    /// Handle for cancelling from another thread
    pub fn token(&self) -> SessionToken {
        self.token.clone()
    }

    /// Run `drill` to completion or until a newer session starts
    ///
    /// `on_item` is called with the 0-based rep and character after each item
    /// is handed to the player.
    pub fn run(
        &self,
        drill: &Drill,
        player: &mut Player,
        mut on_item: impl FnMut(usize, char),
    ) -> DrillOutcome {
        let ticket = self.token.restart();
        let mut played = 0;

        for (rep, (ch, pattern)) in drill.iter().enumerate() {
            if !self.token.is_current(ticket) {
                break;
            }
            let events = player.play_pattern(&pattern);
            on_item(rep, ch);
            played += 1;

            let sounding = Duration::from_secs_f64(crate::types::total_duration(&events));
            if rep + 1 < drill.len() && !self.token.wait(ticket, sounding + self.interval) {
                break;
            }
        }

        let cancelled = played < drill.len();
        if cancelled {
            player.stop();
            tracing::info!("Drill cancelled after {} of {} items", played, drill.len());
        } else {
            tracing::debug!("Drill finished: {} items", played);
        }
        DrillOutcome { played, cancelled }
    }
}

//! Tone and haptic emitter seams plus the playback front door.
//!
//! The scheduler produces events; emitters realize them. [`Player`] ties the
//! two together and works the same whether or not an emitter is attached, so
//! a missing audio device never breaks scheduling.
//!
//! [`ClockedToneEmitter`] is a realization engine for any [`ToneSink`]: a
//! worker thread plays one sequence at a time against a single anchor instant
//! and abandons it as soon as a newer request arrives.

use crate::codec;
use crate::config::PlaybackConfig;
use crate::scheduler::{self, Envelope};
use crate::types::{total_duration, Pattern, PlaybackToken, ScheduledEvent, TimingProfile};
use crate::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::ops::{Deref, DerefMut};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Extra time after a sequence's nominal end before the device is released
pub const RELEASE_BUFFER: Duration = Duration::from_millis(100);

/// Realizes scheduled tone events
pub trait ToneEmitter: Send {
    /// Start realizing `events` from now, replacing anything still pending
    fn play_envelope(&mut self, events: &[ScheduledEvent], pitch_hz: f64, volume: f64)
        -> Result<()>;

    /// Silence the device and drop any pending events
    fn stop_all(&mut self);
}

/// Realizes vibration pulse patterns (pulse, rest, pulse, ... in ms)
pub trait HapticEmitter: Send {
    fn vibrate(&mut self, pulses_ms: &[u32]);
}

/// Haptics for platforms without a vibration motor
#[derive(Debug, Default)]
pub struct NullHaptic;

impl HapticEmitter for NullHaptic {
    fn vibrate(&mut self, pulses_ms: &[u32]) {
        tracing::trace!("Ignoring vibration pattern of {} steps", pulses_ms.len());
    }
}

// ============================================================================
// Player
// ============================================================================

/// Schedules playback requests and hands them to whatever emitters exist
pub struct Player {
    tone: Option<Box<dyn ToneEmitter>>,
    haptic: Option<Box<dyn HapticEmitter>>,
    timings: TimingProfile,
    pitch_hz: f64,
    volume: f64,
}

impl Player {
    /// Build a player with no emitters attached
    pub fn new(settings: &PlaybackConfig) -> Result<Self> {
        Ok(Self {
            tone: None,
            haptic: None,
            timings: settings.timings()?,
            pitch_hz: settings.pitch_hz,
            volume: scheduler::volume_fraction(settings.volume_percent),
        })
    }

    /// Attach a tone emitter from its initialization result
    ///
    /// A failed init is logged and leaves the player silent.
    pub fn with_tone<E: ToneEmitter + 'static>(mut self, init: Result<E>) -> Self {
        match init {
            Ok(emitter) => self.tone = Some(Box::new(emitter)),
            Err(e) => {
                tracing::warn!("Tone emitter unavailable, playback will be silent: {}", e);
                self.tone = None;
            }
        }
        self
    }

    /// Attach a haptic emitter; ignored unless `enabled`
    pub fn with_haptic<H: HapticEmitter + 'static>(mut self, enabled: bool, haptic: H) -> Self {
        self.haptic = if enabled {
            Some(Box::new(haptic))
        } else {
            None
        };
        self
    }

    pub fn timings(&self) -> &TimingProfile {
        &self.timings
    }

    pub fn has_tone(&self) -> bool {
        self.tone.is_some()
    }

    /// Play one character's pattern on the tone and haptic emitters
    pub fn play_pattern(&mut self, pattern: &Pattern) -> Vec<ScheduledEvent> {
        let events = self.play_tokens(&scheduler::pattern_tokens(pattern));
        if let Some(haptic) = self.haptic.as_mut() {
            haptic.vibrate(&scheduler::haptic_pattern(pattern, &self.timings));
        }
        events
    }

    /// Play a supported character
    pub fn play_char(&mut self, ch: char) -> Result<Vec<ScheduledEvent>> {
        let pattern = codec::to_pattern(ch).ok_or(Error::UnknownCharacter(ch))?;
        Ok(self.play_pattern(&pattern))
    }

    /// Play plain text, with character and word gaps between items
    pub fn play_text(&mut self, text: &str) -> Result<Vec<ScheduledEvent>> {
        let tokens = scheduler::encode_text(text)?;
        Ok(self.play_tokens(&tokens))
    }

    fn play_tokens(&mut self, tokens: &[PlaybackToken]) -> Vec<ScheduledEvent> {
        let events = scheduler::schedule(tokens, &self.timings);
        if let Some(tone) = self.tone.as_mut() {
            // At most one sequence may be live on the device
            tone.stop_all();
            if let Err(e) = tone.play_envelope(&events, self.pitch_hz, self.volume) {
                tracing::warn!("Tone emitter failed to play sequence: {}", e);
            }
        }
        events
    }

    /// Silence everything currently playing
    pub fn stop(&mut self) {
        if let Some(tone) = self.tone.as_mut() {
            tone.stop_all();
        }
    }
}

// ============================================================================
// Clocked realization
// ============================================================================

/// Device primitives a [`ClockedToneEmitter`] drives
pub trait ToneSink: Send + 'static {
    /// Claim the device for one playback request
    fn acquire(&mut self) -> Result<()>;
    fn set_pitch(&mut self, pitch_hz: f64);
    /// Begin a tone shaped by `envelope`
    fn tone_on(&mut self, envelope: &Envelope);
    fn tone_off(&mut self);
    /// Give the device back
    fn release(&mut self);
}

/// A sink claimed for one request; silenced and released on drop
pub struct DeviceGuard<'a, S: ToneSink> {
    sink: &'a mut S,
}

impl<'a, S: ToneSink> DeviceGuard<'a, S> {
    pub fn acquire(sink: &'a mut S) -> Result<Self> {
        sink.acquire()?;
        Ok(Self { sink })
    }
}

impl<S: ToneSink> Deref for DeviceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.sink
    }
}

impl<S: ToneSink> DerefMut for DeviceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.sink
    }
}

impl<S: ToneSink> Drop for DeviceGuard<'_, S> {
    fn drop(&mut self) {
        self.sink.tone_off();
        self.sink.release();
    }
}

enum Command {
    Play {
        events: Vec<ScheduledEvent>,
        pitch_hz: f64,
        volume: f64,
    },
    Stop,
    Shutdown,
}

/// Tone emitter realizing sequences on a worker thread
pub struct ClockedToneEmitter {
    tx: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl ClockedToneEmitter {
    /// Start the worker thread that owns `sink`
    pub fn init<S: ToneSink>(sink: S) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = std::thread::Builder::new()
            .name("tone-emitter".into())
            .spawn(move || run_worker(sink, rx))
            .map_err(|e| Error::Device(format!("Failed to start tone worker: {}", e)))?;
        Ok(Self {
            tx,
            worker: Some(worker),
        })
    }
}

impl ToneEmitter for ClockedToneEmitter {
    fn play_envelope(
        &mut self,
        events: &[ScheduledEvent],
        pitch_hz: f64,
        volume: f64,
    ) -> Result<()> {
        self.tx
            .send(Command::Play {
                events: events.to_vec(),
                pitch_hz,
                volume,
            })
            .map_err(|_| Error::Device("Tone worker has stopped".into()))
    }

    fn stop_all(&mut self) {
        let _ = self.tx.send(Command::Stop);
    }
}

impl Drop for ClockedToneEmitter {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Tone worker panicked");
            }
        }
    }
}

fn run_worker<S: ToneSink>(mut sink: S, rx: Receiver<Command>) {
    let mut pending = None;
    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            Command::Play {
                events,
                pitch_hz,
                volume,
            } => {
                pending = realize(&mut sink, &events, pitch_hz, volume, &rx);
            }
            Command::Stop => sink.tone_off(),
            Command::Shutdown => break,
        }
    }
    tracing::debug!("Tone worker exiting");
}

/// Play one sequence; returns the command that interrupted it, if any
fn realize<S: ToneSink>(
    sink: &mut S,
    events: &[ScheduledEvent],
    pitch_hz: f64,
    volume: f64,
    rx: &Receiver<Command>,
) -> Option<Command> {
    let mut device = match DeviceGuard::acquire(sink) {
        Ok(device) => device,
        Err(e) => {
            tracing::warn!("Unable to acquire tone device: {}", e);
            return None;
        }
    };
    device.set_pitch(pitch_hz);

    let anchor = Instant::now();
    let at = |seconds: f64| anchor + Duration::from_secs_f64(seconds.max(0.0));

    for event in events {
        if let Some(command) = wait_until(rx, at(event.offset)) {
            return Some(command);
        }
        if event.is_tone() {
            device.tone_on(&Envelope::for_event(event.duration, volume));
        } else {
            device.tone_off();
        }
    }

    if let Some(command) = wait_until(rx, at(total_duration(events))) {
        return Some(command);
    }
    device.tone_off();

    // Cleanup deadline; the guard releases the device when it drops
    wait_until(rx, at(total_duration(events)) + RELEASE_BUFFER)
}

fn wait_until(rx: &Receiver<Command>, deadline: Instant) -> Option<Command> {
    match rx.recv_deadline(deadline) {
        Ok(command) => Some(command),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Command::Shutdown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    enum SinkCall {
        Acquire,
        Pitch,
        On,
        Off,
        Release,
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<SinkCall>>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }

        fn push(&self, call: SinkCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl ToneSink for RecordingSink {
        fn acquire(&mut self) -> Result<()> {
            self.push(SinkCall::Acquire);
            Ok(())
        }
        fn set_pitch(&mut self, _pitch_hz: f64) {
            self.push(SinkCall::Pitch);
        }
        fn tone_on(&mut self, envelope: &Envelope) {
            assert_eq!(envelope.amplitude_at(0.0), 0.0);
            self.push(SinkCall::On);
        }
        fn tone_off(&mut self) {
            self.push(SinkCall::Off);
        }
        fn release(&mut self) {
            self.push(SinkCall::Release);
        }
    }

    #[derive(Clone, Default)]
    struct RecordingEmitter {
        plays: Arc<Mutex<Vec<usize>>>,
        stops: Arc<Mutex<usize>>,
    }

    impl ToneEmitter for RecordingEmitter {
        fn play_envelope(
            &mut self,
            events: &[ScheduledEvent],
            _pitch_hz: f64,
            _volume: f64,
        ) -> Result<()> {
            self.plays.lock().unwrap().push(events.len());
            Ok(())
        }

        fn stop_all(&mut self) {
            *self.stops.lock().unwrap() += 1;
        }
    }

    #[derive(Clone, Default)]
    struct RecordingHaptic {
        patterns: Arc<Mutex<Vec<Vec<u32>>>>,
    }

    impl HapticEmitter for RecordingHaptic {
        fn vibrate(&mut self, pulses_ms: &[u32]) {
            self.patterns.lock().unwrap().push(pulses_ms.to_vec());
        }
    }

    fn fast_settings() -> PlaybackConfig {
        PlaybackConfig {
            char_speed: 60.0,
            effective_speed: 60.0,
            ..PlaybackConfig::default()
        }
    }

    /// Every acquire is matched by a release before the next acquire
    fn assert_scoped(calls: &[SinkCall]) {
        let mut held = false;
        for call in calls {
            match call {
                SinkCall::Acquire => {
                    assert!(!held, "device acquired twice: {:?}", calls);
                    held = true;
                }
                SinkCall::Release => {
                    assert!(held, "release without acquire: {:?}", calls);
                    held = false;
                }
                SinkCall::On | SinkCall::Pitch => {
                    assert!(held, "tone outside request: {:?}", calls)
                }
                SinkCall::Off => {}
            }
        }
        assert!(!held, "device never released: {:?}", calls);
    }

    #[test]
    fn test_player_without_emitter_still_schedules() {
        let mut player = Player::new(&PlaybackConfig::default()).unwrap();
        assert!(!player.has_tone());
        let events = player.play_char('K').unwrap();
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_failed_init_degrades_to_silence() {
        crate::logging::init_test();
        let init: Result<RecordingEmitter> = Err(Error::Device("no audio device".into()));
        let mut player = Player::new(&PlaybackConfig::default())
            .unwrap()
            .with_tone(init);
        assert!(!player.has_tone());
        assert_eq!(player.play_text("SOS").unwrap().len(), 17);
    }

    #[test]
    fn test_player_stops_before_each_new_sequence() {
        let emitter = RecordingEmitter::default();
        let mut player = Player::new(&PlaybackConfig::default())
            .unwrap()
            .with_tone(Ok(emitter.clone()));

        player.play_char('K').unwrap();
        player.play_char('E').unwrap();

        assert_eq!(*emitter.plays.lock().unwrap(), vec![5, 1]);
        assert_eq!(*emitter.stops.lock().unwrap(), 2);
    }

    #[test]
    fn test_unknown_character_is_rejected() {
        let mut player = Player::new(&PlaybackConfig::default()).unwrap();
        assert!(matches!(player.play_char('#'), Err(Error::UnknownCharacter('#'))));
    }

    #[test]
    fn test_haptic_only_when_enabled() {
        let haptic = RecordingHaptic::default();
        let mut player = Player::new(&PlaybackConfig::default())
            .unwrap()
            .with_haptic(true, haptic.clone());
        player.play_char('A').unwrap();
        assert_eq!(*haptic.patterns.lock().unwrap(), vec![vec![60, 60, 180]]);

        let disabled = RecordingHaptic::default();
        let mut player = Player::new(&PlaybackConfig::default())
            .unwrap()
            .with_haptic(false, disabled.clone());
        player.play_char('A').unwrap();
        assert!(disabled.patterns.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clocked_emitter_completes_and_releases() {
        let sink = RecordingSink::default();
        let mut player = Player::new(&fast_settings())
            .unwrap()
            .with_tone(ClockedToneEmitter::init(sink.clone()));

        let events = player.play_char('E').unwrap();
        let total = Duration::from_secs_f64(total_duration(&events));
        std::thread::sleep(total + RELEASE_BUFFER + Duration::from_millis(300));

        let calls = sink.calls();
        assert!(calls.contains(&SinkCall::Acquire));
        assert_eq!(calls.iter().filter(|c| **c == SinkCall::On).count(), 1);
        assert_eq!(calls.last(), Some(&SinkCall::Release));
        assert_scoped(&calls);
    }

    #[test]
    fn test_new_request_preempts_previous_sequence() {
        let sink = RecordingSink::default();
        let mut player = Player::new(&PlaybackConfig::default())
            .unwrap()
            .with_tone(ClockedToneEmitter::init(sink.clone()));

        let first = player.play_text("PARIS PARIS").unwrap();
        let full_tones = first.iter().filter(|e| e.is_tone()).count();
        assert_eq!(full_tones, 28);

        // let the first sequence get partway through before switching
        std::thread::sleep(Duration::from_millis(400));
        let second = player.play_char('E').unwrap();
        let total = Duration::from_secs_f64(total_duration(&second));
        std::thread::sleep(total + RELEASE_BUFFER + Duration::from_millis(300));
        drop(player);

        let calls = sink.calls();
        assert_scoped(&calls);

        let acquires: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == SinkCall::Acquire)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(acquires.len(), 2, "calls: {:?}", calls);

        let (before, after) = calls.split_at(acquires[1]);
        let ons_before = before.iter().filter(|c| **c == SinkCall::On).count();
        let ons_after = after.iter().filter(|c| **c == SinkCall::On).count();
        assert!(ons_before >= 1, "first sequence never sounded: {:?}", calls);
        assert!(ons_before < full_tones, "first sequence was not cut short");
        assert_eq!(ons_after, 1, "only the new sequence may sound: {:?}", calls);
        assert_eq!(calls.last(), Some(&SinkCall::Release));
    }

    #[test]
    fn test_null_haptic_accepts_patterns() {
        let mut player = Player::new(&PlaybackConfig::default())
            .unwrap()
            .with_haptic(true, NullHaptic);
        assert_eq!(player.play_char('K').unwrap().len(), 5);
    }
}

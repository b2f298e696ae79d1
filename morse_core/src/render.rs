//! Offline rendering of scheduled events to PCM and WAV files.

use crate::emitter::ToneEmitter;
use crate::scheduler::Envelope;
use crate::types::{total_duration, ScheduledEvent};
use crate::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Render events to mono f32 samples: a sine at `pitch_hz` under each tone's envelope
pub fn render_samples(
    events: &[ScheduledEvent],
    pitch_hz: f64,
    volume: f64,
    sample_rate: u32,
) -> Vec<f32> {
    let rate = f64::from(sample_rate);
    let sample_count = (total_duration(events) * rate).round() as usize;
    let mut samples = vec![0.0f32; sample_count];

    for event in events.iter().filter(|e| e.is_tone()) {
        let envelope = Envelope::for_event(event.duration, volume);
        let start = (event.offset * rate).round() as usize;
        let end = ((event.end() * rate).round() as usize).min(sample_count);
        for (i, sample) in samples.iter_mut().enumerate().take(end).skip(start) {
            let t = i as f64 / rate;
            let amplitude = envelope.amplitude_at(t - event.offset);
            *sample = (amplitude * (2.0 * PI * pitch_hz * t).sin()) as f32;
        }
    }

    samples
}

/// Write mono f32 samples as a WAV file
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    tracing::info!("Wrote {} samples to {:?}", samples.len(), path);
    Ok(())
}

/// Tone emitter that renders each sequence to a WAV file instead of a device
pub struct WavToneEmitter {
    path: PathBuf,
    sample_rate: u32,
}

impl WavToneEmitter {
    pub fn init(path: impl Into<PathBuf>, sample_rate: u32) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path, sample_rate })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ToneEmitter for WavToneEmitter {
    fn play_envelope(
        &mut self,
        events: &[ScheduledEvent],
        pitch_hz: f64,
        volume: f64,
    ) -> Result<()> {
        let samples = render_samples(events, pitch_hz, volume, self.sample_rate);
        write_wav(&self.path, &samples, self.sample_rate)
    }

    // Rendering completes synchronously, so nothing is ever pending
    fn stop_all(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::scheduler::schedule_pattern;
    use crate::timing::derive_timings;

    #[test]
    fn test_render_length_and_silence() {
        let timings = derive_timings(20.0, 20.0).unwrap();
        let events = schedule_pattern(&codec::to_pattern('K').unwrap(), &timings);
        let samples = render_samples(&events, 600.0, 0.7, 8_000);

        // 0.54 s at 8 kHz
        assert_eq!(samples.len(), 4_320);
        // tone boundaries start from silence
        assert_eq!(samples[0], 0.0);
        // symbol gap between first dash and dot is silent
        let gap_mid = (0.21 * 8_000.0) as usize;
        assert_eq!(samples[gap_mid], 0.0);
        assert!(samples.iter().all(|s| s.abs() <= 0.7 + 1e-6));
        assert!(samples.iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn test_wav_emitter_writes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/k.wav");
        let timings = derive_timings(20.0, 20.0).unwrap();
        let events = schedule_pattern(&codec::to_pattern('E').unwrap(), &timings);

        let mut emitter = WavToneEmitter::init(&path, 8_000).unwrap();
        emitter.play_envelope(&events, 600.0, 0.5).unwrap();

        let reader = hound::WavReader::open(emitter.path()).unwrap();
        assert_eq!(reader.spec().sample_rate, 8_000);
        assert_eq!(reader.len(), 480);
    }
}

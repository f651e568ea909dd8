//! Synthetic audio clip
//!
//! A "recording" of fixed length whose spectrum swells like syllables,
//! so audio runs can be previewed without a sound device.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mimic_core::MimicResult;
use mimic_timeline::{AudioClip, AudioResource, SpectralSampler};
use parking_lot::Mutex;
use rand::Rng;

#[derive(Debug, Default)]
struct Playhead {
    started: Option<Instant>,
}

/// Shared playback position, read by the host loop to detect the end
#[derive(Debug, Clone, Default)]
pub struct PlaybackHandle {
    playhead: Arc<Mutex<Playhead>>,
    duration: Duration,
}

impl PlaybackHandle {
    /// Playing and past the clip's end
    pub fn has_ended(&self) -> bool {
        self.playhead
            .lock()
            .started
            .is_some_and(|t| t.elapsed() >= self.duration)
    }

    fn position(&self) -> Option<Duration> {
        self.playhead.lock().started.map(|t| t.elapsed())
    }
}

struct SyntheticTrack {
    handle: PlaybackHandle,
}

impl AudioResource for SyntheticTrack {
    fn duration(&self) -> Option<Duration> {
        Some(self.handle.duration)
    }

    fn play(&mut self) -> MimicResult<()> {
        self.handle.playhead.lock().started = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        self.handle.playhead.lock().started = None;
    }

    fn seek_to_start(&mut self) {}
}

struct SyllableSpectrum {
    handle: PlaybackHandle,
    attached: bool,
}

impl SpectralSampler for SyllableSpectrum {
    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn read_magnitudes(&mut self, bins: &mut [u8]) {
        let t = match self.handle.position() {
            Some(position) if self.attached => position.as_secs_f32(),
            _ => {
                bins.fill(0);
                return;
            }
        };
        // ~4 syllables per second, with a slower phrase envelope
        let syllable = (t * 4.0 * TAU).sin().max(0.0);
        let phrase = 0.6 + 0.4 * (t * 0.5 * TAU).sin();
        let mut rng = rand::thread_rng();
        for (i, bin) in bins.iter_mut().enumerate() {
            let rolloff = 1.0 - i as f32 / 512.0;
            let noise: f32 = rng.gen_range(0.85..1.15);
            *bin = (220.0 * syllable * phrase * rolloff * noise).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Build a synthetic clip of `duration`
pub fn synthetic_clip(duration: Duration) -> (AudioClip, PlaybackHandle) {
    let handle = PlaybackHandle {
        playhead: Arc::default(),
        duration,
    };
    let clip = AudioClip::new(
        Box::new(SyntheticTrack {
            handle: handle.clone(),
        }),
        Box::new(SyllableSpectrum {
            handle: handle.clone(),
            attached: false,
        }),
    );
    (clip, handle)
}

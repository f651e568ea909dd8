//! Audio Timeline Adapter - timelines driven by a playing clip
//!
//! Audio runs have no tokens. Each frame reads the clip's current
//! frequency magnitudes and turns them into a drive level.

use std::time::Duration;

use mimic_core::{Emotion, FrameTime, MimicResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::TimelineModel;

/// Audio timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioTimingConfig {
    /// Used when the clip cannot report its duration yet
    #[serde(with = "millis")]
    pub default_duration: Duration,
    /// Empirical magnitude ceiling (of 255) that maps to full level
    pub spectral_ceiling: f32,
    /// Magnitude bins read per frame
    pub bin_count: usize,
}

impl Default for AudioTimingConfig {
    fn default() -> Self {
        AudioTimingConfig {
            default_duration: Duration::from_millis(8000),
            spectral_ceiling: 180.0,
            bin_count: 256,
        }
    }
}

/// Playable audio resource (delegate)
pub trait AudioResource {
    /// Measured duration, `None` while unknown (e.g. not decoded yet)
    fn duration(&self) -> Option<Duration>;

    fn play(&mut self) -> MimicResult<()>;

    fn pause(&mut self);

    fn seek_to_start(&mut self);
}

/// Spectral sampler attached to a live audio source (delegate)
pub trait SpectralSampler {
    /// Wire the sampler to the clip's output
    fn attach(&mut self);

    fn detach(&mut self);

    /// Non-blocking snapshot of current frequency magnitudes (0..=255)
    fn read_magnitudes(&mut self, bins: &mut [u8]);
}

/// Average magnitude normalized by `ceiling`, clamped to [0.0 - 1.0]
pub fn spectral_level(bins: &[u8], ceiling: f32) -> f32 {
    if bins.is_empty() || ceiling <= 0.0 {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    let average = sum as f32 / bins.len() as f32;
    (average / ceiling).clamp(0.0, 1.0)
}

/// A selected audio clip: the resource plus its spectral sampler
pub struct AudioClip {
    resource: Box<dyn AudioResource>,
    sampler: Box<dyn SpectralSampler>,
    bins: Vec<u8>,
    attached: bool,
}

impl AudioClip {
    pub fn new(resource: Box<dyn AudioResource>, sampler: Box<dyn SpectralSampler>) -> Self {
        AudioClip {
            resource,
            sampler,
            bins: Vec::new(),
            attached: false,
        }
    }

    pub fn measured_duration(&self) -> Option<Duration> {
        self.resource.duration()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Current drive level; 0.0 when the sampler is detached
    pub fn read_level(&mut self, config: &AudioTimingConfig) -> f32 {
        if !self.attached {
            return 0.0;
        }
        self.bins.resize(config.bin_count, 0);
        self.sampler.read_magnitudes(&mut self.bins);
        spectral_level(&self.bins, config.spectral_ceiling)
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("duration", &self.resource.duration())
            .field("attached", &self.attached)
            .finish()
    }
}

/// Starts and releases audio runs
#[derive(Debug, Clone, Default)]
pub struct AudioTimelineAdapter {
    config: AudioTimingConfig,
}

impl AudioTimelineAdapter {
    pub fn new(config: AudioTimingConfig) -> Self {
        AudioTimelineAdapter { config }
    }

    pub fn config(&self) -> &AudioTimingConfig {
        &self.config
    }

    /// Measured duration, or the default when unknown or zero
    pub fn resolve_duration(&self, measured: Option<Duration>) -> Duration {
        match measured {
            Some(d) if !d.is_zero() => d,
            _ => {
                debug!(
                    fallback = ?self.config.default_duration,
                    "audio duration unavailable, using default"
                );
                self.config.default_duration
            }
        }
    }

    /// Attach the sampler, start playback and anchor the timeline at
    /// `start_time`, so timeline zero is audible zero.
    pub fn start(
        &self,
        clip: &mut AudioClip,
        start_time: FrameTime,
        emotion: Emotion,
    ) -> MimicResult<Option<TimelineModel>> {
        let duration = self.resolve_duration(clip.measured_duration());

        clip.sampler.attach();
        clip.attached = true;
        if let Err(e) = clip.resource.play() {
            warn!(error = %e, "audio playback refused");
            self.release(clip);
            return Err(e);
        }

        Ok(TimelineModel::audio(start_time, duration, emotion))
    }

    /// Pause, rewind and detach the sampler. Safe to call repeatedly.
    pub fn release(&self, clip: &mut AudioClip) {
        clip.resource.pause();
        clip.resource.seek_to_start();
        if clip.attached {
            clip.sampler.detach();
            clip.attached = false;
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

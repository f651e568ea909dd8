//! Controller configuration

use mimic_core::{MimicError, MimicResult};
use mimic_timeline::{AudioTimingConfig, TextTimingConfig};
use mimic_visual::IdleConfig;
use serde::{Deserialize, Serialize};

/// Playback controller configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub text: TextTimingConfig,
    pub audio: AudioTimingConfig,
    pub idle: IdleConfig,
    /// Seed for idle randomness; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl ControllerConfig {
    /// Slower blinking and a longer emotional breath
    pub fn calm() -> Self {
        ControllerConfig {
            idle: IdleConfig::calm(),
            ..Default::default()
        }
    }

    /// Reproducible idle behavior
    pub fn deterministic(seed: u64) -> Self {
        ControllerConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON document; missing keys keep defaults
    pub fn from_json_str(json: &str) -> MimicResult<Self> {
        let config: ControllerConfig =
            serde_json::from_str(json).map_err(|e| MimicError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MimicResult<()> {
        self.text.validate()?;
        self.idle.validate()?;
        if self.audio.default_duration.is_zero() {
            return Err(MimicError::InvalidConfig(
                "audio default_duration must be positive".into(),
            ));
        }
        if !(self.audio.spectral_ceiling > 0.0) || self.audio.bin_count == 0 {
            return Err(MimicError::InvalidConfig(
                "audio spectral_ceiling and bin_count must be positive".into(),
            ));
        }
        Ok(())
    }
}

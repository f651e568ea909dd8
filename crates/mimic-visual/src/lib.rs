//! MIMIC Visual - the avatar's appearance as state
//!
//! A pose vector is NOT pixels. It is the full set of facial, head and
//! body parameters at one instant; a renderer paints it.
//!
//! # Layers
//!
//! - Drive: token envelope (text) or spectral level (audio)
//! - Idle: blinking, emotion pulse, head sway, gaze drift
//! - Emotion: fixed per-emotion biases from a lookup table
//!
//! Every bounded field is clamped before a pose leaves the synthesizer.

pub mod pose;
pub mod emotion;
pub mod idle;
pub mod synthesis;

pub use pose::*;
pub use emotion::*;
pub use idle::*;
pub use synthesis::*;

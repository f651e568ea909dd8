//! MIMIC Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every MIMIC crate:
//! - Time primitive (FrameTime)
//! - Emotional direction of a run (Emotion)
//! - Error taxonomy

pub mod time;
pub mod emotion;
pub mod error;

pub use time::*;
pub use emotion::*;
pub use error::*;

//! MIMIC Runtime - playback orchestration
//!
//! The playback controller runs the per-frame loop:
//! 1. Confirm the frame is the one it requested (stale frames do nothing)
//! 2. Read the clock
//! 3. Sample the drive signal (spectral level for audio runs)
//! 4. Synthesize the pose
//! 5. Publish a snapshot and the progress readout
//! 6. Request the next frame, or complete and tear down
//!
//! External collaborators (speech, audio, renderer) are traits; the
//! controller never blocks on any of them.

pub mod config;
pub mod status;
pub mod speech;
pub mod render;
pub mod controller;

pub use config::*;
pub use status::*;
pub use speech::*;
pub use render::*;
pub use controller::*;

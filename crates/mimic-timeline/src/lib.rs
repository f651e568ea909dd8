//! MIMIC Timeline - what one playback run looks like in time
//!
//! A run is either driven by a text script (heuristic token timing) or
//! by an audio clip (live spectral sampling). Both produce the same
//! immutable `TimelineModel`.
//!
//! Token timing is a proxy for articulation, not phoneme recognition:
//! longer words and terminal punctuation take longer to say.

pub mod model;
pub mod text;
pub mod audio;

pub use model::*;
pub use text::*;
pub use audio::*;

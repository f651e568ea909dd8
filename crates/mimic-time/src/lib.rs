//! MIMIC Time - clocks and the frame scheduling contract
//!
//! All animation runs on a single sequential timeline. Asynchrony is
//! expressed only as "the next frame is requested":
//! - `Clock`: monotonic readings (`SystemClock`, or `VirtualClock` for tests)
//! - `FrameScheduler`: request/cancel the next frame callback (`FrameQueue`)

pub mod clock;
pub mod scheduler;

pub use clock::*;
pub use scheduler::*;

//! MIMIC Test Harness - simulation and scenario testing
//!
//! This crate provides:
//! - Scripted speech, audio and sink fakes
//! - A deterministic playback simulator (virtual clock + frame queue)
//! - End-to-end playback scenarios

pub mod fakes;
pub mod simulator;
pub mod scenarios;

pub use fakes::*;
pub use simulator::*;
pub use scenarios::*;

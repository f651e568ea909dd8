//! Publication - frame sinks and the renderer contract

use std::path::PathBuf;

use mimic_core::FrameTime;
use mimic_visual::PoseVector;
use serde::{Deserialize, Serialize};

use crate::{PlaybackStatus, RunId};

/// Owned snapshot of one published frame
///
/// Sinks receive a copy; the controller keeps writing its own pose.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    pub pose: PoseVector,
    /// Eased progress, percent with one decimal
    pub progress_percent: f32,
    /// Run that produced the frame; `None` for the idle pose
    pub run: Option<RunId>,
    pub at: FrameTime,
}

/// Receiver of published frames and status changes
pub trait FrameSink {
    fn publish(&mut self, frame: &PoseFrame);

    fn status(&mut self, _status: &PlaybackStatus) {}
}

/// Named colors and shape of the avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDescriptor {
    pub skin: String,
    pub hair: String,
    pub eyes: String,
    pub accent: String,
    pub background: String,
    pub face_shape: FaceShape,
    /// Custom portrait painted under the animated features
    pub portrait: Option<PathBuf>,
}

impl Default for StyleDescriptor {
    fn default() -> Self {
        StyleDescriptor {
            skin: "#f1c7a5".into(),
            hair: "#3b2a20".into(),
            eyes: "#2f5d8a".into(),
            accent: "#e0567a".into(),
            background: "#101820".into(),
            face_shape: FaceShape::Oval,
            portrait: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceShape {
    #[default]
    Oval,
    Round,
    Square,
    Heart,
}

/// Visual compositor
///
/// Must accept any in-range pose, including the idle rest pose.
pub trait Renderer {
    fn render(&mut self, pose: &PoseVector, style: &StyleDescriptor);
}

/// Frame sink that paints every frame with a renderer
#[derive(Debug)]
pub struct RendererSink<R: Renderer> {
    renderer: R,
    style: StyleDescriptor,
    progress_percent: f32,
    status: PlaybackStatus,
}

impl<R: Renderer> RendererSink<R> {
    pub fn new(renderer: R, style: StyleDescriptor) -> Self {
        RendererSink {
            renderer,
            style,
            progress_percent: 0.0,
            status: PlaybackStatus::Ready,
        }
    }

    pub fn set_style(&mut self, style: StyleDescriptor) {
        self.style = style;
    }

    pub fn style(&self) -> &StyleDescriptor {
        &self.style
    }

    /// Last published progress readout
    pub fn progress_percent(&self) -> f32 {
        self.progress_percent
    }

    pub fn last_status(&self) -> &PlaybackStatus {
        &self.status
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: Renderer> FrameSink for RendererSink<R> {
    fn publish(&mut self, frame: &PoseFrame) {
        self.progress_percent = frame.progress_percent;
        self.renderer.render(&frame.pose, &self.style);
    }

    fn status(&mut self, status: &PlaybackStatus) {
        self.status = status.clone();
    }
}

//! Terminal renderer - one status line per painted frame

use std::io::{self, Write};

use mimic_runtime::{Renderer, StyleDescriptor};
use mimic_visual::PoseVector;

const METER_WIDTH: usize = 20;

/// Paints a pose as a line of meters
#[derive(Debug)]
pub struct TerminalRenderer {
    /// Paint every n-th frame
    every: u64,
    frames: u64,
}

impl TerminalRenderer {
    pub fn new(every: u64) -> Self {
        TerminalRenderer {
            every: every.max(1),
            frames: 0,
        }
    }
}

fn meter(value: f32) -> String {
    let filled = (value.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(METER_WIDTH - filled))
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, pose: &PoseVector, _style: &StyleDescriptor) {
        self.frames += 1;
        if self.frames % self.every != 0 && !pose.is_at_rest() {
            return;
        }

        let eyes = if pose.blink > 0.5 { "-  -" } else { "o  o" };
        let line = format!(
            "\r[{eyes}] mouth {} tilt {:+5.1} turn {:+5.1} {:<9} {:<12}",
            meter(pose.mouth_openness),
            pose.head_tilt,
            pose.head_turn,
            pose.emotion.name(),
            pose.timeline_label,
        );
        let mut out = io::stdout().lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_width() {
        assert_eq!(meter(0.0).chars().count(), METER_WIDTH);
        assert_eq!(meter(1.0), "█".repeat(METER_WIDTH));
        assert_eq!(meter(0.5).chars().filter(|c| *c == '█').count(), 10);
    }
}

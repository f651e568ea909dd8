//! MIMIC Avatar Demo
//!
//! Drives the playback controller from a terminal:
//! - Text runs with silent speech, started on the next refresh
//! - Audio runs from a synthetic clip
//! - Emotion and speaking rate changes between runs
//!
//! Set `RUST_LOG=debug` to watch the controller's lifecycle logs.

mod audio;
mod ui;

use std::io::{self, Write};
use std::time::Duration;

use mimic_core::Emotion;
use mimic_runtime::{
    ControllerConfig, PlaybackController, PlaybackState, PlaybackStatus, RendererSink, RunSource,
    SilentSpeech, SpeechEvent, SpeechVoice, StyleDescriptor,
};
use mimic_time::{FrameQueue, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use audio::{synthetic_clip, PlaybackHandle};
use ui::TerminalRenderer;

const REFRESH: Duration = Duration::from_micros(16_667);

type Controller = PlaybackController<SystemClock, FrameQueue>;

fn prompt() {
    print!("\n> ");
    let _ = io::stdout().flush();
}

fn load_config() -> Result<ControllerConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            Ok(ControllerConfig::from_json_str(&json)?)
        }
        None => Ok(ControllerConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║           MIMIC Avatar Demo - Text + Audio                 ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Commands:");
    println!("    /say <text>       - Speak a script");
    println!("    /audio [seconds]  - Play a synthetic clip (default 6s)");
    println!("    /emotion <name>   - neutral, happy, sad, surprised, angry");
    println!("    /rate <0.5-2.0>   - Speaking rate");
    println!("    /stop             - Stop the current run");
    println!("    /status           - Show controller status");
    println!("    /quit             - Exit");

    let config = load_config()?;
    let queue = FrameQueue::new();
    let sink = RendererSink::new(TerminalRenderer::new(3), StyleDescriptor::default());
    let mut controller = PlaybackController::new(
        config,
        SystemClock::new(),
        queue.clone(),
        Box::new(SilentSpeech),
        Box::new(sink),
    )?;

    let mut clip_handle: Option<PlaybackHandle> = None;
    let mut last_status = controller.status().clone();
    let mut refresh = tokio::time::interval(REFRESH);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt();
    loop {
        tokio::select! {
            _ = refresh.tick() => {
                // Silent speech is audible as soon as it is accepted
                if controller.state() == PlaybackState::Starting {
                    if let Some(id) = controller.active_run() {
                        controller.on_speech_event(SpeechEvent::started(id));
                    }
                }
                if clip_handle.as_ref().is_some_and(PlaybackHandle::has_ended) {
                    controller.on_audio_ended();
                }
                for request in queue.take_due() {
                    controller.on_frame(request);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(line.trim(), &mut controller, &mut clip_handle) {
                    break;
                }
                prompt();
            }
        }

        if controller.status() != &last_status {
            last_status = controller.status().clone();
            if matches!(
                last_status,
                PlaybackStatus::Complete | PlaybackStatus::Stopped | PlaybackStatus::Error(_)
            ) {
                println!();
                println!("  [{}]", last_status);
                prompt();
            }
        }
    }

    controller.stop();
    println!("\nGoodbye!");
    Ok(())
}

/// Apply one command line; `false` to quit
fn handle_command(line: &str, controller: &mut Controller, clip: &mut Option<PlaybackHandle>) -> bool {
    if line.is_empty() {
        return true;
    }
    let (cmd, arg) = match line.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    match cmd {
        "/quit" | "/exit" | "/q" => return false,
        "/say" | "/s" => {
            if let Err(e) = controller.generate(RunSource::Text(arg.to_string())) {
                println!("  {}", e);
            }
        }
        "/audio" | "/a" => {
            let seconds = arg.parse::<f64>().unwrap_or(6.0).clamp(0.5, 120.0);
            let (new_clip, handle) = synthetic_clip(Duration::from_secs_f64(seconds));
            controller.load_audio(new_clip);
            *clip = Some(handle);
            if let Err(e) = controller.generate(RunSource::Audio) {
                println!("  {}", e);
            }
        }
        "/emotion" | "/e" => match arg.parse::<Emotion>() {
            Ok(emotion) => {
                controller.set_emotion(emotion);
                println!("  emotion: {} (applies to the next run)", emotion);
            }
            Err(e) => println!("  {}", e),
        },
        "/rate" | "/r" => match arg.parse::<f32>() {
            Ok(rate) => {
                controller.set_voice(SpeechVoice {
                    rate,
                    ..controller.voice().clone()
                });
                println!("  rate: {:.2}", controller.voice().rate);
            }
            Err(_) => println!("  usage: /rate <0.5-2.0>"),
        },
        "/stop" => controller.stop(),
        "/status" => {
            let stats = controller.stats();
            println!("  state:    {:?}", controller.state());
            println!("  status:   {}", controller.status());
            println!("  emotion:  {}", controller.emotion());
            println!("  rate:     {:.2}", controller.voice().rate);
            if let Some(timeline) = controller.timeline() {
                println!("  timeline: {:?} over {:?}", timeline.mode(), timeline.duration());
            }
            println!(
                "  runs:     {} started, {} complete, {} cancelled, {} failed",
                stats.runs_started, stats.runs_completed, stats.runs_cancelled, stats.runs_failed
            );
            println!("  frames:   {}", stats.ticks);
        }
        _ => {
            // Bare text is spoken
            if let Err(e) = controller.generate(RunSource::Text(line.to_string())) {
                println!("  {}", e);
            }
        }
    }
    true
}

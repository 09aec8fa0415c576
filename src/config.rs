use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// ── Screen ──────────────────────────────────────────────────────────────────

pub const SCREEN_WIDTH: i32 = 320;
pub const SCREEN_HEIGHT: i32 = 240;

// ── Bird ────────────────────────────────────────────────────────────────────

pub const BIRD_X: i32 = 20;
pub const BIRD_RADIUS: i32 = 10;
pub const BIRD_START_HEIGHT: i32 = 120;
pub const GRAVITY: i32 = 1;
pub const FLAP_VELOCITY: i32 = -10;

// ── Pipes ───────────────────────────────────────────────────────────────────

pub const MAX_PIPES: usize = 8;
pub const PIPE_SPAWN_X: i32 = 360;
pub const PIPE_GAP: i32 = 70;
pub const SCROLL_SPEED: i32 = 2;
pub const SPAWN_EVERY: u32 = 30;
pub const RETIRE_EVERY: u32 = 5;

// Pipe edges inside [BIRD_X - BIRD_RADIUS, BIRD_X + BIRD_RADIUS] are tested.
pub const COLLISION_MIN_X: i32 = 10;
pub const COLLISION_MAX_X: i32 = 30;

// ── Palette (8-bit, RGB 3-3-2) ──────────────────────────────────────────────

pub const BACKGROUND: u8 = 0xFF;
pub const PIPE_COLOR: u8 = 0x03;
pub const BIRD_COLOR: u8 = 0xE0;

/// 1000 ticks of a 32 kHz timer.
pub const DEFAULT_FPS: f64 = 32.0;
pub const MIN_FPS: f64 = 0.1;
pub const MAX_FPS: f64 = 1000.0;

/// Command-line options.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// Seed for pipe placement (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target frame rate
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = parse_fps)]
    pub fps: f64,

    /// Disable sound
    #[arg(long)]
    pub mute: bool,

    /// Copy the previous frame into the draw buffer before drawing
    #[arg(long)]
    pub partial_redraw: bool,

    /// Write log records to this file (filter with RUST_LOG)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }
}

fn parse_fps(s: &str) -> Result<f64, String> {
    let fps: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (MIN_FPS..=MAX_FPS).contains(&fps) {
        Ok(fps)
    } else {
        Err(format!("frame rate must be in [{MIN_FPS}, {MAX_FPS}], got {fps}"))
    }
}

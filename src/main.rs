mod bird;
mod collision;
mod config;
mod game;
mod pipes;
mod pixels;
mod platform;
mod sound;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::path::Path;

use config::Args;
use game::Outcome;
use sound::Sound;
use terminal::Terminal;

// ── Logging ─────────────────────────────────────────────────────────────────

/// The screen is ours while playing, so records only ever go to a file.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!(
        "seed {seed}, {} fps, partial redraw {}",
        args.fps,
        args.partial_redraw
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sound = if args.mute { None } else { Sound::open() };

    let outcome = {
        let mut term =
            Terminal::open(args.frame_period()).context("failed to take over the terminal")?;
        let outcome = game::run(&mut term, &mut rng, args.partial_redraw)
            .context("terminal I/O failed")?;
        if let (Outcome::Crashed { .. }, Some(sound)) = (outcome, sound.as_mut()) {
            sound.play_crash();
            sound.wait();
        }
        outcome
    };

    let how = match outcome {
        Outcome::Quit { .. } => "Quit",
        Outcome::Crashed { .. } => "Crashed",
    };
    println!("{how} after {} frames (seed {seed}).", outcome.frames());
    Ok(())
}

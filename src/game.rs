use rand::Rng;
use std::io;

use crate::bird::Bird;
use crate::collision::pipe_collides;
use crate::config::*;
use crate::pipes::PipePool;
use crate::platform::Platform;

/// Why the loop stopped, and how many frames were simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Quit { frames: u32 },
    Crashed { frames: u32 },
}

impl Outcome {
    pub fn frames(&self) -> u32 {
        match *self {
            Outcome::Quit { frames } | Outcome::Crashed { frames } => frames,
        }
    }
}

#[derive(Debug, Default)]
pub struct Game {
    pub bird: Bird,
    pub pipes: PipePool,
    frame: u32,
    action_was_down: bool,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Advances the world by one frame. Does not test for collisions.
    pub fn step<R: Rng>(&mut self, action_down: bool, rng: &mut R) {
        self.bird.apply_gravity();
        if action_down && !self.action_was_down {
            self.bird.flap();
        }

        self.pipes.scroll(SCROLL_SPEED);
        if self.frame % SPAWN_EVERY == 0 {
            self.spawn_pipe(rng);
        }
        if self.frame % RETIRE_EVERY == 0 && !self.pipes.is_empty() {
            let retired = self.pipes.retire();
            if retired > 0 {
                log::debug!(
                    "frame {}: retired {retired} pipe(s), mask {:08b}",
                    self.frame,
                    self.pipes.mask()
                );
            }
        }

        self.action_was_down = action_down;
        self.frame += 1;
    }

    fn spawn_pipe<R: Rng>(&mut self, rng: &mut R) {
        let gap_top = rng.gen_range(0..=SCREEN_HEIGHT - PIPE_GAP);
        let gap_bottom = gap_top + PIPE_GAP;
        match self.pipes.spawn(PIPE_SPAWN_X, gap_top, gap_bottom) {
            Some(slot) => log::debug!(
                "frame {}: pipe in slot {slot}, gap {gap_top}..{gap_bottom}, {} live",
                self.frame,
                self.pipes.len()
            ),
            None => {
                debug_assert!(self.pipes.is_full());
                log::trace!("frame {}: pipe pool full, spawn dropped", self.frame);
            }
        }
    }

    pub fn collides(&self) -> bool {
        self.pipes
            .iter()
            .any(|p| pipe_collides(self.bird.height, p.position_x, p.gap_top, p.gap_bottom))
    }

    /// Clears the screen and paints pipes, then the bird on top.
    pub fn draw<P: Platform + ?Sized>(&self, platform: &mut P) {
        platform.fill_screen(BACKGROUND);

        platform.set_color(PIPE_COLOR);
        for pipe in self.pipes.iter() {
            platform.vert_line(pipe.position_x, 0, pipe.gap_top);
            platform.vert_line(
                pipe.position_x,
                pipe.gap_bottom,
                SCREEN_HEIGHT - pipe.gap_bottom,
            );
        }

        platform.set_color(BIRD_COLOR);
        platform.fill_circle(BIRD_X, self.bird.height, BIRD_RADIUS);
    }
}

/// Plays one round until the exit key is pressed or the bird hits a pipe.
///
/// The frame in which a collision happens is never drawn.
pub fn run<P, R>(platform: &mut P, rng: &mut R, partial_redraw: bool) -> io::Result<Outcome>
where
    P: Platform + ?Sized,
    R: Rng,
{
    let mut game = Game::new();

    loop {
        let keys = platform.scan_keys()?;
        if keys.exit {
            log::info!("exit key after {} frames", game.frame());
            return Ok(Outcome::Quit {
                frames: game.frame(),
            });
        }

        if partial_redraw {
            platform.blit_screen();
        }

        game.step(keys.action, rng);
        if game.collides() {
            log::info!(
                "crashed on frame {} at height {}",
                game.frame(),
                game.bird.height
            );
            return Ok(Outcome::Crashed {
                frames: game.frame(),
            });
        }

        game.draw(platform);
        platform.swap_draw()?;
        platform.pace();
    }
}

//! What the game needs from the machine it runs on.
//!
//! Coordinates are in the 320x240 logical screen. Drawing goes to an
//! off-screen buffer that becomes visible on `swap_draw`.

use std::io;

/// An 8-bit palette index.
pub type Shade = u8;

/// Keys sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keys {
    /// Flap.
    pub action: bool,
    /// Leave the game.
    pub exit: bool,
}

pub trait Platform {
    /// Polls the keyboard and reports which keys are down right now.
    fn scan_keys(&mut self) -> io::Result<Keys>;

    fn fill_screen(&mut self, shade: Shade);

    /// Colour used by the shape primitives.
    fn set_color(&mut self, shade: Shade);

    fn fill_circle(&mut self, x: i32, y: i32, radius: i32);

    /// A one pixel wide line from `(x, y)` down `length` pixels.
    fn vert_line(&mut self, x: i32, y: i32, length: i32);

    /// Copies the visible frame into the draw buffer.
    fn blit_screen(&mut self);

    /// Presents the draw buffer.
    fn swap_draw(&mut self) -> io::Result<()>;

    /// Sleeps out whatever is left of the current frame period.
    fn pace(&mut self);
}

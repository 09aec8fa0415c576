//! Terminal-backed `Platform`.
//!
//! The 320x240 logical screen is stretched over the whole terminal using
//! half-block pixels. Two pixel buffers give the double buffering: shapes go
//! to `back`, `swap_draw` prints it and makes it the new `front`.

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use std::io::{self, Stdout, Write, stdout};
use std::time::{Duration, Instant};

use crate::config::{BACKGROUND, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::pixels::{PixelBuf, Rgb};
use crate::platform::{Keys, Platform, Shade};

/// Maps logical screen coordinates onto a pixel buffer of any size.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    sx: f64,
    sy: f64,
}

impl Viewport {
    fn for_buf(buf: &PixelBuf) -> Self {
        Viewport {
            sx: buf.width() as f64 / SCREEN_WIDTH as f64,
            sy: buf.height() as f64 / SCREEN_HEIGHT as f64,
        }
    }

    fn fill_circle(&self, buf: &mut PixelBuf, cx: i32, cy: i32, r: i32, c: Rgb) {
        let (cx, cy, r) = (cx as f64, cy as f64, r as f64);
        let x0 = ((cx - r) * self.sx).floor() as i32;
        let x1 = ((cx + r) * self.sx).ceil() as i32;
        let y0 = ((cy - r) * self.sy).floor() as i32;
        let y1 = ((cy + r) * self.sy).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let lx = (px as f64 + 0.5) / self.sx - cx;
                let ly = (py as f64 + 0.5) / self.sy - cy;
                if lx * lx + ly * ly <= r * r {
                    buf.set(px, py, c);
                }
            }
        }
        // Never let the bird vanish on a tiny terminal.
        buf.set(
            (cx * self.sx).floor() as i32,
            (cy * self.sy).floor() as i32,
            c,
        );
    }

    fn vert_line(&self, buf: &mut PixelBuf, x: i32, y: i32, length: i32, c: Rgb) {
        if length <= 0 {
            return;
        }
        let col = (x as f64 * self.sx).floor() as i32;
        let top = (y as f64 * self.sy).floor() as i32;
        let bottom = (((y + length) as f64) * self.sy).ceil() as i32;
        for row in top..bottom.max(top + 1) {
            buf.set(col, row, c);
        }
    }
}

/// Frames a key stays down after a press on terminals that never report
/// releases, long enough to bridge the gaps between auto-repeat presses.
const REPEAT_GRACE_FRAMES: u8 = 2;

/// Held state of one key.
#[derive(Debug, Default, Clone, Copy)]
struct KeyLatch {
    held: bool,
    pressed: bool,
    grace: u8,
}

impl KeyLatch {
    fn update(&mut self, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press => {
                self.held = true;
                self.pressed = true;
            }
            KeyEventKind::Repeat => self.held = true,
            KeyEventKind::Release => self.held = false,
        }
    }

    /// Down if held now or pressed since the last read, so a tap shorter
    /// than a frame still counts.
    ///
    /// Without release events a key is down on the frame its press arrived
    /// and for `REPEAT_GRACE_FRAMES` after, so auto-repeat reads as a hold.
    fn take(&mut self, reports_release: bool) -> bool {
        if reports_release {
            let down = self.held || self.pressed;
            self.pressed = false;
            return down;
        }
        if self.pressed {
            self.pressed = false;
            self.grace = REPEAT_GRACE_FRAMES;
            true
        } else if self.grace > 0 {
            self.grace -= 1;
            true
        } else {
            false
        }
    }
}

/// Tracks the two keys the game cares about from terminal key events.
#[derive(Debug, Default)]
struct KeyState {
    reports_release: bool,
    action: KeyLatch,
    exit: KeyLatch,
}

impl KeyState {
    fn handle(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.exit.update(KeyEventKind::Press);
            return;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Up => self.action.update(key.kind),
            KeyCode::Esc | KeyCode::Char('q') => self.exit.update(key.kind),
            _ => {}
        }
    }

    fn sample(&mut self) -> Keys {
        Keys {
            action: self.action.take(self.reports_release),
            exit: self.exit.take(self.reports_release),
        }
    }
}

pub struct Terminal<W: Write = Stdout> {
    out: W,
    front: PixelBuf,
    back: PixelBuf,
    color: Rgb,
    keys: KeyState,
    frame_period: Duration,
    frame_end: Instant,
}

impl Terminal {
    /// Takes over the terminal until dropped.
    pub fn open(frame_period: Duration) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut term = Terminal::claim(stdout(), frame_period)?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                term.out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            term.keys.reports_release = true;
        }

        let (cols, rows) = terminal::size()?;
        term.resize(cols, rows);
        log::info!(
            "terminal {cols}x{rows}, key releases reported: {}",
            term.keys.reports_release
        );
        Ok(term)
    }
}

impl<W: Write> Terminal<W> {
    /// Switches `out` to the alternate screen. Once this is called the
    /// returned value, or its drop on the error path, owns the cleanup.
    fn claim(out: W, frame_period: Duration) -> io::Result<Self> {
        let white = Rgb::from_palette(BACKGROUND);
        let mut term = Terminal {
            out,
            front: PixelBuf::new(0, 0, white),
            back: PixelBuf::new(0, 0, white),
            color: white,
            keys: KeyState::default(),
            frame_period,
            frame_end: Instant::now(),
        };
        execute!(
            term.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )?;
        Ok(term)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let (pw, ph) = (cols as usize, rows as usize * 2);
        log::debug!("resized to {cols}x{rows}");
        let white = Rgb::from_palette(BACKGROUND);
        self.front.resize(pw, ph, white);
        self.back.resize(pw, ph, white);
    }

    /// Undoes `claim` and raw mode. Every step runs even if an earlier one
    /// fails; the first error is returned.
    fn restore(&mut self) -> io::Result<()> {
        let flags = if self.keys.reports_release {
            execute!(self.out, PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        };
        let screen = execute!(
            self.out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        );
        let raw = terminal::disable_raw_mode();
        flags.and(screen).and(raw)
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("failed to restore terminal: {e}");
        }
    }
}

impl<W: Write> Platform for Terminal<W> {
    fn scan_keys(&mut self) -> io::Result<Keys> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => self.keys.handle(key),
                Event::Resize(c, r) => self.resize(c, r),
                _ => {}
            }
        }
        Ok(self.keys.sample())
    }

    fn fill_screen(&mut self, shade: Shade) {
        self.back.fill(Rgb::from_palette(shade));
    }

    fn set_color(&mut self, shade: Shade) {
        self.color = Rgb::from_palette(shade);
    }

    fn fill_circle(&mut self, x: i32, y: i32, radius: i32) {
        Viewport::for_buf(&self.back).fill_circle(&mut self.back, x, y, radius, self.color);
    }

    fn vert_line(&mut self, x: i32, y: i32, length: i32) {
        Viewport::for_buf(&self.back).vert_line(&mut self.back, x, y, length, self.color);
    }

    fn blit_screen(&mut self) {
        self.back.copy_from(&self.front);
    }

    fn swap_draw(&mut self) -> io::Result<()> {
        self.back.render(&mut self.out)?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn pace(&mut self) {
        let elapsed = self.frame_end.elapsed();
        if elapsed < self.frame_period {
            std::thread::sleep(self.frame_period - elapsed);
        }
        self.frame_end = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = Rgb(255, 255, 255);
    const INK: Rgb = Rgb(0, 0, 0);

    fn painted(buf: &PixelBuf) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..buf.height() {
            for x in 0..buf.width() {
                if buf.get(x, y) == INK {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn press(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn full_size_line_is_one_column() {
        let mut buf = PixelBuf::new(320, 240, WHITE);
        Viewport::for_buf(&buf).vert_line(&mut buf, 100, 0, 60, INK);
        let px = painted(&buf);
        assert_eq!(px.len(), 60);
        assert!(px.iter().all(|&(x, y)| x == 100 && y < 60));
    }

    #[test]
    fn line_scales_down_without_vanishing() {
        let mut buf = PixelBuf::new(80, 48, WHITE);
        Viewport::for_buf(&buf).vert_line(&mut buf, 100, 130, 110, INK);
        let px = painted(&buf);
        assert!(!px.is_empty());
        assert!(px.iter().all(|&(x, _)| x == 25));
        assert_eq!(px.first(), Some(&(25, 26)));
        assert_eq!(px.last(), Some(&(25, 47)));
    }

    #[test]
    fn off_screen_and_empty_lines_draw_nothing() {
        let mut buf = PixelBuf::new(320, 240, WHITE);
        let vp = Viewport::for_buf(&buf);
        vp.vert_line(&mut buf, 360, 0, 100, INK);
        vp.vert_line(&mut buf, -2, 0, 100, INK);
        vp.vert_line(&mut buf, 50, 0, 0, INK);
        assert!(painted(&buf).is_empty());
    }

    #[test]
    fn circle_at_full_size() {
        let mut buf = PixelBuf::new(320, 240, WHITE);
        Viewport::for_buf(&buf).fill_circle(&mut buf, 20, 120, 10, INK);
        let px = painted(&buf);
        assert!(px.contains(&(20, 120)));
        assert!(px.contains(&(11, 120)));
        assert!(!px.contains(&(31, 120)));
        assert!(px.contains(&(10, 120)));
        assert!(!px.contains(&(9, 120)));
        assert!(px.contains(&(29, 120)));
        assert!(!px.contains(&(30, 120)));
        assert!(px.contains(&(20, 111)));
        assert!(!px.contains(&(20, 109)));
    }

    #[test]
    fn circle_survives_tiny_terminal() {
        let mut buf = PixelBuf::new(10, 6, WHITE);
        Viewport::for_buf(&buf).fill_circle(&mut buf, 20, 120, 10, INK);
        assert!(painted(&buf).contains(&(0, 3)));
    }

    #[test]
    fn press_without_release_reports_lingers_briefly() {
        let mut keys = KeyState::default();
        keys.handle(press(KeyCode::Char(' '), KeyEventKind::Press));
        assert_eq!(keys.sample(), Keys { action: true, exit: false });
        assert!(keys.sample().action);
        assert!(keys.sample().action);
        assert_eq!(keys.sample(), Keys::default());
    }

    #[test]
    fn auto_repeat_without_release_reports_reads_as_one_hold() {
        // Repeats arrive as plain presses and miss the odd frame.
        let mut keys = KeyState::default();
        let mut game = crate::game::Game::new();
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let mut flaps = 0;
        for frame in 0..20 {
            if frame % 3 != 2 {
                keys.handle(press(KeyCode::Enter, KeyEventKind::Press));
            }
            game.bird.velocity = 0;
            game.step(keys.sample().action, &mut rng);
            if game.bird.velocity == -10 {
                flaps += 1;
            }
        }
        assert_eq!(flaps, 1);
    }

    #[test]
    fn separate_taps_without_release_reports() {
        let mut keys = KeyState::default();
        keys.handle(press(KeyCode::Enter, KeyEventKind::Press));
        let downs: Vec<bool> = (0..4).map(|_| keys.sample().action).collect();
        assert_eq!(downs, vec![true, true, true, false]);
        keys.handle(press(KeyCode::Enter, KeyEventKind::Press));
        assert!(keys.sample().action);
    }

    #[test]
    fn held_key_with_release_reports() {
        let mut keys = KeyState {
            reports_release: true,
            ..Default::default()
        };
        keys.handle(press(KeyCode::Enter, KeyEventKind::Press));
        assert!(keys.sample().action);
        keys.handle(press(KeyCode::Enter, KeyEventKind::Repeat));
        assert!(keys.sample().action);
        assert!(keys.sample().action);
        keys.handle(press(KeyCode::Enter, KeyEventKind::Release));
        assert!(!keys.sample().action);
    }

    #[test]
    fn tap_inside_one_frame_still_counts() {
        let mut keys = KeyState {
            reports_release: true,
            ..Default::default()
        };
        keys.handle(press(KeyCode::Up, KeyEventKind::Press));
        keys.handle(press(KeyCode::Up, KeyEventKind::Release));
        assert!(keys.sample().action);
        assert!(!keys.sample().action);
    }

    #[test]
    fn exit_keys() {
        for code in [KeyCode::Esc, KeyCode::Char('q')] {
            let mut keys = KeyState::default();
            keys.handle(press(code, KeyEventKind::Press));
            assert!(keys.sample().exit);
        }
        let mut keys = KeyState::default();
        keys.handle(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(keys.sample().exit);
    }

    /// Fails the first write, records everything after it.
    struct FlakyOut {
        failed: bool,
        written: std::rc::Rc<std::cell::RefCell<Vec<u8>>>,
    }

    impl Write for FlakyOut {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(io::Error::other("terminal went away"));
            }
            self.written.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_setup_still_restores_screen() {
        let written = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let out = FlakyOut {
            failed: false,
            written: written.clone(),
        };
        assert!(Terminal::claim(out, Duration::from_millis(10)).is_err());

        let text = String::from_utf8(written.borrow().clone()).unwrap();
        assert!(text.contains("\x1b[?1049l"), "left alternate screen: {text:?}");
        assert!(text.contains("\x1b[?25h"), "showed cursor: {text:?}");
    }

    #[test]
    fn other_keys_ignored() {
        let mut keys = KeyState::default();
        keys.handle(press(KeyCode::Char('a'), KeyEventKind::Press));
        assert_eq!(keys.sample(), Keys::default());
    }
}

use crate::config::{BIRD_START_HEIGHT, FLAP_VELOCITY, GRAVITY};

/// The player. Only moves vertically; its horizontal position is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bird {
    pub height: i32,
    pub velocity: i32,
}

impl Default for Bird {
    fn default() -> Self {
        Bird {
            height: BIRD_START_HEIGHT,
            velocity: 0,
        }
    }
}

impl Bird {
    /// No clamping: the bird may leave the screen in either direction.
    pub fn apply_gravity(&mut self) {
        self.velocity += GRAVITY;
        self.height += self.velocity;
    }

    pub fn flap(&mut self) {
        self.velocity = FLAP_VELOCITY;
    }
}

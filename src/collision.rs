//! Bird-versus-pipe collision.
//!
//! The bird is a circle; a pipe is a zero-width vertical edge with a gap in
//! it. When the edge crosses the circle at horizontal offset `x` from its
//! centre, the circle covers `±half_chord(x)` vertically on that edge, and
//! the bird survives only if that span fits inside the gap.

use crate::config::{BIRD_RADIUS, BIRD_X, COLLISION_MAX_X, COLLISION_MIN_X};

/// Half the length of the chord cut through a circle of `radius` at
/// horizontal distance `offset` from its centre.
///
/// `offset` must satisfy `|offset| <= radius`.
#[inline]
pub fn half_chord(radius: f64, offset: f64) -> f64 {
    (radius * radius - offset * offset).sqrt()
}

/// Whether a pipe edge at `position_x` is tested against the bird.
#[inline]
pub fn in_collision_window(position_x: i32) -> bool {
    (COLLISION_MIN_X..=COLLISION_MAX_X).contains(&position_x)
}

/// Tests one pipe edge against the bird.
///
/// * `offset_x`: pipe edge minus bird centre, horizontally.
/// * `upper_gap`: top of the gap minus bird centre, vertically.
/// * `lower_gap`: bottom of the gap minus bird centre, vertically.
///
/// Screen y grows downwards, so the circle pokes through the top of the gap
/// when `upper_gap > -y` and through the bottom when `lower_gap < y`. The
/// half-chord `y` is truncated to whole pixels before comparing.
pub fn edge_collides(offset_x: i32, upper_gap: i32, lower_gap: i32) -> bool {
    let y = half_chord(f64::from(BIRD_RADIUS), f64::from(offset_x)).trunc();
    log::debug!("pipe edge: up {upper_gap}, dn {lower_gap}, y {y}");
    f64::from(upper_gap) > -y || f64::from(lower_gap) < y
}

/// Tests a bird at `bird_height` against a pipe, if the pipe is in the window.
pub fn pipe_collides(bird_height: i32, position_x: i32, gap_top: i32, gap_bottom: i32) -> bool {
    in_collision_window(position_x)
        && edge_collides(
            position_x - BIRD_X,
            gap_top - bird_height,
            gap_bottom - bird_height,
        )
}

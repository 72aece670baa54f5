use cinder_math::{Color, Vec2};

/// Checker colors of the warning material.
pub const WARNING_DARK: Color = Color::BLACK;
pub const WARNING_LIGHT: Color = Color::new(1.0, 0.0, 1.0);
/// Checker frequency of the warning material.
pub const WARNING_SCALE: f32 = 25.0;

/// Which half of a checkerboard `uv` lands in. `true` selects the second color.
#[inline]
pub fn checkerboard(uv: Vec2, scale: f32) -> bool {
    (scale * uv.x).sin() * (scale * uv.y).sin() >= 0.0
}

/// Color of the warning material at `uv`.
pub(crate) fn warning_color(uv: Vec2) -> Color {
    if checkerboard(uv, WARNING_SCALE) {
        WARNING_LIGHT
    } else {
        WARNING_DARK
    }
}

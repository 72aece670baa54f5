//! Linear RGBA color value type.

use std::ops::{Add, AddAssign, Div, Mul};

use bytemuck::{Pod, Zeroable};

use crate::Vec3;

/// A linear-space RGBA color.
///
/// Arithmetic works on the RGB channels only; alpha is carried through
/// from the left-hand operand. `repr(C)` so framebuffers can be handed to
/// encoders as flat `f32` slices.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    /// All channels zero, including alpha. The state of an unwritten pixel.
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque color from RGB.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray with all three channels set to `v`.
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    /// Replace the alpha channel.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Largest of the RGB channels.
    pub fn max_component(self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// Rec. 709 luminance.
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// True when no RGB channel exceeds `threshold`.
    pub fn is_black(self, threshold: f32) -> bool {
        self.max_component() <= threshold
    }

    /// Linear blend, `t = 0` gives `self`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Gamma 2.0 encode and quantize to 8-bit RGBA.
    pub fn to_rgba8(self) -> [u8; 4] {
        let encode = |c: f32| {
            let gamma = if c > 0.0 { c.sqrt() } else { 0.0 };
            (255.0 * gamma.clamp(0.0, 1.0)) as u8
        };
        [
            encode(self.r),
            encode(self.g),
            encode(self.b),
            (255.0 * self.a.clamp(0.0, 1.0)) as u8,
        ]
    }

    /// View a slice of colors as interleaved `f32` RGBA.
    pub fn as_flat(colors: &[Color]) -> &[f32] {
        bytemuck::cast_slice(colors)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::rgba(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::rgba(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        Color::rgba(self.r * rhs, self.g * rhs, self.b * rhs, self.a)
    }
}

impl Div<f32> for Color {
    type Output = Color;

    fn div(self, rhs: f32) -> Color {
        Color::rgba(self.r / rhs, self.g / rhs, self.b / rhs, self.a)
    }
}

//! Beam colors.
//!
//! Colors are compared exactly. The engine only ever produces colors copied
//! from the source (canonical white) or from a prism's configured split
//! colors, so equality against the canonical presets is well defined.

/// RGB color of a laser beam with channels in `[0.0, 1.0]`.
///
/// # Example
///
/// ```
/// use beamline_core::scene::Color;
///
/// let red = Color::from_hex(0xff0000);
/// assert_eq!(red, Color::RED);
/// assert_eq!(Color::WHITE.to_hex(), 0xffffff);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Unsplit source light. Only this color triggers a prism split.
    pub const WHITE: Self = Self::rgb_const(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb_const(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb_const(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb_const(0.0, 0.0, 1.0);
    pub const BLACK: Self = Self::rgb_const(0.0, 0.0, 0.0);

    const fn rgb_const(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Creates a color, clamping every channel into `[0.0, 1.0]`.
    ///
    /// NaN channels become `0.0`.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        fn clamp(c: f32) -> f32 {
            if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) }
        }
        Self {
            r: clamp(r),
            g: clamp(g),
            b: clamp(b),
        }
    }

    /// Creates a color from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Packs the color into `0xRRGGBB`, rounding each channel.
    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn is_white(&self) -> bool {
        *self == Self::WHITE
    }

    /// Validates that all channels are within `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<(), &'static str> {
        for c in [self.r, self.g, self.b] {
            if !(0.0..=1.0).contains(&c) {
                return Err("Color channels must be between 0.0 and 1.0");
            }
        }
        Ok(())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

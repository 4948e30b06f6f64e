//! Palette and static label text

use serde::{Deserialize, Serialize};

/// sRGB color with straight alpha, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// From a packed `0xAARRGGBB` value
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            r: ((argb >> 16) & 0xFF) as f32 / 255.0,
            g: ((argb >> 8) & 0xFF) as f32 / 255.0,
            b: (argb & 0xFF) as f32 / 255.0,
            a: ((argb >> 24) & 0xFF) as f32 / 255.0,
        }
    }

    /// Linear-light RGBA for an sRGB render target
    pub fn to_linear(self) -> [f32; 4] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b), self.a]
    }

    /// Shader output for a render target. An sRGB target encodes on write, so
    /// it takes linear values; a unorm target takes the sRGB values as-is.
    pub fn to_target(self, srgb_target: bool) -> [f32; 4] {
        if srgb_target {
            self.to_linear()
        } else {
            [self.r, self.g, self.b, self.a]
        }
    }

    /// CSS `rgb()` notation for DOM labels
    pub fn to_css(self) -> String {
        format!(
            "rgb({}, {}, {})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Page behind the arena
    pub backdrop: Color,
    pub arena: Color,
    pub obstacle: Color,
    pub ball: Color,
    pub title: Color,
    pub subtitle: Color,
    pub title_text: String,
    pub subtitle_text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            backdrop: Color::from_argb(0xFF0F172A),
            arena: Color::from_argb(0xFF0F1F3F),
            obstacle: Color::from_argb(0xFF18CED8),
            ball: Color::from_argb(0xFFFFC857),
            title: Color::from_argb(0xFFFFE29A),
            subtitle: Color::from_argb(0xFFAED9E0),
            title_text: "Tilt to roll the ball".to_string(),
            subtitle_text: "Avoid the neon walls".to_string(),
        }
    }
}

//! Probe colors and the cyclic palette new probes draw from.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// RGBA bytes with full opacity.
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The 20 probe colors, issued in order and then repeated.
pub const PALETTE: [Color; 20] = [
    Color::rgb(0xFF, 0x47, 0xCA),
    Color::rgb(0xFF, 0x03, 0x3E),
    Color::rgb(0x7F, 0xFF, 0xD4),
    Color::rgb(0xA8, 0xE4, 0xA0),
    Color::rgb(0x99, 0x00, 0x66),
    Color::rgb(0xFA, 0xE7, 0xB5),
    Color::rgb(0x77, 0xDD, 0xE7),
    Color::rgb(0x98, 0xFB, 0x98),
    Color::rgb(0x34, 0xC9, 0x24),
    Color::rgb(0xF6, 0x4A, 0x46),
    Color::rgb(0xFF, 0x14, 0x93),
    Color::rgb(0x00, 0xBF, 0xFF),
    Color::rgb(0xFD, 0x7C, 0x6E),
    Color::rgb(0xC7, 0xD0, 0xCC),
    Color::rgb(0xED, 0xFF, 0x21),
    Color::rgb(0xED, 0x76, 0x0E),
    Color::rgb(0xFF, 0xFF, 0x00),
    Color::rgb(0xBF, 0xFF, 0x00),
    Color::rgb(0x3B, 0xB0, 0x8F),
    Color::rgb(0xFF, 0x4D, 0x00),
];

/// Hands out palette colors in order, wrapping after the last one.
///
/// Each probe creator owns its own cycle. Resetting it starts again from
/// the first palette entry.
#[derive(Debug, Clone, Default)]
pub struct ColorCycle {
    issued: usize,
}

impl ColorCycle {
    /// Creates a fresh cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the palette color at `index`, wrapping around.
    #[must_use]
    pub fn color_at(index: usize) -> Color {
        PALETTE[index % PALETTE.len()]
    }

    /// Issues the next color.
    pub fn next_color(&mut self) -> Color {
        let color = Self::color_at(self.issued);
        self.issued += 1;
        color
    }

    /// Color the next call to [`ColorCycle::next_color`] will return.
    #[must_use]
    pub fn peek(&self) -> Color {
        Self::color_at(self.issued)
    }

    /// Starts again from the first palette entry.
    pub fn reset(&mut self) {
        self.issued = 0;
    }
}

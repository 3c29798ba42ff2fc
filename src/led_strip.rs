//! Transmission buffers for LED strips, plus gamma and brightness correction.
//!
//! A [`Frame1d`] holds one color per LED in the order the strip receives them. Effects
//! render into it through a [coordinate mapper](crate::xy); the last step before the
//! buffer leaves for the hardware is a [`Correction`], which folds gamma and a
//! brightness limit into one 256-entry lookup table.
//!
//! # Example
//!
//! ```rust
//! use ripple_panel::led_strip::{colors, Correction, Current, Frame1d, Gamma};
//!
//! // 64 LEDs on a 500 mA budget, with the usual sRGB-like curve.
//! const CORRECTION: Correction = Correction::with_current(Gamma::Gamma2_2, Current::Milliamps(500), 64);
//!
//! let mut frame = Frame1d::<64>::filled(colors::WHITE);
//! CORRECTION.apply(&mut frame);
//! assert!(frame[0].r < 255);
//! ```

/// Predefined RGB color constants from the `smart_leds` crate.
///
/// Common colors include `RED`, `GREEN`, `BLUE`, `YELLOW`, `WHITE`, `BLACK`, `CYAN`, `MAGENTA`, `ORANGE`, `PURPLE`.
#[doc(inline)]
pub use smart_leds::colors;

/// 8-bit-per-channel RGB color from `embedded_graphics`.
#[doc(inline)]
pub use embedded_graphics::pixelcolor::Rgb888;

/// RGB color type used by LED strip frames.
pub use smart_leds::RGB8;

use core::ops::{Deref, DerefMut};
use embedded_graphics::prelude::RgbColor;
use serde::{Deserialize, Serialize};

// ============================================================================
// Color conversion
// ============================================================================

/// Convert `embedded-graphics` colors to [`RGB8`] for LED strip rendering.
///
/// ```rust
/// use ripple_panel::led_strip::{Rgb888, ToRgb8, RGB8};
///
/// assert_eq!(Rgb888::new(16, 32, 48).to_rgb8(), RGB8::new(16, 32, 48));
/// ```
pub trait ToRgb8 {
    /// Convert this color to [`RGB8`].
    #[must_use]
    fn to_rgb8(self) -> RGB8;
}

impl ToRgb8 for Rgb888 {
    #[inline(always)]
    fn to_rgb8(self) -> RGB8 {
        RGB8::new(self.r(), self.g(), self.b())
    }
}

// ============================================================================
// Frame1d
// ============================================================================

/// Fixed-size transmission buffer: one color per LED, in wiring order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame1d<const N: usize>(pub [RGB8; N]);

impl<const N: usize> Frame1d<N> {
    /// Number of LEDs in this frame.
    pub const LEN: usize = N;

    /// Create a new blank (all black) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([RGB8::new(0, 0, 0); N])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: RGB8) -> Self {
        Self([color; N])
    }
}

impl<const N: usize> Deref for Frame1d<N> {
    type Target = [RGB8; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for Frame1d<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> From<[RGB8; N]> for Frame1d<N> {
    fn from(array: [RGB8; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> From<Frame1d<N>> for [RGB8; N] {
    fn from(frame: Frame1d<N>) -> Self {
        frame.0
    }
}

impl<const N: usize> Default for Frame1d<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Gamma Correction
// ============================================================================

/// Gamma correction mode for LED strips.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(all(feature = "defmt", not(feature = "host")), derive(defmt::Format))]
pub enum Gamma {
    /// Linear gamma (no correction). Gamma = 1.0
    #[default]
    Linear,
    /// Standard gamma 2.2 correction for perceived brightness.
    Gamma2_2,
}

/// Gamma 2.2 lookup table for 8-bit values.
/// Pre-computed to avoid floating point math: corrected = (value/255)^2.2 * 255
const GAMMA_2_2_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

impl Gamma {
    /// Apply this curve to one channel value.
    #[must_use]
    pub const fn correct(self, value: u8) -> u8 {
        match self {
            Self::Linear => value,
            Self::Gamma2_2 => GAMMA_2_2_TABLE[value as usize],
        }
    }
}

/// Generate a combined gamma correction and brightness scaling lookup table.
///
/// `combo_table[input_value]` is the gamma-corrected value scaled by
/// `max_brightness / 255`.
#[must_use]
pub const fn generate_combo_table(gamma: Gamma, max_brightness: u8) -> [u8; 256] {
    let mut result = [0u8; 256];
    let mut index = 0;
    while index < 256 {
        let gamma_corrected = gamma.correct(index as u8);
        // (value * brightness) / 255
        let scaled = ((gamma_corrected as u16 * max_brightness as u16) / 255) as u8;
        result[index] = scaled;
        index += 1;
    }
    result
}

// ============================================================================
// Current limiting
// ============================================================================

/// Worst-case draw of one WS2812-style LED at full white.
const MILLIAMPS_PER_LED: u32 = 60;

/// Current budget for a strip, turned into a brightness cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(all(feature = "defmt", not(feature = "host")), derive(defmt::Format))]
pub enum Current {
    /// Limit brightness so that every LED at full white stays within this many milliamps.
    Milliamps(u16),
    /// No limit; brightness stays at 100%.
    Unlimited,
}

impl Default for Current {
    fn default() -> Self {
        Self::Milliamps(250)
    }
}

impl Current {
    /// Brightness cap for `led_count` LEDs, 255 when the budget covers full white.
    #[must_use]
    pub const fn max_brightness(self, led_count: usize) -> u8 {
        let worst_case_ma = led_count as u32 * MILLIAMPS_PER_LED;
        match self {
            Self::Unlimited => 255,
            Self::Milliamps(_) if worst_case_ma == 0 => 255,
            Self::Milliamps(ma) => {
                let scale = (ma as u32 * 255) / worst_case_ma;
                if scale > 255 { 255 } else { scale as u8 }
            }
        }
    }
}

// ============================================================================
// Correction
// ============================================================================

/// Gamma curve and brightness cap, precomputed into one table and applied to a frame
/// just before transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Correction {
    combo_table: [u8; 256],
}

impl Correction {
    /// No correction at all.
    pub const NONE: Self = Self::new(Gamma::Linear, 255);

    /// Correction for an explicit brightness cap.
    #[must_use]
    pub const fn new(gamma: Gamma, max_brightness: u8) -> Self {
        Self {
            combo_table: generate_combo_table(gamma, max_brightness),
        }
    }

    /// Correction whose brightness cap keeps `led_count` LEDs within `current`.
    #[must_use]
    pub const fn with_current(gamma: Gamma, current: Current, led_count: usize) -> Self {
        Self::new(gamma, current.max_brightness(led_count))
    }

    /// Correct one color.
    #[must_use]
    #[inline]
    pub const fn correct(&self, color: RGB8) -> RGB8 {
        RGB8::new(
            self.combo_table[color.r as usize],
            self.combo_table[color.g as usize],
            self.combo_table[color.b as usize],
        )
    }

    /// Correct every LED of `frame` in place.
    pub fn apply<const N: usize>(&self, frame: &mut Frame1d<N>) {
        for color in frame.iter_mut() {
            *color = self.correct(*color);
        }
    }
}

impl Default for Correction {
    fn default() -> Self {
        Self::NONE
    }
}

//! Sixteen-stop color palettes sampled with a 16-bit index.
//!
//! The top four bits of the index pick a stop and the next eight bits blend toward the
//! following stop (stop 15 blends back into stop 0), so a slowly increasing index sweeps
//! smoothly around the palette.
//!
//! ```rust
//! use ripple_panel::palette::Palette16;
//! use ripple_panel::led_strip::RGB8;
//!
//! let red = Palette16::RAINBOW.color(0, 255);
//! assert_eq!(red, RGB8::new(0xFF, 0, 0));
//!
//! // Halfway between stop 15 and stop 0 wraps around.
//! let wrapped = Palette16::RAINBOW.color(0xF800, 255);
//! assert!(wrapped.r > 0xD5);
//!
//! // Zero brightness is black.
//! assert_eq!(Palette16::OCEAN.color(0x1234, 0), RGB8::default());
//! ```

use serde::{Deserialize, Serialize};
use smart_leds::RGB8;

use crate::math::scale8;

const fn hex(rgb: u32) -> RGB8 {
    RGB8::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// A palette of sixteen evenly spaced color stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette16(pub [RGB8; 16]);

impl Palette16 {
    /// Fully saturated hues around the color wheel.
    pub const RAINBOW: Self = Self([
        hex(0xFF0000),
        hex(0xD52A00),
        hex(0xAB5500),
        hex(0xAB7F00),
        hex(0xABAB00),
        hex(0x56D500),
        hex(0x00FF00),
        hex(0x00D52A),
        hex(0x00AB55),
        hex(0x0056AA),
        hex(0x0000FF),
        hex(0x2A00D5),
        hex(0x5500AB),
        hex(0x7F0081),
        hex(0xAB0055),
        hex(0xD5002B),
    ]);

    /// Blues, teals and sea greens.
    pub const OCEAN: Self = Self([
        hex(0x191970),
        hex(0x00008B),
        hex(0x191970),
        hex(0x000080),
        hex(0x00008B),
        hex(0x0000CD),
        hex(0x2E8B57),
        hex(0x008080),
        hex(0x5F9EA0),
        hex(0x0000FF),
        hex(0x008B8B),
        hex(0x6495ED),
        hex(0x7FFFD4),
        hex(0x2E8B57),
        hex(0x00FFFF),
        hex(0x87CEFA),
    ]);

    /// Sample the palette at `index`, then scale by `brightness` (255 leaves it unscaled).
    #[must_use]
    pub fn color(&self, index: u16, brightness: u8) -> RGB8 {
        let stop = usize::from(index >> 12);
        let blend = (index >> 4) as u8;
        let RGB8 { r, g, b } = self.0[stop];

        let (mut r, mut g, mut b) = (r, g, b);
        if blend != 0 {
            let next = self.0[(stop + 1) % 16];
            let keep = 255 - blend;
            r = scale8(r, keep).saturating_add(scale8(next.r, blend));
            g = scale8(g, keep).saturating_add(scale8(next.g, blend));
            b = scale8(b, keep).saturating_add(scale8(next.b, blend));
        }

        if brightness != 255 {
            r = scale8(r, brightness);
            g = scale8(g, brightness);
            b = scale8(b, brightness);
        }
        RGB8::new(r, g, b)
    }
}

/// Which built-in palette an effect draws with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(all(feature = "defmt", not(feature = "host")), derive(defmt::Format))]
pub enum PaletteChoice {
    /// [`Palette16::RAINBOW`]
    #[default]
    Rainbow,
    /// [`Palette16::OCEAN`]
    Ocean,
}

impl PaletteChoice {
    /// The palette this choice names.
    #[must_use]
    pub const fn palette(self) -> &'static Palette16 {
        match self {
            Self::Rainbow => &Palette16::RAINBOW,
            Self::Ocean => &Palette16::OCEAN,
        }
    }
}

//! Logical 2D frames for LED panels.
//!
//! A [`Frame2d`] is an in-memory `W × H` picture in screen order: `frame[(x, y)]` with
//! `(0, 0)` at the top-left. It implements the `embedded-graphics`
//! [`DrawTarget`], so text and shapes can be drawn into it, and converts to and from a
//! [`Frame1d`] transmission buffer through an [`XyLookup`].
//!
//! # Example: Draw over a rendered frame
//!
//! ```rust
//! use ripple_panel::led2d::Frame2d;
//! use ripple_panel::led_strip::{colors, Frame1d};
//! use ripple_panel::xy::{PanelXy, XyConfig, XyLookup};
//! use embedded_graphics::{
//!     pixelcolor::Rgb888,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//!
//! type Frame = Frame2d<8, 4>;
//! let lookup = XyLookup::<32>::from_map(&PanelXy::<{ XyConfig::SERPENTINE.bits() }, 8, 4>::new())?;
//!
//! let mut overlay = Frame::new();
//! Rectangle::new(Frame::TOP_LEFT, Frame::SIZE)
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb888::RED, 1))
//!     .draw(&mut overlay)
//!     .expect("drawing into a frame cannot fail");
//!
//! let mut strip = Frame1d::<32>::filled(colors::BLUE);
//! overlay.overlay_onto(&mut strip, &lookup)?;
//! assert_eq!(strip[0], colors::RED); // border
//! assert_eq!(strip[9], colors::BLUE); // (6, 1) is inside the border
//! # Ok::<(), ripple_panel::Error>(())
//! ```

use core::convert::Infallible;
use core::ops::{Deref, DerefMut, Index, IndexMut};

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::{DrawTarget, OriginDimensions, Pixel, Point, Size},
};
use smart_leds::RGB8;

use crate::led_strip::{Frame1d, ToRgb8};
use crate::xy::{XyLookup, XyMap};
use crate::{Error, Result};

/// Fixed-size 2D frame, stored row by row.
///
/// # Associated Constants
///
/// - `WIDTH`, `HEIGHT`, `LEN`: dimensions in pixels
/// - `SIZE`, `TOP_LEFT`, `TOP_RIGHT`, `BOTTOM_LEFT`, `BOTTOM_RIGHT`: the same, as
///   `embedded-graphics` values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame2d<const W: usize, const H: usize>(pub [[RGB8; W]; H]);

impl<const W: usize, const H: usize> Frame2d<W, H> {
    /// Frame2d width in pixels (columns).
    pub const WIDTH: usize = W;
    /// Frame2d height in pixels (rows).
    pub const HEIGHT: usize = H;
    /// Total number of pixels (WIDTH × HEIGHT).
    pub const LEN: usize = W * H;
    /// Frame dimensions as a [`Size`].
    pub const SIZE: Size = Size::new(W as u32, H as u32);
    /// Top-left corner coordinate as a [`Point`].
    pub const TOP_LEFT: Point = Point::new(0, 0);
    /// Top-right corner coordinate as a [`Point`].
    pub const TOP_RIGHT: Point = Point::new((W - 1) as i32, 0);
    /// Bottom-left corner coordinate as a [`Point`].
    pub const BOTTOM_LEFT: Point = Point::new(0, (H - 1) as i32);
    /// Bottom-right corner coordinate as a [`Point`].
    pub const BOTTOM_RIGHT: Point = Point::new((W - 1) as i32, (H - 1) as i32);

    /// Create a new blank (all black) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([[RGB8::new(0, 0, 0); W]; H])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: RGB8) -> Self {
        Self([[color; W]; H])
    }

    /// Rebuild the logical picture from a transmission buffer.
    ///
    /// # Errors
    ///
    /// [`Error::StorageLength`] if `lookup` does not describe a `W × H` matrix.
    pub fn from_strip<const N: usize>(strip: &Frame1d<N>, lookup: &XyLookup<N>) -> Result<Self> {
        check_dimensions::<W, H, N>(lookup)?;
        let mut frame = Self::new();
        for (y_index, row) in frame.0.iter_mut().enumerate() {
            for (x_index, pixel) in row.iter_mut().enumerate() {
                *pixel = strip[usize::from(lookup.map(x_index as u16, y_index as u16))];
            }
        }
        Ok(frame)
    }

    /// Lay this picture out in wiring order.
    ///
    /// # Errors
    ///
    /// [`Error::StorageLength`] if `lookup` does not describe a `W × H` matrix.
    pub fn to_strip<const N: usize>(&self, lookup: &XyLookup<N>) -> Result<Frame1d<N>> {
        check_dimensions::<W, H, N>(lookup)?;
        let mut strip = Frame1d::new();
        self.write_pixels(&mut strip, lookup, |_| true);
        Ok(strip)
    }

    /// Copy every non-black pixel of this frame over `strip`, leaving the rest of `strip`
    /// as it was.
    ///
    /// # Errors
    ///
    /// [`Error::StorageLength`] if `lookup` does not describe a `W × H` matrix.
    pub fn overlay_onto<const N: usize>(
        &self,
        strip: &mut Frame1d<N>,
        lookup: &XyLookup<N>,
    ) -> Result<()> {
        check_dimensions::<W, H, N>(lookup)?;
        self.write_pixels(strip, lookup, |color| color != RGB8::default());
        Ok(())
    }

    fn write_pixels<const N: usize>(
        &self,
        strip: &mut Frame1d<N>,
        lookup: &XyLookup<N>,
        keep: impl Fn(RGB8) -> bool,
    ) {
        for (y_index, row) in self.0.iter().enumerate() {
            for (x_index, &color) in row.iter().enumerate() {
                if keep(color) {
                    strip[usize::from(lookup.map(x_index as u16, y_index as u16))] = color;
                }
            }
        }
    }
}

fn check_dimensions<const W: usize, const H: usize, const N: usize>(
    lookup: &XyLookup<N>,
) -> Result<()> {
    if usize::from(lookup.width()) == W && usize::from(lookup.height()) == H {
        Ok(())
    } else {
        Err(Error::StorageLength {
            expected: lookup.len(),
            actual: W * H,
        })
    }
}

impl<const W: usize, const H: usize> Deref for Frame2d<W, H> {
    type Target = [[RGB8; W]; H];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const W: usize, const H: usize> DerefMut for Frame2d<W, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const W: usize, const H: usize> Index<(usize, usize)> for Frame2d<W, H> {
    type Output = RGB8;

    fn index(&self, (x_index, y_index): (usize, usize)) -> &Self::Output {
        assert!(x_index < W, "x_index must be within width");
        assert!(y_index < H, "y_index must be within height");
        &self.0[y_index][x_index]
    }
}

impl<const W: usize, const H: usize> IndexMut<(usize, usize)> for Frame2d<W, H> {
    fn index_mut(&mut self, (x_index, y_index): (usize, usize)) -> &mut Self::Output {
        assert!(x_index < W, "x_index must be within width");
        assert!(y_index < H, "y_index must be within height");
        &mut self.0[y_index][x_index]
    }
}

impl<const W: usize, const H: usize> From<[[RGB8; W]; H]> for Frame2d<W, H> {
    fn from(array: [[RGB8; W]; H]) -> Self {
        Self(array)
    }
}

impl<const W: usize, const H: usize> From<Frame2d<W, H>> for [[RGB8; W]; H] {
    fn from(frame: Frame2d<W, H>) -> Self {
        frame.0
    }
}

impl<const W: usize, const H: usize> Default for Frame2d<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> OriginDimensions for Frame2d<W, H> {
    fn size(&self) -> Size {
        Self::SIZE
    }
}

impl<const W: usize, const H: usize> DrawTarget for Frame2d<W, H> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(x_index), Ok(y_index)) = (usize::try_from(coord.x), usize::try_from(coord.y))
            else {
                continue;
            };
            if let Some(pixel) = self.0.get_mut(y_index).and_then(|row| row.get_mut(x_index)) {
                *pixel = color.to_rgb8();
            }
        }
        Ok(())
    }
}

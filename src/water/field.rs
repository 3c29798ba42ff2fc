//! Double-buffered, padded amplitude grid and the ripple update rule.
//!
//! Coordinates here are *padded*: the field is `(W + 2) × (H + 2)` cells, the outer ring
//! is the perimeter, and interior cell `(x, y)` for `1 <= x <= W`, `1 <= y <= H` shows
//! up as pixel `(x - 1, y - 1)` when rendered.

use fixed::types::U8F8;
use smart_leds::RGB8;

use crate::logging::debug;
use crate::xy::XyMap;
use crate::{Error, Result};

/// Largest interior width or height whose padded extent still fits 8.8 coordinates.
pub const MAX_SIDE: usize = 254;

/// One side of the field's perimeter, in clockwise order starting at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(all(feature = "defmt", not(feature = "host")), derive(defmt::Format))]
pub enum Side {
    /// Row 0, walked left to right.
    Top,
    /// Last column, walked top to bottom.
    Right,
    /// Last row, walked right to left.
    Bottom,
    /// Column 0, walked bottom to top.
    Left,
}

impl Side {
    /// All sides in clockwise order.
    pub const CLOCKWISE: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];
}

/// Wave amplitudes for a `W × H` matrix in two buffers of `PADDED == (W + 2) * (H + 2)`
/// cells.
///
/// The *front* buffer is the one last produced by [`advance`](Self::advance) and
/// [`swap_buffers`](Self::swap_buffers). It is what [`render`](Self::render) shows,
/// what [`inject`](Self::inject) adds to, and what the next `advance` reads neighbors
/// from. The *back* buffer holds the frame before that and is overwritten in place by
/// `advance`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveField<const W: usize, const H: usize, const PADDED: usize> {
    buffers: [[u8; PADDED]; 2],
    front: usize,
    damping: u8,
}

impl<const W: usize, const H: usize, const PADDED: usize> WaveField<W, H, PADDED> {
    /// Padded width, `W + 2`.
    pub const PADDED_WIDTH: usize = W + 2;
    /// Padded height, `H + 2`.
    pub const PADDED_HEIGHT: usize = H + 2;
    /// Number of perimeter cells.
    pub const PERIMETER_LEN: usize = 2 * (W + 1) + 2 * (H + 1);

    /// Create a still field whose perimeter holds `255 - damping`.
    ///
    /// # Errors
    ///
    /// [`Error::FieldTooSmall`] below 2×2, [`Error::FieldTooLarge`] above
    /// [`MAX_SIDE`] on either side, [`Error::StorageLength`] if `PADDED` is wrong.
    pub fn new(damping: u8) -> Result<Self> {
        if W < 2 || H < 2 {
            return Err(Error::FieldTooSmall);
        }
        if W > MAX_SIDE || H > MAX_SIDE {
            return Err(Error::FieldTooLarge { max: MAX_SIDE });
        }
        let expected = Self::PADDED_WIDTH * Self::PADDED_HEIGHT;
        if PADDED != expected {
            return Err(Error::StorageLength {
                expected,
                actual: PADDED,
            });
        }

        let mut field = Self {
            buffers: [[0; PADDED]; 2],
            front: 0,
            damping,
        };
        field.set_edge_damping(damping);
        Ok(field)
    }

    /// The configured edge damping.
    #[must_use]
    pub const fn damping(&self) -> u8 {
        self.damping
    }

    /// Value written to undriven perimeter cells, `255 - damping`.
    #[must_use]
    pub const fn perimeter_value(&self) -> u8 {
        255 - self.damping
    }

    /// Change the edge damping and repaint the whole perimeter of both buffers.
    ///
    /// Higher damping absorbs more of each wave at the edges; 0 reflects almost
    /// everything.
    pub fn set_edge_damping(&mut self, damping: u8) {
        self.damping = damping;
        let value = self.perimeter_value();
        for position in 0..Self::PERIMETER_LEN {
            self.set_perimeter(position, value);
        }
        debug!("edge damping set to {}", damping);
    }

    /// Front-buffer amplitude at padded `(x, y)`.
    ///
    /// Requires `x < W + 2` and `y < H + 2`.
    #[must_use]
    #[inline(always)]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.front()[y * Self::PADDED_WIDTH + x]
    }

    /// Front-buffer amplitude at padded `(x, y)`, or `None` outside the field.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < Self::PADDED_WIDTH && y < Self::PADDED_HEIGHT {
            Some(self.at(x, y))
        } else {
            None
        }
    }

    /// The front buffer, row-major over the padded grid.
    #[must_use]
    pub fn front(&self) -> &[u8; PADDED] {
        &self.buffers[self.front]
    }

    /// The back buffer, row-major over the padded grid.
    #[must_use]
    pub fn back(&self) -> &[u8; PADDED] {
        &self.buffers[1 - self.front]
    }

    /// Add a stimulus at the sub-cell position `(x, y)`, spread over the four nearest
    /// interior cells of the front buffer with Wu weights.
    ///
    /// Does nothing when the whole part of `x` or `y` lands on or past the far
    /// perimeter. Cells on the near perimeter are skipped. Additions saturate at 255.
    pub fn inject(&mut self, x: U8F8, y: U8F8, intensity: u8) {
        let (x_bits, y_bits) = (usize::from(x.to_bits()), usize::from(y.to_bits()));
        if x_bits >= (Self::PADDED_WIDTH - 1) << 8 || y_bits >= (Self::PADDED_HEIGHT - 1) << 8 {
            return;
        }

        let fraction_x = x.frac().to_bits() as u8;
        let fraction_y = y.frac().to_bits() as u8;
        let (inverse_x, inverse_y) = (255 - fraction_x, 255 - fraction_y);
        let weights = [
            wu_weight(inverse_x, inverse_y),
            wu_weight(fraction_x, inverse_y),
            wu_weight(inverse_x, fraction_y),
            wu_weight(fraction_x, fraction_y),
        ];

        let front = self.front;
        let buffer = &mut self.buffers[front];
        for (corner, weight) in weights.into_iter().enumerate() {
            let cell_x = (x_bits >> 8) + (corner & 1);
            let cell_y = (y_bits >> 8) + (corner >> 1);
            if cell_x == 0 || cell_x >= Self::PADDED_WIDTH - 1 {
                continue;
            }
            if cell_y == 0 || cell_y >= Self::PADDED_HEIGHT - 1 {
                continue;
            }
            let added = ((u16::from(intensity) * u16::from(weight)) >> 8) as u8;
            let cell = &mut buffer[cell_y * Self::PADDED_WIDTH + cell_x];
            *cell = cell.saturating_add(added);
        }
    }

    /// Step the simulation: every interior cell of the back buffer is replaced by
    /// [`ripple_cell`] of its own old value and its four front-buffer neighbors.
    pub fn advance(&mut self) {
        let [first, second] = &mut self.buffers;
        let (source, destination) = if self.front == 0 {
            (&*first, second)
        } else {
            (&*second, first)
        };

        let width = Self::PADDED_WIDTH;
        for y_index in 1..=H {
            let row = y_index * width;
            for x_index in 1..=W {
                let cell = row + x_index;
                let neighbors = u16::from(source[cell - 1])
                    + u16::from(source[cell + 1])
                    + u16::from(source[cell - width])
                    + u16::from(source[cell + width]);
                destination[cell] = ripple_cell(neighbors, destination[cell]);
            }
        }
    }

    /// Make the freshly advanced back buffer the front buffer.
    pub const fn swap_buffers(&mut self) {
        self.front = 1 - self.front;
    }

    /// Write every interior cell of the front buffer, row by row, to
    /// `out[xy_map.map(x, y)]` as `color(amplitude)`. Indices past the end of `out` are
    /// skipped.
    pub fn render<M, F>(&self, xy_map: &M, out: &mut [RGB8], mut color: F)
    where
        M: XyMap + ?Sized,
        F: FnMut(u8) -> RGB8,
    {
        let front = self.front();
        for y_index in 0..H {
            let row = &front[(y_index + 1) * Self::PADDED_WIDTH + 1..][..W];
            for (x_index, &amplitude) in row.iter().enumerate() {
                let led_index = xy_map.map(x_index as u16, y_index as u16);
                if let Some(pixel) = out.get_mut(usize::from(led_index)) {
                    *pixel = color(amplitude);
                }
            }
        }
    }

    /// Number of perimeter cells along `side`.
    #[must_use]
    pub const fn side_len(side: Side) -> usize {
        match side {
            Side::Top | Side::Bottom => Self::PADDED_WIDTH - 1,
            Side::Right | Side::Left => Self::PADDED_HEIGHT - 1,
        }
    }

    /// Clockwise position of the first cell of `side`.
    #[must_use]
    pub const fn side_start(side: Side) -> usize {
        match side {
            Side::Top => 0,
            Side::Right => Self::PADDED_WIDTH - 1,
            Side::Bottom => Self::PADDED_WIDTH + Self::PADDED_HEIGHT - 2,
            Side::Left => 2 * Self::PADDED_WIDTH + Self::PADDED_HEIGHT - 3,
        }
    }

    /// Padded `(x, y)` of the perimeter cell at clockwise `position` from the top-left
    /// corner, or `None` past the end.
    #[must_use]
    pub const fn perimeter_xy(position: usize) -> Option<(usize, usize)> {
        let across = Self::PADDED_WIDTH - 1;
        let down = Self::PADDED_HEIGHT - 1;
        if position < across {
            Some((position, 0))
        } else if position < across + down {
            Some((across, position - across))
        } else if position < 2 * across + down {
            Some((across - (position - across - down), down))
        } else if position < Self::PERIMETER_LEN {
            Some((0, down - (position - 2 * across - down)))
        } else {
            None
        }
    }

    /// Write `value` to the perimeter cell at clockwise `position` in both buffers.
    /// Positions past the end are ignored.
    pub fn set_perimeter(&mut self, position: usize, value: u8) {
        if let Some((x_index, y_index)) = Self::perimeter_xy(position) {
            let cell = y_index * Self::PADDED_WIDTH + x_index;
            for buffer in &mut self.buffers {
                buffer[cell] = value;
            }
        }
    }
}

/// Wu weight for the pair of fractions `a` and `b`: `(a * b + a + b) >> 8`.
#[must_use]
pub const fn wu_weight(a: u8, b: u8) -> u8 {
    let (a, b) = (a as u16, b as u16);
    ((a * b + a + b) >> 8) as u8
}

/// New amplitude of a cell whose four neighbors sum to `neighbors` and whose value two
/// frames ago was `previous`.
///
/// Differences below zero reflect back up instead of clamping, keeping a little more
/// energy in the field.
#[must_use]
pub const fn ripple_cell(neighbors: u16, previous: u8) -> u8 {
    let spread = 64 * neighbors;
    let held = 128 * previous as u16;
    if spread <= held {
        ((held - spread) >> 8) as u8
    } else {
        let remainder = spread - held;
        if remainder < 32768 {
            (remainder >> 7) as u8
        } else {
            255
        }
    }
}

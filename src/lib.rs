//! Coordinate mapping and a water ripple effect for serpentine and tiled LED matrices.
//!
//! - [`xy`]: turn logical `(x, y)` into the index an LED strip expects, for any mix of
//!   serpentine wiring, column-major strips, mirrored panels, and tiled panels. The
//!   layout can be fixed at compile time ([`xy::PanelsXy`]) or chosen at run time
//!   ([`xy::DynXy`]); both give the same answers.
//! - [`water`]: a fixed-point ripple simulation with sub-cell stimulus and damped or
//!   driven edges, rendered through a [`palette`] into a [`led_strip::Frame1d`].
//! - [`settings`]: the effect's tunables and a CRC-checked record for storing them.
//!
//! Everything runs without an allocator and without floating point. Enable the `host`
//! feature for `std`, PNG previews ([`to_png`]), and the integration tests.
//!
//! # Glossary
//!
//! - **Major axis:** the direction the strip runs inside a panel (rows unless
//!   column-major); the **minor axis** is the one it steps along between lines.
//! - **Serpentine:** every other line runs backwards, so the strip snakes back and forth.
//! - **Tiling:** several equal panels chained into one matrix; each panel owns a
//!   contiguous range of indices.
//! - **Perimeter:** the one-cell ring around the simulated field that implements the
//!   boundary, either a fixed damping value or a driven wave.
//! - **8.8 fixed point:** a `u16` whose high byte is the whole cell and low byte the
//!   fraction, used to place a stimulus between cells.
//! - **Wu weighting:** splitting one sub-cell stimulus over its four nearest cells with
//!   weights `(a * b + a + b) >> 8`.
#![cfg_attr(not(any(test, feature = "host")), no_std)]

mod error;
pub(crate) mod logging;

pub mod led2d;
pub mod led_strip;
pub mod math;
pub mod palette;
pub mod settings;
#[cfg(feature = "host")]
pub mod to_png;
pub mod water;
pub mod xy;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

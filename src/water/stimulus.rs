//! Stimulus generators: a wandering point and occasional random drops.

use embassy_time::Instant;
use fixed::types::U8F8;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::math::{beatsin16, sin16};

/// A point stimulus in padded field coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stimulus {
    /// Column, 8.8 fixed point.
    pub x: U8F8,
    /// Row, 8.8 fixed point.
    pub y: U8F8,
    /// Amount added at full weight.
    pub intensity: u8,
}

/// Intensity of a random drop.
pub const DROP_INTENSITY: u8 = 64;

/// A drop falls on a frame when a random byte is above this.
const DROP_THRESHOLD: u8 = 200;

// `sin16(phase)` shifted into `1..=65535`.
fn unit_sin(phase: u16) -> u32 {
    (i32::from(sin16(phase)) + 32768).unsigned_abs()
}

fn coordinate(bits: u32) -> U8F8 {
    U8F8::from_bits(u16::try_from(bits).unwrap_or(u16::MAX))
}

/// Stimulus that wanders over the field along a Lissajous-like path, with intensity
/// swelling and fading on a slower beat.
///
/// The phase speeds are themselves slow sine beats of the frame timestamp, so the path
/// never settles into a fixed loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovingStimulus {
    phase: [u16; 3],
}

impl MovingStimulus {
    /// Start with all phases at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { phase: [0; 3] }
    }

    /// Advance the phases for the frame at `now` and return the stimulus for a
    /// `width × height` matrix.
    pub fn step(&mut self, now: Instant, width: usize, height: usize) -> Stimulus {
        let [x_phase, y_phase, z_phase] = &mut self.phase;
        *x_phase = x_phase.wrapping_add(beatsin16(9, 500, 1800, now));
        *y_phase = y_phase.wrapping_add(beatsin16(7, 500, 1500, now));
        *z_phase = z_phase.wrapping_add(beatsin16(2, 500, 5000, now));

        let span_x = width.saturating_sub(2) as u32;
        let span_y = height.saturating_sub(2) as u32;
        let x = 256 + ((span_x * unit_sin(*x_phase)) >> 8);
        let y = 256 + ((span_y * unit_sin(*y_phase)) >> 8);
        let intensity = 127 + (unit_sin(*z_phase) >> 9) as u8;

        Stimulus {
            x: coordinate(x),
            y: coordinate(y),
            intensity,
        }
    }
}

/// Occasional drops at random cells, from a seeded PRNG so runs are repeatable.
#[derive(Clone, Debug)]
pub struct RandomDrops {
    rng: SmallRng,
}

impl RandomDrops {
    /// Create a drop source from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Roll for a drop this frame on a `width × height` matrix.
    ///
    /// Returns the drop position (on a whole interior cell's span) about one frame in
    /// five, and `None` otherwise.
    pub fn roll(&mut self, width: usize, height: usize) -> Option<Stimulus> {
        if self.rng.r#gen::<u8>() <= DROP_THRESHOLD {
            return None;
        }
        let x = 256 + width as u32 * u32::from(self.rng.r#gen::<u8>());
        let y = 256 + height as u32 * u32::from(self.rng.r#gen::<u8>());
        Some(Stimulus {
            x: coordinate(x),
            y: coordinate(y),
            intensity: DROP_INTENSITY,
        })
    }
}

//! Driven boundaries: a cosine wave travelling clockwise around selected edges.

use core::ops::BitOr;

use serde::{Deserialize, Serialize};

use super::field::{Side, WaveField};
use crate::math::cos8;
use crate::{Error, Result};

/// Set of perimeter sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(all(feature = "defmt", not(feature = "host")), derive(defmt::Format))]
pub struct EdgeMask(u8);

impl EdgeMask {
    /// No sides.
    pub const NONE: Self = Self(0);
    /// The top row.
    pub const TOP: Self = Self(1);
    /// The right column.
    pub const RIGHT: Self = Self(2);
    /// The bottom row.
    pub const BOTTOM: Self = Self(4);
    /// The left column.
    pub const LEFT: Self = Self(8);
    /// All four sides.
    pub const ALL: Self = Self(0x0F);

    /// Build from raw bits; unknown bits are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Sides in either mask.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when no side is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when `side` is selected.
    #[must_use]
    pub const fn has(self, side: Side) -> bool {
        let bit = match side {
            Side::Top => Self::TOP,
            Side::Right => Self::RIGHT,
            Side::Bottom => Self::BOTTOM,
            Side::Left => Self::LEFT,
        };
        self.0 & bit.0 != 0
    }
}

impl BitOr for EdgeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Perimeter wave generator.
///
/// Each frame the phase moves forward by `phase_step` and every cell of the selected
/// sides, walked clockwise as one strip, gets `cos8(phase + position * 256 * cycles / len) / 3`
/// where `len` is the combined length of the selected sides. The wave therefore shows
/// `cycles` full periods along the driven perimeter and travels along it over time.
///
/// ```rust
/// use ripple_panel::water::{EdgeMask, EdgeWaves, WaveField};
///
/// let mut field = WaveField::<8, 8, 100>::new(250)?;
/// let mut waves = EdgeWaves::new(EdgeMask::TOP | EdgeMask::LEFT, 4, 2)?;
/// waves.drive(&mut field);
/// assert!(field.at(3, 0) <= 85);
/// assert_eq!(field.at(9, 4), 5); // right side keeps the damping value
/// # Ok::<(), ripple_panel::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeWaves {
    edges: EdgeMask,
    phase_step: u8,
    cycles: u8,
    phase: u8,
}

impl EdgeWaves {
    /// Create a generator for `edges`.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroLengthEdgeCycle`] if `edges` is empty or `cycles` is zero.
    pub const fn new(edges: EdgeMask, phase_step: u8, cycles: u8) -> Result<Self> {
        if edges.is_empty() || cycles == 0 {
            return Err(Error::ZeroLengthEdgeCycle);
        }
        Ok(Self {
            edges,
            phase_step,
            cycles,
            phase: 0,
        })
    }

    /// The driven sides.
    #[must_use]
    pub const fn edges(&self) -> EdgeMask {
        self.edges
    }

    /// Current phase accumulator.
    #[must_use]
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// Restart the wave at `phase`.
    pub const fn set_phase(&mut self, phase: u8) {
        self.phase = phase;
    }

    /// Advance the phase once and paint the driven sides of both buffers.
    pub fn drive<const W: usize, const H: usize, const PADDED: usize>(
        &mut self,
        field: &mut WaveField<W, H, PADDED>,
    ) {
        self.phase = self.phase.wrapping_add(self.phase_step);

        let driven_len: usize = Side::CLOCKWISE
            .into_iter()
            .filter(|&side| self.edges.has(side))
            .map(WaveField::<W, H, PADDED>::side_len)
            .sum();
        let cycles = usize::from(self.cycles);

        let mut position = 0_usize;
        for side in Side::CLOCKWISE {
            if !self.edges.has(side) {
                continue;
            }
            let start = WaveField::<W, H, PADDED>::side_start(side);
            for offset in 0..WaveField::<W, H, PADDED>::side_len(side) {
                let angle = (position * 256 * cycles / driven_len) as u8;
                field.set_perimeter(start + offset, cos8(self.phase.wrapping_add(angle)) / 3);
                position += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_cycles() {
        assert_eq!(
            EdgeWaves::new(EdgeMask::NONE, 1, 1),
            Err(Error::ZeroLengthEdgeCycle)
        );
        assert_eq!(
            EdgeWaves::new(EdgeMask::ALL, 1, 0),
            Err(Error::ZeroLengthEdgeCycle)
        );
    }

    #[test]
    fn drives_only_selected_sides() {
        let mut field = WaveField::<4, 4, 36>::new(200).expect("valid field");
        let mut waves = EdgeWaves::new(EdgeMask::BOTTOM, 0, 1).expect("valid generator");
        waves.drive(&mut field);
        // Bottom side starts at the bottom-right corner: phase 0, cos8(0) / 3.
        assert_eq!(field.at(5, 5), cos8(0) / 3);
        assert_eq!(field.back()[5 * 6 + 5], cos8(0) / 3);
        assert_eq!(field.at(0, 0), 55);
        assert_eq!(field.at(5, 2), 55);
    }

    #[test]
    fn phase_wraps() {
        let mut field = WaveField::<2, 2, 16>::new(250).expect("valid field");
        let mut waves = EdgeWaves::new(EdgeMask::ALL, 200, 3).expect("valid generator");
        waves.drive(&mut field);
        waves.drive(&mut field);
        assert_eq!(waves.phase(), 144);
    }

    #[test]
    fn mask_from_bits_drops_unknown() {
        assert_eq!(EdgeMask::from_bits(0xFF), EdgeMask::ALL);
        assert!(EdgeMask::ALL.has(Side::Left));
        assert!(!EdgeMask::TOP.has(Side::Bottom));
    }
}

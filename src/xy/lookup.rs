//! Precomputed `(x, y)` → transmission index table.
//!
//! Building the table checks that the mapping reaches every index exactly once, so an
//! effect that renders through an [`XyLookup`] can index its output buffer without
//! further checks.

use super::XyMap;
use crate::{Error, Result};

/// Lookup table for a `N`-pixel matrix, stored in row-major `(x, y)` order together
/// with its inverse.
///
/// ```rust
/// use ripple_panel::xy::{PanelXy, XyConfig, XyLookup, XyMap};
///
/// let panel = PanelXy::<{ XyConfig::SERPENTINE.bits() }, 3, 2>::new();
/// let lookup = XyLookup::<6>::from_map(&panel)?;
/// assert_eq!(lookup.map(0, 1), 5);
/// assert_eq!(*lookup.index_to_xy(), [(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1)]);
/// # Ok::<(), ripple_panel::Error>(())
/// ```
///
/// ```text
/// 3×2 serpentine:
///   LED0  LED1  LED2
///   LED5  LED4  LED3
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XyLookup<const N: usize> {
    index_by_xy: [u16; N],
    xy_by_index: [(u16, u16); N],
    width: u16,
    height: u16,
}

impl<const N: usize> XyLookup<N> {
    /// Tabulate `xy_map`, checking that it is a bijection onto `0..N`.
    ///
    /// # Errors
    ///
    /// [`Error::StorageLength`] if `N` is not `width * height`,
    /// [`Error::IndexOutOfRange`] or [`Error::DuplicateIndex`] if the mapping is not a
    /// bijection.
    pub fn from_map<M: XyMap + ?Sized>(xy_map: &M) -> Result<Self> {
        let width = xy_map.width();
        let height = xy_map.height();
        if xy_map.len() != N {
            return Err(Error::StorageLength {
                expected: xy_map.len(),
                actual: N,
            });
        }

        let mut index_by_xy = [0_u16; N];
        let mut xy_by_index = [(0_u16, 0_u16); N];
        let mut seen = [false; N];
        let mut slots = index_by_xy.iter_mut();
        for y_index in 0..height {
            for x_index in 0..width {
                let led_index = xy_map.map(x_index, y_index);
                let seen_slot = seen
                    .get_mut(usize::from(led_index))
                    .ok_or(Error::IndexOutOfRange { index: led_index })?;
                if *seen_slot {
                    return Err(Error::DuplicateIndex { index: led_index });
                }
                *seen_slot = true;
                if let Some(slot) = slots.next() {
                    *slot = led_index;
                }
                if let Some(xy) = xy_by_index.get_mut(usize::from(led_index)) {
                    *xy = (x_index, y_index);
                }
            }
        }

        Ok(Self {
            index_by_xy,
            xy_by_index,
            width,
            height,
        })
    }

    /// The inverse table: entry `i` is the `(x, y)` wired at transmission index `i`.
    #[must_use]
    pub const fn index_to_xy(&self) -> &[(u16, u16); N] {
        &self.xy_by_index
    }
}

impl<const N: usize> XyMap for XyLookup<N> {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn map(&self, x: u16, y: u16) -> u16 {
        self.index_by_xy[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xy::{DynXy, Geometry, XyConfig};

    struct Collapsed;

    impl XyMap for Collapsed {
        fn width(&self) -> u16 {
            2
        }

        fn height(&self) -> u16 {
            2
        }

        fn map(&self, x: u16, _y: u16) -> u16 {
            x
        }
    }

    struct Overflowing;

    impl XyMap for Overflowing {
        fn width(&self) -> u16 {
            2
        }

        fn height(&self) -> u16 {
            1
        }

        fn map(&self, x: u16, _y: u16) -> u16 {
            x + 5
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let xy_map = DynXy::new(XyConfig::RASTER, Geometry::single(4, 4)).expect("valid geometry");
        assert_eq!(
            XyLookup::<15>::from_map(&xy_map),
            Err(Error::StorageLength {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn rejects_duplicate_index() {
        assert_eq!(
            XyLookup::<4>::from_map(&Collapsed),
            Err(Error::DuplicateIndex { index: 0 })
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert_eq!(
            XyLookup::<2>::from_map(&Overflowing),
            Err(Error::IndexOutOfRange { index: 5 })
        );
    }

    #[test]
    fn matches_source_mapping() {
        let xy_map = DynXy::new(
            XyConfig::SERPENTINE | XyConfig::COLUMN_MAJOR,
            Geometry::single(5, 3),
        )
        .expect("valid geometry");
        let lookup = XyLookup::<15>::from_map(&xy_map).expect("bijective mapping");
        for y_index in 0..3 {
            for x_index in 0..5 {
                assert_eq!(lookup.map(x_index, y_index), xy_map.map(x_index, y_index));
            }
        }
    }

    #[test]
    fn inverse_is_stored_with_table() {
        let xy_map = DynXy::new(XyConfig::SERPENTINE, Geometry::single(4, 2)).expect("valid geometry");
        let lookup = XyLookup::<8>::from_map(&xy_map).expect("bijective mapping");
        let inverse = lookup.index_to_xy();
        assert_eq!(inverse[3], (3, 0));
        assert_eq!(inverse[4], (3, 1));
        for (led_index, &(x_index, y_index)) in inverse.iter().enumerate() {
            assert_eq!(usize::from(lookup.map(x_index, y_index)), led_index);
        }
    }
}

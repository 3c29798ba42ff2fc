//! Map logical `(x, y)` pixel coordinates to transmission indices for serpentine and tiled panels.
//!
//! Coordinates use a screen-style convention: `(0, 0)` is the top-left corner,
//! `x` increases to the right, and `y` increases downward. The LED strip inside a panel
//! runs along the *major* axis (rows by default, columns with [`XyConfig::COLUMN_MAJOR`])
//! and steps along the *minor* axis at the end of each line.
//!
//! Three mappers implement [`XyMap`]:
//! - [`PanelXy`] / [`PanelsXy`]: flags and sizes are const generics. Every branch on a
//!   flag and every division by a panel size folds away at compile time.
//! - [`DynXy`]: flags and sizes are runtime values, validated once by [`DynXy::new`].
//! - [`XyLookup`]: a table built once from any of the above.
//!
//! [`xy_panel`] and [`xy_panels`] are the runtime mapping functions themselves. The
//! constant mappers carry their own implementation of the same algorithm; the
//! `mapping_equivalence` tests check that both agree for every flag combination.
//!
//! # Example
//!
//! Two 16×32 panels side by side, each wired in columns that snake up and down:
//!
//! ```rust
//! use ripple_panel::xy::{DynXy, Geometry, PanelsXy, XyConfig, XyMap};
//!
//! const CONFIG: XyConfig = XyConfig::SERPENTINE
//!     .union(XyConfig::COLUMN_MAJOR)
//!     .union(XyConfig::SERPENTINE_TILING);
//! type Matrix = PanelsXy<{ CONFIG.bits() }, 32, 32, 16, 32>;
//!
//! let fast = Matrix::new();
//! let flexible = DynXy::new(CONFIG, Geometry::tiled(32, 32, 16, 32))?;
//!
//! assert_eq!(fast.map(0, 0), 0);
//! assert_eq!(fast.map(0, 1), 1); // down the first column
//! assert_eq!(fast.map(1, 31), 32); // back up the second
//! assert_eq!(fast.map(31, 0), flexible.map(31, 0));
//! # Ok::<(), ripple_panel::Error>(())
//! ```
//!
//! ```text
//! 4×2 panel, SERPENTINE (row major):     4×2 panel, SERPENTINE | COLUMN_MAJOR:
//!   LED0  LED1  LED2  LED3                 LED0  LED3  LED4  LED7
//!   LED7  LED6  LED5  LED4                 LED1  LED2  LED5  LED6
//! ```

pub mod lookup;

pub use lookup::XyLookup;

use core::ops::BitOr;

use crate::{Error, Result};

/// Wiring flags for a panel and for the tiling of panels into a matrix.
///
/// Combine flags with `|` at runtime or [`union`](Self::union) in `const` contexts.
/// The raw [`bits`](Self::bits) are what the constant mappers take as a const generic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct XyConfig(u8);

impl XyConfig {
    /// Plain raster order: every row left to right, top to bottom.
    pub const RASTER: Self = Self(0);
    /// Odd rows (or columns) run in the opposite direction.
    pub const SERPENTINE: Self = Self(1);
    /// The strip runs down columns rather than across rows.
    pub const COLUMN_MAJOR: Self = Self(2);
    /// Mirror each panel along its major axis.
    pub const FLIP_MAJOR: Self = Self(4);
    /// Mirror each panel along its minor axis.
    pub const FLIP_MINOR: Self = Self(8);
    /// Odd rows (or columns) of panels run in the opposite direction.
    pub const SERPENTINE_TILING: Self = Self(16);
    /// Panels are chained down columns rather than across rows.
    pub const VERTICAL_TILING: Self = Self(32);

    const ALL_BITS: u8 = 0x3F;

    /// Number of distinct flag combinations.
    pub const COMBINATIONS: u8 = Self::ALL_BITS + 1;

    /// Build from raw bits; unknown bits are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    /// Raw bits, suitable as the `CONFIG` const generic of [`PanelXy`] and [`PanelsXy`].
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Flags set in either `self` or `other`.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when every flag in `other` is also set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for XyConfig {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Something that turns a logical `(x, y)` into a transmission index.
///
/// `map` requires `x < width()` and `y < height()`. It does not check; the result for
/// out-of-range input is unspecified.
pub trait XyMap {
    /// Matrix width in pixels.
    fn width(&self) -> u16;

    /// Matrix height in pixels.
    fn height(&self) -> u16;

    /// Transmission index for `(x, y)`, in `0..width * height`.
    fn map(&self, x: u16, y: u16) -> u16;

    /// Total number of pixels.
    fn len(&self) -> usize {
        usize::from(self.width()) * usize::from(self.height())
    }
}

/// Map `(x, y)` on a single `width × height` panel.
#[must_use]
#[inline]
pub const fn xy_panel(config: XyConfig, x: u16, y: u16, width: u16, height: u16) -> u16 {
    let (mut major, mut minor, size_major, size_minor) = if config.contains(XyConfig::COLUMN_MAJOR)
    {
        (y, x, height, width)
    } else {
        (x, y, width, height)
    };
    if config.contains(XyConfig::FLIP_MINOR) {
        minor = size_minor - 1 - minor;
    }
    let odd_line = minor & 1 == 1;
    if config.contains(XyConfig::FLIP_MAJOR)
        ^ (odd_line && config.contains(XyConfig::SERPENTINE))
    {
        major = size_major - 1 - major;
    }
    minor * size_major + major
}

/// Map `(x, y)` on a `width × height` matrix tiled from `panel_width × panel_height` panels.
///
/// Panels are numbered along the tiling direction (rows of panels, or columns with
/// [`XyConfig::VERTICAL_TILING`]) and each one occupies a contiguous index range.
#[must_use]
#[inline]
pub const fn xy_panels(
    config: XyConfig,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    panel_width: u16,
    panel_height: u16,
) -> u16 {
    let x_panels = width / panel_width;
    let y_panels = height / panel_height;
    let mut x_panel = x / panel_width;
    let mut y_panel = y / panel_height;

    let vertical = config.contains(XyConfig::VERTICAL_TILING);
    if config.contains(XyConfig::SERPENTINE_TILING) {
        if vertical {
            if x_panel & 1 == 1 {
                y_panel = y_panels - 1 - y_panel;
            }
        } else if y_panel & 1 == 1 {
            x_panel = x_panels - 1 - x_panel;
        }
    }

    let panel_index = if vertical {
        y_panels * x_panel + y_panel
    } else {
        x_panels * y_panel + x_panel
    };
    let panel_offset = panel_width * panel_height * panel_index;

    panel_offset
        + xy_panel(
            config,
            x % panel_width,
            y % panel_height,
            panel_width,
            panel_height,
        )
}

/// Matrix and panel dimensions, checked by [`Geometry::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Matrix width in pixels.
    pub width: u16,
    /// Matrix height in pixels.
    pub height: u16,
    /// Width of one panel.
    pub panel_width: u16,
    /// Height of one panel.
    pub panel_height: u16,
}

impl Geometry {
    /// A matrix made of one panel.
    #[must_use]
    pub const fn single(width: u16, height: u16) -> Self {
        Self::tiled(width, height, width, height)
    }

    /// A matrix tiled from equal panels.
    #[must_use]
    pub const fn tiled(width: u16, height: u16, panel_width: u16, panel_height: u16) -> Self {
        Self {
            width,
            height,
            panel_width,
            panel_height,
        }
    }

    /// True when the matrix is exactly one panel.
    #[must_use]
    pub const fn is_single_panel(&self) -> bool {
        self.width == self.panel_width && self.height == self.panel_height
    }

    /// Check that the matrix is non-empty, a whole number of panels, and `u16`-addressable.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroDimension`], [`Error::PartialPanel`], or [`Error::MatrixTooLarge`].
    pub const fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.panel_width == 0 || self.panel_height == 0
        {
            return Err(Error::ZeroDimension);
        }
        if self.width % self.panel_width != 0 || self.height % self.panel_height != 0 {
            return Err(Error::PartialPanel {
                matrix_width: self.width,
                matrix_height: self.height,
                panel_width: self.panel_width,
                panel_height: self.panel_height,
            });
        }
        if self.width as u32 * self.height as u32 > u16::MAX as u32 {
            return Err(Error::MatrixTooLarge);
        }
        Ok(())
    }
}

/// Runtime-configured mapper: flags and geometry chosen when the display is set up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DynXy {
    config: XyConfig,
    geometry: Geometry,
}

impl DynXy {
    /// Validate `geometry` and build a mapper for it.
    ///
    /// # Errors
    ///
    /// Any error from [`Geometry::validate`].
    pub const fn new(config: XyConfig, geometry: Geometry) -> Result<Self> {
        if let Err(error) = geometry.validate() {
            return Err(error);
        }
        Ok(Self { config, geometry })
    }

    /// The wiring flags.
    #[must_use]
    pub const fn config(&self) -> XyConfig {
        self.config
    }

    /// The matrix and panel dimensions.
    #[must_use]
    pub const fn geometry(&self) -> Geometry {
        self.geometry
    }
}

impl XyMap for DynXy {
    fn width(&self) -> u16 {
        self.geometry.width
    }

    fn height(&self) -> u16 {
        self.geometry.height
    }

    #[inline]
    fn map(&self, x: u16, y: u16) -> u16 {
        let geometry = &self.geometry;
        if geometry.is_single_panel() {
            xy_panel(self.config, x, y, geometry.width, geometry.height)
        } else {
            xy_panels(
                self.config,
                x,
                y,
                geometry.width,
                geometry.height,
                geometry.panel_width,
                geometry.panel_height,
            )
        }
    }
}

/// Single-panel mapper with flags and size fixed at compile time.
///
/// `CONFIG` is [`XyConfig::bits`]. Invalid sizes fail to compile when [`Self::new`] is
/// instantiated.
///
/// ```rust
/// use ripple_panel::xy::{PanelXy, XyConfig, XyMap};
///
/// let panel = PanelXy::<{ XyConfig::SERPENTINE.bits() }, 4, 2>::new();
/// assert_eq!(panel.map(3, 0), 3);
/// assert_eq!(panel.map(3, 1), 4); // second row runs back
/// assert_eq!(panel.map(0, 1), 7);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelXy<const CONFIG: u8, const W: u16, const H: u16>;

impl<const CONFIG: u8, const W: u16, const H: u16> PanelXy<CONFIG, W, H> {
    const CHECK: () = {
        assert!(W > 0 && H > 0, "panel width and height must be positive");
        assert!(
            W as u32 * H as u32 <= u16::MAX as u32,
            "panel must be addressable with u16 indices"
        );
    };

    const COLUMN_MAJOR: bool = CONFIG & XyConfig::COLUMN_MAJOR.bits() != 0;
    const SERPENTINE: bool = CONFIG & XyConfig::SERPENTINE.bits() != 0;
    const FLIP_MAJOR: bool = CONFIG & XyConfig::FLIP_MAJOR.bits() != 0;
    const FLIP_MINOR: bool = CONFIG & XyConfig::FLIP_MINOR.bits() != 0;
    const SIZE_MAJOR: u16 = if Self::COLUMN_MAJOR { H } else { W };
    const SIZE_MINOR: u16 = if Self::COLUMN_MAJOR { W } else { H };

    /// Create the mapper (zero-sized).
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::CHECK;
        Self
    }

    /// Transmission index for `(x, y)`, usable in `const` contexts.
    #[must_use]
    #[inline(always)]
    pub const fn index(x: u16, y: u16) -> u16 {
        let (mut major, mut minor) = if Self::COLUMN_MAJOR { (y, x) } else { (x, y) };
        if Self::FLIP_MINOR {
            minor = Self::SIZE_MINOR - 1 - minor;
        }
        if Self::FLIP_MAJOR ^ (Self::SERPENTINE && minor & 1 == 1) {
            major = Self::SIZE_MAJOR - 1 - major;
        }
        minor * Self::SIZE_MAJOR + major
    }
}

impl<const CONFIG: u8, const W: u16, const H: u16> XyMap for PanelXy<CONFIG, W, H> {
    fn width(&self) -> u16 {
        W
    }

    fn height(&self) -> u16 {
        H
    }

    #[inline(always)]
    fn map(&self, x: u16, y: u16) -> u16 {
        Self::index(x, y)
    }
}

/// Tiled mapper with flags, matrix size (`W × H`), and panel size (`PW × PH`) fixed at
/// compile time.
///
/// `W` must be a multiple of `PW` and `H` of `PH`; otherwise [`Self::new`] fails to compile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelsXy<const CONFIG: u8, const W: u16, const H: u16, const PW: u16, const PH: u16>;

impl<const CONFIG: u8, const W: u16, const H: u16, const PW: u16, const PH: u16>
    PanelsXy<CONFIG, W, H, PW, PH>
{
    const CHECK: () = {
        assert!(PW > 0 && PH > 0, "panel width and height must be positive");
        assert!(W > 0 && H > 0, "matrix width and height must be positive");
        assert!(W % PW == 0, "matrix width must be a multiple of panel width");
        assert!(H % PH == 0, "matrix height must be a multiple of panel height");
        assert!(
            W as u32 * H as u32 <= u16::MAX as u32,
            "matrix must be addressable with u16 indices"
        );
    };

    const SERPENTINE_TILING: bool = CONFIG & XyConfig::SERPENTINE_TILING.bits() != 0;
    const VERTICAL_TILING: bool = CONFIG & XyConfig::VERTICAL_TILING.bits() != 0;
    const X_PANELS: u16 = W / PW;
    const Y_PANELS: u16 = H / PH;
    const PANEL_LEN: u16 = PW * PH;

    /// Create the mapper (zero-sized).
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::CHECK;
        Self
    }

    /// Transmission index for `(x, y)`, usable in `const` contexts.
    #[must_use]
    #[inline(always)]
    pub const fn index(x: u16, y: u16) -> u16 {
        let mut x_panel = x / PW;
        let mut y_panel = y / PH;
        if Self::SERPENTINE_TILING {
            if Self::VERTICAL_TILING {
                if x_panel & 1 == 1 {
                    y_panel = Self::Y_PANELS - 1 - y_panel;
                }
            } else if y_panel & 1 == 1 {
                x_panel = Self::X_PANELS - 1 - x_panel;
            }
        }
        let panel_index = if Self::VERTICAL_TILING {
            Self::Y_PANELS * x_panel + y_panel
        } else {
            Self::X_PANELS * y_panel + x_panel
        };
        Self::PANEL_LEN * panel_index + PanelXy::<CONFIG, PW, PH>::index(x % PW, y % PH)
    }
}

impl<const CONFIG: u8, const W: u16, const H: u16, const PW: u16, const PH: u16> XyMap
    for PanelsXy<CONFIG, W, H, PW, PH>
{
    fn width(&self) -> u16 {
        W
    }

    fn height(&self) -> u16 {
        H
    }

    #[inline(always)]
    fn map(&self, x: u16, y: u16) -> u16 {
        Self::index(x, y)
    }
}

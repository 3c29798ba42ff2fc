//! Errors returned when a panel mapping, wave field, or settings record is rejected.

use derive_more::{Display, Error};

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors for panel geometry, wave-field construction, and settings records.
///
/// Everything except the settings variants is a construction-time configuration error:
/// an effect that returns one of these must not start.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(all(feature = "defmt", not(feature = "host")), derive(defmt::Format))]
pub enum Error {
    /// A matrix or panel width or height was zero.
    #[display("panel and matrix dimensions must be non-zero")]
    ZeroDimension,

    /// The matrix is not an exact number of panels wide and high.
    #[display(
        "matrix {matrix_width}x{matrix_height} is not a whole number of {panel_width}x{panel_height} panels"
    )]
    PartialPanel {
        /// Matrix width in pixels.
        matrix_width: u16,
        /// Matrix height in pixels.
        matrix_height: u16,
        /// Panel width in pixels.
        panel_width: u16,
        /// Panel height in pixels.
        panel_height: u16,
    },

    /// `width * height` is more than a `u16` transmission index can address.
    #[display("matrix has more pixels than a u16 index can address")]
    MatrixTooLarge,

    /// The wave field needs at least two interior cells in each direction.
    #[display("wave field must be at least 2x2 cells")]
    FieldTooSmall,

    /// The padded wave field is too wide or tall for 8.8 fixed-point stimulus coordinates.
    #[display("wave field must be at most {max} cells wide and high")]
    FieldTooLarge {
        /// Largest supported interior width or height.
        max: usize,
    },

    /// A const-generic storage length does not match the dimensions it must hold.
    #[display("storage length {actual} does not match the required {expected}")]
    StorageLength {
        /// Length implied by the dimensions.
        expected: usize,
        /// Length supplied through the const generic.
        actual: usize,
    },

    /// A mapping sent two coordinates to the same transmission index, or left one unused.
    #[display("mapping is not one-to-one: index {index} is reached more than once")]
    DuplicateIndex {
        /// The transmission index reached twice.
        index: u16,
    },

    /// A mapping produced an index outside the transmission buffer.
    #[display("mapping produced index {index}, past the end of the buffer")]
    IndexOutOfRange {
        /// The out-of-range index.
        index: u16,
    },

    /// An enabled edge-wave generator has no length to travel around.
    #[display("edge waves need at least one enabled edge and one cycle")]
    ZeroLengthEdgeCycle,

    /// A settings record did not fit in the buffer provided.
    #[display("settings record does not fit in the buffer")]
    SettingsBufferTooSmall,

    /// A settings record had the right magic number but failed its length or CRC check.
    #[display("settings record is corrupted")]
    SettingsCorrupted,
}

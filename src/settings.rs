//! Water effect tunables and their persisted record format.
//!
//! [`WaterSettings`] is a plain `serde` value. For a key/value or flash store it is
//! wrapped in a self-checking record:
//!
//! ```text
//! MAGIC (4, LE) | payload length (2, LE) | postcard payload | CRC-32 of all before (4, LE)
//! ```
//!
//! A buffer that does not start with [`MAGIC`] holds no record (erased flash, a fresh
//! key). A buffer that does, but fails its length or CRC check, is corrupted.
//!
//! ```rust
//! use ripple_panel::settings::{self, WaterSettings};
//! use ripple_panel::water::EdgeMask;
//!
//! let mut stored = [0xFF_u8; 64];
//! assert_eq!(settings::load_from_slice(&stored)?, None);
//!
//! let tuned = WaterSettings { damping: 200, edges: EdgeMask::ALL, ..WaterSettings::default() };
//! settings::save_to_slice(&tuned, &mut stored)?;
//! assert_eq!(settings::load_from_slice(&stored)?, Some(tuned));
//! # Ok::<(), ripple_panel::Error>(())
//! ```

use crc32fast::Hasher;
use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::led_strip::{Correction, Gamma};
use crate::logging::{info, warn};
use crate::palette::PaletteChoice;
use crate::water::{EdgeMask, EdgeWaves};
use crate::{Error, Result};

/// Start of every settings record: `'WTRS'`.
pub const MAGIC: u32 = 0x5754_5253;
const HEADER_SIZE: usize = 4 + 2; // Magic + PayloadLen
const CRC_SIZE: usize = 4;
const MAX_PAYLOAD_SIZE: usize = 48;

/// Longest record [`save_to_slice`] can produce.
pub const MAX_RECORD_LEN: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE + CRC_SIZE;

/// Tunables for [`WaterEffect`](crate::water::WaterEffect).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSettings {
    /// Edge damping; perimeter cells hold `255 - damping` unless driven.
    pub damping: u8,
    /// Add the wandering stimulus every frame.
    pub moving_stimulus: bool,
    /// Add occasional random drops on dark cells.
    pub random_drops: bool,
    /// Sides driven by [`EdgeWaves`]; empty for none.
    pub edges: EdgeMask,
    /// Edge-wave phase advance per frame.
    pub edge_phase_step: u8,
    /// Full cosine periods around the driven sides.
    pub edge_cycles: u8,
    /// Palette to draw with.
    pub palette: PaletteChoice,
    /// Palette offset advance per frame.
    pub palette_speed: u16,
    /// Overall brightness cap applied after rendering.
    pub brightness: u8,
    /// Output curve applied after rendering.
    pub gamma: Gamma,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            damping: 250,
            moving_stimulus: true,
            random_drops: true,
            edges: EdgeMask::NONE,
            edge_phase_step: 8,
            edge_cycles: 1,
            palette: PaletteChoice::Rainbow,
            palette_speed: 96,
            brightness: 255,
            gamma: Gamma::default(),
        }
    }
}

impl WaterSettings {
    /// The edge-wave generator these settings describe, or `None` when no side is
    /// driven.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroLengthEdgeCycle`] if sides are driven with zero cycles.
    pub const fn edge_waves(&self) -> Result<Option<EdgeWaves>> {
        if self.edges.is_empty() {
            return Ok(None);
        }
        match EdgeWaves::new(self.edges, self.edge_phase_step, self.edge_cycles) {
            Ok(edge_waves) => Ok(Some(edge_waves)),
            Err(error) => Err(error),
        }
    }

    /// Output correction for these settings.
    #[must_use]
    pub const fn correction(&self) -> Correction {
        Correction::new(self.gamma, self.brightness)
    }
}

/// Write `settings` as a record at the start of `buffer`, returning the record length.
///
/// # Errors
///
/// [`Error::SettingsBufferTooSmall`] if the record does not fit.
pub fn save_to_slice(settings: &WaterSettings, buffer: &mut [u8]) -> Result<usize> {
    let mut payload_buffer = [0u8; MAX_PAYLOAD_SIZE];
    let payload_len = postcard::to_slice(settings, &mut payload_buffer)
        .map_err(|_| Error::SettingsBufferTooSmall)?
        .len();

    let crc_offset = HEADER_SIZE + payload_len;
    let record_len = crc_offset + CRC_SIZE;
    let record = buffer
        .get_mut(..record_len)
        .ok_or(Error::SettingsBufferTooSmall)?;

    record[0..4].copy_from_slice(&MAGIC.to_le_bytes());
    record[4..HEADER_SIZE].copy_from_slice(&(payload_len as u16).to_le_bytes());
    record[HEADER_SIZE..crc_offset].copy_from_slice(&payload_buffer[..payload_len]);
    let crc = compute_crc(&record[..crc_offset]);
    record[crc_offset..].copy_from_slice(&crc.to_le_bytes());

    info!("Settings: saved {} byte record", record_len);
    Ok(record_len)
}

/// Encode `settings` into an owned record.
///
/// # Errors
///
/// [`Error::SettingsBufferTooSmall`] if the settings do not encode within
/// [`MAX_RECORD_LEN`].
pub fn to_record(settings: &WaterSettings) -> Result<Vec<u8, MAX_RECORD_LEN>> {
    let mut buffer = [0u8; MAX_RECORD_LEN];
    let record_len = save_to_slice(settings, &mut buffer)?;
    Vec::from_slice(&buffer[..record_len]).map_err(|()| Error::SettingsBufferTooSmall)
}

/// Read a record from the start of `buffer`.
///
/// Returns `Ok(None)` when `buffer` does not start with [`MAGIC`].
///
/// # Errors
///
/// [`Error::SettingsCorrupted`] if the length, CRC, or payload is invalid.
pub fn load_from_slice(buffer: &[u8]) -> Result<Option<WaterSettings>> {
    let Some(magic) = read_array::<4>(buffer, 0) else {
        return Ok(None);
    };
    if u32::from_le_bytes(magic) != MAGIC {
        info!("Settings: no record");
        return Ok(None);
    }

    let payload_len = usize::from(u16::from_le_bytes(
        read_array::<2>(buffer, 4).ok_or(Error::SettingsCorrupted)?,
    ));
    if payload_len > MAX_PAYLOAD_SIZE {
        warn!("Settings: invalid payload length {}", payload_len);
        return Err(Error::SettingsCorrupted);
    }

    let crc_offset = HEADER_SIZE + payload_len;
    let stored_crc = u32::from_le_bytes(
        read_array::<CRC_SIZE>(buffer, crc_offset).ok_or(Error::SettingsCorrupted)?,
    );
    let covered = buffer.get(..crc_offset).ok_or(Error::SettingsCorrupted)?;
    let computed_crc = compute_crc(covered);
    if stored_crc != computed_crc {
        warn!(
            "Settings: CRC mismatch (expected {}, found {})",
            computed_crc, stored_crc
        );
        return Err(Error::SettingsCorrupted);
    }

    let payload = covered.get(HEADER_SIZE..).ok_or(Error::SettingsCorrupted)?;
    let settings: WaterSettings = postcard::from_bytes(payload).map_err(|_| {
        warn!("Settings: payload does not decode");
        Error::SettingsCorrupted
    })?;

    info!("Settings: loaded record");
    Ok(Some(settings))
}

fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> Option<[u8; N]> {
    buffer.get(offset..offset.checked_add(N)?)?.try_into().ok()
}

/// Compute CRC32 checksum.
fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

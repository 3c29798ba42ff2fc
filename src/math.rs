//! Integer trigonometry and scaling helpers for 8- and 16-bit LED math.
//!
//! Angles are full-circle fractions: `0..=65535` for 16-bit angles and `0..=255` for
//! 8-bit angles. Nothing here touches floating point, so every result is reproducible
//! on the target and on the host.

use embassy_time::Instant;

// Piecewise-linear quarter-wave: eight segments, each a base value and a slope.
const SIN16_BASE: [u16; 8] = [0, 6393, 12539, 18204, 23170, 27245, 30273, 32137];
const SIN16_SLOPE: [u8; 8] = [49, 48, 44, 38, 31, 23, 14, 4];

/// Sine of a 16-bit angle, in `-32767..=32767`.
#[must_use]
pub const fn sin16(theta: u16) -> i16 {
    let mut offset = (theta & 0x3FFF) >> 3; // 0..=2047
    if theta & 0x4000 != 0 {
        offset = 2047 - offset;
    }
    let section = (offset / 256) as usize; // 0..=7
    let base = SIN16_BASE[section];
    let slope = SIN16_SLOPE[section] as u16;
    let section_offset = (offset as u8 / 2) as u16;
    let y = (slope * section_offset + base) as i16;
    if theta & 0x8000 != 0 { -y } else { y }
}

/// Cosine of a 16-bit angle, in `-32767..=32767`.
#[must_use]
pub const fn cos16(theta: u16) -> i16 {
    sin16(theta.wrapping_add(16384))
}

/// Cosine of an 8-bit angle, offset into `0..=255` with 128 at the zero crossing.
#[must_use]
pub const fn cos8(theta: u8) -> u8 {
    let wave = cos16((theta as u16) << 8) as i32 + 32768;
    (wave >> 8) as u8
}

/// Scale `value` by `scale / 256`, treating `scale == 255` as unity.
#[must_use]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Scale `value` by `scale / 65536`, treating `scale == 65535` as unity.
#[must_use]
pub const fn scale16(value: u16, scale: u16) -> u16 {
    ((value as u32 * (1 + scale as u32)) >> 16) as u16
}

/// Sawtooth that wraps `bpm` times a minute, derived from the frame timestamp.
#[must_use]
pub fn beat16(bpm: u16, now: Instant) -> u16 {
    // bpm in 8.8 fixed point; 280 ≈ 65536 * 65536 / 60000 / 256.
    let bpm88 = u64::from(bpm) << 8;
    ((now.as_millis().wrapping_mul(bpm88).wrapping_mul(280)) >> 16) as u16
}

/// Sine wave oscillating between `low` and `high`, `bpm` times a minute.
#[must_use]
pub fn beatsin16(bpm: u16, low: u16, high: u16, now: Instant) -> u16 {
    let beat = beat16(bpm, now);
    let beat_sin = (i32::from(sin16(beat)) + 32768) as u16;
    let range = high.saturating_sub(low);
    low.saturating_add(scale16(beat_sin, range))
}

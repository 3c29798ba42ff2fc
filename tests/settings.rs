#![allow(missing_docs)]
//! Host-level tests for the settings record.

use ripple_panel::Error;
use ripple_panel::led_strip::Gamma;
use ripple_panel::palette::PaletteChoice;
use ripple_panel::settings::{
    self, MAGIC, MAX_RECORD_LEN, WaterSettings, load_from_slice, save_to_slice,
};
use ripple_panel::water::EdgeMask;

fn tuned() -> WaterSettings {
    WaterSettings {
        damping: 180,
        moving_stimulus: false,
        random_drops: true,
        edges: EdgeMask::TOP | EdgeMask::BOTTOM,
        edge_phase_step: 3,
        edge_cycles: 2,
        palette: PaletteChoice::Ocean,
        palette_speed: 1000,
        brightness: 64,
        gamma: Gamma::Gamma2_2,
    }
}

#[test]
fn erased_flash_holds_no_settings() {
    assert_eq!(load_from_slice(&[0xFF; 64]), Ok(None));
    assert_eq!(load_from_slice(&[0x00; 64]), Ok(None));
    assert_eq!(load_from_slice(&[]), Ok(None));
    assert_eq!(load_from_slice(&MAGIC.to_le_bytes()[..3]), Ok(None));
}

#[test]
fn saved_settings_load_back() {
    let mut buffer = [0xFF_u8; 128];
    let record_len = save_to_slice(&tuned(), &mut buffer).expect("fits");
    assert!(record_len <= MAX_RECORD_LEN);
    // Bytes after the record are left alone.
    assert!(buffer[record_len..].iter().all(|&byte| byte == 0xFF));
    assert_eq!(load_from_slice(&buffer), Ok(Some(tuned())));
}

#[test]
fn record_matches_slice_encoding() {
    let record = settings::to_record(&tuned()).expect("fits");
    let mut buffer = [0u8; MAX_RECORD_LEN];
    let record_len = save_to_slice(&tuned(), &mut buffer).expect("fits");
    assert_eq!(record.as_slice(), &buffer[..record_len]);
    assert_eq!(load_from_slice(&record), Ok(Some(tuned())));
}

#[test]
fn flipped_payload_bit_is_corruption() {
    let mut buffer = [0u8; MAX_RECORD_LEN];
    save_to_slice(&tuned(), &mut buffer).expect("fits");
    buffer[6] ^= 0x01;
    assert_eq!(load_from_slice(&buffer), Err(Error::SettingsCorrupted));
}

#[test]
fn flipped_crc_bit_is_corruption() {
    let mut buffer = [0u8; MAX_RECORD_LEN];
    let record_len = save_to_slice(&WaterSettings::default(), &mut buffer).expect("fits");
    buffer[record_len - 1] ^= 0x80;
    assert_eq!(load_from_slice(&buffer), Err(Error::SettingsCorrupted));
}

#[test]
fn oversized_length_is_corruption() {
    let mut buffer = [0u8; MAX_RECORD_LEN];
    save_to_slice(&WaterSettings::default(), &mut buffer).expect("fits");
    buffer[4..6].copy_from_slice(&1000_u16.to_le_bytes());
    assert_eq!(load_from_slice(&buffer), Err(Error::SettingsCorrupted));
}

#[test]
fn truncated_record_is_corruption() {
    let mut buffer = [0u8; MAX_RECORD_LEN];
    let record_len = save_to_slice(&WaterSettings::default(), &mut buffer).expect("fits");
    assert_eq!(
        load_from_slice(&buffer[..record_len - 1]),
        Err(Error::SettingsCorrupted)
    );
    assert_eq!(load_from_slice(&buffer[..5]), Err(Error::SettingsCorrupted));
}

#[test]
fn valid_crc_over_garbage_payload_is_corruption() {
    // A well-formed envelope around a payload postcard cannot decode.
    let payload = [0xFF_u8; 3];
    let mut record = Vec::new();
    record.extend_from_slice(&MAGIC.to_le_bytes());
    record.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    record.extend_from_slice(&payload);
    let crc = crc32fast::hash(&record);
    record.extend_from_slice(&crc.to_le_bytes());
    assert_eq!(load_from_slice(&record), Err(Error::SettingsCorrupted));
}

#[test]
fn small_buffer_is_rejected() {
    let mut buffer = [0u8; 10];
    assert_eq!(
        save_to_slice(&tuned(), &mut buffer),
        Err(Error::SettingsBufferTooSmall)
    );
}

#[test]
fn loaded_settings_build_effect_parts() {
    let loaded = load_from_slice(&settings::to_record(&tuned()).expect("fits"))
        .expect("valid record")
        .expect("record present");
    let edge_waves = loaded
        .edge_waves()
        .expect("non-zero cycles")
        .expect("edges driven");
    assert_eq!(edge_waves.edges(), EdgeMask::TOP | EdgeMask::BOTTOM);
    assert_eq!(edge_waves.phase(), 0);
}

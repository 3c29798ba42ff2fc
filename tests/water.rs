#![allow(missing_docs)]
//! Host-level tests for the wave field and the water effect.

use embassy_time::Instant;
use fixed::types::U8F8;
use proptest::prelude::*;
use ripple_panel::Error;
use ripple_panel::led_strip::{Frame1d, RGB8};
use ripple_panel::settings::WaterSettings;
use ripple_panel::water::{
    EdgeMask, EffectState, FrameContext, RandomDrops, Stimulus, WaterEffect, WaveField,
};
use ripple_panel::xy::{DynXy, Geometry, PanelXy, XyConfig};

type Field = WaveField<8, 8, 100>;
type SmallWaterField = WaveField<8, 6, 80>;
type SmallWater = WaterEffect<8, 6, 80, 48>;

fn fixed(whole: u16, fraction: u16) -> U8F8 {
    U8F8::from_bits((whole << 8) | fraction)
}

fn still_settings() -> WaterSettings {
    WaterSettings {
        moving_stimulus: false,
        random_drops: false,
        ..WaterSettings::default()
    }
}

const DROP_SEED: u64 = 11;

/// Number of drop-free frames before the first random drop on an 8×6 effect, and that
/// drop.
fn first_drop(seed: u64) -> (u64, Stimulus) {
    let mut drops = RandomDrops::new(seed);
    (0..1000)
        .find_map(|frame_index| drops.roll(8, 6).map(|drop| (frame_index, drop)))
        .expect("a drop within 1000 frames")
}

/// Effect whose only stimulus is random drops, on a fully absorbing perimeter.
fn drops_only(seed: u64) -> SmallWater {
    let xy_map = DynXy::new(XyConfig::RASTER, Geometry::single(8, 6)).expect("valid geometry");
    let settings = WaterSettings {
        damping: 255,
        random_drops: true,
        ..still_settings()
    };
    SmallWater::new(&xy_map, settings, seed).expect("valid effect")
}

fn frame_at(frame_index: u64) -> FrameContext {
    FrameContext {
        now: Instant::from_millis(frame_index * 16),
    }
}

#[test]
fn half_cell_injection_spreads_over_four_cells() {
    let mut field = Field::new(250).expect("valid field");
    field.inject(fixed(2, 128), fixed(3, 128), 200);

    // weight(128, 128) = 65 and weight(127, 128) = 64 both give 50; weight(127, 127) = 63
    // gives 49.
    assert_eq!(field.at(2, 3), 49);
    assert_eq!(field.at(3, 3), 50);
    assert_eq!(field.at(2, 4), 50);
    assert_eq!(field.at(3, 4), 50);

    let touched = [(2, 3), (3, 3), (2, 4), (3, 4)];
    for y_index in 1..=8 {
        for x_index in 1..=8 {
            if !touched.contains(&(x_index, y_index)) {
                assert_eq!(field.at(x_index, y_index), 0, "({x_index}, {y_index})");
            }
        }
    }
}

#[test]
fn repeated_injection_saturates() {
    let mut field = Field::new(250).expect("valid field");
    for _ in 0..10 {
        field.inject(fixed(4, 0), fixed(4, 0), 255);
    }
    assert_eq!(field.at(4, 4), 255);
    // Whole-cell position: the other three weights are zero.
    assert_eq!(field.at(5, 4), 0);
    assert_eq!(field.at(4, 5), 0);
}

#[test]
fn injection_on_far_perimeter_is_ignored() {
    let mut field = Field::new(250).expect("valid field");
    let before = field.clone();
    field.inject(fixed(9, 0), fixed(4, 128), 255);
    field.inject(fixed(4, 128), fixed(9, 10), 255);
    assert_eq!(field, before);
}

#[test]
fn injection_near_perimeter_is_clipped() {
    let mut field = Field::new(250).expect("valid field");
    field.inject(fixed(0, 128), fixed(0, 128), 200);
    // Only (1, 1) is interior.
    assert_eq!(field.at(1, 1), 50);
    assert_eq!(field.at(0, 0), 5);
    assert_eq!(field.at(1, 0), 5);
    assert_eq!(field.at(0, 1), 5);
}

#[test]
fn ripple_spreads_to_neighbors() {
    let mut field = Field::new(255).expect("valid field");
    field.inject(fixed(4, 0), fixed(4, 0), 200);
    field.advance();
    field.swap_buffers();
    // A whole-cell drop lands as (200 * 255) >> 8 = 199; each neighbor gets
    // (64 * 199) >> 7 = 99.
    assert_eq!(field.at(3, 4), 99);
    assert_eq!(field.at(5, 4), 99);
    assert_eq!(field.at(4, 3), 99);
    assert_eq!(field.at(4, 5), 99);
    assert_eq!(field.at(4, 4), 0);
}

#[test]
fn perimeter_holds_damping_for_fifty_frames() {
    let mut water = SmallWater::new(
        &PanelXy::<{ XyConfig::SERPENTINE.bits() }, 8, 6>::new(),
        WaterSettings {
            damping: 230,
            ..WaterSettings::default()
        },
        3,
    )
    .expect("valid effect");
    let mut frame = Frame1d::new();
    for frame_index in 0..50 {
        water.draw(frame_at(frame_index), &mut frame);
        for position in 0..SmallWaterField::PERIMETER_LEN {
            let (x_index, y_index) =
                SmallWaterField::perimeter_xy(position).expect("on perimeter");
            assert_eq!(water.field().at(x_index, y_index), 25);
            assert_eq!(
                water.field().back()[y_index * SmallWaterField::PADDED_WIDTH + x_index],
                25
            );
        }
    }
}

#[test]
fn edge_damping_repaints_perimeter() {
    let mut field = Field::new(250).expect("valid field");
    field.set_edge_damping(100);
    assert_eq!(field.damping(), 100);
    assert_eq!(field.at(0, 0), 155);
    assert_eq!(field.at(9, 9), 155);
    assert_eq!(field.at(0, 5), 155);
    assert_eq!(field.at(5, 9), 155);
    assert_eq!(field.get(10, 0), None);
    assert_eq!(field.get(0, 10), None);
    assert_eq!(field.get(9, 9), Some(155));
}

#[test]
fn effect_moves_from_idle_to_running() {
    let xy_map = DynXy::new(XyConfig::RASTER, Geometry::single(8, 6)).expect("valid geometry");
    let mut water = SmallWater::new(&xy_map, WaterSettings::default(), 1).expect("valid effect");
    assert_eq!(water.state(), EffectState::Idle);
    let mut frame = Frame1d::new();
    water.draw(frame_at(0), &mut frame);
    assert_eq!(water.state(), EffectState::Running);
    water.draw(frame_at(1), &mut frame);
    assert_eq!(water.state(), EffectState::Running);
    assert_eq!(water.frames(), 2);
}

#[test]
fn still_water_renders_black() {
    let xy_map = DynXy::new(XyConfig::SERPENTINE, Geometry::single(8, 6)).expect("valid geometry");
    let mut water = SmallWater::new(
        &xy_map,
        WaterSettings {
            damping: 255,
            ..still_settings()
        },
        1,
    )
    .expect("valid effect");
    let mut frame = Frame1d::filled(RGB8::new(9, 9, 9));
    water.draw(frame_at(0), &mut frame);
    assert!(frame.iter().all(|pixel| *pixel == RGB8::default()));
}

#[test]
fn injected_drop_renders_through_mapping() {
    let xy_map = DynXy::new(XyConfig::SERPENTINE, Geometry::single(8, 6)).expect("valid geometry");
    let mut water = SmallWater::new(
        &xy_map,
        WaterSettings {
            damping: 255,
            ..still_settings()
        },
        1,
    )
    .expect("valid effect");
    // Field cell (4, 2) is pixel (3, 1): serpentine row 1 puts it at index 8 + 7 - 3 = 12.
    water.inject(fixed(4, 0), fixed(2, 0), 255);
    let mut frame = Frame1d::new();
    water.draw(frame_at(0), &mut frame);
    // The drop cell itself goes dark after one step while its neighbors light up.
    assert_eq!(frame[12], RGB8::default());
    // Pixel (2, 1) -> index 13, pixel (4, 1) -> index 11, pixel (3, 0) -> 3, (3, 2) -> 19.
    for led_index in [11, 13, 3, 19] {
        assert_ne!(frame[led_index], RGB8::default(), "LED {led_index}");
    }
}

#[test]
fn mismatched_mapping_is_rejected() {
    let xy_map = DynXy::new(XyConfig::RASTER, Geometry::single(6, 8)).expect("valid geometry");
    assert!(matches!(
        SmallWater::new(&xy_map, WaterSettings::default(), 1),
        Err(Error::StorageLength { .. })
    ));
    assert!(matches!(
        WaterEffect::<8, 6, 81, 48>::new(
            &DynXy::new(XyConfig::RASTER, Geometry::single(8, 6)).expect("valid geometry"),
            WaterSettings::default(),
            1,
        ),
        Err(Error::StorageLength {
            expected: 80,
            actual: 81
        })
    ));
}

#[test]
fn zero_cycle_edges_are_rejected() {
    let xy_map = DynXy::new(XyConfig::RASTER, Geometry::single(8, 6)).expect("valid geometry");
    let bad = WaterSettings {
        edges: EdgeMask::LEFT,
        edge_cycles: 0,
        ..WaterSettings::default()
    };
    assert!(matches!(
        SmallWater::new(&xy_map, bad, 1),
        Err(Error::ZeroLengthEdgeCycle)
    ));

    let mut water = SmallWater::new(&xy_map, WaterSettings::default(), 1).expect("valid effect");
    assert_eq!(water.apply_settings(bad), Err(Error::ZeroLengthEdgeCycle));
    assert_eq!(water.settings(), &WaterSettings::default());
}

#[test]
fn apply_settings_switches_edges_on_and_off() {
    let xy_map = DynXy::new(XyConfig::RASTER, Geometry::single(8, 6)).expect("valid geometry");
    let mut water = SmallWater::new(&xy_map, still_settings(), 1).expect("valid effect");
    let driven = WaterSettings {
        edges: EdgeMask::TOP,
        edge_cycles: 1,
        edge_phase_step: 64,
        ..still_settings()
    };
    water.apply_settings(driven).expect("valid settings");
    let mut frame = Frame1d::new();
    water.draw(frame_at(0), &mut frame);
    // phase 64 at position 0: cos8(64) / 3 is near 128 / 3.
    let top_left = water.field().at(0, 0);
    assert!((41..=43).contains(&top_left), "{top_left}");
    // The left side is not driven.
    assert_eq!(water.field().at(0, 4), 5);

    water.apply_settings(still_settings()).expect("valid settings");
    assert_eq!(water.field().at(0, 0), 5);
    assert_eq!(water.field().at(5, 0), 5);
}

#[test]
fn same_seed_same_frames() {
    let xy_map = DynXy::new(XyConfig::SERPENTINE, Geometry::tiled(8, 6, 4, 3)).expect("valid geometry");
    let mut first = SmallWater::new(&xy_map, WaterSettings::default(), 99).expect("valid effect");
    let mut second = SmallWater::new(&xy_map, WaterSettings::default(), 99).expect("valid effect");
    let (mut first_frame, mut second_frame) = (Frame1d::new(), Frame1d::new());
    for frame_index in 0..100 {
        first.draw(frame_at(frame_index), &mut first_frame);
        second.draw(frame_at(frame_index), &mut second_frame);
        assert_eq!(first_frame, second_frame);
    }
}

#[test]
fn random_drop_lands_on_dark_cell() {
    let (quiet_frames, drop) = first_drop(DROP_SEED);
    let mut water = drops_only(DROP_SEED);
    let mut frame = Frame1d::new();
    for frame_index in 0..quiet_frames {
        water.draw(frame_at(frame_index), &mut frame);
    }
    assert!(water.field().front().iter().all(|&amplitude| amplitude == 0));

    water.draw(frame_at(quiet_frames), &mut frame);

    let mut expected = SmallWaterField::new(255).expect("valid field");
    expected.inject(drop.x, drop.y, drop.intensity);
    expected.advance();
    expected.swap_buffers();
    assert_eq!(water.field().front(), expected.front());
    assert_eq!(water.field().back(), expected.back());
    assert!(water.field().back().iter().any(|&amplitude| amplitude != 0));
}

#[test]
fn random_drop_skips_lit_cell() {
    let (quiet_frames, drop) = first_drop(DROP_SEED);
    let cell_x = drop.x.to_bits() >> 8;
    let cell_y = drop.y.to_bits() >> 8;
    let mut water = drops_only(DROP_SEED);
    let mut frame = Frame1d::new();
    for frame_index in 0..quiet_frames {
        water.draw(frame_at(frame_index), &mut frame);
    }

    // Light the landing cell just before the frame that rolls the drop.
    water.inject(fixed(cell_x, 0), fixed(cell_y, 0), 255);
    water.draw(frame_at(quiet_frames), &mut frame);

    let mut expected = SmallWaterField::new(255).expect("valid field");
    expected.inject(fixed(cell_x, 0), fixed(cell_y, 0), 255);
    expected.advance();
    expected.swap_buffers();
    assert_eq!(water.field().front(), expected.front());
    assert_eq!(water.field().back(), expected.back());
}

proptest! {
    #[test]
    fn perimeter_survives_any_stimulus(
        damping in any::<u8>(),
        drops in proptest::collection::vec((any::<u16>(), any::<u16>(), any::<u8>()), 0..40),
        steps in 1usize..30,
    ) {
        let mut field = Field::new(damping).expect("valid field");
        for (x_bits, y_bits, intensity) in drops {
            field.inject(U8F8::from_bits(x_bits), U8F8::from_bits(y_bits), intensity);
        }
        for _ in 0..steps {
            field.advance();
            field.swap_buffers();
        }
        for position in 0..Field::PERIMETER_LEN {
            let (x_index, y_index) = Field::perimeter_xy(position).expect("on perimeter");
            prop_assert_eq!(field.at(x_index, y_index), 255 - damping);
        }
    }
}

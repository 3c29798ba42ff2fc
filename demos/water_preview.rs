//! Render a few seconds of the water effect on a 32×32 matrix of two 16×32 panels and
//! save it as an animated PNG.
//!
//! ```text
//! cargo run --features host --bin demo_water_preview -- [output.png] [frames]
//! ```

use std::error::Error;

use embassy_time::{Duration, Instant};
use ripple_panel::led_strip::Frame1d;
use ripple_panel::settings::WaterSettings;
use ripple_panel::to_png::Preview;
use ripple_panel::water::{EdgeMask, FrameContext, WaterEffect};
use ripple_panel::xy::{PanelsXy, XyConfig};

const CONFIG: XyConfig = XyConfig::SERPENTINE
    .union(XyConfig::COLUMN_MAJOR)
    .union(XyConfig::SERPENTINE_TILING);
const WIDTH: usize = 32;
const HEIGHT: usize = 32;
const FRAME_DELAY: Duration = Duration::from_millis(33);

type Matrix = PanelsXy<{ CONFIG.bits() }, 32, 32, 16, 32>;
type Water = WaterEffect<WIDTH, HEIGHT, { (WIDTH + 2) * (HEIGHT + 2) }, { WIDTH * HEIGHT }>;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "water_preview.png".to_owned());
    let frame_count: u64 = args.next().map_or(Ok(150), |text| text.parse())?;

    let settings = WaterSettings {
        edges: EdgeMask::TOP | EdgeMask::BOTTOM,
        edge_cycles: 2,
        ..WaterSettings::default()
    };
    let mut water = Water::new(&Matrix::new(), settings, 0x5EED)?;

    let mut strip = Frame1d::new();
    let mut strips = Vec::new();
    for frame_index in 0..frame_count {
        let now = Instant::from_millis(frame_index * FRAME_DELAY.as_millis());
        water.draw(FrameContext { now }, &mut strip);
        strips.push(strip);
    }

    Preview::default().write_strip_apng::<WIDTH, HEIGHT, { WIDTH * HEIGHT }>(
        &strips,
        water.lookup(),
        &output_path,
        FRAME_DELAY,
    )?;
    Ok(())
}

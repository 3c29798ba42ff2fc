//! Water ripple effect for LED matrices.
//!
//! [`WaveField`] holds the simulation: two padded amplitude buffers, a reflect-at-zero
//! diffusion rule, Wu-weighted sub-cell stimulus, and a damped or driven perimeter.
//! [`WaterEffect`] wraps one field with the stimulus generators, a palette, and an
//! [`XyLookup`] for a whole matrix, and renders one frame per [`draw`](WaterEffect::draw).
//!
//! # Frame pipeline
//!
//! Each `draw` call, in order:
//!
//! 1. drive the perimeter if [`EdgeWaves`] are configured
//! 2. add the [moving stimulus](MovingStimulus) and maybe a [random drop](RandomDrops)
//! 3. [`advance`](WaveField::advance) and [`swap_buffers`](WaveField::swap_buffers)
//! 4. [`render`](WaveField::render) through the palette into the transmission buffer
//! 5. apply gamma and brightness [`Correction`]
//!
//! Anything injected between frames with [`WaterEffect::inject`] lands in the buffer the
//! next frame reads from.
//!
//! # Example
//!
//! ```rust
//! use embassy_time::Instant;
//! use ripple_panel::led_strip::Frame1d;
//! use ripple_panel::settings::WaterSettings;
//! use ripple_panel::water::{FrameContext, WaterEffect};
//! use ripple_panel::xy::{DynXy, Geometry, XyConfig};
//!
//! // Two 8×8 panels side by side, each wired as a serpentine.
//! let xy_map = DynXy::new(XyConfig::SERPENTINE, Geometry::tiled(16, 8, 8, 8))?;
//! let mut water = WaterEffect::<16, 8, 180, 128>::new(&xy_map, WaterSettings::default(), 1)?;
//!
//! let mut frame = Frame1d::<128>::new();
//! for frame_index in 0..60 {
//!     let ctx = FrameContext { now: Instant::from_millis(frame_index * 16) };
//!     water.draw(ctx, &mut frame);
//! }
//! assert!(frame.iter().any(|pixel| *pixel != Default::default()));
//! # Ok::<(), ripple_panel::Error>(())
//! ```

pub mod edge;
pub mod field;
pub mod stimulus;

pub use edge::{EdgeMask, EdgeWaves};
pub use field::{MAX_SIDE, Side, WaveField};
pub use stimulus::{MovingStimulus, RandomDrops, Stimulus};

use embassy_time::Instant;
use fixed::types::U8F8;

use crate::led_strip::{Correction, Frame1d};
use crate::logging::{debug, info, trace};
use crate::palette::Palette16;
use crate::settings::WaterSettings;
use crate::xy::{XyLookup, XyMap};
use crate::{Error, Result};

/// Per-frame input from the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameContext {
    /// Timestamp of the frame being drawn.
    pub now: Instant,
}

/// Lifecycle of a [`WaterEffect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(all(feature = "defmt", not(feature = "host")), derive(defmt::Format))]
pub enum EffectState {
    /// Constructed, no frame drawn yet.
    Idle,
    /// At least one frame drawn.
    Running,
}

/// Water ripples on a `W × H` matrix of `N == W * H` LEDs.
///
/// `PADDED` must be `(W + 2) * (H + 2)`; it sizes the simulation buffers.
#[derive(Clone, Debug)]
pub struct WaterEffect<const W: usize, const H: usize, const PADDED: usize, const N: usize> {
    field: WaveField<W, H, PADDED>,
    lookup: XyLookup<N>,
    settings: WaterSettings,
    edge_waves: Option<EdgeWaves>,
    moving: MovingStimulus,
    drops: RandomDrops,
    correction: Correction,
    palette_offset: u16,
    state: EffectState,
    frames: u32,
}

impl<const W: usize, const H: usize, const PADDED: usize, const N: usize>
    WaterEffect<W, H, PADDED, N>
{
    /// Build the effect for the matrix described by `xy_map`.
    ///
    /// The mapping is tabulated once. `seed` drives the random drops.
    ///
    /// # Errors
    ///
    /// Any [`WaveField::new`] error, [`XyLookup::from_map`] error (including a mapping
    /// whose size is not `W × H`), or [`EdgeWaves::new`] error from `settings`.
    pub fn new<M: XyMap + ?Sized>(xy_map: &M, settings: WaterSettings, seed: u64) -> Result<Self> {
        let field = WaveField::new(settings.damping)?;
        if usize::from(xy_map.width()) != W || usize::from(xy_map.height()) != H {
            return Err(Error::StorageLength {
                expected: W * H,
                actual: xy_map.len(),
            });
        }
        let lookup = XyLookup::from_map(xy_map)?;
        let edge_waves = settings.edge_waves()?;

        let effect = Self {
            field,
            lookup,
            settings,
            edge_waves,
            moving: MovingStimulus::new(),
            drops: RandomDrops::new(seed),
            correction: settings.correction(),
            palette_offset: 0,
            state: EffectState::Idle,
            frames: 0,
        };
        info!("water effect {}x{} ready ({} LEDs)", W, H, N);
        Ok(effect)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EffectState {
        self.state
    }

    /// Frames drawn so far.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// The active tunables.
    #[must_use]
    pub const fn settings(&self) -> &WaterSettings {
        &self.settings
    }

    /// The simulation state.
    #[must_use]
    pub const fn field(&self) -> &WaveField<W, H, PADDED> {
        &self.field
    }

    /// Mutable access to the simulation, for custom stimulus between frames.
    pub const fn field_mut(&mut self) -> &mut WaveField<W, H, PADDED> {
        &mut self.field
    }

    /// The tabulated matrix mapping.
    #[must_use]
    pub const fn lookup(&self) -> &XyLookup<N> {
        &self.lookup
    }

    /// Add a stimulus at sub-cell `(x, y)` in padded field coordinates.
    pub fn inject(&mut self, x: U8F8, y: U8F8, intensity: u8) {
        self.field.inject(x, y, intensity);
    }

    /// Change the edge damping and repaint the perimeter.
    ///
    /// Driven sides are repainted by the next frame.
    pub fn set_edge_damping(&mut self, damping: u8) {
        self.settings.damping = damping;
        self.field.set_edge_damping(damping);
    }

    /// Replace the tunables.
    ///
    /// The perimeter is repainted when the damping or the driven edges change. The
    /// field itself keeps its ripples.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroLengthEdgeCycle`] if the new settings drive edges with zero
    /// cycles. The old settings stay in effect.
    pub fn apply_settings(&mut self, settings: WaterSettings) -> Result<()> {
        let edge_waves = settings.edge_waves()?;
        let repaint = settings.damping != self.settings.damping
            || settings.edges != self.settings.edges
            || settings.edge_cycles != self.settings.edge_cycles;

        if repaint {
            self.field.set_edge_damping(settings.damping);
            self.edge_waves = edge_waves;
            debug!(
                "edges reconfigured: mask {} cycles {}",
                settings.edges.bits(),
                settings.edge_cycles
            );
        } else if let (Some(current), Some(new)) = (&mut self.edge_waves, edge_waves) {
            // Same sides: keep the phase, take the new speed.
            let phase = current.phase();
            *current = new;
            current.set_phase(phase);
        }
        self.correction = settings.correction();
        self.settings = settings;
        info!(
            "water settings applied: damping {} brightness {}",
            settings.damping, settings.brightness
        );
        Ok(())
    }

    /// Default color for an amplitude: the palette at the rotating offset plus
    /// `amplitude << 5`, with brightness equal to the amplitude.
    #[must_use]
    pub fn color_for(palette: &Palette16, palette_offset: u16, amplitude: u8) -> smart_leds::RGB8 {
        palette.color(
            palette_offset.wrapping_add(u16::from(amplitude) << 5),
            amplitude,
        )
    }

    /// Run one frame and write it into `frame`.
    pub fn draw(&mut self, ctx: FrameContext, frame: &mut Frame1d<N>) {
        if self.state == EffectState::Idle {
            self.state = EffectState::Running;
            debug!("water effect running");
        }

        if let Some(edge_waves) = &mut self.edge_waves {
            edge_waves.drive(&mut self.field);
        }

        if self.settings.moving_stimulus {
            let Stimulus { x, y, intensity } = self.moving.step(ctx.now, W, H);
            self.field.inject(x, y, intensity);
        }

        if self.settings.random_drops {
            if let Some(Stimulus { x, y, intensity }) = self.drops.roll(W, H) {
                let cell_x = usize::from(x.to_bits() >> 8);
                let cell_y = usize::from(y.to_bits() >> 8);
                if self.field.get(cell_x, cell_y) == Some(0) {
                    self.field.inject(x, y, intensity);
                }
            }
        }

        self.field.advance();
        self.field.swap_buffers();

        self.palette_offset = self.palette_offset.wrapping_add(self.settings.palette_speed);
        let palette = self.settings.palette.palette();
        let palette_offset = self.palette_offset;
        self.field.render(&self.lookup, &mut frame.0, |amplitude| {
            Self::color_for(palette, palette_offset, amplitude)
        });
        self.correction.apply(frame);

        self.frames = self.frames.wrapping_add(1);
        trace!("water frame {}", self.frames);
    }
}

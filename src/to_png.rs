//! Host-side PNG and APNG previews of panel frames.
//!
//! Each pixel is drawn as a soft-edged disc on a black background so the picture looks
//! like a lit panel. LED values are treated as gamma-encoded and linearized with
//! [`Preview::inverse_gamma`] before being written as 16-bit samples.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use embassy_time::Duration;
use png::{BitDepth, ColorType, Encoder, ScaledFloat};
use smart_leds::RGB8;

use crate::led2d::Frame2d;
use crate::led_strip::Frame1d;
use crate::water::WaveField;
use crate::xy::XyLookup;

type PreviewResult<T = ()> = Result<T, Box<dyn Error>>;

/// How previews are sized and shaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preview {
    /// Largest output width or height in image pixels.
    pub max_dimension: u32,
    /// Exponent that turns an LED value into linear light.
    pub inverse_gamma: f32,
}

impl Default for Preview {
    fn default() -> Self {
        Self {
            max_dimension: 400,
            inverse_gamma: 2.2,
        }
    }
}

impl Preview {
    /// Write one frame as a PNG.
    ///
    /// # Errors
    ///
    /// Any I/O or PNG encoding error, or a size that does not fit the image format.
    pub fn write_png<const W: usize, const H: usize>(
        &self,
        frame: &Frame2d<W, H>,
        output_path: impl AsRef<Path>,
    ) -> PreviewResult {
        let output_path = output_path.as_ref();
        let layout = Layout::new(W, H, self.max_dimension)?;
        let mut encoder = encoder(output_path, &layout)?;
        encoder.set_source_gamma(ScaledFloat::new(1.0));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.render(frame, &layout))?;
        writer.finish()?;
        log::info!("wrote PNG to {}", output_path.display());
        Ok(())
    }

    /// Write frames as a looping APNG, `frame_delay` apart.
    ///
    /// # Errors
    ///
    /// An empty `frames`, a delay outside `1..=65535` ms, or any I/O or encoding error.
    pub fn write_apng<const W: usize, const H: usize>(
        &self,
        frames: &[Frame2d<W, H>],
        output_path: impl AsRef<Path>,
        frame_delay: Duration,
    ) -> PreviewResult {
        if frames.is_empty() {
            return Err("an animation needs at least one frame".into());
        }
        let delay_ms = u16::try_from(frame_delay.as_millis())?;
        if delay_ms == 0 {
            return Err("frame delay must be at least one millisecond".into());
        }

        let output_path = output_path.as_ref();
        let layout = Layout::new(W, H, self.max_dimension)?;
        let mut encoder = encoder(output_path, &layout)?;
        encoder.set_source_gamma(ScaledFloat::new(1.0));
        encoder.set_animated(u32::try_from(frames.len())?, 0)?;
        let mut writer = encoder.write_header()?;
        for frame in frames {
            writer.set_frame_delay(delay_ms, 1000)?;
            writer.write_image_data(&self.render(frame, &layout))?;
        }
        writer.finish()?;
        log::info!(
            "wrote {} frame APNG to {}",
            frames.len(),
            output_path.display()
        );
        Ok(())
    }

    /// Write transmission buffers as a looping APNG, unscrambling them with `lookup`.
    ///
    /// # Errors
    ///
    /// A `lookup` that does not describe a `W × H` matrix, or any [`Self::write_apng`]
    /// error.
    pub fn write_strip_apng<const W: usize, const H: usize, const N: usize>(
        &self,
        strips: &[Frame1d<N>],
        lookup: &XyLookup<N>,
        output_path: impl AsRef<Path>,
        frame_delay: Duration,
    ) -> PreviewResult {
        let frames = strips
            .iter()
            .map(|strip| Frame2d::<W, H>::from_strip(strip, lookup))
            .collect::<crate::Result<Vec<_>>>()?;
        self.write_apng(&frames, output_path, frame_delay)
    }

    fn render<const W: usize, const H: usize>(
        &self,
        frame: &Frame2d<W, H>,
        layout: &Layout,
    ) -> Vec<u8> {
        let mut bytes = vec![0u8; layout.byte_len()];
        let disc = layout.disc();
        for (row_index, row) in frame.0.iter().enumerate() {
            for (column_index, &pixel) in row.iter().enumerate() {
                let linear = self.linearize(pixel);
                let origin_x = layout.border + column_index as u32 * layout.cell_size;
                let origin_y = layout.border + row_index as u32 * layout.cell_size;
                for &(local_x, local_y, coverage) in &disc {
                    let offset = layout.sample_offset(origin_x + local_x, origin_y + local_y);
                    for (channel, value) in linear.iter().enumerate() {
                        let sample = to_u16(value * coverage).to_be_bytes();
                        bytes[offset + 2 * channel..offset + 2 * channel + 2]
                            .copy_from_slice(&sample);
                    }
                }
            }
        }
        bytes
    }

    fn linearize(&self, pixel: RGB8) -> [f32; 3] {
        [pixel.r, pixel.g, pixel.b].map(|channel| (f32::from(channel) / 255.0).powf(self.inverse_gamma))
    }
}

/// Show a field's front buffer as grayscale, one pixel per interior cell.
#[must_use]
pub fn field_frame<const W: usize, const H: usize, const PADDED: usize>(
    field: &WaveField<W, H, PADDED>,
) -> Frame2d<W, H> {
    let mut frame = Frame2d::new();
    for (y_index, row) in frame.0.iter_mut().enumerate() {
        for (x_index, pixel) in row.iter_mut().enumerate() {
            let amplitude = field.at(x_index + 1, y_index + 1);
            *pixel = RGB8::new(amplitude, amplitude, amplitude);
        }
    }
    frame
}

struct Layout {
    cell_size: u32,
    radius: u32,
    border: u32,
    width: u32,
    height: u32,
}

impl Layout {
    /// Largest cell size whose image fits `max_dimension`.
    fn new(columns: usize, rows: usize, max_dimension: u32) -> PreviewResult<Self> {
        let columns = u32::try_from(columns)?;
        let rows = u32::try_from(rows)?;
        let mut cell_size = max_dimension.max(4);
        loop {
            let margin = (cell_size / 8).max(1);
            let radius = (cell_size - 2 * margin) / 2;
            let width = columns * cell_size + 2 * radius;
            let height = rows * cell_size + 2 * radius;
            if width.max(height) <= max_dimension || cell_size == 4 {
                return Ok(Self {
                    cell_size,
                    radius,
                    border: radius,
                    width,
                    height,
                });
            }
            cell_size -= 1;
        }
    }

    const fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 3 * 2
    }

    const fn sample_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3 * 2
    }

    /// Pixels of one LED disc relative to its cell, with a linear fade over the outer
    /// third of the radius.
    fn disc(&self) -> Vec<(u32, u32, f32)> {
        let center = (self.cell_size as i32 - 1) / 2;
        let radius = self.radius as f32;
        let inner = radius - (self.radius / 3).max(1) as f32;
        let mut disc = Vec::new();
        for local_y in 0..self.cell_size {
            for local_x in 0..self.cell_size {
                let delta_x = local_x as i32 - center;
                let delta_y = local_y as i32 - center;
                let distance = ((delta_x * delta_x + delta_y * delta_y) as f32).sqrt();
                if distance > radius {
                    continue;
                }
                let coverage = if distance <= inner {
                    1.0
                } else {
                    (1.0 - (distance - inner) / (radius - inner)).max(0.0)
                };
                disc.push((local_x, local_y, coverage));
            }
        }
        disc
    }
}

fn encoder<'a>(
    output_path: &Path,
    layout: &Layout,
) -> PreviewResult<Encoder<'a, BufWriter<File>>> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), layout.width, layout.height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    Ok(encoder)
}

fn to_u16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_fits_target() {
        let layout = Layout::new(16, 8, 200).expect("small panel");
        assert!(layout.width <= 200);
        assert!(layout.height <= 200);
        assert!(layout.radius > 0);
    }

    #[test]
    fn black_frame_renders_black() {
        let preview = Preview::default();
        let layout = Layout::new(2, 2, 40).expect("small panel");
        let bytes = preview.render(&Frame2d::<2, 2>::new(), &layout);
        assert!(bytes.iter().all(|&byte| byte == 0));
    }
}

//! Render temperature fields into browsable artifacts.
//!
//! Two artifacts are produced per shot: a colorized JPEG for
//! display, and the raw per-pixel temperatures as a bare
//! little-endian float32 buffer for exact value lookup. The
//! buffer has no header, padding, or compression; a consumer
//! recovers the temperature under a pixel as
//! `buffer[row * width + col]`, so its length is always
//! exactly `width * height * 4` bytes.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Result;
use byteordered::ByteOrdered;
use image::{jpeg::JpegEncoder, ColorType, DynamicImage, Rgb, RgbImage};
use itertools::iproduct;

use crate::temperature::TemperatureField;

/// Lower bound of the rendered range, degrees Celsius.
pub const RENDER_MIN: f32 = 24.0;
/// Upper bound of the rendered range, degrees Celsius.
pub const RENDER_MAX: f32 = 50.0;
/// Colormap evaluated over the normalized range.
pub const COLORMAP: colorous::Gradient = colorous::TURBO;

/// Bounding dimension of map-marker thumbnails.
pub const THUMBNAIL_BOUND: u32 = 512;
/// JPEG quality for the colorized image.
pub const COLOR_JPEG_QUALITY: u8 = 92;
/// JPEG quality for thumbnails.
pub const THUMB_JPEG_QUALITY: u8 = 85;

// Guards the normalization against a degenerate range.
const MIN_RANGE_SPAN: f32 = 1e-9;

/// Colorize a temperature field over `[vmin, vmax]`. Each
/// pixel is the colormap evaluated at the clamped normalized
/// temperature: values at or below `vmin` take the lowest
/// color, at or above `vmax` the highest.
pub fn colorize(field: &TemperatureField, vmin: f32, vmax: f32) -> RgbImage {
    let span = (vmax - vmin).max(MIN_RANGE_SPAN);
    let (height, width) = field.dim();
    let mut image = RgbImage::new(width as u32, height as u32);
    for (row, col) in iproduct!(0..height, 0..width) {
        let t = ((field.get(row, col) - vmin) / span).max(0.).min(1.);
        let color = COLORMAP.eval_continuous(t as f64);
        image.put_pixel(col as u32, row as u32, Rgb([color.r, color.g, color.b]));
    }
    image
}

/// Write every temperature as a 4-byte little-endian float,
/// row-major, with no framing.
pub fn write_dn_buffer<W: Write>(field: &TemperatureField, writer: W) -> Result<()> {
    let mut out = ByteOrdered::le(writer);
    for value in field.values() {
        out.write_f32(*value)?;
    }
    Ok(())
}

/// Downscale the colorized image to fit within the thumbnail
/// bound, preserving aspect ratio. An image already within
/// the bound is kept at its own size, never enlarged.
pub fn thumbnail(image: &RgbImage) -> RgbImage {
    if image.width() <= THUMBNAIL_BOUND && image.height() <= THUMBNAIL_BOUND {
        return image.clone();
    }
    DynamicImage::ImageRgb8(image.clone())
        .thumbnail(THUMBNAIL_BOUND, THUMBNAIL_BOUND)
        .to_rgb8()
}

pub fn save_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, quality).encode(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgb8,
    )?;
    writer.flush()?;
    Ok(())
}

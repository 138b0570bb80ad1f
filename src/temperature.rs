//! Decode radiometric TIFFs into calibrated temperature
//! fields.
//!
//! The cameras store one digital number per pixel, already
//! linearized against the factory calibration, so the
//! conversion to degrees Celsius is the fixed affine map
//! `dn / 40.0 - 100.0`. This is a property of the capture
//! format, not of any particular dataset, and is therefore
//! not configurable.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Result};
use image::{tiff::TiffDecoder, ColorType, ImageDecoder};
use ndarray::Array2;

/// Divisor of the DN -> Celsius calibration.
pub const DN_DIVISOR: f32 = 40.0;
/// Offset of the DN -> Celsius calibration, in degrees.
pub const DN_OFFSET: f32 = 100.0;

/// Convert one digital number to degrees Celsius.
#[inline]
pub fn dn_to_celsius(dn: f32) -> f32 {
    dn / DN_DIVISOR - DN_OFFSET
}

/// A 2-D grid of calibrated temperatures in degrees
/// Celsius, one value per pixel of the source grid. Row and
/// column order match the raw grid exactly; no resampling or
/// orientation correction is applied.
#[derive(Debug, Clone)]
pub struct TemperatureField {
    data: Array2<f32>,
}

impl TemperatureField {
    /// Read the raw grid from a radiometric TIFF and apply
    /// the calibration per sample. Supports 8- and 16-bit
    /// grayscale layouts; anything else is an error, as is
    /// an unreadable or corrupt file.
    pub fn from_radiometric_tiff(path: &Path) -> Result<Self> {
        let decoder = TiffDecoder::new(BufReader::new(File::open(path)?))?;
        let (width, height) = decoder.dimensions();
        let samples = match decoder.color_type() {
            ColorType::L8 => samples_as_dn::<u8, _>(decoder)?,
            ColorType::L16 => samples_as_dn::<u16, _>(decoder)?,
            other => bail!("unsupported pixel layout: {:?}", other),
        };

        let celsius = samples.into_iter().map(dn_to_celsius).collect();
        let data = Array2::from_shape_vec((height as usize, width as usize), celsius)?;
        Ok(TemperatureField { data })
    }

    pub fn from_celsius(data: Array2<f32>) -> Self {
        TemperatureField { data }
    }

    /// Grid shape as `(height, width)`.
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[(row, col)]
    }

    /// Temperatures in row-major order.
    pub fn values(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }
}

fn samples_as_dn<'a, T, R>(decoder: R) -> Result<Vec<f32>>
where
    f32: From<T>,
    T: zerocopy::AsBytes + zerocopy::FromBytes,
    R: ImageDecoder<'a>,
{
    use zerocopy::AsBytes;

    let (width, height) = decoder.dimensions();
    let num_pixels = (width * height) as usize;
    let mut samples: Vec<T> = Vec::with_capacity(num_pixels);
    unsafe {
        samples.set_len(num_pixels);
    }
    decoder.read_image(samples.as_bytes_mut())?;
    Ok(samples.into_iter().map(|s| s.into()).collect())
}

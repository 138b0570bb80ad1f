//! Best-effort capture metadata from the visible-light
//! image.
//!
//! Everything here is optional by construction: a missing
//! file, missing EXIF block, or malformed tag degrades to
//! the empty defaults instead of failing the shot. The
//! radiometric TIFFs carry no usable EXIF, so the
//! visible-light JPEG is the only metadata source.

use std::{fs::File, io::BufReader, path::Path};

use exif::{In, Rational, Tag, Value};
use serde_derive::*;

/// A geolocation in decimal degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GpsPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Metadata attached to one shot. Fields are independently
/// best-effort; absent data is the empty string or `None`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ShotMeta {
    /// Camera make and model, joined with a single space.
    pub camera: String,
    /// Capture timestamp as recorded by the camera.
    pub datetime: String,
    #[serde(rename = "_gps", default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsPoint>,
}

/// Extract metadata from the visible-light file, if any.
/// Never fails: any extraction problem yields the defaults.
pub fn extract(visible: Option<&Path>) -> ShotMeta {
    let exif = match visible.map(read_exif) {
        Some(Ok(exif)) => exif,
        _ => return ShotMeta::default(),
    };

    let make = ascii_field(&exif, Tag::Make).unwrap_or_default();
    let model = ascii_field(&exif, Tag::Model).unwrap_or_default();
    let camera = format!("{} {}", make, model).trim().to_string();

    let datetime = ascii_field(&exif, Tag::DateTimeOriginal)
        .or_else(|| ascii_field(&exif, Tag::DateTime))
        .unwrap_or_default();

    ShotMeta {
        camera,
        datetime,
        gps: parse_gps(&exif),
    }
}

fn read_exif(path: &Path) -> Result<exif::Exif, exif::Error> {
    let file = File::open(path)?;
    exif::Reader::new().read_from_container(&mut BufReader::new(file))
}

fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref lines) if !lines.is_empty() => {
            let text = String::from_utf8_lossy(&lines[0]);
            Some(text.trim_end_matches('\0').trim().to_string())
        }
        _ => None,
    }
}

fn rational_field<'a>(exif: &'a exif::Exif, tag: Tag) -> Option<&'a [Rational]> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Rational(ref rationals) => Some(rationals.as_slice()),
        _ => None,
    }
}

/// Parse the GPS block into decimal degrees. Latitude and
/// longitude are degree-minute-second triples; hemisphere
/// reference letters flip the sign for South and West.
fn parse_gps(exif: &exif::Exif) -> Option<GpsPoint> {
    let lat = dms_to_degrees(rational_field(exif, Tag::GPSLatitude)?)?;
    let lon = dms_to_degrees(rational_field(exif, Tag::GPSLongitude)?)?;
    Some(GpsPoint {
        lat: apply_hemisphere(lat, ascii_field(exif, Tag::GPSLatitudeRef), "S"),
        lon: apply_hemisphere(lon, ascii_field(exif, Tag::GPSLongitudeRef), "W"),
    })
}

/// Negate a coordinate when its hemisphere reference is the
/// negative one; a missing reference reads as N / E.
fn apply_hemisphere(degrees: f64, reference: Option<String>, negative: &str) -> f64 {
    if reference.as_deref() == Some(negative) {
        -degrees
    } else {
        degrees
    }
}

fn dms_to_degrees(dms: &[Rational]) -> Option<f64> {
    if dms.len() < 3 {
        return None;
    }
    // A zero denominator contributes zero rather than
    // poisoning the whole fix.
    let component = |r: &Rational| if r.denom == 0 { 0.0 } else { r.to_f64() };
    Some(component(&dms[0]) + component(&dms[1]) / 60.0 + component(&dms[2]) / 3600.0)
}

//! Build a browsable static map site from paired
//! visible-light and radiometric thermal captures.
//!
//! A dataset is a directory tree of files grouped by a
//! shared timestamp stem: a visible-light JPEG
//! (`*-visible.jpg`), an optional colorized preview
//! (`*-radiometric.jpg`), and the radiometric TIFF holding
//! raw digital numbers (`*-radiometric.tif[f]`). For every
//! stem with a radiometric file the build
//!
//! 1. [decodes][temperature] the raw grid and applies the
//!    fixed calibration `dn / 40.0 - 100.0` to obtain
//!    degrees Celsius;
//! 2. [extracts][meta] camera, timestamp, and GPS metadata
//!    from the visible-light EXIF, best effort;
//! 3. [renders][render] a colorized JPEG, a bounded
//!    thumbnail, and the raw temperatures as a bare
//!    little-endian float32 buffer for exact per-pixel
//!    lookup;
//! 4. records a [`Shot`] in the index and, when a GPS fix
//!    exists, a point feature for the map layer.
//!
//! The outputs land in a self-contained directory:
//! `data/db.json` (id to shot record), `data/points.geojson`
//! (feature collection), `media/` (artifacts), and the
//! static page shell that browses them.
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use std::path::Path;
//! let stats = thermal_site::build_site(
//!     Path::new("dataset"),
//!     Path::new("site_out"),
//! )?;
//! eprintln!("indexed {} shots", stats.shots_indexed);
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod cli;
pub mod meta;
pub mod render;
pub mod scan;
pub mod site;
pub mod temperature;

pub use crate::site::{build_site, BuildStats, Shot};
pub use crate::temperature::TemperatureField;

//! Assemble the site: drive the per-shot pipeline and write
//! the index and feature collection.
//!
//! Every capture set with a radiometric file becomes one
//! [`Shot`] keyed by a stable id, the hex SHA-1 of the
//! radiometric file's absolute path. A rebuild over the same
//! input tree therefore reproduces the same ids and artifact
//! names. `data/db.json` maps id to shot record;
//! `data/points.geojson` carries one point feature per shot
//! with a GPS fix.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde_derive::*;
use sha1::{Digest, Sha1};

use crate::{
    assets, cli,
    meta::{self, GpsPoint, ShotMeta},
    render,
    scan::{self, CaptureSet},
    temperature::TemperatureField,
};

/// One indexed capture in the persisted index.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Shot {
    pub id: String,
    pub stem: String,
    /// Relative path of the copied visible-light image, or
    /// `null` when the capture had none.
    pub rgb: Option<String>,
    pub thermal_color: String,
    pub thermal_dn: String,
    pub size: ShotSize,
    pub meta: ShotMeta,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ShotSize {
    pub w: usize,
    pub h: usize,
}

/// A point feature for the map layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeoFeature {
    #[serde(rename = "type")]
    pub ty: String,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub ty: String,
    /// `[longitude, latitude]` in degrees.
    pub coordinates: [f64; 2],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeatureProperties {
    pub id: String,
    pub camera: String,
    pub datetime: String,
    pub thumb: String,
}

impl GeoFeature {
    fn point(id: &str, meta: &ShotMeta, thumb: &str, gps: GpsPoint) -> Self {
        GeoFeature {
            ty: "Feature".to_string(),
            geometry: PointGeometry {
                ty: "Point".to_string(),
                coordinates: [gps.lon, gps.lat],
            },
            properties: FeatureProperties {
                id: id.to_string(),
                camera: meta.camera.clone(),
                datetime: meta.datetime.clone(),
                thumb: thumb.to_string(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub ty: String,
    pub features: Vec<GeoFeature>,
}

impl FeatureCollection {
    fn new(features: Vec<GeoFeature>) -> Self {
        FeatureCollection {
            ty: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// Counts reported at the end of a build.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct BuildStats {
    pub shots_indexed: usize,
    pub features: usize,
}

/// Stable identifier for an artifact: hex SHA-1 of the full
/// source path string. Distinct paths give distinct ids even
/// when stems collide across directories.
pub fn shot_id(path: &Path) -> String {
    let mut hasher = Sha1::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hex::encode(hasher.finalize())
}

const SUBDIRS: [&str; 8] = [
    "assets/css",
    "assets/js",
    "assets/img",
    "data",
    "media/rgb",
    "media/thermal_color",
    "media/thermal_dn",
    "media/thumbs",
];

/// The output directory layout. Creating it (or writing any
/// artifact into it) is the one place a build is allowed to
/// fail outright.
pub struct SiteTree {
    root: PathBuf,
}

impl SiteTree {
    pub fn create(root: &Path) -> Result<Self> {
        for sub in SUBDIRS.iter() {
            fs::create_dir_all(root.join(sub))
                .with_context(|| format!("creating output directory {}", sub))?;
        }
        Ok(SiteTree {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a slash-separated relative artifact path.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

fn thermal_color_rel(id: &str) -> String {
    format!("media/thermal_color/{}.jpg", id)
}

fn thermal_dn_rel(id: &str) -> String {
    format!("media/thermal_dn/{}.bin", id)
}

fn thumb_rel(id: &str) -> String {
    format!("media/thumbs/{}.jpg", id)
}

fn rgb_rel(id: &str) -> String {
    format!("media/rgb/{}.jpg", id)
}

/// Build the complete site under `out_dir` from the capture
/// tree at `input_root`.
///
/// Shots are processed in lexicographic stem order, in
/// parallel; the index and feature collection are
/// aggregated serially afterwards. A capture whose
/// radiometric file fails to decode is skipped with a
/// warning; failures to write into the output tree abort
/// the build.
pub fn build_site(input_root: &Path, out_dir: &Path) -> Result<BuildStats> {
    let input_root = input_root
        .canonicalize()
        .with_context(|| format!("resolving input root {:?}", input_root))?;

    let tree = SiteTree::create(out_dir)?;
    assets::write_assets(tree.root())?;

    let sets: Vec<(String, CaptureSet)> = scan::find_capture_sets(&input_root)?
        .into_iter()
        .filter(|(_, set)| set.radiometric.is_some())
        .collect();

    let bar = cli::progress_bar(sets.len() as u64);
    let results: Vec<Option<(Shot, Option<GeoFeature>)>> = sets
        .par_iter()
        .progress_with(bar)
        .map(|(stem, set)| process_set(stem, set, &tree))
        .collect::<Result<Vec<_>>>()?;

    let mut shots: BTreeMap<String, Shot> = BTreeMap::new();
    let mut features: Vec<GeoFeature> = Vec::new();
    for (shot, feature) in results.into_iter().flatten() {
        features.extend(feature);
        shots.insert(shot.id.clone(), shot);
    }

    let stats = BuildStats {
        shots_indexed: shots.len(),
        features: features.len(),
    };

    write_json(&tree.path("data/db.json"), &shots)?;
    write_json(
        &tree.path("data/points.geojson"),
        &FeatureCollection::new(features),
    )?;

    Ok(stats)
}

/// Process one capture set into a shot and its optional map
/// feature. Returns `Ok(None)` when the set is skipped.
fn process_set(
    stem: &str,
    set: &CaptureSet,
    tree: &SiteTree,
) -> Result<Option<(Shot, Option<GeoFeature>)>> {
    let radiometric = match set.radiometric {
        Some(ref path) => path,
        None => return Ok(None),
    };

    // Decode failure drops this capture only; the rest of
    // the build continues.
    let field = match TemperatureField::from_radiometric_tiff(radiometric) {
        Ok(field) => field,
        Err(err) => {
            eprintln!("skipping {}: {:#}", stem, err);
            return Ok(None);
        }
    };

    let id = shot_id(radiometric);
    let (height, width) = field.dim();

    let color = render::colorize(&field, render::RENDER_MIN, render::RENDER_MAX);
    let thermal_color = thermal_color_rel(&id);
    render::save_jpeg(
        &color,
        &tree.path(&thermal_color),
        render::COLOR_JPEG_QUALITY,
    )
    .with_context(|| format!("writing {}", thermal_color))?;

    let thermal_dn = thermal_dn_rel(&id);
    let mut writer = BufWriter::new(
        File::create(tree.path(&thermal_dn))
            .with_context(|| format!("creating {}", thermal_dn))?,
    );
    render::write_dn_buffer(&field, &mut writer)?;
    writer.flush()?;

    let thumb = thumb_rel(&id);
    render::save_jpeg(
        &render::thumbnail(&color),
        &tree.path(&thumb),
        render::THUMB_JPEG_QUALITY,
    )
    .with_context(|| format!("writing {}", thumb))?;

    let rgb = match set.visible {
        Some(ref visible) => {
            let rel = rgb_rel(&shot_id(visible));
            fs::copy(visible, tree.path(&rel))
                .with_context(|| format!("copying {:?}", visible))?;
            Some(rel)
        }
        None => None,
    };

    let meta = meta::extract(set.visible.as_deref());
    let feature = meta.gps.map(|gps| GeoFeature::point(&id, &meta, &thumb, gps));

    let shot = Shot {
        id,
        stem: stem.to_string(),
        rgb,
        thermal_color,
        thermal_dn,
        size: ShotSize {
            w: width,
            h: height,
        },
        meta,
    };
    Ok(Some((shot, feature)))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer =
        BufWriter::new(File::create(path).with_context(|| format!("creating {:?}", path))?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

mod common;

use std::collections::BTreeMap;
use std::fs;

use thermal_site::{build_site, Shot};

fn read_db(out_dir: &std::path::Path) -> BTreeMap<String, Shot> {
    let file = fs::File::open(out_dir.join("data/db.json")).unwrap();
    serde_json::from_reader(file).unwrap()
}

#[test]
fn radiometric_only_capture_indexes_with_null_rgb() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("site");

    common::write_radiometric_tiff(
        &input.path().join("t1-radiometric.tif"),
        &[4000, 4400, 4800, 5200],
        2,
        2,
    );

    let stats = build_site(input.path(), &out_dir).unwrap();
    assert_eq!(stats.shots_indexed, 1);
    assert_eq!(stats.features, 0);

    let db = read_db(&out_dir);
    let shot = db.values().next().unwrap();
    assert_eq!(shot.stem, "t1");
    assert_eq!(shot.rgb, None);
    assert_eq!(shot.size.w, 2);
    assert_eq!(shot.size.h, 2);
    assert_eq!(shot.meta.camera, "");
    assert_eq!(shot.meta.datetime, "");
    assert!(shot.meta.gps.is_none());

    // The raw buffer is the exact float32 payload.
    let dn = fs::read(out_dir.join(&shot.thermal_dn)).unwrap();
    assert_eq!(dn.len(), 2 * 2 * 4);
    let values: Vec<f32> = dn
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0]);

    assert!(out_dir.join(&shot.thermal_color).exists());
    assert!(out_dir
        .join("media/thumbs")
        .join(format!("{}.jpg", shot.id))
        .exists());
    assert!(out_dir.join("index.html").exists());
    assert!(out_dir.join("assets/css/styles.css").exists());
    assert!(out_dir.join("assets/js/main.js").exists());
    assert!(out_dir.join("assets/img/colorbar.png").exists());

    // No GPS fix, so the feature collection is valid but empty.
    let fc: serde_json::Value =
        serde_json::from_reader(fs::File::open(out_dir.join("data/points.geojson")).unwrap())
            .unwrap();
    assert_eq!(fc["type"], "FeatureCollection");
    assert_eq!(fc["features"].as_array().unwrap().len(), 0);
}

#[test]
fn visible_file_is_copied_under_hashed_name() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("site");

    common::write_radiometric_tiff(
        &input.path().join("t1-radiometric.tif"),
        &[4000, 4400],
        2,
        1,
    );
    common::write_visible_jpeg(&input.path().join("t1-visible.jpg"));

    let stats = build_site(input.path(), &out_dir).unwrap();
    assert_eq!(stats.shots_indexed, 1);

    let db = read_db(&out_dir);
    let shot = db.values().next().unwrap();
    let rgb = shot.rgb.as_ref().unwrap();
    assert!(rgb.starts_with("media/rgb/"));
    assert!(out_dir.join(rgb).exists());
    // Bytes copied unmodified.
    let copied = fs::read(out_dir.join(rgb)).unwrap();
    let source = fs::read(input.path().join("t1-visible.jpg")).unwrap();
    assert_eq!(copied, source);
    // No EXIF on the visible file: metadata degrades, no feature.
    assert_eq!(shot.meta.camera, "");
    assert_eq!(stats.features, 0);
}

#[test]
fn corrupt_radiometric_is_skipped_without_aborting() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("site");

    common::write_radiometric_tiff(&input.path().join("good-radiometric.tif"), &[5000], 1, 1);
    fs::write(input.path().join("bad-radiometric.tif"), b"not a tiff").unwrap();

    let stats = build_site(input.path(), &out_dir).unwrap();
    assert_eq!(stats.shots_indexed, 1);

    let db = read_db(&out_dir);
    assert_eq!(db.values().next().unwrap().stem, "good");
}

#[test]
fn capture_without_radiometric_file_is_dropped() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("site");

    common::write_visible_jpeg(&input.path().join("lonely-visible.jpg"));

    let stats = build_site(input.path(), &out_dir).unwrap();
    assert_eq!(stats.shots_indexed, 0);
    assert_eq!(stats.features, 0);
    assert!(read_db(&out_dir).is_empty());
}

#[test]
fn colliding_stems_in_different_directories_get_distinct_ids() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("site");

    let day1 = input.path().join("day1");
    let day2 = input.path().join("day2");
    fs::create_dir_all(&day1).unwrap();
    fs::create_dir_all(&day2).unwrap();
    common::write_radiometric_tiff(&day1.join("a-radiometric.tif"), &[4000], 1, 1);
    common::write_radiometric_tiff(&day2.join("a-radiometric.tif"), &[4400], 1, 1);

    let stats = build_site(input.path(), &out_dir).unwrap();
    // Both files share the stem "a": one capture set, whose
    // radiometric slot keeps the later-visited file.
    assert_eq!(stats.shots_indexed, 1);

    // Distinct paths hash to distinct ids regardless.
    let id1 = thermal_site::site::shot_id(&day1.join("a-radiometric.tif"));
    let id2 = thermal_site::site::shot_id(&day2.join("a-radiometric.tif"));
    assert_ne!(id1, id2);
    let db = read_db(&out_dir);
    let shot = db.values().next().unwrap();
    assert!(shot.id == id1 || shot.id == id2);
}

#[test]
fn rebuild_reproduces_ids_and_artifact_bytes() {
    let input = tempfile::tempdir().unwrap();
    common::write_radiometric_tiff(
        &input.path().join("t1-radiometric.tif"),
        &[4000, 4400, 4800, 5200, 6000, 6400],
        3,
        2,
    );

    let out1 = tempfile::tempdir().unwrap();
    let out2 = tempfile::tempdir().unwrap();
    let dir1 = out1.path().join("site");
    let dir2 = out2.path().join("site");
    build_site(input.path(), &dir1).unwrap();
    build_site(input.path(), &dir2).unwrap();

    let db1 = read_db(&dir1);
    let db2 = read_db(&dir2);
    let ids1: Vec<&String> = db1.keys().collect();
    let ids2: Vec<&String> = db2.keys().collect();
    assert_eq!(ids1, ids2);

    let shot = db1.values().next().unwrap();
    assert_eq!(
        fs::read(dir1.join(&shot.thermal_dn)).unwrap(),
        fs::read(dir2.join(&shot.thermal_dn)).unwrap()
    );
    assert_eq!(
        fs::read(dir1.join(&shot.thermal_color)).unwrap(),
        fs::read(dir2.join(&shot.thermal_color)).unwrap()
    );
    assert_eq!(
        fs::read(dir1.join("data/db.json")).unwrap(),
        fs::read(dir2.join("data/db.json")).unwrap()
    );
}

#[test]
fn empty_dataset_builds_a_valid_empty_index() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("site");

    let stats = build_site(input.path(), &out_dir).unwrap();
    assert_eq!(stats.shots_indexed, 0);
    assert_eq!(stats.features, 0);
    assert!(read_db(&out_dir).is_empty());
    assert!(out_dir.join("index.html").exists());
}

//! Scan a dataset tree and group capture files by their
//! timestamp stem.
//!
//! Cameras in the field write up to three files per trigger,
//! distinguished only by a role suffix on a shared timestamp
//! stem: the visible-light JPEG, a colorized radiometric
//! preview JPEG, and the radiometric TIFF holding the raw
//! digital numbers. Only the radiometric TIFF is required to
//! index a capture.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

/// Suffix of the visible-light JPEG.
pub const VISIBLE_SUFFIX: &str = "-visible.jpg";
/// Suffix of the colorized radiometric preview JPEG.
pub const PREVIEW_SUFFIX: &str = "-radiometric.jpg";
/// Suffixes of the radiometric TIFF, in match priority order.
/// Suffixes sharing a trailing substring must stay
/// longest-first so a name is never claimed by a shorter
/// sibling.
pub const RADIOMETRIC_SUFFIXES: [&str; 2] = ["-radiometric.tiff", "-radiometric.tif"];

/// The role a file plays within a capture set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Visible,
    Preview,
    Radiometric,
}

/// All files sharing one timestamp stem. At most one path
/// per role; a set without a radiometric file cannot be
/// indexed.
#[derive(Debug, Clone, Default)]
pub struct CaptureSet {
    pub visible: Option<PathBuf>,
    /// Recorded during the scan but unused downstream; the
    /// colorized output is re-rendered from the raw grid
    /// instead.
    pub preview: Option<PathBuf>,
    pub radiometric: Option<PathBuf>,
}

impl CaptureSet {
    fn record(&mut self, role: Role, path: PathBuf) {
        // A duplicate role for the same stem keeps the
        // later-visited file.
        let slot = match role {
            Role::Visible => &mut self.visible,
            Role::Preview => &mut self.preview,
            Role::Radiometric => &mut self.radiometric,
        };
        *slot = Some(path);
    }
}

/// Classify a filename against the role suffixes. Returns
/// the role and the stem (the name with the suffix removed),
/// or `None` for a name matching no suffix.
pub fn classify(name: &str) -> Option<(Role, &str)> {
    if let Some(stem) = name.strip_suffix(VISIBLE_SUFFIX) {
        return Some((Role::Visible, stem));
    }
    if let Some(stem) = name.strip_suffix(PREVIEW_SUFFIX) {
        return Some((Role::Preview, stem));
    }
    for suffix in RADIOMETRIC_SUFFIXES.iter() {
        if let Some(stem) = name.strip_suffix(suffix) {
            return Some((Role::Radiometric, stem));
        }
    }
    None
}

/// Walk `root` recursively and group every recognized file
/// into a capture set keyed by stem. Unrecognized names are
/// skipped silently. The returned map is ordered by stem, so
/// downstream processing is independent of directory
/// traversal order.
pub fn find_capture_sets(root: &Path) -> Result<BTreeMap<String, CaptureSet>> {
    let mut sets: BTreeMap<String, CaptureSet> = BTreeMap::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = match entry.file_name().to_str() {
            Some(name) => name,
            None => continue,
        };
        if let Some((role, stem)) = classify(name) {
            sets.entry(stem.to_string())
                .or_insert_with(CaptureSet::default)
                .record(role, entry.path().to_path_buf());
        }
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir_all, File};

    #[test]
    fn classify_by_suffix() {
        assert_eq!(
            classify("20250412-103000-visible.jpg"),
            Some((Role::Visible, "20250412-103000"))
        );
        assert_eq!(
            classify("20250412-103000-radiometric.jpg"),
            Some((Role::Preview, "20250412-103000"))
        );
        assert_eq!(
            classify("20250412-103000-radiometric.tif"),
            Some((Role::Radiometric, "20250412-103000"))
        );
        assert_eq!(
            classify("20250412-103000-radiometric.tiff"),
            Some((Role::Radiometric, "20250412-103000"))
        );
        assert_eq!(classify("notes.txt"), None);
        assert_eq!(classify("20250412-103000.jpg"), None);
    }

    #[test]
    fn groups_by_stem_across_directories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let sub = dir.path().join("day1");
        create_dir_all(&sub)?;
        File::create(dir.path().join("a-visible.jpg"))?;
        File::create(sub.join("a-radiometric.tif"))?;
        File::create(sub.join("b-radiometric.tiff"))?;
        File::create(sub.join("ignored.dat"))?;

        let sets = find_capture_sets(dir.path())?;
        assert_eq!(sets.len(), 2);
        let a = &sets["a"];
        assert!(a.visible.is_some());
        assert!(a.radiometric.is_some());
        assert!(a.preview.is_none());
        let b = &sets["b"];
        assert!(b.visible.is_none());
        assert!(b.radiometric.is_some());
        Ok(())
    }

    #[test]
    fn duplicate_role_keeps_last_visited() {
        let mut set = CaptureSet::default();
        set.record(Role::Radiometric, PathBuf::from("first/a-radiometric.tif"));
        set.record(Role::Radiometric, PathBuf::from("second/a-radiometric.tiff"));
        assert_eq!(
            set.radiometric.as_deref(),
            Some(Path::new("second/a-radiometric.tiff"))
        );
    }
}

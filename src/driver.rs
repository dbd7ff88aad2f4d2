// Batch driver: turns the local photo directory into index calls and
// finishes with one search against the test photo. Everything runs
// sequentially; the first failing call aborts the run.

use crate::api::FaceClient;
use anyhow::{anyhow, bail, Context, Result};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One photo to index: the file on disk and the external id the service
/// will store alongside the face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    pub path: PathBuf,
    pub id: String,
}

/// Explicit run configuration. The original workflow gated the batch
/// step on a toggle buried in the entry point; here the toggle and the
/// photo list are plain data handed to `run`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub reindex: bool,
    pub photos: Vec<PhotoEntry>,
    pub test_photo: PathBuf,
}

impl RunConfig {
    /// Build a config whose photo list is discovered from `photos_dir`
    /// (every `face*.png` in it, ids derived from the filenames).
    /// Reindexing is on by default.
    pub fn from_photos_dir(photos_dir: &Path, test_photo: impl Into<PathBuf>) -> Result<Self> {
        Ok(RunConfig {
            reindex: true,
            photos: discover_photos(photos_dir)?,
            test_photo: test_photo.into(),
        })
    }
}

/// Derive the external id from a photo filename.
///
/// The naming convention is `face-<id>.png`: the id is the token
/// between the first `-` and whichever of `-` or `.` follows it, so
/// `face-travis.png` gives `travis` and `bart-test-2.png` gives `test`.
/// Names that do not contain a `-`, or that leave the id empty, are
/// rejected here instead of failing mid-batch.
pub fn photo_id_from_path(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Photo path {} has no usable file name", path.display()))?;
    let Some((_, rest)) = name.split_once('-') else {
        bail!("Photo name {:?} has no '-' to derive an id from", name);
    };
    let id = rest.split(['-', '.']).next().unwrap_or_default();
    if id.is_empty() {
        bail!("Photo name {:?} derives an empty id", name);
    }
    Ok(id.to_string())
}

/// Enumerate `face*.png` under `dir` and pair each file with its
/// derived id. A missing directory simply yields no entries.
pub fn discover_photos(dir: &Path) -> Result<Vec<PhotoEntry>> {
    let pattern = dir.join("face*.png");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| anyhow!("Photo directory {} is not valid UTF-8", dir.display()))?;
    let mut photos = Vec::new();
    for entry in glob(pattern).context("Invalid photo glob pattern")? {
        let path = entry.context("Failed to read photo directory entry")?;
        let id = photo_id_from_path(&path)?;
        photos.push(PhotoEntry { path, id });
    }
    photos.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(photos)
}

/// Run the batch: index every configured photo (when `reindex` is set),
/// then search the collection once with the test photo. Errors from any
/// call propagate unchanged; photos already indexed before a failure
/// stay indexed remotely and no local progress record is kept.
pub fn run(api: &FaceClient, config: &RunConfig) -> Result<()> {
    if config.reindex {
        for photo in &config.photos {
            println!("{}", photo.path.display());
            println!("{}", photo.id);
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
            spinner.set_message(format!("Indexing {}...", photo.id));
            spinner.enable_steady_tick(Duration::from_millis(100));
            let result = api.index_face(&photo.path, &photo.id);
            spinner.finish_and_clear();
            result?;
        }
    }

    api.search_faces_by_image(&config.test_photo)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_token_between_first_dash_and_dot() {
        assert_eq!(
            photo_id_from_path(Path::new("face-travis.png")).unwrap(),
            "travis"
        );
        assert_eq!(
            photo_id_from_path(Path::new("face-bart.png")).unwrap(),
            "bart"
        );
        assert_eq!(
            photo_id_from_path(Path::new("./photos/face-josephine.png")).unwrap(),
            "josephine"
        );
    }

    #[test]
    fn multi_dash_names_keep_only_the_first_token() {
        assert_eq!(
            photo_id_from_path(Path::new("./photos/test/bart-test-2.png")).unwrap(),
            "test"
        );
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!(photo_id_from_path(Path::new("face.png")).is_err());
        assert!(photo_id_from_path(Path::new("face-.png")).is_err());
    }

    #[test]
    fn discovery_picks_matching_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["face-travis.png", "face-bart.png", "group-shot.png", "face-kiel.jpg"] {
            std::fs::write(dir.path().join(name), b"png").unwrap();
        }

        let photos = discover_photos(dir.path()).unwrap();
        let ids: Vec<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["bart", "travis"]);
        assert!(photos.iter().all(|p| p.path.starts_with(dir.path())));
    }

    #[test]
    fn discovery_of_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("no-such-subdir");
        assert!(discover_photos(&gone).unwrap().is_empty());
    }

    #[test]
    fn run_fails_on_missing_test_photo_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let api = FaceClient::new("http://127.0.0.1:1", None).unwrap();
        let config = RunConfig {
            reindex: false,
            photos: Vec::new(),
            test_photo: dir.path().join("bart-test-2.png"),
        };

        let err = run(&api, &config).unwrap_err();
        assert!(err.to_string().contains("Failed to read image file"));
    }

    #[test]
    fn config_from_photos_dir_defaults_to_reindexing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("face-travis.png"), b"png").unwrap();

        let config =
            RunConfig::from_photos_dir(dir.path(), dir.path().join("test/bart-test-2.png"))
                .unwrap();
        assert!(config.reindex);
        assert_eq!(config.photos.len(), 1);
        assert_eq!(config.photos[0].id, "travis");
    }
}

//! Image store scanning
//!
//! The image store is a plain directory tree. Sources write into it, the
//! publisher reads from it; nothing is ever deleted here.

use crate::config::IMAGES_DIRECTORY;
use crate::error::{Error, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List every file below `dir` (recursively) in random order
///
/// Each call walks the tree again, so files added since the previous call are
/// included and the order differs between calls. Symlinks are not followed.
///
/// # Errors
///
/// Returns a configuration error if `dir` is empty, missing, or not a
/// directory, and an I/O error if the walk fails part way.
pub fn scan_images(dir: &Path) -> Result<Vec<PathBuf>> {
    scan_images_with_rng(dir, &mut rand::thread_rng())
}

/// [`scan_images`] on the blocking thread pool, for use from async code
pub async fn scan_images_in_background(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || scan_images(&dir))
        .await
        .map_err(|e| Error::Other(format!("image scan task failed: {e}")))?
}

/// [`scan_images`] with a caller-provided random source
pub fn scan_images_with_rng<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Result<Vec<PathBuf>> {
    if dir.as_os_str().is_empty() {
        return Err(Error::config("images directory is not set", IMAGES_DIRECTORY));
    }
    if !dir.is_dir() {
        return Err(Error::config(
            format!("images directory {} does not exist", dir.display()),
            IMAGES_DIRECTORY,
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            let context = format!("failed to scan {}: {e}", path.display());
            // Loop errors carry no io::Error; everything else keeps its kind
            let kind = e
                .into_io_error()
                .map_or(std::io::ErrorKind::Other, |io| io.kind());
            Error::Io(std::io::Error::new(kind, context))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    // Walk order depends on the filesystem; sort first so a seeded rng is reproducible
    files.sort();
    files.shuffle(rng);
    tracing::debug!(dir = %dir.display(), count = files.len(), "scanned image store");
    Ok(files)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"img").unwrap();
    }

    #[test]
    fn finds_every_file_recursively_exactly_once() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let expected: HashSet<PathBuf> = [
            root.join("a.jpg"),
            root.join("nasa_apod/b.jpg"),
            root.join("nasa_epic/2024/c.png"),
            root.join("spacex/d.jpg"),
        ]
        .into_iter()
        .collect();
        for path in &expected {
            touch(path);
        }
        std::fs::create_dir_all(root.join("empty_subdir")).unwrap();

        let found = scan_images(root).unwrap();

        assert_eq!(found.len(), expected.len(), "no duplicates, no directories");
        let found: HashSet<PathBuf> = found.into_iter().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let temp = tempdir().unwrap();
        assert!(scan_images(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn rescans_pick_up_new_files() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("a.jpg"));
        assert_eq!(scan_images(temp.path()).unwrap().len(), 1);

        touch(&temp.path().join("later/b.jpg"));
        assert_eq!(scan_images(temp.path()).unwrap().len(), 2);
    }

    #[test]
    fn order_follows_the_random_source() {
        let temp = tempdir().unwrap();
        for i in 0..20 {
            touch(&temp.path().join(format!("{i:02}.jpg")));
        }

        let first = scan_images_with_rng(temp.path(), &mut StdRng::seed_from_u64(7)).unwrap();
        let again = scan_images_with_rng(temp.path(), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first, again, "same seed, same order");

        let orders: HashSet<Vec<PathBuf>> = (0..5)
            .map(|seed| scan_images_with_rng(temp.path(), &mut StdRng::seed_from_u64(seed)).unwrap())
            .collect();
        assert!(orders.len() > 1, "different seeds should shuffle differently");
    }

    #[test]
    fn missing_directory_is_config_error() {
        let temp = tempdir().unwrap();
        let result = scan_images(&temp.path().join("nope"));
        assert!(matches!(
            result,
            Err(Error::Config { key: Some(k), .. }) if k == IMAGES_DIRECTORY
        ));
    }

    #[test]
    fn unset_directory_is_config_error() {
        assert!(matches!(scan_images(Path::new("")), Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn background_scan_sees_the_same_files() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("a.jpg"));
        touch(&temp.path().join("deep/b.jpg"));

        let found: HashSet<PathBuf> = scan_images_in_background(temp.path())
            .await
            .unwrap()
            .into_iter()
            .collect();
        let expected: HashSet<PathBuf> = scan_images(temp.path()).unwrap().into_iter().collect();
        assert_eq!(found, expected);
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn background_scan_reports_config_errors() {
        let temp = tempdir().unwrap();
        let result = scan_images_in_background(&temp.path().join("nope")).await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_keeps_permission_denied_kind() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let locked = temp.path().join("locked");
        touch(&locked.join("hidden.jpg"));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind root
        let readable = std::fs::read_dir(&locked).is_ok();
        let result = scan_images(temp.path());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        match result {
            Err(Error::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied);
                assert!(e.to_string().contains("locked"), "{e}");
            }
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn file_instead_of_directory_is_config_error() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a.jpg");
        touch(&file);
        assert!(matches!(scan_images(&file), Err(Error::Config { .. })));
    }
}

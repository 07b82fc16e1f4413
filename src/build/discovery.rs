//! Source image discovery.
//!
//! Lists the images of one directory (non-recursive) and the subfolders of
//! an animation root. Everything is returned sorted by path so runs are
//! reproducible.

use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extensions accepted as source images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Error during source discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The directory to scan does not exist or is a file
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Check if a path has a recognized image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Every direct child of `dir` matching `keep`, sorted.
fn list_children(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };
    let paths = glob_with(&pattern, options)
        .map_err(|source| DiscoveryError::InvalidPattern { pattern: pattern.clone(), source })?;

    let mut found = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if keep(&path) => found.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("error reading path: {}", e),
        }
    }

    found.sort();
    Ok(found)
}

/// Source images directly inside `dir`.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    list_children(dir, |p| p.is_file() && is_image_file(p))
}

/// Subdirectories directly inside `dir`.
pub fn discover_subfolders(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    list_children(dir, Path::is_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("hero.png")));
        assert!(is_image_file(Path::new("hero walk 1.JPG")));
        assert!(is_image_file(Path::new("logo.WebP")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn test_discover_images_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.png");
        touch(temp.path(), "a.BMP");
        touch(temp.path(), "readme.md");
        touch(temp.path(), "nested/c.png");

        let files = discover_images(temp.path()).unwrap();
        let names: Vec<_> =
            files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["a.BMP", "b.png"]);
    }

    #[test]
    fn test_discover_images_with_glob_characters_in_path() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("[anims]");
        touch(&dir, "hero walk 1.png");

        assert_eq!(discover_images(&dir).unwrap().len(), 1);
    }

    #[test]
    fn test_discover_subfolders() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "raptor/raptor idle 1.png");
        touch(temp.path(), "dino/dino walk 1.png");
        touch(temp.path(), "stray.png");

        let folders = discover_subfolders(temp.path()).unwrap();
        assert_eq!(folders, vec![temp.path().join("dino"), temp.path().join("raptor")]);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(discover_images(&missing), Err(DiscoveryError::NotADirectory(_))));
    }
}

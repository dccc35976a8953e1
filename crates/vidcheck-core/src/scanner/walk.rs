use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// Canonical form of `root`, or `DirectoryNotFound` when it is not a directory.
pub fn scan_root(root: &Path) -> Result<PathBuf, Error> {
    if !root.is_dir() {
        return Err(Error::DirectoryNotFound(root.to_path_buf()));
    }
    fs::canonicalize(root).map_err(|_| Error::DirectoryNotFound(root.to_path_buf()))
}

/// Recursive walk of `root` returning every file whose name ends with one of
/// `extensions` (case-insensitive), skipping anything matched by an ignore glob.
///
/// Paths are absolute and sorted by file name within each directory, so the
/// result is deterministic for a fixed directory state.
pub fn discover_video_files(
    root: &Path,
    extensions: &[String],
    ignore_globs: &[String],
) -> Result<Vec<PathBuf>, Error> {
    let root = scan_root(root)?;

    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let suffixes: Vec<String> = extensions.iter().map(|ext| ext.to_lowercase()).collect();

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry, &ignore_patterns));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.file_type().is_file() && has_video_extension(entry.path(), &suffixes) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_ignored(entry: &DirEntry, ignore_patterns: &[Pattern]) -> bool {
    entry.depth() > 0
        && ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(entry.path()))
}

/// `suffixes` must already be lowercase.
pub fn has_video_extension(path: &Path, suffixes: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VIDEO_EXTENSIONS;

    fn default_suffixes() -> Vec<String> {
        VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let suffixes = default_suffixes();
        assert!(has_video_extension(Path::new("/a/Holiday.MP4"), &suffixes));
        assert!(has_video_extension(Path::new("/a/clip.m2ts"), &suffixes));
        assert!(has_video_extension(Path::new("movie.DivX"), &suffixes));
        assert!(!has_video_extension(Path::new("/a/notes.txt"), &suffixes));
        assert!(!has_video_extension(Path::new("/a/mp4"), &suffixes));
    }

    #[test]
    fn test_discover_walks_recursively_and_filters() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("season1/extras")).unwrap();
        fs::write(root.join("a.mkv"), b"x").unwrap();
        fs::write(root.join("readme.md"), b"x").unwrap();
        fs::write(root.join("season1/ep1.MP4"), b"x").unwrap();
        fs::write(root.join("season1/extras/bts.webm"), b"x").unwrap();
        fs::write(root.join("season1/cover.jpg"), b"x").unwrap();

        let files = discover_video_files(root, &default_suffixes(), &[]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mkv", "ep1.MP4", "bts.webm"]);
        assert!(files.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_discover_honours_ignore_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("keep")).unwrap();
        fs::create_dir_all(root.join("trash")).unwrap();
        fs::write(root.join("keep/a.mov"), b"x").unwrap();
        fs::write(root.join("trash/b.mov"), b"x").unwrap();
        fs::write(root.join("keep/sample.avi"), b"x").unwrap();

        let ignores = vec!["**/trash".to_string(), "**/sample.*".to_string()];
        let files = discover_video_files(root, &default_suffixes(), &ignores).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep/a.mov"));
    }

    #[test]
    fn test_missing_root_is_directory_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        match discover_video_files(&missing, &default_suffixes(), &[]) {
            Err(Error::DirectoryNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected DirectoryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_file_root_is_directory_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("clip.mp4");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            discover_video_files(&file, &default_suffixes(), &[]),
            Err(Error::DirectoryNotFound(_))
        ));
    }
}

//! Path utilities for tool arguments and concat list files

use std::io;
use std::path::{Path, PathBuf};

/// Path utilities
pub struct PathUtils;

impl PathUtils {
    /// Absolute form of `path`, resolved against the working directory
    pub fn absolute(path: &Path) -> io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }

    /// Use forward slashes throughout
    pub fn normalize_separators(path: &str) -> String {
        path.replace('\\', "/")
    }

    /// One concat-demuxer line: `file '<absolute path>'`.
    ///
    /// An embedded single quote closes the quoted string, emits an escaped
    /// quote, and reopens it.
    pub fn concat_list_entry(path: &Path) -> io::Result<String> {
        let absolute = Self::absolute(path)?;
        let normalized = Self::normalize_separators(&absolute.to_string_lossy());
        Ok(format!("file '{}'", normalized.replace('\'', "'\\''")))
    }

    /// File name with a suffix inserted before the extension
    pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match path.extension() {
            Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
            None => format!("{}{}", stem, suffix),
        };
        path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_entry_plain() {
        let entry = PathUtils::concat_list_entry(Path::new("/media/clips/a.mp4")).unwrap();
        assert_eq!(entry, "file '/media/clips/a.mp4'");
    }

    #[test]
    fn test_list_entry_escapes_quotes() {
        let entry = PathUtils::concat_list_entry(Path::new("/media/it's here.mp4")).unwrap();
        assert_eq!(entry, r"file '/media/it'\''s here.mp4'");
    }

    #[test]
    fn test_list_entry_is_absolute() {
        let entry = PathUtils::concat_list_entry(Path::new("relative.mp4")).unwrap();
        let cwd = PathUtils::normalize_separators(&std::env::current_dir().unwrap().to_string_lossy());
        assert!(entry.starts_with(&format!("file '{}", cwd)));
    }

    #[test]
    fn test_normalize_backslashes() {
        assert_eq!(PathUtils::normalize_separators(r"C:\clips\a.mp4"), "C:/clips/a.mp4");
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            PathUtils::with_suffix(Path::new("/out/clip_1.mp4"), "_pre"),
            PathBuf::from("/out/clip_1_pre.mp4")
        );
    }
}

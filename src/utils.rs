use glob::{glob, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoContext, Result};

/// Extension of flattened frames
pub const IMAGE_EXTENSION: &str = "jpg";

/// Extension of flattened label masks
pub const MASK_EXTENSION: &str = "png";

/// Width of the zero-padded index in flattened file names
pub const INDEX_WIDTH: usize = 7;

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .progress_chars("#>-"),
    );
    pb
}

/// Recreate an output directory so that it starts empty
pub fn create_output_directory(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        log::warn!(
            "Directory {:?} already exists. Deleting and recreating it.",
            path
        );
        fs::remove_dir_all(path).with_path(path)?;
    }
    fs::create_dir_all(path).with_path(path)?;
    Ok(path.to_path_buf())
}

/// Files directly inside `dir` with the given extension, sorted by name.
///
/// A missing directory yields an empty list; unreadable entries are errors.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        extension
    );
    let paths = glob(&pattern).map_err(|e| Error::Io {
        path: dir.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| Error::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File stem as an owned string
pub fn file_stem_string(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Name of a flattened file: `<index:07>.<ext>`
pub fn indexed_file_name(index: u64, extension: &str) -> String {
    format!("{:0width$}.{}", index, extension, width = INDEX_WIDTH)
}

/// Frame file name paired with a mask: same stem, image extension
pub fn frame_name_for_mask(mask_path: &Path) -> String {
    format!("{}.{}", file_stem_string(mask_path), IMAGE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_file_name() {
        assert_eq!(indexed_file_name(0, "jpg"), "0000000.jpg");
        assert_eq!(indexed_file_name(1234567, "png"), "1234567.png");
    }

    #[test]
    fn test_frame_name_for_mask() {
        assert_eq!(
            frame_name_for_mask(Path::new("/pool/0000042.png")),
            "0000042.jpg"
        );
    }

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.jpg"] {
            fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        let files = list_files_with_extension(temp_dir.path(), "png").unwrap();
        let names: Vec<String> = files.iter().map(|p| file_stem_string(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(list_files_with_extension(&temp_dir.path().join("missing"), "png")
            .unwrap()
            .is_empty());
    }
}

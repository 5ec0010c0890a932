use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::coco::CocoFile;
use crate::error::{Error, IoContext, Result};

/// Read a split manifest: one video id per line
pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).with_path(path)?;
    parse_manifest(&content)
}

/// Parse manifest text. Lines are trimmed and blank lines ignored; a video
/// listed twice is rejected.
pub fn parse_manifest(content: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut videos = Vec::new();
    for line in content.lines() {
        let video = line.trim();
        if video.is_empty() {
            continue;
        }
        if !seen.insert(video) {
            return Err(Error::DuplicateVideo(video.to_string()));
        }
        videos.push(video.to_string());
    }
    Ok(videos)
}

/// Recursively copy `src` into the not yet existing `dst`, returning the
/// number of files copied
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    fs::create_dir_all(dst).with_path(dst)?;

    let mut entries: Vec<_> = fs::read_dir(src)
        .with_path(src)?
        .collect::<std::io::Result<Vec<_>>>()
        .with_path(src)?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut copied = 0;
    for entry in entries {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type().with_path(&from)?.is_dir() {
            copied += copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).with_path(&from)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Serialize a COCO document, creating the parent directory if needed
pub fn write_coco_file(coco: &CocoFile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_path(parent)?;
        }
    }
    let file = File::create(path).with_path(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, coco)?;
    writer.flush().with_path(path)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

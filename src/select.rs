//! Copy the videos of a manifest into a staging area

use log::{debug, info};
use std::path::Path;

use crate::error::{Error, Result};
use crate::io::copy_tree;
use crate::utils::create_progress_bar;

/// Copy `<source_root>/<video>` to `<dest_root>/<video>` for every video.
///
/// Fails on the first missing source or already existing destination.
/// Videos copied before a failure are left in place.
pub fn select_videos(
    videos: &[String],
    source_root: &Path,
    dest_root: &Path,
    label: &str,
) -> Result<Vec<usize>> {
    let pb = create_progress_bar(videos.len() as u64, label);
    let mut counts = Vec::with_capacity(videos.len());

    for video in videos {
        let src = source_root.join(video);
        if !src.is_dir() {
            pb.abandon();
            return Err(Error::MissingVideo {
                video: video.clone(),
                path: src,
            });
        }

        let dst = dest_root.join(video);
        if dst.exists() {
            pb.abandon();
            return Err(Error::DestinationExists(dst));
        }

        let copied = copy_tree(&src, &dst)?;
        debug!("Copied {} files of video {}", copied, video);
        counts.push(copied);
        pb.inc(1);
    }

    pb.finish_with_message(format!("{} complete", label));
    info!(
        "Selected {} videos ({} files) into {}",
        videos.len(),
        counts.iter().sum::<usize>(),
        dest_root.display()
    );
    Ok(counts)
}

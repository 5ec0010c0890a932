//! Flatten staged per-video directories into sequentially named pools
//!
//! Flattening first builds a [`FlattenPlan`] from one sorted frame listing
//! per video, so a frame and the mask with the same stem always receive the
//! same index. The plan is validated before anything is written, the pools
//! are recreated from scratch, and the staging directories are removed only
//! once every file has been copied.

use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoContext, Result};
use crate::utils::{
    create_output_directory, create_progress_bar, file_stem_string, indexed_file_name,
    list_files_with_extension, IMAGE_EXTENSION, MASK_EXTENSION,
};

/// One frame of the flattened pools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub video: String,
    pub stem: String,
    pub index: u64,
    pub frame: PathBuf,
    pub mask: Option<PathBuf>,
}

/// Ordered mapping from staged files to their flattened index
#[derive(Debug, Clone, Default)]
pub struct FlattenPlan {
    pub entries: Vec<PlanEntry>,
    /// Videos that had a staged frame directory, in manifest order
    pub videos: Vec<String>,
}

impl FlattenPlan {
    pub fn frame_count(&self) -> usize {
        self.entries.len()
    }

    pub fn mask_count(&self) -> usize {
        self.entries.iter().filter(|e| e.mask.is_some()).count()
    }
}

/// Assign a global index to every staged frame, in manifest order.
///
/// A video without a staged directory is skipped. Every staged mask must
/// have a frame with the same stem.
pub fn plan_flatten(videos: &[String], images_root: &Path, annos_root: &Path) -> Result<FlattenPlan> {
    let mut plan = FlattenPlan::default();
    let mut next_index = 0u64;

    for video in videos {
        let frame_dir = images_root.join(video);
        let mut masks: BTreeMap<String, PathBuf> =
            list_files_with_extension(&annos_root.join(video), MASK_EXTENSION)?
                .into_iter()
                .map(|path| (file_stem_string(&path), path))
                .collect();

        if !frame_dir.is_dir() {
            if let Some((_, mask)) = masks.into_iter().next() {
                return Err(Error::UnpairedMask {
                    video: video.clone(),
                    mask,
                });
            }
            warn!("Video {} has no staged directory, skipping", video);
            continue;
        }

        for frame in list_files_with_extension(&frame_dir, IMAGE_EXTENSION)? {
            let stem = file_stem_string(&frame);
            let mask = masks.remove(&stem);
            if mask.is_none() {
                debug!("Frame {} of video {} has no mask", stem, video);
            }
            plan.entries.push(PlanEntry {
                video: video.clone(),
                stem,
                index: next_index,
                frame,
                mask,
            });
            next_index += 1;
        }

        if let Some((_, mask)) = masks.into_iter().next() {
            return Err(Error::UnpairedMask {
                video: video.clone(),
                mask,
            });
        }
        plan.videos.push(video.clone());
    }

    Ok(plan)
}

/// Copy every planned file into freshly created pools
pub fn execute_plan(plan: &FlattenPlan, images_dir: &Path, annos_dir: &Path) -> Result<()> {
    create_output_directory(images_dir)?;
    create_output_directory(annos_dir)?;

    let pb = create_progress_bar(plan.entries.len() as u64, "Flatten");
    for entry in &plan.entries {
        let frame_dst = images_dir.join(indexed_file_name(entry.index, IMAGE_EXTENSION));
        fs::copy(&entry.frame, &frame_dst).with_path(&entry.frame)?;
        if let Some(mask) = &entry.mask {
            let mask_dst = annos_dir.join(indexed_file_name(entry.index, MASK_EXTENSION));
            fs::copy(mask, &mask_dst).with_path(mask)?;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Flatten complete");
    Ok(())
}

/// Delete the staged directories of the planned videos
pub fn remove_staging(plan: &FlattenPlan, images_root: &Path, annos_root: &Path) -> Result<()> {
    for video in &plan.videos {
        for dir in [images_root.join(video), annos_root.join(video)] {
            if dir.is_dir() {
                fs::remove_dir_all(&dir).with_path(&dir)?;
            }
        }
    }
    Ok(())
}

/// Plan, copy and (unless `keep_staging`) clean up one split
pub fn flatten_staging(
    videos: &[String],
    images_root: &Path,
    annos_root: &Path,
    images_dir: &Path,
    annos_dir: &Path,
    keep_staging: bool,
) -> Result<FlattenPlan> {
    let plan = plan_flatten(videos, images_root, annos_root)?;
    info!(
        "Flattening {} frames and {} masks from {} videos",
        plan.frame_count(),
        plan.mask_count(),
        plan.videos.len()
    );

    execute_plan(&plan, images_dir, annos_dir)?;
    if !keep_staging {
        remove_staging(&plan, images_root, annos_root)?;
    }
    Ok(plan)
}

/// Parse the stem of a flattened file name as its index
pub fn parse_frame_index(path: &Path) -> Result<u64> {
    let stem = file_stem_string(path);
    stem.parse::<u64>()
        .map_err(|_| Error::FilenameNotInteger(stem))
}

/// Sorted indices of the files of a pool
pub fn pool_indices(dir: &Path, extension: &str) -> Result<Vec<u64>> {
    let mut indices = list_files_with_extension(dir, extension)?
        .iter()
        .map(|path| parse_frame_index(path))
        .collect::<Result<Vec<_>>>()?;
    indices.sort_unstable();
    Ok(indices)
}

/// Check that a pool holds exactly the indices `0..N` and return `N`
pub fn verify_pool(dir: &Path, extension: &str) -> Result<u64> {
    let indices = pool_indices(dir, extension)?;
    for (expected, &index) in (0u64..).zip(indices.iter()) {
        if index != expected {
            return Err(Error::PoolGap {
                dir: dir.to_path_buf(),
                expected,
            });
        }
    }
    Ok(indices.len() as u64)
}

/// Check the frame pool is contiguous and every mask has its frame.
///
/// Returns the number of frames and masks.
pub fn verify_pools(images_dir: &Path, annos_dir: &Path) -> Result<(u64, usize)> {
    let frames = verify_pool(images_dir, IMAGE_EXTENSION)?;
    let masks = pool_indices(annos_dir, MASK_EXTENSION)?;
    if let Some(&orphan) = masks.iter().find(|&&index| index >= frames) {
        return Err(Error::MissingFrame {
            mask: annos_dir.join(indexed_file_name(orphan, MASK_EXTENSION)),
            frame: images_dir.join(indexed_file_name(orphan, IMAGE_EXTENSION)),
        });
    }
    Ok((frames, masks.len()))
}

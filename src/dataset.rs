use log::info;

use crate::coco::CocoFile;
use crate::coco_dataset::process_coco_dataset;
use crate::config::{Args, CocoConfig, DatasetPaths};
use crate::error::Result;
use crate::flatten::{flatten_staging, verify_pools};
use crate::io::read_manifest;
use crate::select::select_videos;
use crate::utils::create_output_directory;

/// Select and flatten the videos of the manifest into the two pools.
///
/// Staging left over from an earlier run is cleared first.
pub fn prepare_pools(paths: &DatasetPaths, keep_staging: bool) -> Result<()> {
    create_output_directory(&paths.staging_images_dir)?;
    create_output_directory(&paths.staging_annos_dir)?;

    let videos = read_manifest(&paths.manifest)?;
    info!(
        "Read {} videos from {}",
        videos.len(),
        paths.manifest.display()
    );

    info!("Selecting video frames...");
    select_videos(
        &videos,
        &paths.source_images_dir,
        &paths.staging_images_dir,
        "Frames",
    )?;

    info!("Selecting video annotations...");
    select_videos(
        &videos,
        &paths.source_annos_dir,
        &paths.staging_annos_dir,
        "Masks",
    )?;

    info!("Flattening staged videos...");
    flatten_staging(
        &videos,
        &paths.staging_images_dir,
        &paths.staging_annos_dir,
        &paths.images_dir,
        &paths.annos_dir,
        keep_staging,
    )?;

    let (frames, masks) = verify_pools(&paths.images_dir, &paths.annos_dir)?;
    info!("Pools hold {} frames and {} masks", frames, masks);
    Ok(())
}

/// Main conversion pipeline for one split
pub fn process_dataset(args: &Args) -> Result<CocoFile> {
    let paths = args.to_dataset_paths();
    let config: CocoConfig = args.to_coco_config()?;

    if args.skip_data_gen {
        info!("Skipping data generation, using existing pools");
    } else {
        prepare_pools(&paths, args.keep_staging)?;
    }

    info!(
        "Generating JSON file for the {} split...",
        args.split.name()
    );
    process_coco_dataset(&paths.annos_dir, &paths.images_dir, &paths.json_path, &config)
}

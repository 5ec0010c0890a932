//! COCO annotation generation
//!
//! Scans the flattened mask pool in file-name order and builds one image
//! record per mask plus one annotation per labelled instance. Image ids
//! follow scan order from 0, annotation ids run from 1 over the whole split.

use log::{debug, info};
use std::io;
use std::path::Path;

use crate::coco::{Annotation, CocoFile, CocoWriter, Image};
use crate::config::CocoConfig;
use crate::error::{Error, Result};
use crate::io::write_coco_file;
use crate::mask::{
    distinct_labels, encode_instance, indicator_mask, load_label_mask, resize_indicator,
};
use crate::types::ProcessingStats;
use crate::utils::{
    create_progress_bar, frame_name_for_mask, list_files_with_extension, MASK_EXTENSION,
};

/// Build the COCO document of a flattened split
pub fn generate_coco_dataset(
    annos_dir: &Path,
    images_dir: &Path,
    config: &CocoConfig,
) -> Result<CocoFile> {
    if !annos_dir.is_dir() {
        return Err(Error::Io {
            path: annos_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "mask pool not found"),
        });
    }
    let masks = list_files_with_extension(annos_dir, MASK_EXTENSION)?;
    info!("Generating annotations for {} masks", masks.len());

    let mut writer = CocoWriter::new();
    let mut stats = ProcessingStats::new();
    let pb = create_progress_bar(masks.len() as u64, "Annotate");

    for mask_path in &masks {
        if let Err(e) = process_mask(mask_path, images_dir, config, &mut writer, &mut stats) {
            pb.abandon();
            return Err(e);
        }
        pb.inc(1);
    }
    pb.finish_with_message("Annotation complete");

    stats.print_summary();
    info!(
        "Built {} image records and {} annotations",
        writer.image_count(),
        writer.annotation_count()
    );
    Ok(writer.build(config.categories.categories()))
}

/// Add the image record and the instance annotations of one mask
fn process_mask(
    mask_path: &Path,
    images_dir: &Path,
    config: &CocoConfig,
    writer: &mut CocoWriter,
    stats: &mut ProcessingStats,
) -> Result<()> {
    let image_id = writer.next_image_id();

    let file_name = frame_name_for_mask(mask_path);
    let frame_path = images_dir.join(&file_name);
    if !frame_path.is_file() {
        return Err(Error::MissingFrame {
            mask: mask_path.to_path_buf(),
            frame: frame_path,
        });
    }
    let (width, height) = image::image_dimensions(&frame_path).map_err(|source| Error::Image {
        path: frame_path.clone(),
        source,
    })?;

    let mask = load_label_mask(mask_path)?;
    if mask.dimensions() != (width, height) {
        debug!(
            "Mask {} is {:?}, frame is {:?}; resampling instances",
            mask_path.display(),
            mask.dimensions(),
            (width, height)
        );
        stats.increment_resized();
    }

    writer.add_image(Image::new(
        image_id,
        file_name,
        width,
        height,
        &config.date_captured,
    ));
    stats.increment_images();

    for label in distinct_labels(&mask) {
        let indicator = resize_indicator(&indicator_mask(&mask, label), width, height);
        let geometry = match encode_instance(&indicator, config.segmentation_mode, config.tolerance)
        {
            Some(geometry) => geometry,
            None => {
                debug!(
                    "Instance {} of {} is empty after resampling",
                    label,
                    mask_path.display()
                );
                stats.increment_skipped_empty();
                continue;
            }
        };

        let category_id = config.class_mapping.category_for(label);
        if !config.categories.contains(category_id) {
            return Err(Error::UnknownCategory(category_id));
        }

        writer.add_annotation(Annotation {
            id: 0,
            image_id,
            category_id,
            iscrowd: geometry.iscrowd,
            area: geometry.area,
            bbox: geometry.bbox,
            segmentation: geometry.segmentation,
            width,
            height,
        });
        stats.increment_annotations();
    }

    Ok(())
}

/// Generate the split's COCO document and write it to `json_path`
pub fn process_coco_dataset(
    annos_dir: &Path,
    images_dir: &Path,
    json_path: &Path,
    config: &CocoConfig,
) -> Result<CocoFile> {
    let coco = generate_coco_dataset(annos_dir, images_dir, config)?;
    write_coco_file(&coco, json_path)?;
    Ok(coco)
}

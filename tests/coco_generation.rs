mod common;

use clap::Parser;
use std::fs;
use tempfile::tempdir;
use youku2coco::coco::Segmentation;
use youku2coco::config::ClassMapping;
use youku2coco::mask::{distinct_labels, load_label_mask};
use youku2coco::{
    generate_coco_dataset, process_coco_dataset, process_dataset, Args, CategorySet, CocoConfig,
    Error, SegmentationMode,
};

use common::{write_frame, write_indexed_mask, write_mask, write_mask16, write_youku_fixture};

#[test]
fn test_background_only_mask_yields_image_without_annotations() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 10, 8);
    write_mask(&annos_dir.join("0000000.png"), 10, 8, &[]);

    let coco = generate_coco_dataset(&annos_dir, &images_dir, &CocoConfig::default()).unwrap();

    assert_eq!(coco.images.len(), 1);
    assert_eq!(coco.images[0].id, 0);
    assert_eq!(coco.images[0].file_name, "0000000.jpg");
    assert!(coco.annotations.is_empty());
}

#[test]
fn test_one_annotation_per_label_value() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 24, 16);
    write_mask(
        &annos_dir.join("0000000.png"),
        24,
        16,
        &[(3, 0, 0, 5, 5), (7, 10, 2, 6, 4), (200, 18, 10, 4, 6)],
    );

    let coco = generate_coco_dataset(&annos_dir, &images_dir, &CocoConfig::default()).unwrap();

    assert_eq!(coco.annotations.len(), 3);
    let ids: Vec<u32> = coco.annotations.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(coco.annotations.iter().all(|a| a.image_id == 0));
    assert!(coco.annotations.iter().all(|a| a.category_id == 1));
    assert!(coco.annotations.iter().all(|a| a.iscrowd == 0));

    // bbox and area come from the full-resolution indicator
    let second = &coco.annotations[1];
    assert_eq!(second.bbox, [10.0, 2.0, 6.0, 4.0]);
    assert_eq!(second.area, 24.0);
    match &second.segmentation {
        Segmentation::Polygon(polygons) => {
            assert_eq!(polygons.len(), 1);
            assert!(polygons[0].len() >= 6);
        }
        other => panic!("expected polygon segmentation, got {:?}", other),
    }
}

#[test]
fn test_width_and_height_come_from_frame() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 16, 12);
    write_mask(&annos_dir.join("0000000.png"), 8, 6, &[(1, 2, 2, 2, 2)]);

    let coco = generate_coco_dataset(&annos_dir, &images_dir, &CocoConfig::default()).unwrap();

    assert_eq!((coco.images[0].width, coco.images[0].height), (16, 12));
    let annotation = &coco.annotations[0];
    assert_eq!((annotation.width, annotation.height), (16, 12));
    assert_eq!(annotation.bbox, [4.0, 4.0, 4.0, 4.0]);
    assert_eq!(annotation.area, 16.0);
}

#[test]
fn test_missing_frame_is_fatal() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 8, 8);
    write_mask(&annos_dir.join("0000000.png"), 8, 8, &[(1, 0, 0, 3, 3)]);
    write_mask(&annos_dir.join("0000001.png"), 8, 8, &[(1, 0, 0, 3, 3)]);

    let result = generate_coco_dataset(&annos_dir, &images_dir, &CocoConfig::default());

    assert!(matches!(
        result,
        Err(Error::MissingFrame { frame, .. }) if frame == images_dir.join("0000001.jpg")
    ));
}

#[test]
fn test_rle_mode_marks_crowd() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 4, 3);
    write_mask(&annos_dir.join("0000000.png"), 4, 3, &[(5, 1, 0, 2, 3)]);
    let config = CocoConfig {
        segmentation_mode: SegmentationMode::Rle,
        ..CocoConfig::default()
    };

    let coco = generate_coco_dataset(&annos_dir, &images_dir, &config).unwrap();

    let annotation = &coco.annotations[0];
    assert_eq!(annotation.iscrowd, 1);
    assert_eq!(
        annotation.segmentation,
        Segmentation::Rle {
            counts: vec![3, 6, 3],
            size: [3, 4],
        }
    );
}

#[test]
fn test_label_value_mapping_uses_taxonomy() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 12, 12);
    write_mask(
        &annos_dir.join("0000000.png"),
        12,
        12,
        &[(3, 0, 0, 4, 4), (18, 6, 6, 4, 4)],
    );
    let config = CocoConfig {
        categories: CategorySet::Coco80,
        class_mapping: ClassMapping::LabelValue,
        ..CocoConfig::default()
    };

    let coco = generate_coco_dataset(&annos_dir, &images_dir, &config).unwrap();

    let categories: Vec<u32> = coco.annotations.iter().map(|a| a.category_id).collect();
    assert_eq!(categories, vec![3, 18]);
    assert_eq!(coco.categories.len(), 80);

    write_mask(&annos_dir.join("0000000.png"), 12, 12, &[(12, 0, 0, 4, 4)]);
    let result = generate_coco_dataset(&annos_dir, &images_dir, &config);
    assert!(matches!(result, Err(Error::UnknownCategory(12))));
}

#[test]
fn test_generation_is_byte_identical_across_runs() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    for index in 0..4u32 {
        write_frame(&images_dir.join(format!("{:07}.jpg", index)), 20, 14);
        write_mask(
            &annos_dir.join(format!("{:07}.png", index)),
            20,
            14,
            &[(1, index, 1, 6, 5), (2, 10, index + 2, 7, 6)],
        );
    }

    let first = temp_dir.path().join("first/instances.json");
    let second = temp_dir.path().join("second/instances.json");
    let config = CocoConfig::default();
    process_coco_dataset(&annos_dir, &images_dir, &first, &config).unwrap();
    process_coco_dataset(&annos_dir, &images_dir, &second, &config).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_end_to_end_two_videos() {
    let temp_dir = tempdir().unwrap();
    let youku = temp_dir.path().join("youku");
    let output = temp_dir.path().join("coco");
    write_youku_fixture(&youku);

    let args = Args::parse_from([
        "youku2coco",
        "-y",
        youku.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--split",
        "train",
    ]);
    process_dataset(&args).unwrap();

    for index in 0..3 {
        assert!(output.join(format!("train2017/{:07}.jpg", index)).is_file());
        assert!(output.join(format!("train2017_anno/{:07}.png", index)).is_file());
    }
    assert!(!output.join("staging/train/JPEGImages/v1").exists());

    let json_path = output.join("annotations/instance_train2017.json");
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();

    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 4);
    assert_eq!(json["type"], "instances");
    assert_eq!(json["categories"][0]["name"], "person");

    let images = json["images"].as_array().unwrap();
    let image_ids: Vec<u64> = images.iter().map(|i| i["id"].as_u64().unwrap()).collect();
    assert_eq!(image_ids, vec![0, 1, 2]);
    let widths: Vec<u64> = images.iter().map(|i| i["width"].as_u64().unwrap()).collect();
    assert_eq!(widths, vec![16, 18, 20]);
    assert_eq!(images[0]["date_captured"], "2013-11-14 17:02:52");

    let annotations = json["annotations"].as_array().unwrap();
    let annotation_ids: Vec<u64> = annotations
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(annotation_ids, vec![1, 2, 3]);
    let owners: Vec<u64> = annotations
        .iter()
        .map(|a| a["image_id"].as_u64().unwrap())
        .collect();
    assert_eq!(owners, vec![0, 0, 1]);
}

#[test]
fn test_rerun_with_existing_pools_only_generates() {
    let temp_dir = tempdir().unwrap();
    let youku = temp_dir.path().join("youku");
    let output = temp_dir.path().join("coco");
    write_youku_fixture(&youku);
    let base = [
        "youku2coco",
        "-y",
        youku.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ];
    process_dataset(&Args::parse_from(base)).unwrap();

    let rerun = Args::parse_from(base.iter().copied().chain(["--skip_data_gen"]));
    let coco = process_dataset(&rerun).unwrap();

    assert_eq!(coco.images.len(), 3);
    assert_eq!(coco.annotations.len(), 3);
}

#[test]
fn test_sixteen_bit_mask_keeps_labels() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 8, 8);
    write_mask16(
        &annos_dir.join("0000000.png"),
        8,
        8,
        &[(1, 0, 0, 3, 3), (2, 4, 4, 3, 3)],
    );

    let coco = generate_coco_dataset(&annos_dir, &images_dir, &CocoConfig::default()).unwrap();

    assert_eq!(coco.annotations.len(), 2);
    assert_eq!(coco.annotations[0].bbox, [0.0, 0.0, 3.0, 3.0]);
    assert_eq!(coco.annotations[1].bbox, [4.0, 4.0, 3.0, 3.0]);
}

#[test]
fn test_sixteen_bit_labels_above_255_stay_distinct() {
    let temp_dir = tempdir().unwrap();
    let mask_path = temp_dir.path().join("0000000.png");
    write_mask16(&mask_path, 6, 4, &[(256, 0, 0, 2, 2), (512, 3, 0, 2, 2)]);

    let mask = load_label_mask(&mask_path).unwrap();

    assert_eq!(distinct_labels(&mask), vec![256, 512]);
}

#[test]
fn test_palette_mask_labels_are_indices() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let annos_dir = temp_dir.path().join("annos");
    write_frame(&images_dir.join("0000000.jpg"), 4, 2);
    // Two rows of [1, 1, 0, 2]
    let indices = [1, 1, 0, 2, 1, 1, 0, 2];
    write_indexed_mask(&annos_dir.join("0000000.png"), 4, 2, &indices);

    let mask = load_label_mask(&annos_dir.join("0000000.png")).unwrap();
    assert_eq!(distinct_labels(&mask), vec![1, 2]);
    assert_eq!(mask.get_pixel(3, 1)[0], 2);

    let coco = generate_coco_dataset(&annos_dir, &images_dir, &CocoConfig::default()).unwrap();
    assert_eq!(coco.annotations.len(), 2);
    assert_eq!(coco.annotations[0].area, 4.0);
    assert_eq!(coco.annotations[1].bbox, [3.0, 0.0, 1.0, 2.0]);
}

#[test]
fn test_rgb_mask_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let mask_path = temp_dir.path().join("0000000.png");
    image::RgbImage::new(4, 4).save(&mask_path).unwrap();

    let result = load_label_mask(&mask_path);

    assert!(matches!(result, Err(Error::UnsupportedMask { .. })));
}

#[test]
fn test_missing_mask_pool_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    write_frame(&images_dir.join("0000000.jpg"), 4, 4);

    let result = generate_coco_dataset(
        &temp_dir.path().join("missing"),
        &images_dir,
        &CocoConfig::default(),
    );

    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_rerun_with_kept_staging_succeeds() {
    let temp_dir = tempdir().unwrap();
    let youku = temp_dir.path().join("youku");
    let output = temp_dir.path().join("coco");
    write_youku_fixture(&youku);
    let args = Args::parse_from([
        "youku2coco",
        "-y",
        youku.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--keep_staging",
    ]);

    process_dataset(&args).unwrap();
    assert!(output.join("staging/train/JPEGImages/v1").is_dir());
    let coco = process_dataset(&args).unwrap();

    assert_eq!(coco.images.len(), 3);
    assert_eq!(coco.annotations.len(), 3);
}

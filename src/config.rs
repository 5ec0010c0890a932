use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::coco::CategorySet;
use crate::error::{Error, Result};

/// Format accepted for the synthetic capture date of every image record
pub const DATE_CAPTURED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Command-line arguments parser for converting a Youku split to COCO format.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Root of the Youku dataset (contains ImageSets, JPEGImages and Annotations)
    #[arg(short = 'y', long = "youku_dir")]
    pub youku_dir: String,

    /// Root of the generated COCO dataset
    #[arg(short = 'o', long = "output_dir", default_value = "./datasets/coco")]
    pub output_dir: String,

    /// Dataset split to convert
    #[arg(long = "split", value_enum, default_value = "train")]
    pub split: Split,

    /// Only generate the JSON file from already flattened pools
    #[arg(long = "skip_data_gen")]
    pub skip_data_gen: bool,

    /// Keep the staged per-video directories after flattening
    #[arg(long = "keep_staging")]
    pub keep_staging: bool,

    /// Segmentation encoding for annotations: 'polygon' or 'rle'
    #[arg(long = "segmentation", value_enum, default_value = "polygon")]
    pub segmentation: SegmentationMode,

    /// Polygon simplification tolerance in pixels
    #[arg(long = "tolerance", default_value_t = 2.0, value_parser = validate_tolerance)]
    pub tolerance: f64,

    /// Category taxonomy written to the JSON file
    #[arg(long = "categories", value_enum, default_value = "person")]
    pub categories: CategorySet,

    /// How mask label values map to category ids
    #[arg(long = "class_mapping", value_enum, default_value = "fixed")]
    pub class_mapping: ClassMappingKind,

    /// Category id assigned to every instance with the 'fixed' mapping
    #[arg(long = "category_id", default_value_t = 1)]
    pub category_id: u32,

    /// Capture date written to every image record
    #[arg(long = "date_captured", default_value = "2013-11-14 17:02:52", value_parser = validate_date)]
    pub date_captured: String,
}

impl Args {
    /// Build the generator configuration from the parsed flags
    pub fn to_coco_config(&self) -> Result<CocoConfig> {
        let class_mapping = match self.class_mapping {
            ClassMappingKind::Fixed => {
                if !self.categories.contains(self.category_id) {
                    return Err(Error::UnknownCategory(self.category_id));
                }
                ClassMapping::Fixed(self.category_id)
            }
            ClassMappingKind::LabelValue => ClassMapping::LabelValue,
        };

        Ok(CocoConfig {
            segmentation_mode: self.segmentation,
            tolerance: self.tolerance,
            categories: self.categories,
            class_mapping,
            date_captured: self.date_captured.clone(),
        })
    }

    /// Resolve every input and output location for the selected split
    pub fn to_dataset_paths(&self) -> DatasetPaths {
        DatasetPaths::new(Path::new(&self.youku_dir), Path::new(&self.output_dir), self.split)
    }
}

/// Which Youku split is converted
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Split {
    Train,
    Val,
}

impl Split {
    /// Manifest path relative to the Youku root
    pub fn manifest_name(self) -> &'static str {
        match self {
            Split::Train => "ImageSets/train.txt",
            // Youku ships its validation list as the test set
            Split::Val => "ImageSets/test.txt",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }
}

/// Segmentation encoding of generated annotations
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum SegmentationMode {
    /// Simplified outer contours, iscrowd = 0
    #[default]
    Polygon,
    /// Uncompressed column-major run-length encoding, iscrowd = 1
    Rle,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum ClassMappingKind {
    Fixed,
    LabelValue,
}

/// Resolved class-id strategy
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ClassMapping {
    /// Every instance gets this category id
    Fixed(u32),
    /// The mask pixel value is the category id
    LabelValue,
}

impl ClassMapping {
    pub fn category_for(self, label: u16) -> u32 {
        match self {
            ClassMapping::Fixed(id) => id,
            ClassMapping::LabelValue => u32::from(label),
        }
    }
}

/// Configuration of the annotation generator
#[derive(Debug, Clone)]
pub struct CocoConfig {
    pub segmentation_mode: SegmentationMode,
    pub tolerance: f64,
    pub categories: CategorySet,
    pub class_mapping: ClassMapping,
    pub date_captured: String,
}

impl Default for CocoConfig {
    fn default() -> Self {
        Self {
            segmentation_mode: SegmentationMode::Polygon,
            tolerance: 2.0,
            categories: CategorySet::Person,
            class_mapping: ClassMapping::Fixed(1),
            date_captured: "2013-11-14 17:02:52".to_string(),
        }
    }
}

/// Input and output locations for one split
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub manifest: PathBuf,
    pub source_images_dir: PathBuf,
    pub source_annos_dir: PathBuf,
    pub staging_images_dir: PathBuf,
    pub staging_annos_dir: PathBuf,
    pub images_dir: PathBuf,
    pub annos_dir: PathBuf,
    pub json_path: PathBuf,
}

impl DatasetPaths {
    pub fn new(youku_dir: &Path, output_dir: &Path, split: Split) -> Self {
        let staging = output_dir.join("staging").join(split.name());
        Self {
            manifest: youku_dir.join(split.manifest_name()),
            source_images_dir: youku_dir.join("JPEGImages"),
            source_annos_dir: youku_dir.join("Annotations"),
            staging_images_dir: staging.join("JPEGImages"),
            staging_annos_dir: staging.join("Annotations"),
            images_dir: output_dir.join(format!("{}2017", split.name())),
            annos_dir: output_dir.join(format!("{}2017_anno", split.name())),
            json_path: output_dir
                .join("annotations")
                .join(format!("instance_{}2017.json", split.name())),
        }
    }
}

// Validate that the tolerance is a finite, non-negative number
fn validate_tolerance(s: &str) -> std::result::Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val.is_finite() && val >= 0.0 => Ok(val),
        _ => Err("TOLERANCE must be a non-negative number".to_string()),
    }
}

fn validate_date(s: &str) -> std::result::Result<String, String> {
    NaiveDateTime::parse_from_str(s, DATE_CAPTURED_FORMAT)
        .map(|_| s.to_string())
        .map_err(|e| format!("DATE must look like 2013-11-14 17:02:52: {}", e))
}

//! Youku to COCO format converter
//!
//! This library selects the videos of a Youku split, flattens their frames and
//! instance masks into sequentially named pools, and converts the masks into a
//! COCO instances file.

pub mod coco;
pub mod coco_dataset;
pub mod config;
pub mod dataset;
pub mod error;
pub mod flatten;
pub mod io;
pub mod mask;
pub mod select;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, CocoConfig, DatasetPaths, SegmentationMode, Split};
pub use dataset::{prepare_pools, process_dataset};
pub use error::{Error, Result};
pub use types::ProcessingStats;

// COCO-specific exports
pub use coco::{CategorySet, CocoFile, CocoWriter};
pub use coco_dataset::{generate_coco_dataset, process_coco_dataset};
pub use flatten::{flatten_staging, plan_flatten, verify_pool, verify_pools, FlattenPlan};
pub use select::select_videos;

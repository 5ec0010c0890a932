//! COCO format data structures
//!
//! The document layout follows the instances files of COCO 2017: an `images`
//! array, the literal `type: "instances"`, an `annotations` array and the
//! `categories` taxonomy.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// COCO category information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub supercategory: String,
    pub id: u32,
    pub name: String,
}

/// COCO image information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u32,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub date_captured: String,
    pub license: u32,
    pub coco_url: String,
    pub flickr_url: String,
}

impl Image {
    pub fn new(id: u32, file_name: String, width: u32, height: u32, date_captured: &str) -> Self {
        Self {
            id,
            file_name,
            width,
            height,
            date_captured: date_captured.to_string(),
            license: 1,
            coco_url: String::new(),
            flickr_url: String::new(),
        }
    }
}

/// Segmentation of one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    /// Flat `[x0, y0, x1, y1, ...]` vertex lists, one per outer contour
    Polygon(Vec<Vec<f64>>),
    /// Column-major runs starting with background, `size` is `[height, width]`
    Rle { counts: Vec<u32>, size: [u32; 2] },
}

/// COCO annotation information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u32,
    pub image_id: u32,
    pub category_id: u32,
    pub iscrowd: u32,
    pub area: f64,
    pub bbox: [f64; 4], // [x, y, width, height]
    pub segmentation: Segmentation,
    pub width: u32,
    pub height: u32,
}

/// Complete COCO instances document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoFile {
    pub images: Vec<Image>,
    #[serde(rename = "type")]
    pub kind: String,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl CocoFile {
    pub fn new(images: Vec<Image>, annotations: Vec<Annotation>, categories: Vec<Category>) -> Self {
        Self {
            images,
            kind: "instances".to_string(),
            annotations,
            categories,
        }
    }
}

/// Fixed category taxonomies the generator can emit
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum CategorySet {
    /// A single "person" class with id 1
    #[default]
    Person,
    /// The 80 annotated COCO 2017 classes with their original ids
    Coco80,
}

impl CategorySet {
    pub fn categories(self) -> Vec<Category> {
        let table: &[(u32, &str, &str)] = match self {
            CategorySet::Person => &COCO80[..1],
            CategorySet::Coco80 => COCO80,
        };
        table
            .iter()
            .map(|&(id, name, supercategory)| Category {
                supercategory: supercategory.to_string(),
                id,
                name: name.to_string(),
            })
            .collect()
    }

    pub fn contains(self, id: u32) -> bool {
        match self {
            CategorySet::Person => id == 1,
            CategorySet::Coco80 => COCO80.iter().any(|&(cid, _, _)| cid == id),
        }
    }
}

/// Hands out the running image and annotation ids of one document
#[derive(Debug)]
pub struct CocoWriter {
    next_image_id: u32,
    next_annotation_id: u32,
    images: Vec<Image>,
    annotations: Vec<Annotation>,
}

impl CocoWriter {
    /// Image ids start at 0, annotation ids at 1
    pub fn new() -> Self {
        Self::with_start_ids(0, 1)
    }

    pub fn with_start_ids(start_image_id: u32, start_annotation_id: u32) -> Self {
        Self {
            next_image_id: start_image_id,
            next_annotation_id: start_annotation_id,
            images: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Reserve the id of the next image
    pub fn next_image_id(&mut self) -> u32 {
        let image_id = self.next_image_id;
        self.next_image_id += 1;
        image_id
    }

    pub fn add_image(&mut self, image: Image) {
        self.images.push(image);
    }

    /// Add an annotation and return the id it was given
    pub fn add_annotation(&mut self, mut annotation: Annotation) -> u32 {
        let annotation_id = self.next_annotation_id;
        self.next_annotation_id += 1;
        annotation.id = annotation_id;
        self.annotations.push(annotation);
        annotation_id
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Build the complete COCO document
    pub fn build(self, categories: Vec<Category>) -> CocoFile {
        CocoFile::new(self.images, self.annotations, categories)
    }
}

impl Default for CocoWriter {
    fn default() -> Self {
        Self::new()
    }
}

const COCO80: &[(u32, &str, &str)] = &[
    (1, "person", "person"),
    (2, "bicycle", "vehicle"),
    (3, "car", "vehicle"),
    (4, "motorcycle", "vehicle"),
    (5, "airplane", "vehicle"),
    (6, "bus", "vehicle"),
    (7, "train", "vehicle"),
    (8, "truck", "vehicle"),
    (9, "boat", "vehicle"),
    (10, "traffic light", "outdoor"),
    (11, "fire hydrant", "outdoor"),
    (13, "stop sign", "outdoor"),
    (14, "parking meter", "outdoor"),
    (15, "bench", "outdoor"),
    (16, "bird", "animal"),
    (17, "cat", "animal"),
    (18, "dog", "animal"),
    (19, "horse", "animal"),
    (20, "sheep", "animal"),
    (21, "cow", "animal"),
    (22, "elephant", "animal"),
    (23, "bear", "animal"),
    (24, "zebra", "animal"),
    (25, "giraffe", "animal"),
    (27, "backpack", "accessory"),
    (28, "umbrella", "accessory"),
    (31, "handbag", "accessory"),
    (32, "tie", "accessory"),
    (33, "suitcase", "accessory"),
    (34, "frisbee", "sports"),
    (35, "skis", "sports"),
    (36, "snowboard", "sports"),
    (37, "sports ball", "sports"),
    (38, "kite", "sports"),
    (39, "baseball bat", "sports"),
    (40, "baseball glove", "sports"),
    (41, "skateboard", "sports"),
    (42, "surfboard", "sports"),
    (43, "tennis racket", "sports"),
    (44, "bottle", "kitchen"),
    (46, "wine glass", "kitchen"),
    (47, "cup", "kitchen"),
    (48, "fork", "kitchen"),
    (49, "knife", "kitchen"),
    (50, "spoon", "kitchen"),
    (51, "bowl", "kitchen"),
    (52, "banana", "food"),
    (53, "apple", "food"),
    (54, "sandwich", "food"),
    (55, "orange", "food"),
    (56, "broccoli", "food"),
    (57, "carrot", "food"),
    (58, "hot dog", "food"),
    (59, "pizza", "food"),
    (60, "donut", "food"),
    (61, "cake", "food"),
    (62, "chair", "furniture"),
    (63, "couch", "furniture"),
    (64, "potted plant", "furniture"),
    (65, "bed", "furniture"),
    (67, "dining table", "furniture"),
    (70, "toilet", "furniture"),
    (72, "tv", "electronic"),
    (73, "laptop", "electronic"),
    (74, "mouse", "electronic"),
    (75, "remote", "electronic"),
    (76, "keyboard", "electronic"),
    (77, "cell phone", "electronic"),
    (78, "microwave", "appliance"),
    (79, "oven", "appliance"),
    (80, "toaster", "appliance"),
    (81, "sink", "appliance"),
    (82, "refrigerator", "appliance"),
    (84, "book", "indoor"),
    (85, "clock", "indoor"),
    (86, "vase", "indoor"),
    (87, "scissors", "indoor"),
    (88, "teddy bear", "indoor"),
    (89, "hair drier", "indoor"),
    (90, "toothbrush", "indoor"),
];

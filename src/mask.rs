//! Label mask decoding and per-instance geometry
//!
//! A label mask stores one instance per distinct non-zero pixel value. Every
//! instance is turned into a binary indicator image from which the COCO bbox,
//! area and segmentation are derived.

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::coco::Segmentation;
use crate::config::SegmentationMode;
use crate::error::{Error, IoContext, Result};

/// Single-channel mask holding raw label values
pub type LabelMask = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Decode a label mask keeping the raw label values.
///
/// Palette PNGs are read as palette indices and grayscale PNGs as their
/// sample values, up to 16 bits. Any other layout is rejected.
pub fn load_label_mask(path: &Path) -> Result<LabelMask> {
    let file = File::open(path).with_path(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let png_error = |source| Error::Png {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = decoder.read_info().map_err(png_error)?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(png_error)?;

    let bits = frame.bit_depth as u8;
    match frame.color_type {
        png::ColorType::Indexed | png::ColorType::Grayscale => Ok(unpack_rows(
            &buf[..frame.buffer_size()],
            frame.width,
            frame.height,
            frame.line_size,
            bits,
        )),
        color => Err(Error::UnsupportedMask {
            path: path.to_path_buf(),
            layout: format!("{:?} {}-bit", color, bits),
        }),
    }
}

// Rows are packed MSB first below 8 bits and big-endian at 16 bits
fn unpack_rows(data: &[u8], width: u32, height: u32, line_size: usize, bits: u8) -> LabelMask {
    ImageBuffer::from_fn(width, height, |x, y| {
        let row = &data[y as usize * line_size..(y as usize + 1) * line_size];
        if bits == 16 {
            let at = x as usize * 2;
            return Luma([u16::from_be_bytes([row[at], row[at + 1]])]);
        }
        let value_mask = ((1u16 << bits) - 1) as u8;
        let bit = x as usize * bits as usize;
        let shift = 8 - bits as usize - bit % 8;
        Luma([u16::from((row[bit / 8] >> shift) & value_mask)])
    })
}

/// Distinct non-zero label values, ascending
pub fn distinct_labels(mask: &LabelMask) -> Vec<u16> {
    let labels: BTreeSet<u16> = mask.pixels().map(|p| p[0]).filter(|&v| v != 0).collect();
    labels.into_iter().collect()
}

/// Binary image holding 1 where the mask equals `label`, 0 elsewhere
pub fn indicator_mask(mask: &LabelMask, label: u16) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([u8::from(mask.get_pixel(x, y)[0] == label)])
    })
}

/// Resample an indicator to the frame size with nearest-neighbour sampling
pub fn resize_indicator(indicator: &GrayImage, width: u32, height: u32) -> GrayImage {
    if indicator.dimensions() == (width, height) {
        return indicator.clone();
    }
    imageops::resize(indicator, width, height, FilterType::Nearest)
}

/// Number of set pixels
pub fn indicator_area(indicator: &GrayImage) -> u64 {
    indicator.pixels().filter(|p| p[0] != 0).count() as u64
}

/// Tight `[x, y, width, height]` box around the set pixels
pub fn indicator_bbox(indicator: &GrayImage) -> Option<[f64; 4]> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in indicator.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| {
        [
            x0 as f64,
            y0 as f64,
            (x1 - x0 + 1) as f64,
            (y1 - y0 + 1) as f64,
        ]
    })
}

/// Uncompressed COCO RLE: column-major runs, first run counts background
pub fn indicator_to_rle(indicator: &GrayImage) -> Segmentation {
    let (width, height) = indicator.dimensions();
    let mut counts = Vec::new();
    let mut current = 0u8;
    let mut run = 0u32;
    for x in 0..width {
        for y in 0..height {
            let value = u8::from(indicator.get_pixel(x, y)[0] != 0);
            if value != current {
                counts.push(run);
                current = value;
                run = 0;
            }
            run += 1;
        }
    }
    counts.push(run);
    Segmentation::Rle {
        counts,
        size: [height, width],
    }
}

/// Outer contours of the indicator simplified with Douglas-Peucker.
///
/// Polygons with fewer than three vertices are dropped. Coordinates are
/// flattened as `[x0, y0, x1, y1, ...]` and clipped at zero.
pub fn indicator_to_polygons(indicator: &GrayImage, tolerance: f64) -> Vec<Vec<f64>> {
    // Pad so that instances touching the frame edge still close
    let (width, height) = indicator.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    for (x, y, pixel) in indicator.enumerate_pixels() {
        if pixel[0] != 0 {
            padded.put_pixel(x + 1, y + 1, Luma([255]));
        }
    }

    find_contours::<u32>(&padded)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer))
        .filter_map(|contour| {
            let mut points: Vec<Point<u32>> = if tolerance > 0.0 {
                approximate_polygon_dp(&contour.points, tolerance, true)
            } else {
                contour.points
            };
            // The closed approximation repeats its first vertex
            points.dedup();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            if points.len() < 3 {
                return None;
            }
            Some(
                points
                    .iter()
                    .flat_map(|p| {
                        [
                            (p.x as f64 - 1.0).max(0.0),
                            (p.y as f64 - 1.0).max(0.0),
                        ]
                    })
                    .collect(),
            )
        })
        .collect()
}

/// Geometry of one instance as written to the annotation record
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceGeometry {
    pub bbox: [f64; 4],
    pub area: f64,
    pub segmentation: Segmentation,
    pub iscrowd: u32,
}

/// Encode an indicator mask; `None` when no pixel is set.
///
/// bbox and area always come from the full-resolution indicator. In polygon
/// mode an instance whose contours all simplify away is written as RLE.
pub fn encode_instance(
    indicator: &GrayImage,
    mode: SegmentationMode,
    tolerance: f64,
) -> Option<InstanceGeometry> {
    let area = indicator_area(indicator);
    if area == 0 {
        return None;
    }
    let bbox = indicator_bbox(indicator)?;

    let (segmentation, iscrowd) = match mode {
        SegmentationMode::Rle => (indicator_to_rle(indicator), 1),
        SegmentationMode::Polygon => {
            let polygons = indicator_to_polygons(indicator, tolerance);
            if polygons.is_empty() {
                log::warn!(
                    "Instance of {} px has no polygon at tolerance {}, using RLE",
                    area,
                    tolerance
                );
                (indicator_to_rle(indicator), 0)
            } else {
                (Segmentation::Polygon(polygons), 0)
            }
        }
    };

    Some(InstanceGeometry {
        bbox,
        area: area as f64,
        segmentation,
        iscrowd,
    })
}

#![allow(dead_code)]

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Write a solid JPEG frame of the given size
pub fn write_frame(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_pixel(width, height, image::Rgb([90, 120, 150]))
        .save(path)
        .unwrap();
}

/// Write a label mask with one rectangular block per `(label, x, y, w, h)`
pub fn write_mask(path: &Path, width: u32, height: u32, blocks: &[(u8, u32, u32, u32, u32)]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut mask = GrayImage::new(width, height);
    for &(label, bx, by, bw, bh) in blocks {
        for y in by..by + bh {
            for x in bx..bx + bw {
                mask.put_pixel(x, y, Luma([label]));
            }
        }
    }
    mask.save(path).unwrap();
}

/// Write a 16-bit grayscale label mask, one block per `(label, x, y, w, h)`
pub fn write_mask16(path: &Path, width: u32, height: u32, blocks: &[(u16, u32, u32, u32, u32)]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut mask: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(width, height);
    for &(label, bx, by, bw, bh) in blocks {
        for y in by..by + bh {
            for x in bx..bx + bw {
                mask.put_pixel(x, y, Luma([label]));
            }
        }
    }
    mask.save(path).unwrap();
}

/// Write an 8-bit palette PNG whose pixels are the given palette indices.
///
/// Index 1 is light and index 2 is dark, so decoding to luma would not
/// return the indices.
pub fn write_indexed_mask(path: &Path, width: u32, height: u32, indices: &[u8]) {
    assert_eq!(indices.len(), (width * height) as usize);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(vec![0, 0, 0, 200, 200, 200, 10, 10, 10]);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(indices).unwrap();
}

/// Youku layout with videos v1 (two frames) and v2 (one frame).
///
/// Frame widths differ per frame so pairs can be recognised after flattening:
/// v1/00000 is 16 wide, v1/00001 is 18 wide, v2/00000 is 20 wide.
pub fn write_youku_fixture(root: &Path) {
    fs::create_dir_all(root.join("ImageSets")).unwrap();
    fs::write(root.join("ImageSets/train.txt"), "v1\nv2\n").unwrap();

    let frames = [("v1", "00000", 16), ("v1", "00001", 18), ("v2", "00000", 20)];
    for (video, stem, width) in frames {
        write_frame(
            &root.join(format!("JPEGImages/{}/{}.jpg", video, stem)),
            width,
            12,
        );
    }

    // v1/00000: two instances, v1/00001: one instance, v2/00000: background only
    write_mask(
        &root.join("Annotations/v1/00000.png"),
        16,
        12,
        &[(1, 1, 1, 5, 4), (2, 8, 5, 6, 6)],
    );
    write_mask(&root.join("Annotations/v1/00001.png"), 18, 12, &[(1, 2, 2, 8, 8)]);
    write_mask(&root.join("Annotations/v2/00000.png"), 20, 12, &[]);
}

#![allow(dead_code)]

use std::fs::File;
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder};

/// Dark background with a bright square in the middle.
pub fn square_u8(width: u32, height: u32) -> Vec<u8> {
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let in_x = x >= width / 4 && x < 3 * width / 4;
                let in_y = y >= height / 4 && y < 3 * height / 4;
                let base = if in_x && in_y { 200 } else { 30 };
                base + ((x * 7 + y * 13) % 11) as u8
            })
        })
        .collect()
}

pub fn write_gray8(path: &Path, width: u32, height: u32, data: &[u8]) {
    let mut enc = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    enc.write_image::<colortype::Gray8>(width, height, data).unwrap();
}

pub fn write_gray16(path: &Path, width: u32, height: u32, data: &[u16]) {
    let mut enc = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    enc.write_image::<colortype::Gray16>(width, height, data).unwrap();
}

pub fn write_rgb8(path: &Path, width: u32, height: u32) {
    let data = vec![90u8; (width * height * 3) as usize];
    let mut enc = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    enc.write_image::<colortype::RGB8>(width, height, &data).unwrap();
}

//! Test fixtures: small TIFF files written to scratch directories.

use std::fs::File;
use std::path::{Path, PathBuf};

use tiff::encoder::{TiffEncoder, colortype};

/// Black 8-bit RGB placeholder panorama (2:1 aspect).
pub fn write_placeholder_tiff(path: &Path, width: u32, height: u32) {
    let data = vec![0u8; (width * height * 3) as usize];
    let file = File::create(path).unwrap();
    TiffEncoder::new(file)
        .unwrap()
        .write_image::<colortype::RGB8>(width, height, &data)
        .unwrap();
}

/// 16-bit RGB horizontal gradient, red rising left to right.
pub fn write_gradient_tiff16(path: &Path, width: u32, height: u32) -> Vec<u16> {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..height {
        for x in 0..width {
            let value = (x as u64 * u16::MAX as u64 / (width as u64 - 1)) as u16;
            data.extend_from_slice(&[value, 1000, 0]);
        }
    }
    let file = File::create(path).unwrap();
    TiffEncoder::new(file)
        .unwrap()
        .write_image::<colortype::RGB16>(width, height, &data)
        .unwrap();
    data
}

pub fn write_gray8_tiff(path: &Path, width: u32, height: u32, data: &[u8]) {
    let file = File::create(path).unwrap();
    TiffEncoder::new(file)
        .unwrap()
        .write_image::<colortype::Gray8>(width, height, data)
        .unwrap();
}

pub fn scratch_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

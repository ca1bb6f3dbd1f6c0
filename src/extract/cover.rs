//! Cover image handling: resize to 400x600 max with LANCZOS3, encode PNG,
//! save under the configured covers directory as `<book_id>.png` (spec
//! §4.C Extract, §6 Filesystem).

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::ImageFormat;

pub const MAX_WIDTH: u32 = 400;
pub const MAX_HEIGHT: u32 = 600;

pub fn resize_and_save(covers_dir: &Path, book_id: i32, image_data: &[u8]) -> anyhow::Result<String> {
    std::fs::create_dir_all(covers_dir)?;

    let img = image::load_from_memory(image_data)?;
    let resized = img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3);

    let filename = format!("{book_id}.png");
    let path: PathBuf = covers_dir.join(&filename);
    resized.save_with_format(&path, ImageFormat::Png)?;

    Ok(filename)
}

//! Standard-quality export: the result scaled down to 720 pixels.

use crate::error::Result;
use image::imageops::FilterType;
use image::GenericImageView;
use std::io::Cursor;

/// Longest edge of the standard-quality download.
pub const SD_MAX_EDGE: u32 = 720;

/// A re-encoded PNG together with its pixel size.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// PNG bytes.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Computes the size of an image capped at `max_edge` on its longer side.
///
/// Images already within the cap keep their size. When width equals height
/// the height is treated as the longer edge. The shorter edge is rounded
/// half up and never drops below one pixel.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width > height {
        if width > max_edge {
            return (max_edge, scale_edge(height, max_edge, width));
        }
    } else if height > max_edge {
        return (scale_edge(width, max_edge, height), max_edge);
    }
    (width, height)
}

fn scale_edge(edge: u32, max_edge: u32, longer: u32) -> u32 {
    let (edge, max_edge, longer) = (u64::from(edge), u64::from(max_edge), u64::from(longer));
    let scaled = (2 * edge * max_edge + longer) / (2 * longer);
    scaled.max(1) as u32
}

/// Decodes `data`, scales it to fit within `max_edge` and re-encodes it as PNG.
pub fn export_png(data: &[u8], max_edge: u32) -> Result<ExportedImage> {
    let img = image::load_from_memory(data)?;
    let (src_width, src_height) = img.dimensions();
    let (width, height) = fit_within(src_width, src_height, max_edge);

    let img = if (width, height) == (src_width, src_height) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;

    tracing::debug!(
        src_width,
        src_height,
        width,
        height,
        "exported standard-quality image"
    );

    Ok(ExportedImage {
        data: buffer.into_inner(),
        width,
        height,
    })
}

/// Exports the 720p standard-quality PNG.
pub fn export_sd(data: &[u8]) -> Result<ExportedImage> {
    export_png(data, SD_MAX_EDGE)
}

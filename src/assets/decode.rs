use std::io::Cursor;
use std::path::PathBuf;

use crate::assets::raster::Raster;
use crate::foundation::error::{MosaicError, MosaicResult};

/// Load a raster from `url`, bypassing any cache, and downsample it by `downsample_levels`.
///
/// `url` may be a plain filesystem path or a `file://` URL. Masks are always decoded as 8-bit
/// luma; images keep 16-bit values when the source is 16-bit.
pub fn load_raster(url: &str, downsample_levels: u32, is_mask: bool) -> MosaicResult<Raster> {
    let path = resolve_path(url)?;
    let img = image::ImageReader::open(&path)
        .map_err(|e| MosaicError::resource(format!("failed to open '{url}': {e}")))?
        .with_guessed_format()
        .map_err(|e| MosaicError::resource(format!("failed to sniff format of '{url}': {e}")))?
        .decode()
        .map_err(|e| MosaicError::resource(format!("failed to decode '{url}': {e}")))?;
    Ok(raster_from_image(&img, is_mask).downsampled_by(downsample_levels))
}

/// Decode an in-memory encoded image into a raster.
pub fn decode_raster(bytes: &[u8], is_mask: bool) -> MosaicResult<Raster> {
    let img = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MosaicError::resource(format!("failed to sniff image format: {e}")))?
        .decode()
        .map_err(|e| MosaicError::resource(format!("failed to decode image: {e}")))?;
    Ok(raster_from_image(&img, is_mask))
}

fn raster_from_image(img: &image::DynamicImage, is_mask: bool) -> Raster {
    let (width, height) = (img.width(), img.height());
    let wide = matches!(
        img.color(),
        image::ColorType::L16
            | image::ColorType::La16
            | image::ColorType::Rgb16
            | image::ColorType::Rgba16
    );
    let pixels: Vec<f32> = if wide && !is_mask {
        img.to_luma16().into_raw().into_iter().map(f32::from).collect()
    } else {
        img.to_luma8().into_raw().into_iter().map(f32::from).collect()
    };
    Raster {
        width,
        height,
        pixels,
    }
}

fn resolve_path(url: &str) -> MosaicResult<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        if rest.is_empty() {
            return Err(MosaicError::resource("file url has an empty path"));
        }
        return Ok(PathBuf::from(rest));
    }
    if let Some((scheme, _)) = url.split_once("://") {
        return Err(MosaicError::resource(format!(
            "unsupported url scheme '{scheme}' in '{url}'"
        )));
    }
    if url.trim().is_empty() {
        return Err(MosaicError::resource("image url must be non-empty"));
    }
    Ok(PathBuf::from(url))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

use crate::error::{Result, VisionShopError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::path::Path;
use vision_shop_common::camera::{jpeg_quality_percent, IDEAL_HEIGHT, IDEAL_WIDTH, JPEG_MIME, JPEG_QUALITY};
use vision_shop_common::detection::to_data_url;

/// 画像ファイルを 1280×720 以内に縮小し、品質0.7のJPEG Data URLにする
pub fn encode_frame(path: &Path) -> Result<String> {
    let img = image::open(path)
        .map_err(|e| VisionShopError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let img = if img.width() > IDEAL_WIDTH || img.height() > IDEAL_HEIGHT {
        img.resize(IDEAL_WIDTH, IDEAL_HEIGHT, FilterType::Triangle)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality_percent(JPEG_QUALITY))
        .encode_image(&rgb)
        .map_err(|e| VisionShopError::ImageEncode(e.to_string()))?;

    Ok(to_data_url(JPEG_MIME, &STANDARD.encode(&jpeg)))
}

//! 画像ファイルの読み込み
//!
//! ブラウザ版の file input (accept="image/*") に相当する。
//! MIMEタイプは拡張子から判定する。

use crate::error::{Result, ScannerError};
use image::ImageFormat;
use prescription_scanner_common::SelectedImage;
use std::path::Path;

/// imageクレートが扱わないがバックエンドが受け付ける形式
const EXTRA_FORMATS: &[(&str, &str)] = &[("heic", "image/heic"), ("heif", "image/heif")];

/// 拡張子からMIMEタイプを決める
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    if let Ok(format) = ImageFormat::from_path(path) {
        return Some(format.to_mime_type());
    }

    let ext = path.extension()?.to_string_lossy().to_lowercase();
    EXTRA_FORMATS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// 画像を読み込みプレビュー付きで返す
pub fn load_image(path: &Path) -> Result<SelectedImage> {
    if !path.is_file() {
        return Err(ScannerError::FileNotFound(path.display().to_string()));
    }

    let mime_type = mime_type_for(path)
        .ok_or_else(|| ScannerError::UnsupportedImage(path.display().to_string()))?;

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::debug!(file = %file_name, mime_type, bytes = bytes.len(), "image loaded");
    Ok(SelectedImage::new(file_name, mime_type, bytes))
}

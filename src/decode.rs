//! Asynchronous decoding of uploaded floor-plan photos.
//!
//! Each selected file is read and probed independently; the shell spawns
//! one task per file, so a multi-file batch completes in whatever order
//! the decodes finish. A file that fails to decode is reported and never
//! becomes a gallery image.

use std::path::PathBuf;

use thiserror::Error;
use tokio::task;

/// Validated raster payload ready to become a gallery image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Original encoded file bytes; iced decodes them again for display.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Why a selected file could not be turned into a gallery image.
///
/// Kept `Clone` (with stringly payloads) so it can travel inside iced
/// messages.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("không đọc được tệp {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("tệp {path} không phải ảnh hợp lệ: {reason}")]
    Format { path: String, reason: String },
}

/// Read `path` and verify it decodes as an image, returning the payload
/// and pixel dimensions.
///
/// The pixel probe is CPU work, so it runs under `spawn_blocking`.
pub async fn load_image(path: PathBuf) -> Result<DecodedImage, DecodeError> {
    let display = path.display().to_string();

    let bytes = tokio::fs::read(&path).await.map_err(|e| DecodeError::Io {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    task::spawn_blocking(move || probe(bytes, display.clone()))
        .await
        .map_err(|e| DecodeError::Io {
            path: path.display().to_string(),
            reason: format!("task join error: {e}"),
        })?
}

fn probe(bytes: Vec<u8>, path: String) -> Result<DecodedImage, DecodeError> {
    use image::GenericImageView;

    let decoded = image::load_from_memory(&bytes).map_err(|e| DecodeError::Format {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let (width, height) = decoded.dimensions();
    tracing::debug!(%path, width, height, "decoded floor-plan image");

    Ok(DecodedImage {
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = load_image(PathBuf::from("/nonexistent/floorplan.png")).await;
        assert!(matches!(result, Err(DecodeError::Io { .. })));
    }

    #[tokio::test]
    async fn garbage_bytes_are_a_format_error() {
        let dir = std::env::temp_dir();
        let path = dir.join("firesafe-decode-test-not-an-image.bin");
        tokio::fs::write(&path, b"definitely not a png").await.unwrap();

        let result = load_image(path.clone()).await;
        assert!(matches!(result, Err(DecodeError::Format { .. })));

        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn valid_png_reports_dimensions() {
        // Smallest useful fixture: encode a 2x3 image in-process.
        let dir = std::env::temp_dir();
        let path = dir.join("firesafe-decode-test-tiny.png");
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let decoded = load_image(path.clone()).await.unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert!(!decoded.bytes.is_empty());

        let _ = tokio::fs::remove_file(path).await;
    }
}

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use log::debug;

use super::error::ClientError;
use super::messages::{ImageDetail, ImageUrl};

const FALLBACK_MIME: &str = "image/jpeg";

/// Reads an image file fully into memory.
///
/// Paths that do not resolve to a readable regular file are reported as
/// [`ClientError::ImageNotFound`].
pub fn load_image(path: &Path) -> Result<Vec<u8>, ClientError> {
    if !path.is_file() {
        return Err(ClientError::ImageNotFound {
            path: path.to_path_buf(),
        });
    }

    fs::read(path).map_err(|err| unreadable(path, err))
}

fn unreadable(path: &Path, err: io::Error) -> ClientError {
    debug!("Cannot read image '{}': {err}", path.display());
    ClientError::ImageNotFound {
        path: path.to_path_buf(),
    }
}

/// Sniffs the MIME type from the image header, defaulting to JPEG.
pub fn mime_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        _ => FALLBACK_MIME,
    }
}

/// Encodes raw image bytes as a base64 `data:` URL.
pub fn data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(bytes), STANDARD.encode(bytes))
}

/// Loads `path` and wraps it as a high-detail image reference.
pub fn image_url(path: &Path) -> Result<ImageUrl, ClientError> {
    let bytes = load_image(path)?;
    Ok(ImageUrl {
        url: data_url(&bytes),
        detail: Some(ImageDetail::High),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn unique_temp_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("oaichat-image-{label}-{nanos}"))
    }

    #[test]
    fn mime_type_detects_common_formats() {
        assert_eq!(mime_type(PNG_HEADER), "image/png");
        assert_eq!(mime_type(b"\xFF\xD8\xFF\xE0\0\x10JFIF"), "image/jpeg");
        assert_eq!(mime_type(b"GIF89a\x01\0\x01\0"), "image/gif");
        assert_eq!(mime_type(b"RIFF\x24\0\0\0WEBPVP8 "), "image/webp");
    }

    #[test]
    fn mime_type_falls_back_to_jpeg() {
        assert_eq!(mime_type(b"image_data"), "image/jpeg");
        assert_eq!(mime_type(&[]), "image/jpeg");
    }

    #[test]
    fn data_url_embeds_base64_payload() {
        assert_eq!(data_url(b"image_data"), "data:image/jpeg;base64,aW1hZ2VfZGF0YQ==");
    }

    #[test]
    fn image_url_reads_file_with_high_detail() {
        let path = unique_temp_path("png");
        fs::write(&path, PNG_HEADER).expect("temp image should be writable");

        let image = image_url(&path).expect("image should load");
        assert!(image.url.starts_with("data:image/png;base64,"));
        assert_eq!(image.detail, Some(ImageDetail::High));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = unique_temp_path("missing");
        let err = load_image(&path).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, ClientError::ImageNotFound { .. }));
    }

    #[test]
    fn read_failures_are_not_found() {
        let path = PathBuf::from("locked.png");
        for kind in [
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::NotFound,
            io::ErrorKind::InvalidData,
        ] {
            let err = unreadable(&path, io::Error::from(kind));
            assert!(err.is_not_found());
            assert_eq!(err.to_string(), "Image file not found: locked.png");
        }
    }

    #[test]
    fn directory_is_not_an_image() {
        let err = load_image(&std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, ClientError::ImageNotFound { .. }));
    }
}

//! Moving media between files and data URIs.

use sellwise_core::error::{Result, SellwiseError};
use sellwise_core::media::DataUri;
use std::fs;
use std::path::Path;

/// Infers the MIME type from a filename extension using the `mime_guess` library.
pub fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Reads an image file into a data URI.
///
/// Fails for files whose extension does not map to an `image/*` type.
pub fn read_image(path: &Path) -> Result<DataUri> {
    let mime_type = infer_mime_type(path);
    if !mime_type.starts_with("image/") {
        return Err(SellwiseError::config(format!(
            "{} is not an image (detected {})",
            path.display(),
            mime_type
        )));
    }
    let bytes = fs::read(path)
        .map_err(|e| SellwiseError::io(format!("Failed to read {}: {}", path.display(), e)))?;
    tracing::debug!(
        "[MediaFile] Loaded {} ({}, {} bytes)",
        path.display(),
        mime_type,
        bytes.len()
    );
    Ok(DataUri::from_bytes(mime_type, &bytes))
}

/// Decodes `media` and writes the raw bytes to `path`, creating parent directories.
pub fn write_media(path: &Path, media: &DataUri) -> Result<usize> {
    let bytes = media
        .decode()
        .map_err(|e| SellwiseError::internal(format!("Failed to decode media: {}", e)))?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)
        .map_err(|e| SellwiseError::io(format!("Failed to write {}: {}", path.display(), e)))?;
    tracing::debug!(
        "[MediaFile] Wrote {} bytes of {} to {}",
        bytes.len(),
        media.mime_type(),
        path.display()
    );
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_infer_mime_type() {
        assert_eq!(infer_mime_type(Path::new("kurta.png")), "image/png");
        assert_eq!(infer_mime_type(Path::new("kurta.JPG")), "image/jpeg");
        assert_eq!(
            infer_mime_type(Path::new("notes")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_read_image_and_write_back() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("reference.png");
        fs::write(&source, b"\x89PNG fake").unwrap();

        let uri = read_image(&source).unwrap();
        assert_eq!(uri.mime_type(), "image/png");

        let target = temp_dir.path().join("out").join("copy.png");
        let written = write_media(&target, &uri).unwrap();
        assert_eq!(written, 9);
        assert_eq!(fs::read(&target).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn test_read_image_rejects_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("brief.txt");
        fs::write(&source, "hello").unwrap();
        assert!(read_image(&source).is_err());
    }
}

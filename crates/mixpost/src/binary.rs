//! Binary attachments carried by host input records
//!
//! A record names its attachments under `binary`, keyed by property name:
//!
//! ```json
//! {"binary": {"data": {"fileName": "photo.png", "mimeType": "image/png", "data": "<base64>"}}}
//! ```
//!
//! Instead of inline `data` an attachment may point at a file with `path`.

use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Filename sent when the host gave none
pub const DEFAULT_FILE_NAME: &str = "file";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Base64 encoded content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Attachment bytes ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl BinaryData {
    /// Reference a file on disk, keeping its name
    pub fn from_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            ..Default::default()
        }
    }

    /// Resolve the attachment bytes. `property` is only used in error messages.
    pub async fn load(&self, property: &str) -> ApiResult<Attachment> {
        let invalid = |reason: String| Error::InvalidBinary {
            property: property.to_string(),
            reason,
        };

        let bytes = match (&self.data, &self.path) {
            (Some(encoded), None) => base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| invalid(format!("data is not valid base64: {e}")))?,
            (None, Some(path)) => tokio::fs::read(path)
                .await
                .map_err(|e| invalid(format!("failed to read {}: {e}", path.display())))?,
            (Some(_), Some(_)) => return Err(invalid("set either data or path, not both".into())),
            (None, None) => return Err(invalid("neither data nor path is set".into())),
        };

        let file_name = self
            .file_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        let mime_type = self
            .mime_type
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| mime_from_extension(&file_name).to_string());

        Ok(Attachment {
            file_name,
            mime_type,
            bytes,
        })
    }
}

/// Infer MIME type from file extension.
pub fn mime_from_extension(filename: &str) -> &'static str {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return "application/octet-stream",
    };

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inline_data_is_decoded() {
        let binary = BinaryData {
            file_name: Some("photo.png".to_string()),
            data: Some(base64::engine::general_purpose::STANDARD.encode(b"0123456789")),
            ..Default::default()
        };

        let attachment = binary.load("data").await.unwrap();

        assert_eq!(attachment.file_name, "photo.png");
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.bytes, b"0123456789");
    }

    #[tokio::test]
    async fn test_missing_file_name_defaults() {
        let binary = BinaryData {
            data: Some("AAEC".to_string()),
            ..Default::default()
        };

        let attachment = binary.load("data").await.unwrap();

        assert_eq!(attachment.file_name, "file");
        assert_eq!(attachment.mime_type, "application/octet-stream");
        assert_eq!(attachment.bytes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_path_attachment_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"video").unwrap();

        let attachment = BinaryData::from_path(path).load("data").await.unwrap();

        assert_eq!(attachment.file_name, "clip.mp4");
        assert_eq!(attachment.mime_type, "video/mp4");
        assert_eq!(attachment.bytes, b"video");
    }

    #[tokio::test]
    async fn test_invalid_sources() {
        let err = BinaryData::default().load("data").await.unwrap_err();
        assert!(err.to_string().contains("neither data nor path"));

        let err = BinaryData {
            data: Some("!!!".to_string()),
            ..Default::default()
        }
        .load("data")
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBinary { .. }));
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("A.JPG"), "image/jpeg");
        assert_eq!(mime_from_extension("noext"), "application/octet-stream");
    }
}

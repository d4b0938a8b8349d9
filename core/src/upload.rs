//! Binary upload payloads.

use crate::http::MultipartForm;

/// Form field the API reads uploaded images from.
pub const UPLOAD_FIELD: &str = "fileData";

/// File name sent when the caller gives none, or none survives cleaning.
const DEFAULT_FILE_NAME: &str = "blob";

/// An image to upload, with the media type the caller declares for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    bytes: Vec<u8>,
    media_type: String,
    file_name: Option<String>,
}

impl UploadPayload {
    pub fn new(bytes: Vec<u8>, media_type: &str) -> Self {
        Self {
            bytes,
            media_type: media_type.to_string(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Repackage as a single-field multipart form. Consumes the payload.
    ///
    /// The file name lands in a part header, so quotes, backslashes and
    /// control characters are dropped from it.
    pub fn into_form(self) -> MultipartForm {
        let file_name = self
            .file_name
            .as_deref()
            .map(header_safe)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        MultipartForm {
            field_name: UPLOAD_FIELD.to_string(),
            file_name,
            content_type: self.media_type,
            bytes: self.bytes,
        }
    }
}

fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

//! Turning a picked or dropped file into an [`UploadedImage`].
//!
//! Admission runs on the metadata the shell reports with the selection; only an
//! admitted file is read. The bytes come back through the `FileIo` capability and are
//! encoded here into a `data:` URI usable both as the preview source and, once the
//! prefix is stripped, as the request payload.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::model::UploadedImage;
use crate::MAX_IMAGE_BYTES;

/// Opaque shell-side reference to a selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHandle(pub u64);

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Picker,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub handle: FileHandle,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

#[must_use]
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Decides whether a selection may be read at all.
///
/// A drop is type-checked before anything else, so a dropped non-image never reaches
/// the size check.
pub fn admit(file: &SelectedFile, source: ImageSource) -> Result<(), ValidationError> {
    let type_check = || {
        if is_image_mime(&file.mime_type) {
            Ok(())
        } else {
            Err(ValidationError::InvalidFileType {
                mime_type: file.mime_type.clone(),
                dropped: source == ImageSource::Drop,
            })
        }
    };

    if source == ImageSource::Drop {
        type_check()?;
    }

    if file.size_bytes > MAX_IMAGE_BYTES {
        return Err(ValidationError::FileTooLarge {
            size_bytes: file.size_bytes,
            max_bytes: MAX_IMAGE_BYTES,
        });
    }

    type_check()
}

pub fn encode(file: &SelectedFile, bytes: &[u8]) -> Result<UploadedImage, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::ReadError {
            reason: format!("{} produced no data", file.handle),
        });
    }

    let size_bytes = bytes.len() as u64;
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(ValidationError::FileTooLarge {
            size_bytes,
            max_bytes: MAX_IMAGE_BYTES,
        });
    }

    let mime_type = file.mime_type.trim().to_ascii_lowercase();
    let encoded_data = format!("data:{mime_type};base64,{}", BASE64.encode(bytes));

    Ok(UploadedImage {
        file: SelectedFile {
            size_bytes,
            ..file.clone()
        },
        encoded_data,
        mime_type,
    })
}

/// Drops a `data:...;base64,` prefix if there is one.
#[must_use]
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    if !encoded.starts_with("data:") {
        return encoded;
    }
    match encoded.split_once(',') {
        Some((_, payload)) if !payload.is_empty() => payload,
        _ => encoded,
    }
}

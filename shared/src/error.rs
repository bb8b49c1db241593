use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::MAX_IMAGE_BYTES;

/// Form fields the validator can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Image,
    Style,
    Email,
}

impl FormField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Style => "style",
            Self::Email => "email",
        }
    }
}

/// Problems with user input. Always recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("file too large: {size_bytes} bytes exceeds maximum of {max_bytes} bytes")]
    FileTooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("invalid file type '{mime_type}'")]
    InvalidFileType { mime_type: String, dropped: bool },

    #[error("failed to read file: {reason}")]
    ReadError { reason: String },

    #[error("email address is malformed")]
    InvalidEmail,

    #[error("missing required field: {}", .0.as_str())]
    MissingField(FormField),
}

impl ValidationError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::FileTooLarge { .. } => format!(
                "Image size must be less than {}MB.",
                MAX_IMAGE_BYTES / (1024 * 1024)
            ),
            Self::InvalidFileType { dropped: true, .. } => {
                "Please drop a valid image file.".into()
            }
            Self::InvalidFileType { dropped: false, .. } => {
                "Please select a valid image file.".into()
            }
            Self::ReadError { .. } => "Error reading image file.".into(),
            Self::InvalidEmail | Self::MissingField(FormField::Email) => {
                "Please enter a valid email address.".into()
            }
            Self::MissingField(FormField::Image) => "Please upload an image first.".into(),
            Self::MissingField(FormField::Style) => "Please select a mockup style.".into(),
        }
    }

    /// The field that should receive focus after this error, if any.
    #[must_use]
    pub const fn focus_field(&self) -> Option<FormField> {
        match self {
            Self::InvalidEmail | Self::MissingField(FormField::Email) => Some(FormField::Email),
            _ => None,
        }
    }
}

/// Every way a generation request can fail, normalized from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RequestFailed {
    #[error("network unreachable: {reason}")]
    NetworkUnreachable { reason: String },

    #[error("blocked by CORS policy: {reason}")]
    CorsBlocked { reason: String },

    #[error("server error {status}")]
    ServerError { status: u16, message: Option<String> },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("request could not be built: {reason}")]
    InvalidRequest { reason: String },
}

impl RequestFailed {
    /// Short human-readable cause, embedded in the banner copy.
    #[must_use]
    pub fn cause(&self) -> String {
        match self {
            Self::NetworkUnreachable { .. } => "the mockup service could not be reached".into(),
            Self::CorsBlocked { .. } => {
                "the mockup service refused the cross-origin request (CORS)".into()
            }
            Self::ServerError {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.trim().to_string(),
            Self::ServerError { status, .. } => format!("Server error: {status}"),
            Self::MalformedResponse { .. } => {
                "the mockup service returned an unreadable response".into()
            }
            Self::InvalidRequest { reason } => reason.clone(),
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        format!(
            "Failed to generate mockup: {}. Please check your connection and try again.",
            self.cause()
        )
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("history key cannot be empty")]
    EmptyHistoryKey,
}

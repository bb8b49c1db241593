use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ClientConfig;
use crate::error::{FormField, RequestFailed};
use crate::history::History;
use crate::ingest::SelectedFile;
use crate::{ERROR_BANNER_MS, SUCCESS_BANNER_MS};

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedImage {
    pub file: SelectedFile,
    /// `data:<mime>;base64,<payload>`
    pub encoded_data: String,
    pub mime_type: String,
}

// The encoded payload can be megabytes long.
impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file", &self.file)
            .field("encoded_len", &self.encoded_data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormState {
    pub image: Option<UploadedImage>,
    pub style: Option<String>,
    pub custom_prompt: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting {
        request_id: String,
        style: String,
        email: String,
    },
}

impl SubmissionPhase {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered { result_url: String },
    EmailOnly,
    Failed(RequestFailed),
}

/// The image currently shown in the result panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayedResult {
    pub url: String,
    pub style: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    #[must_use]
    pub const fn duration_ms(self) -> u64 {
        match self {
            Self::Success => SUCCESS_BANNER_MS,
            Self::Error => ERROR_BANNER_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Banner {
    pub id: u64,
    pub kind: BannerKind,
    pub title: Option<String>,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: ClientConfig,
    pub form: FormState,
    /// Selection admitted but not yet read.
    pub pending_read: Option<SelectedFile>,

    pub history: History,
    pub history_loaded: bool,
    /// Set while a read of `config.history_key` is outstanding.
    pub history_load_pending: bool,

    pub submission: SubmissionPhase,
    pub last_outcome: Option<SubmissionOutcome>,

    pub result_section_visible: bool,
    pub displayed_result: Option<DisplayedResult>,

    pub success_banner: Option<Banner>,
    pub error_banner: Option<Banner>,
    pub focus: Option<FormField>,

    next_banner_id: u64,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        !self.submission.is_idle()
    }

    /// Replaces the live banner of the same kind; returns its id.
    pub fn show_banner(
        &mut self,
        kind: BannerKind,
        title: Option<String>,
        message: impl Into<String>,
    ) -> u64 {
        self.next_banner_id = self.next_banner_id.wrapping_add(1);
        let banner = Banner {
            id: self.next_banner_id,
            kind,
            title,
            message: message.into(),
        };

        match kind {
            BannerKind::Success => self.success_banner = Some(banner),
            BannerKind::Error => {
                self.error_banner = Some(banner);
                self.result_section_visible = true;
            }
        }

        self.next_banner_id
    }

    pub fn show_error(&mut self, message: impl Into<String>) -> u64 {
        self.show_banner(BannerKind::Error, None, message)
    }

    /// Clears the banner with this id. Stale ids are ignored.
    pub fn expire_banner(&mut self, id: u64) -> bool {
        for slot in [&mut self.success_banner, &mut self.error_banner] {
            if slot.as_ref().is_some_and(|b| b.id == id) {
                *slot = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_ids_increase() {
        let mut model = Model::new();
        let a = model.show_banner(BannerKind::Success, None, "one");
        let b = model.show_error("two");
        assert!(b > a);
        assert!(model.result_section_visible);
    }

    #[test]
    fn test_stale_expiry_keeps_newer_banner() {
        let mut model = Model::new();
        let old = model.show_error("first");
        let new = model.show_error("second");

        assert!(!model.expire_banner(old));
        assert_eq!(model.error_banner.as_ref().map(|b| b.id), Some(new));

        assert!(model.expire_banner(new));
        assert!(model.error_banner.is_none());
    }

    #[test]
    fn test_banners_are_independent() {
        let mut model = Model::new();
        let success = model.show_banner(BannerKind::Success, None, "ok");
        let error = model.show_error("bad");

        assert!(model.expire_banner(error));
        assert_eq!(model.success_banner.as_ref().map(|b| b.id), Some(success));
    }

    #[test]
    fn test_uploaded_image_debug_hides_payload() {
        let image = UploadedImage {
            file: crate::ingest::SelectedFile {
                handle: crate::ingest::FileHandle(3),
                name: "a.png".into(),
                mime_type: "image/png".into(),
                size_bytes: 1,
            },
            encoded_data: "data:image/png;base64,SECRETPAYLOAD".into(),
            mime_type: "image/png".into(),
        };
        let debug = format!("{image:?}");
        assert!(!debug.contains("SECRETPAYLOAD"));
        assert!(debug.contains("encoded_len"));
    }
}

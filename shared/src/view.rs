//! Everything the shell needs to draw, derived from the [`Model`] alone.

use serde::{Deserialize, Serialize};

use crate::error::FormField;
use crate::history::HistoryEntry;
use crate::model::{Banner, BannerKind, Model};
use crate::validation::{email_field_state, is_form_ready, FieldState};

pub const EMPTY_HISTORY_MESSAGE: &str = "No mockups generated yet. Create your first one above!";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub form: FormView,
    pub result: ResultView,
    pub success_banner: Option<BannerView>,
    pub error_banner: Option<BannerView>,
    pub history: HistoryView,
    pub focus: Option<FormField>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum UploadView {
    Empty,
    Reading {
        file_name: String,
    },
    Preview {
        file_name: String,
        data_url: String,
        mime_type: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormView {
    pub upload: UploadView,
    pub style: String,
    pub custom_prompt: String,
    pub email: String,
    pub email_state: FieldState,
    pub submit_enabled: bool,
    pub is_submitting: bool,
}

/// Which of loading / image / error owns the result panel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultPrimary {
    Hidden,
    Loading,
    Image,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultView {
    pub visible: bool,
    pub primary: ResultPrimary,
    /// Still set under an error when a stale result persists.
    pub image_url: Option<String>,
    pub error_message: Option<String>,
    pub can_download: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BannerView {
    pub id: u64,
    pub kind: BannerKind,
    pub title: Option<String>,
    pub message: String,
    pub duration_ms: u64,
}

impl From<&Banner> for BannerView {
    fn from(b: &Banner) -> Self {
        Self {
            id: b.id,
            kind: b.kind,
            title: b.title.clone(),
            message: b.message.clone(),
            duration_ms: b.kind.duration_ms(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItemView {
    pub index: usize,
    pub image_url: String,
    pub style: String,
    pub date_label: String,
    pub alt_text: String,
}

impl HistoryItemView {
    fn new(index: usize, entry: &HistoryEntry) -> Self {
        Self {
            index,
            image_url: entry.image_url.clone(),
            style: entry.style.clone(),
            date_label: entry.date_label(),
            alt_text: format!("Mockup {}", index + 1),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryView {
    pub items: Vec<HistoryItemView>,
    pub empty_message: Option<String>,
}

fn upload_view(model: &Model) -> UploadView {
    if let Some(pending) = &model.pending_read {
        return UploadView::Reading {
            file_name: pending.name.clone(),
        };
    }

    match &model.form.image {
        Some(image) => UploadView::Preview {
            file_name: image.file.name.clone(),
            data_url: image.encoded_data.clone(),
            mime_type: image.mime_type.clone(),
        },
        None => UploadView::Empty,
    }
}

fn result_view(model: &Model) -> ResultView {
    let submitting = model.is_submitting();
    let error_message = model.error_banner.as_ref().map(|b| b.message.clone());
    let image_url = model.displayed_result.as_ref().map(|r| r.url.clone());

    let primary = if !model.result_section_visible {
        ResultPrimary::Hidden
    } else if submitting {
        ResultPrimary::Loading
    } else if error_message.is_some() {
        ResultPrimary::Error
    } else if image_url.is_some() {
        ResultPrimary::Image
    } else {
        ResultPrimary::Hidden
    };

    ResultView {
        visible: model.result_section_visible,
        primary,
        can_download: image_url.is_some() && !submitting,
        image_url,
        error_message,
    }
}

fn history_view(model: &Model) -> HistoryView {
    let items: Vec<_> = model
        .history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| HistoryItemView::new(i, e))
        .collect();

    HistoryView {
        empty_message: items.is_empty().then(|| EMPTY_HISTORY_MESSAGE.to_string()),
        items,
    }
}

#[must_use]
pub fn build(model: &Model) -> ViewModel {
    let form = &model.form;

    ViewModel {
        form: FormView {
            upload: upload_view(model),
            style: form.style.clone().unwrap_or_default(),
            custom_prompt: form.custom_prompt.clone(),
            email: form.email.clone(),
            email_state: email_field_state(&form.email),
            submit_enabled: !model.is_submitting() && is_form_ready(form),
            is_submitting: model.is_submitting(),
        },
        result: result_view(model),
        success_banner: model.success_banner.as_ref().map(BannerView::from),
        error_banner: model.error_banner.as_ref().map(BannerView::from),
        history: history_view(model),
        focus: model.focus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DisplayedResult, SubmissionPhase};
    use crate::{ERROR_BANNER_MS, SUCCESS_BANNER_MS};

    fn with_result() -> Model {
        let mut model = Model::new();
        model.result_section_visible = true;
        model.displayed_result = Some(DisplayedResult {
            url: "https://cdn/r.png".into(),
            style: "mug".into(),
        });
        model
    }

    #[test]
    fn test_fresh_model_is_hidden_and_empty() {
        let view = build(&Model::new());
        assert_eq!(view.result.primary, ResultPrimary::Hidden);
        assert!(!view.result.visible);
        assert_eq!(view.form.upload, UploadView::Empty);
        assert!(!view.form.submit_enabled);
        assert_eq!(
            view.history.empty_message.as_deref(),
            Some(EMPTY_HISTORY_MESSAGE)
        );
    }

    #[test]
    fn test_loading_wins_over_everything() {
        let mut model = with_result();
        model.show_error("old failure");
        model.submission = SubmissionPhase::Submitting {
            request_id: "r".into(),
            style: "mug".into(),
            email: "a@b.co".into(),
        };
        let view = build(&model);
        assert_eq!(view.result.primary, ResultPrimary::Loading);
        assert!(!view.result.can_download);
        assert!(view.form.is_submitting);
    }

    #[test]
    fn test_error_is_primary_but_stale_image_persists() {
        let mut model = with_result();
        model.show_error("boom");
        let view = build(&model);
        assert_eq!(view.result.primary, ResultPrimary::Error);
        assert_eq!(view.result.image_url.as_deref(), Some("https://cdn/r.png"));
        assert_eq!(view.result.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_image_primary_and_downloadable() {
        let view = build(&with_result());
        assert_eq!(view.result.primary, ResultPrimary::Image);
        assert!(view.result.can_download);
    }

    #[test]
    fn test_banner_durations() {
        let mut model = Model::new();
        model.show_banner(BannerKind::Success, Some("Done".into()), "ok");
        model.show_error("bad");
        let view = build(&model);
        assert_eq!(view.success_banner.unwrap().duration_ms, SUCCESS_BANNER_MS);
        assert_eq!(view.error_banner.unwrap().duration_ms, ERROR_BANNER_MS);
    }
}

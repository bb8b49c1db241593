use serde::{Deserialize, Serialize};

use crate::capabilities::FileResult;
use crate::config::ClientConfig;
use crate::ingest::{FileHandle, ImageSource, SelectedFile};
use crate::request::WebhookReply;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    AppStarted,
    Configure(ClientConfig),

    // Form input
    ImageSelected {
        file: SelectedFile,
        source: ImageSource,
    },
    ImageRemoved,
    StyleChanged(String),
    CustomPromptChanged(String),
    EmailChanged(String),

    SubmitRequested,
    DownloadRequested,
    HistoryItemSelected {
        index: usize,
    },

    BannerExpired {
        id: u64,
    },
    ErrorDismissed,

    // Capability responses, never sent by the shell
    #[serde(skip)]
    HistoryLoaded {
        key: String,
        bytes: Option<Vec<u8>>,
    },
    #[serde(skip)]
    HistoryPersisted {
        error: Option<String>,
    },
    #[serde(skip)]
    ImageRead {
        handle: FileHandle,
        result: FileResult,
    },
    #[serde(skip)]
    GenerationReplied {
        request_id: String,
        reply: WebhookReply,
    },
    #[serde(skip)]
    DownloadFinished(FileResult),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::ImageSelected { .. } => "image_selected",
            Self::ImageRemoved => "image_removed",
            Self::StyleChanged(_) => "style_changed",
            Self::CustomPromptChanged(_) => "custom_prompt_changed",
            Self::EmailChanged(_) => "email_changed",
            Self::SubmitRequested => "submit_requested",
            Self::DownloadRequested => "download_requested",
            Self::HistoryItemSelected { .. } => "history_item_selected",
            Self::BannerExpired { .. } => "banner_expired",
            Self::ErrorDismissed => "error_dismissed",
            Self::HistoryLoaded { .. } => "history_loaded",
            Self::HistoryPersisted { .. } => "history_persisted",
            Self::ImageRead { .. } => "image_read",
            Self::GenerationReplied { .. } => "generation_replied",
            Self::DownloadFinished(_) => "download_finished",
        }
    }
}

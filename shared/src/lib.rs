#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod ingest;
pub mod model;
pub mod request;
pub mod validation;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::ClientConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

pub const DEFAULT_WEBHOOK_URL: &str =
    "https://n8n.simplifai-1.org/webhook/983c0d13-2bef-493e-879d-85c246bfa512";
pub const HISTORY_STORAGE_KEY: &str = "mockmagicHistory";
pub const HISTORY_CAPACITY: usize = 20;
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
pub const SUCCESS_BANNER_MS: u64 = 10_000;
pub const ERROR_BANNER_MS: u64 = 8_000;
pub const DOWNLOAD_FILE_PREFIX: &str = "mockmagic";

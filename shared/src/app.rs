use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::capabilities::{Capabilities, FileError, FileOutput, FileResult};
use crate::error::{FormField, ValidationError};
use crate::event::Event;
use crate::history::{History, HistoryEntry};
use crate::ingest::{self, FileHandle, ImageSource, SelectedFile};
use crate::model::{BannerKind, DisplayedResult, Model, SubmissionOutcome, SubmissionPhase};
use crate::request::{interpret_reply, GenerationRequest, WebhookReply};
use crate::view::{self, ViewModel};
use crate::DOWNLOAD_FILE_PREFIX;

const SUBMITTED_TITLE: &str = "Request submitted successfully!";

#[derive(Default)]
pub struct App;

impl App {
    fn load_history(model: &mut Model, caps: &Capabilities) {
        model.history_load_pending = true;

        let key = model.config.history_key.clone();
        caps.kv.get(key.clone(), move |result| {
            let bytes = match result {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = ?e, "history read failed, starting empty");
                    None
                }
            };
            Event::HistoryLoaded { key, bytes }
        });
    }

    fn persist_history(model: &Model, caps: &Capabilities) {
        let bytes = match model.history.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "history serialization failed");
                return;
            }
        };

        caps.kv.set(model.config.history_key.clone(), bytes, |result| {
            Event::HistoryPersisted {
                error: result.err().map(|e| format!("{e:?}")),
            }
        });
    }

    fn select_image(
        model: &mut Model,
        caps: &Capabilities,
        file: SelectedFile,
        source: ImageSource,
    ) {
        if let Err(e) = ingest::admit(&file, source) {
            info!(handle = %file.handle, size_bytes = file.size_bytes, reason = %e, "image rejected");
            model.show_error(e.user_message());
            return;
        }

        debug!(handle = %file.handle, size_bytes = file.size_bytes, ?source, "reading image");

        let handle = file.handle;
        model.pending_read = Some(file);
        caps.file_io
            .read(handle, move |result| Event::ImageRead { handle, result });
    }

    fn image_read(model: &mut Model, handle: FileHandle, result: FileResult) {
        let Some(file) = model.pending_read.take_if_handle(handle) else {
            debug!(%handle, "discarding stale image read");
            return;
        };

        let encoded = match result {
            Ok(FileOutput::Contents(bytes)) => ingest::encode(&file, &bytes),
            Ok(FileOutput::Saved) => Err(ValidationError::ReadError {
                reason: "unexpected save output".into(),
            }),
            Err(e) => Err(ValidationError::ReadError {
                reason: e.to_string(),
            }),
        };

        match encoded {
            Ok(image) => {
                debug!(%handle, encoded_len = image.encoded_data.len(), "image ready");
                model.form.image = Some(image);
                if model.focus == Some(FormField::Image) {
                    model.focus = None;
                }
            }
            Err(e) => {
                warn!(%handle, reason = %e, "image could not be read");
                model.show_error(e.user_message());
            }
        }
    }

    fn submit(model: &mut Model, caps: &Capabilities) {
        if model.is_submitting() {
            debug!("submission already in flight, ignoring");
            return;
        }

        let request = match GenerationRequest::from_form(&model.form) {
            Ok(request) => request,
            Err(e) => {
                info!(reason = %e, "submission rejected");
                model.focus = e.focus_field();
                model.show_error(e.user_message());
                return;
            }
        };

        let request_id = Uuid::new_v4().to_string();

        let body = match request.to_body() {
            Ok(body) => body,
            Err(e) => {
                error!(%request_id, reason = %e, "request body could not be built");
                model.show_error(e.user_message());
                model.last_outcome = Some(SubmissionOutcome::Failed(e));
                return;
            }
        };

        info!(
            %request_id,
            style = %request.style,
            image_len = request.image.len(),
            has_custom_prompt = request.custom_prompt.is_some(),
            "submitting generation request"
        );

        model.focus = None;
        model.displayed_result = None;
        model.error_banner = None;
        model.result_section_visible = true;
        model.submission = SubmissionPhase::Submitting {
            request_id: request_id.clone(),
            style: request.style,
            email: request.email,
        };

        caps.http
            .post(&model.config.endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .send(move |result| Event::GenerationReplied {
                request_id,
                reply: WebhookReply::from_http(result),
            });
    }

    fn generation_replied(
        model: &mut Model,
        caps: &Capabilities,
        request_id: &str,
        reply: WebhookReply,
    ) {
        let phase = std::mem::take(&mut model.submission);
        let (style, email) = match phase {
            SubmissionPhase::Submitting {
                request_id: pending,
                style,
                email,
            } if pending == request_id => (style, email),
            other => {
                warn!(%request_id, "reply does not match the in-flight submission");
                model.submission = other;
                return;
            }
        };

        let outcome = match interpret_reply(reply) {
            Ok(result) => match result.result_url {
                Some(url) => {
                    info!(%request_id, "mockup delivered");
                    Self::delivered(model, caps, url.clone(), style, &email);
                    SubmissionOutcome::Delivered { result_url: url }
                }
                None => {
                    info!(%request_id, "mockup will be delivered by email");
                    model.show_banner(
                        BannerKind::Success,
                        Some(SUBMITTED_TITLE.to_string()),
                        submitted_message(&email),
                    );
                    SubmissionOutcome::EmailOnly
                }
            },
            Err(e) => {
                warn!(%request_id, status = ?e.status(), cause = %e, "generation failed");
                model.show_error(e.user_message());
                SubmissionOutcome::Failed(e)
            }
        };

        model.last_outcome = Some(outcome);
    }

    fn delivered(model: &mut Model, caps: &Capabilities, url: String, style: String, email: &str) {
        model.history.add(HistoryEntry::new(
            url.clone(),
            style.clone(),
            email,
            Utc::now(),
        ));
        // Written once the stored list has been merged in.
        if model.history_loaded {
            Self::persist_history(model, caps);
        }

        model.displayed_result = Some(DisplayedResult { url, style });
        model.show_banner(
            BannerKind::Success,
            Some(SUBMITTED_TITLE.to_string()),
            submitted_message(email),
        );
    }

    fn history_loaded(model: &mut Model, caps: &Capabilities, key: &str, bytes: Option<&[u8]>) {
        if key != model.config.history_key || !model.history_load_pending {
            debug!(%key, "discarding history read for a superseded key");
            return;
        }
        model.history_load_pending = false;

        let mut loaded = History::load(bytes);

        // Results delivered before the load completed stay on top.
        let early = model.history.len();
        for entry in model.history.entries().iter().rev() {
            loaded.add(entry.clone());
        }

        model.history = loaded;
        model.history_loaded = true;
        info!(entries = model.history.len(), "history loaded");

        if early > 0 {
            Self::persist_history(model, caps);
        }
    }

    fn download(model: &Model, caps: &Capabilities) {
        let Some(result) = &model.displayed_result else {
            debug!("nothing to download");
            return;
        };

        let file_name = download_file_name(&result.style, Utc::now().timestamp_millis());
        debug!(%file_name, "saving result image");

        caps.file_io
            .save_url(result.url.clone(), file_name, Event::DownloadFinished);
    }

    fn download_finished(model: &mut Model, result: FileResult) {
        match result {
            Ok(_) => debug!("result image saved"),
            Err(FileError::Cancelled) => debug!("download cancelled"),
            Err(e) => {
                warn!(reason = %e, "download failed");
                model.show_error(format!("Failed to download mockup: {e}."));
            }
        }
    }
}

trait TakeIfHandle {
    fn take_if_handle(&mut self, handle: FileHandle) -> Option<SelectedFile>;
}

impl TakeIfHandle for Option<SelectedFile> {
    fn take_if_handle(&mut self, handle: FileHandle) -> Option<SelectedFile> {
        if self.as_ref().is_some_and(|f| f.handle == handle) {
            self.take()
        } else {
            None
        }
    }
}

fn submitted_message(email: &str) -> String {
    format!(
        "Your mockup is being generated and will be sent to {email}. \
         Please check your email inbox (and spam folder) for your generated mockup."
    )
}

/// `mockmagic-<style>-<unix-millis>.png` with separators and whitespace in the style
/// replaced by `-`.
#[must_use]
pub fn download_file_name(style: &str, unix_millis: i64) -> String {
    let style: String = style
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_whitespace() { '-' } else { c })
        .collect();
    format!("{DOWNLOAD_FILE_PREFIX}-{style}-{unix_millis}.png")
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::AppStarted => {
                if model.history_loaded || model.history_load_pending {
                    debug!("history already loaded or loading");
                } else {
                    Self::load_history(model, caps);
                }
            }

            Event::Configure(config) => match config.validated() {
                Ok(config) => {
                    let key_changed = config.history_key != model.config.history_key;
                    info!(endpoint = %config.endpoint, history_key = %config.history_key, "configured");
                    model.config = config;
                    if key_changed && (model.history_loaded || model.history_load_pending) {
                        model.history = History::new();
                        model.history_loaded = false;
                        Self::load_history(model, caps);
                    }
                }
                Err(e) => {
                    error!(reason = %e, "configuration rejected, keeping previous");
                    model.show_error(e.to_string());
                }
            },

            Event::ImageSelected { file, source } => {
                Self::select_image(model, caps, file, source);
            }

            Event::ImageRead { handle, result } => {
                Self::image_read(model, handle, result);
            }

            Event::ImageRemoved => {
                model.form.image = None;
                model.pending_read = None;
            }

            Event::StyleChanged(style) => {
                let style = style.trim();
                model.form.style = (!style.is_empty()).then(|| style.to_string());
            }

            Event::CustomPromptChanged(prompt) => {
                model.form.custom_prompt = prompt;
            }

            Event::EmailChanged(email) => {
                model.form.email = email;
                model.focus = None;
            }

            Event::SubmitRequested => {
                Self::submit(model, caps);
            }

            Event::GenerationReplied { request_id, reply } => {
                Self::generation_replied(model, caps, &request_id, reply);
            }

            Event::HistoryLoaded { key, bytes } => {
                Self::history_loaded(model, caps, &key, bytes.as_deref());
            }

            Event::HistoryPersisted { error } => match error {
                None => debug!(entries = model.history.len(), "history persisted"),
                Some(error) => warn!(%error, "history write failed"),
            },

            Event::HistoryItemSelected { index } => match model.history.get(index) {
                Some(entry) => {
                    model.displayed_result = Some(DisplayedResult {
                        url: entry.image_url.clone(),
                        style: entry.style.clone(),
                    });
                    model.error_banner = None;
                    model.result_section_visible = true;
                }
                None => warn!(index, entries = model.history.len(), "history index out of range"),
            },

            Event::DownloadRequested => {
                Self::download(model, caps);
            }

            Event::DownloadFinished(result) => {
                Self::download_finished(model, result);
            }

            Event::BannerExpired { id } => {
                if !model.expire_banner(id) {
                    debug!(id, "stale banner expiry ignored");
                }
            }

            Event::ErrorDismissed => {
                model.error_banner = None;
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}

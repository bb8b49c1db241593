//! Building the webhook payload and interpreting whatever comes back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{FormField, RequestFailed, ValidationError};
use crate::ingest::strip_data_uri_prefix;
use crate::model::FormState;
use crate::validation::check_submission;

/// JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub image: String,
    pub style: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl GenerationRequest {
    /// Re-validates the form and derives the payload from it.
    pub fn from_form(form: &FormState) -> Result<Self, ValidationError> {
        check_submission(form)?;

        let (Some(image), Some(style)) = (&form.image, &form.style) else {
            // check_submission already guarantees both
            return Err(ValidationError::MissingField(FormField::Image));
        };

        let custom_prompt = Some(form.custom_prompt.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            image: strip_data_uri_prefix(&image.encoded_data).to_string(),
            style: style.trim().to_string(),
            email: form.email.trim().to_string(),
            custom_prompt,
        })
    }

    pub fn to_body(&self) -> Result<Vec<u8>, RequestFailed> {
        serde_json::to_vec(self).map_err(|e| RequestFailed::InvalidRequest {
            reason: e.to_string(),
        })
    }
}

/// What the shell reported for the webhook call, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookReply {
    Response {
        status: u16,
        #[serde(with = "serde_bytes")]
        body: Vec<u8>,
    },
    Transport {
        reason: String,
    },
}

impl WebhookReply {
    pub fn from_http(result: crux_http::Result<crux_http::Response<Vec<u8>>>) -> Self {
        match result {
            Ok(mut response) => Self::Response {
                status: u16::from(response.status()),
                body: response.take_body().unwrap_or_default(),
            },
            // crux_http turns 4xx/5xx into errors; keep the server's body for its message.
            Err(crux_http::Error::Http(e)) => Self::Response {
                status: u16::from(e.code),
                body: e.body.unwrap_or_default(),
            },
            Err(e) => Self::Transport {
                reason: e.to_string(),
            },
        }
    }
}

/// Transient outcome of one successful webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub result_url: Option<String>,
    pub delivered_by_email_only: bool,
}

impl GenerationResult {
    #[must_use]
    pub fn delivered(url: impl Into<String>) -> Self {
        Self {
            result_url: Some(url.into()),
            delivered_by_email_only: false,
        }
    }

    #[must_use]
    pub const fn email_only() -> Self {
        Self {
            result_url: None,
            delivered_by_email_only: true,
        }
    }
}

/// JSON if possible, otherwise `{"message": <text>}`.
#[must_use]
pub fn parse_reply_body(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            serde_json::json!({ "message": text.trim() })
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn interpret_reply(reply: WebhookReply) -> Result<GenerationResult, RequestFailed> {
    let (status, body) = match reply {
        WebhookReply::Response { status, body } => (status, body),
        WebhookReply::Transport { reason } => return Err(classify_transport_failure(reason)),
    };

    let data = parse_reply_body(&body);

    if !is_success(status) {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|m| !m.trim().is_empty());
        return Err(RequestFailed::ServerError { status, message });
    }

    match data.get("result_url") {
        Some(Value::String(url)) if !url.trim().is_empty() => {
            Ok(GenerationResult::delivered(url.trim()))
        }
        Some(Value::Null | Value::String(_)) | None => Ok(GenerationResult::email_only()),
        Some(other) => {
            warn!(kind = json_kind(other), "ignoring non-string result_url");
            Ok(GenerationResult::email_only())
        }
    }
}

/// Browsers report CORS rejections and unreachable hosts the same way; a shell that can
/// tell them apart says so in the reason text.
#[must_use]
pub fn classify_transport_failure(reason: String) -> RequestFailed {
    let lower = reason.to_lowercase();

    if lower.contains("cors") || lower.contains("cross-origin") || lower.contains("access-control")
    {
        RequestFailed::CorsBlocked { reason }
    } else if lower.contains("json") || lower.contains("decod") {
        RequestFailed::MalformedResponse { reason }
    } else {
        RequestFailed::NetworkUnreachable { reason }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

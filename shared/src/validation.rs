//! Form readiness and email shape checks.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{FormField, ValidationError};
use crate::model::FormState;

/// Visual state of the email field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    #[default]
    Neutral,
    Valid,
    Invalid,
}

/// `\s` plus U+FEFF, which browsers count as whitespace and `regex` does not.
const EMAIL_PATTERN: &str = r"^[^\s@\x{FEFF}]+@[^\s@\x{FEFF}]+\.[^\s@\x{FEFF}]+$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email))
}

#[must_use]
pub fn email_field_state(email: &str) -> FieldState {
    let email = email.trim();
    if email.is_empty() {
        FieldState::Neutral
    } else if is_valid_email(email) {
        FieldState::Valid
    } else {
        FieldState::Invalid
    }
}

/// First failing rule, in the order the user is told about them.
pub fn check_submission(form: &FormState) -> Result<(), ValidationError> {
    if form.image.is_none() {
        return Err(ValidationError::MissingField(FormField::Image));
    }

    if form.style.as_deref().map_or(true, |s| s.trim().is_empty()) {
        return Err(ValidationError::MissingField(FormField::Style));
    }

    let email = form.email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField(FormField::Email));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

#[must_use]
pub fn is_form_ready(form: &FormState) -> bool {
    check_submission(form).is_ok()
}

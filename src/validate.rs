//! Request field validation, decoupled from the HTTP layer. Each check
//! appends to a structured error list; a non-empty list becomes a 422.

use crate::errors::AppError;
use serde::Serialize;

pub const MAX_NAME_LEN: usize = 140;
pub const MAX_EMAIL_LEN: usize = 140;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_CATEGORY_LEN: usize = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Convert a collected error list into a request-level failure.
pub fn ensure(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn owner_create(name: &str, email: &str, phone: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_text(&mut errors, "name", name, MAX_NAME_LEN);
    check_text(&mut errors, "email", email, MAX_EMAIL_LEN);
    check_email_shape(&mut errors, "email", email);
    check_text(&mut errors, "phone", phone, MAX_PHONE_LEN);
    errors
}

pub fn owner_update(
    name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(name) = name {
        check_text(&mut errors, "name", name, MAX_NAME_LEN);
    }
    if let Some(email) = email {
        check_text(&mut errors, "email", email, MAX_EMAIL_LEN);
        check_email_shape(&mut errors, "email", email);
    }
    if let Some(phone) = phone {
        check_text(&mut errors, "phone", phone, MAX_PHONE_LEN);
    }
    errors
}

pub fn asset_create(name: &str, category: &str, owner: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_text(&mut errors, "name", name, MAX_NAME_LEN);
    check_text(&mut errors, "category", category, MAX_CATEGORY_LEN);
    check_text(&mut errors, "owner", owner, MAX_NAME_LEN);
    errors
}

pub fn asset_update(
    name: Option<&str>,
    category: Option<&str>,
    owner: Option<&str>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(name) = name {
        check_text(&mut errors, "name", name, MAX_NAME_LEN);
    }
    if let Some(category) = category {
        check_text(&mut errors, "category", category, MAX_CATEGORY_LEN);
    }
    if let Some(owner) = owner {
        check_text(&mut errors, "owner", owner, MAX_NAME_LEN);
    }
    errors
}

fn check_text(errors: &mut Vec<FieldError>, field: &'static str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if value.chars().count() > max_len {
        errors.push(FieldError::new(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
}

// Structural stand-in for a full email validator: one '@', a non-empty
// local part, and a dotted domain.
fn check_email_shape(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.push(FieldError::new(field, "is not a valid email address"));
    }
}

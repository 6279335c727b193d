use serde::Serialize;

use super::fields::{FieldPath, FieldValue};
use super::user::MIN_PASSWORD_LEN;
use super::{Draft, ValidationErrors};
use crate::errors::FormError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordChangeDraft {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// The confirmation never leaves the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangePayload {
    pub current_password: String,
    pub new_password: String,
}

impl Draft for PasswordChangeDraft {
    type Payload = PasswordChangePayload;

    fn set_field(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError> {
        let slot = match (path.head(), path.tail()) {
            ("currentPassword", None) => &mut self.current_password,
            ("newPassword", None) => &mut self.new_password,
            ("confirmPassword", None) => &mut self.confirm_password,
            _ => return Err(path.unknown()),
        };
        *slot = value.into_text(path)?;
        Ok(())
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.current_password.is_empty() {
            errors.insert("currentPassword", "Current password is required");
        }
        if self.new_password.is_empty() {
            errors.insert("newPassword", "New password is required");
        } else if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("newPassword", "New password must be at least 6 characters");
        } else if self.new_password == self.current_password {
            errors.insert("newPassword", "New password must differ from the current one");
        }
        if self.confirm_password != self.new_password {
            errors.insert("confirmPassword", "Passwords do not match");
        }
        errors
    }

    fn to_payload(&self) -> PasswordChangePayload {
        PasswordChangePayload {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        }
    }
}

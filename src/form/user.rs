use serde::Serialize;

use super::fields::{FieldPath, FieldValue};
use super::{Draft, ValidationErrors};
use crate::errors::FormError;
use crate::models::user::ADMIN_ROLES;

pub const MIN_PASSWORD_LEN: usize = 6;

/// New back-office account. Defaults to an active admin.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: String,
    pub is_active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            email: String::new(),
            full_name: String::new(),
            password: String::new(),
            role: "admin".to_string(),
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
}

impl Draft for UserDraft {
    type Payload = UserPayload;

    fn set_field(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError> {
        if path.tail().is_some() {
            return Err(path.unknown());
        }
        match path.head() {
            "email" => self.email = value.into_text(path)?,
            "fullName" => self.full_name = value.into_text(path)?,
            "password" => self.password = value.into_text(path)?,
            "role" => self.role = value.into_text(path)?,
            "isActive" => self.is_active = value.into_flag(path)?,
            _ => return Err(path.unknown()),
        }
        Ok(())
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !email.contains('@') {
            errors.insert("email", "Email address is not valid");
        }
        if self.full_name.trim().is_empty() {
            errors.insert("fullName", "Full name is required");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("password", "Password must be at least 6 characters");
        }
        if !ADMIN_ROLES.contains(&self.role.trim()) {
            errors.insert("role", "Role must be admin or super_admin");
        }
        errors
    }

    /// Passwords are sent as typed.
    fn to_payload(&self) -> UserPayload {
        UserPayload {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name.trim().to_string(),
            role: self.role.trim().to_string(),
            is_active: self.is_active,
        }
    }
}

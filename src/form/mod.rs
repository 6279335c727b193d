//! Form View-Model: drafts, validation and the submit gate.
//!
//! | Module | Draft |
//! |--------|-------|
//! | `product` | create/edit product, including details, SEO and fragrance |
//! | `category` | create/edit category |
//! | `user` | create admin account |
//! | `password` | change own password |
//!
//! A draft is edited by dotted path through [`FormViewModel::set_field`],
//! validated into an ordered [`ValidationErrors`], and only turned into a
//! wire payload once validation passes.

pub mod category;
pub mod fields;
pub mod password;
pub mod product;
pub mod user;

use std::future::Future;

use serde::Serialize;

use crate::errors::{ApiError, FormError, SubmitError};
pub use fields::{FieldPath, FieldValue, parse_keywords, trim_optional};

/// Pseudo-field that holds the server's rejection message.
pub const SUBMIT_FIELD: &str = "submit";

/// Field → message, in insertion order. The first entry is where the user
/// should be taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message for `field`, keeping its original position if it
    /// already had one.
    pub fn insert(&mut self, field: &str, message: &str) {
        match self.entries.iter_mut().find(|(f, _)| f == field) {
            Some((_, existing)) => *existing = message.to_string(),
            None => self.entries.push((field.to_string(), message.to_string())),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn remove(&mut self, field: &str) {
        self.entries.retain(|(f, _)| f != field);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_field(&self) -> Option<&str> {
        self.entries.first().map(|(f, _)| f.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

/// An in-progress record behind a form.
pub trait Draft: Clone + Send + Sync {
    type Payload: Serialize + Send + Sync;

    fn set_field(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError>;

    /// Pure and deterministic; returns every failing field in form order.
    fn validate(&self) -> ValidationErrors;

    /// Wire payload: trimmed strings, empty optionals omitted.
    fn to_payload(&self) -> Self::Payload;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

impl FormMode {
    pub fn id(&self) -> Option<&str> {
        match self {
            FormMode::Create => None,
            FormMode::Edit { id } => Some(id),
        }
    }
}

pub struct FormViewModel<D: Draft> {
    draft: D,
    mode: FormMode,
    errors: ValidationErrors,
    busy: bool,
}

impl<D: Draft> FormViewModel<D> {
    pub fn create(draft: D) -> Self {
        Self::with_mode(draft, FormMode::Create)
    }

    pub fn edit(id: impl Into<String>, draft: D) -> Self {
        Self::with_mode(draft, FormMode::Edit { id: id.into() })
    }

    fn with_mode(draft: D, mode: FormMode) -> Self {
        Self {
            draft,
            mode,
            errors: ValidationErrors::default(),
            busy: false,
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Write one field. A rejected write leaves the draft unchanged.
    pub fn set_field(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let path = FieldPath::parse(path)?;
        self.draft.set_field(&path, value.into())?;
        self.errors.remove(path.as_str());
        self.errors.remove(SUBMIT_FIELD);
        Ok(())
    }

    /// Recompute the error map from scratch.
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = self.draft.validate();
        &self.errors
    }

    /// Gate a submission: refuse while busy, refuse when invalid, otherwise
    /// mark busy and hand back the payload to send.
    pub fn begin_submit(&mut self) -> Result<D::Payload, SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        if !self.validate().is_empty() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }
        self.busy = true;
        Ok(self.draft.to_payload())
    }

    /// Release the busy flag and record a server rejection under
    /// [`SUBMIT_FIELD`].
    pub fn finish_submit<T>(&mut self, result: Result<T, ApiError>) -> Result<T, SubmitError> {
        self.busy = false;
        match result {
            Ok(value) => {
                self.errors.clear();
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(mode = ?self.mode, error = %e, "Form submission rejected");
                self.errors.insert(SUBMIT_FIELD, &e.user_message());
                Err(SubmitError::Api(e))
            }
        }
    }

    /// Validate, convert and send in one call. `send` receives the mode so it
    /// can pick create or update.
    pub async fn submit<T, F, Fut>(&mut self, send: F) -> Result<T, SubmitError>
    where
        F: FnOnce(FormMode, D::Payload) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let payload = self.begin_submit()?;
        let result = send(self.mode.clone(), payload).await;
        self.finish_submit(result)
    }
}

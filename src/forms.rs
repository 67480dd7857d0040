//! Request bodies and their client-side validation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Validation is the first failure class: it runs before a request is built,
//! so a rejected form never reaches the transport or the 401 interceptor.
//! Limits mirror the backend's request constraints.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use serde::Serialize;

use crate::net::types::Tier;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_SHELTER_NAME_LEN: usize = 100;
pub const MAX_SHELTER_DESCRIPTION_LEN: usize = 500;
pub const MAX_SHELTER_ADDRESS_LEN: usize = 255;

// =============================================================================
// ERRORS
// =============================================================================

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field-level problem found in one form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// First message reported for `field`, for inline rendering.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    fn required(&mut self, field: &'static str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.fail(field, message);
            return false;
        }
        true
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize, message: &str) {
        if value.chars().count() > max {
            self.fail(field, message);
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() { Ok(()) } else { Err(ValidationErrors(self.errors)) }
    }
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// =============================================================================
// AUTH FORMS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every rejected field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("name", &self.name, "Name is required");
        if !looks_like_email(&self.email) {
            check.fail("email", "Must be valid email format");
        }
        check.required("username", &self.username, "Username is required");
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            check.fail("password", format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        check.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every rejected field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("username", &self.username, "Username is required");
        if self.password.is_empty() {
            check.fail("password", "Password is required");
        }
        check.finish()
    }
}

// =============================================================================
// RESOURCE FORMS
// =============================================================================

/// Body for creating or updating a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelterForm {
    pub name: String,
    pub description: String,
    pub address: String,
}

impl ShelterForm {
    /// # Errors
    ///
    /// Returns every rejected field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        if check.required("name", &self.name, "Name is required") {
            check.max_len("name", &self.name, MAX_SHELTER_NAME_LEN, "Name cannot exceed 100 characters");
        }
        if check.required("description", &self.description, "Description is required") {
            check.max_len(
                "description",
                &self.description,
                MAX_SHELTER_DESCRIPTION_LEN,
                "Description cannot exceed 500 characters",
            );
        }
        if check.required("address", &self.address, "Address is required") {
            check.max_len("address", &self.address, MAX_SHELTER_ADDRESS_LEN, "Address cannot exceed 255 characters");
        }
        check.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdateForm {
    pub name: String,
}

impl UserUpdateForm {
    /// # Errors
    ///
    /// Returns every rejected field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("name", &self.name, "Name is required");
        check.finish()
    }
}

/// Body for `POST /subscriptions/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeForm {
    pub shelter_request: ShelterForm,
    pub tier: Tier,
}

impl SubscribeForm {
    /// # Errors
    ///
    /// Returns the nested shelter's rejected fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.shelter_request.validate()
    }
}

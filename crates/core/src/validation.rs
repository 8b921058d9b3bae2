//! Form input validation
//!
//! Rules are applied per field with [`FieldValidator`] and collected into a
//! [`ValidationResult`].
//!
//! # Example
//!
//! ```rust
//! use survey_core::validation::{FieldValidator, EMAIL_PATTERN};
//!
//! let result = FieldValidator::new("email", "jane@example.com")
//!     .required()
//!     .max_chars(254)
//!     .matches(&EMAIL_PATTERN, "an email address")
//!     .finish();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loose email shape check, close to what browsers accept for `type="email"`.
pub static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Phone number typed together with its dialling code, e.g. `+4930123456`.
pub static PHONE_WITH_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[0-9]+$").unwrap());

/// Phone number digits only, used once a dialling code has been picked.
pub static PHONE_DIGITS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// The rule a value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Value is blank
    Required,
    /// Value is too long
    MaxChars,
    /// Value does not match a pattern
    Pattern,
    /// A custom check failed
    Custom,
}

/// One broken rule on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field id
    pub field: String,
    /// Broken rule
    pub rule: Rule,
    /// Message for the respondent
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors collected over one or more fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no rule was broken
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every broken rule, in the order found
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Append the errors of another result
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// `Ok` when valid; otherwise an error listing every broken rule.
    ///
    /// Only missing required values yield `RequiredFieldMissing`; any other
    /// mix yields the generic `Validation` code.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let code = if self.errors.iter().all(|e| e.rule == Rule::Required) {
            ErrorCode::RequiredFieldMissing
        } else {
            ErrorCode::Validation
        };
        let details: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        Err(Error::new(code, format!("Invalid input: {}", details.join("; "))))
    }
}

/// Applies rules to a single field value
#[derive(Debug)]
pub struct FieldValidator<'a> {
    field: &'a str,
    value: &'a str,
    result: ValidationResult,
}

impl<'a> FieldValidator<'a> {
    /// Start validating `value` of `field`
    pub fn new(field: &'a str, value: &'a str) -> Self {
        Self {
            field,
            value,
            result: ValidationResult::new(),
        }
    }

    fn fail(&mut self, rule: Rule, message: String) {
        self.result.errors.push(ValidationError {
            field: self.field.to_string(),
            rule,
            message,
        });
    }

    /// The value must contain something other than whitespace.
    #[must_use]
    pub fn required(self) -> Self {
        self.required_if(true)
    }

    /// Apply [`required`](Self::required) only when `required` is true.
    #[must_use]
    pub fn required_if(mut self, required: bool) -> Self {
        if required && self.value.trim().is_empty() {
            self.fail(Rule::Required, "Field is required".to_string());
        }
        self
    }

    /// At most `max` characters (not bytes).
    #[must_use]
    pub fn max_chars(mut self, max: usize) -> Self {
        let len = self.value.chars().count();
        if len > max {
            self.fail(
                Rule::MaxChars,
                format!("Must be at most {} characters, got {}", max, len),
            );
        }
        self
    }

    /// Non-empty values must match `pattern`; blank values are left to
    /// [`required`](Self::required).
    #[must_use]
    pub fn matches(mut self, pattern: &Regex, description: &str) -> Self {
        if !self.value.is_empty() && !pattern.is_match(self.value) {
            self.fail(Rule::Pattern, description.to_string());
        }
        self
    }

    /// Run a custom check returning an error message on failure.
    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(message) = check(self.value) {
            self.fail(Rule::Custom, message);
        }
        self
    }

    /// Collected errors
    pub fn finish(self) -> ValidationResult {
        self.result
    }
}

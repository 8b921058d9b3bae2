//! Core logic for survey-taking widgets
//!
//! This crate provides the non-rendering pieces the survey widgets share:
//!
//! - **Survey state**: accumulating partial responses across question navigation
//! - **Contact-info questions**: required-field rules, value merging, phone
//!   number handling and submission assembly
//! - **Validation**: fluent validators for form input
//! - **Configuration**: TOML-based configuration with defaults
//! - **Error handling**: errors with codes, context, and recovery hints
//!
//! # Example
//!
//! ```rust
//! use survey_core::contact::{ContactField, ContactInfoQuestion, PhoneEntry};
//! use survey_core::state::{ResponseUpdate, SurveyState};
//!
//! let question = ContactInfoQuestion::new("contact");
//! let phone = PhoneEntry::with_code("🇩🇪", "+49");
//!
//! let values = question.apply_change(&[], ContactField::Phone, "30123456");
//! let data = question.submission_data(&values, &phone);
//!
//! let mut state = SurveyState::new("survey-1");
//! state.accumulate_response(ResponseUpdate::with_data(data));
//! assert_eq!(state.response().data["contact"][3], "+49 30123456");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod contact;
pub mod error;
pub mod state;
pub mod validation;

pub use error::{Category, Error, ErrorCode, ErrorReport, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, LogFormat};
    pub use crate::contact::{ContactField, ContactInfoQuestion, DialCode, PhoneEntry};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::state::{ResponseUpdate, SurveyState};
    pub use crate::validation::{FieldValidator, ValidationResult};
}

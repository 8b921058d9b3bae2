//! Contact-info question model
//!
//! A contact-info question asks for up to five values in a fixed order:
//! first name, last name, email, phone and company. Each field can be
//! hidden or marked required. The phone field is paired with a dialling-code
//! picker; once a code is picked the respondent types only the digits and the
//! code is prefixed on submission.
//!
//! Values always travel as a five-element vector in [`ContactField::ALL`]
//! order, matching the shape stored in the survey response.

use crate::error::{Error, Result};
use crate::state::ResponseData;
use crate::validation::{
    FieldValidator, ValidationResult, EMAIL_PATTERN, PHONE_DIGITS_PATTERN, PHONE_WITH_CODE_PATTERN,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Localized text keyed by language code (`"default"` is the fallback).
pub type LocalizedText = BTreeMap<String, String>;

/// Language key used when a translation is missing.
pub const DEFAULT_LANGUAGE: &str = "default";

/// Label shown on the dialling-code button before anything is picked.
pub const UNSELECTED_LABEL: &str = "click...";

/// Hint shown while the phone number must include its own dialling code.
pub const PHONE_HINT_WITH_CODE: &str = "Please fill in your country-code (+123456789)";

/// Hint shown once a dialling code has been picked.
pub const PHONE_HINT_DIGITS: &str =
    "You already selected a country. Please type just numbers (123456789)";

/// Longest value accepted for any field.
pub const MAX_FIELD_LENGTH: usize = 256;

/// Resolve `text` for `language`, falling back to the default language.
pub fn localized<'a>(text: &'a LocalizedText, language: &str) -> &'a str {
    text.get(language)
        .or_else(|| text.get(DEFAULT_LANGUAGE))
        .map_or("", String::as_str)
}

/// The five contact fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    /// `firstName`
    FirstName,
    /// `lastName`
    LastName,
    /// `email`
    Email,
    /// `phone`
    Phone,
    /// `company`
    Company,
}

impl ContactField {
    /// All fields in display order.
    pub const ALL: [ContactField; 5] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Company,
    ];

    /// Stable string id.
    pub fn id(self) -> &'static str {
        match self {
            ContactField::FirstName => "firstName",
            ContactField::LastName => "lastName",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Company => "company",
        }
    }

    /// Position in the value vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// HTML input type the field renders with.
    pub fn input_type(self) -> &'static str {
        match self {
            ContactField::Email => "email",
            _ => "text",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ContactField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ContactField::ALL
            .into_iter()
            .find(|field| field.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::unknown_field(s))
    }
}

/// Per-field settings of a contact-info question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Render the field
    #[serde(default = "default_true")]
    pub show: bool,
    /// Respondent must fill the field
    #[serde(default)]
    pub required: bool,
    /// Placeholder per language
    #[serde(default)]
    pub placeholder: LocalizedText,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            show: true,
            required: false,
            placeholder: LocalizedText::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A contact-info question definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoQuestion {
    /// Question id, the key of the answer in the response
    pub id: String,
    /// Whole question must be answered
    #[serde(default)]
    pub required: bool,
    /// Question headline
    #[serde(default)]
    pub headline: LocalizedText,
    /// Optional text under the headline
    #[serde(default)]
    pub subheader: Option<LocalizedText>,
    /// Label of the next button
    #[serde(default)]
    pub button_label: LocalizedText,
    /// Label of the back button
    #[serde(default)]
    pub back_button_label: LocalizedText,
    /// First name field
    #[serde(default)]
    pub first_name: FieldConfig,
    /// Last name field
    #[serde(default)]
    pub last_name: FieldConfig,
    /// Email field
    #[serde(default)]
    pub email: FieldConfig,
    /// Phone field
    #[serde(default)]
    pub phone: FieldConfig,
    /// Company field
    #[serde(default)]
    pub company: FieldConfig,
}

impl ContactInfoQuestion {
    /// A question with every field shown and optional.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            required: false,
            headline: LocalizedText::new(),
            subheader: None,
            button_label: LocalizedText::new(),
            back_button_label: LocalizedText::new(),
            first_name: FieldConfig::default(),
            last_name: FieldConfig::default(),
            email: FieldConfig::default(),
            phone: FieldConfig::default(),
            company: FieldConfig::default(),
        }
    }

    /// Parse a question definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let question: Self = serde_json::from_str(json)?;
        if question.id.trim().is_empty() {
            return Err(Error::invalid_question("Question id must not be empty"));
        }
        Ok(question)
    }

    /// Settings of one field.
    pub fn field(&self, field: ContactField) -> &FieldConfig {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Company => &self.company,
        }
    }

    /// Fields that are rendered, in display order.
    pub fn visible_fields(&self) -> impl Iterator<Item = ContactField> + '_ {
        ContactField::ALL
            .into_iter()
            .filter(|field| self.field(*field).show)
    }

    /// Whether the respondent must fill `field`.
    ///
    /// A field is required when it says so, or when the question is required
    /// and none of the visible fields is individually required.
    pub fn is_field_required(&self, field: ContactField) -> bool {
        if self.field(field).required {
            return true;
        }
        self.required && self.visible_fields().all(|f| !self.field(f).required)
    }

    /// Placeholder for `field` in `language`, starred when required.
    pub fn placeholder(&self, field: ContactField, language: &str) -> String {
        let text = localized(&self.field(field).placeholder, language);
        if self.is_field_required(field) {
            format!("{}*", text)
        } else {
            text.to_string()
        }
    }

    /// New value vector after the respondent edits `field`.
    ///
    /// The edited field takes `value`; hidden fields are blanked; every other
    /// field keeps its previous value (missing entries read as empty).
    pub fn apply_change(&self, current: &[String], field: ContactField, value: &str) -> Vec<String> {
        ContactField::ALL
            .into_iter()
            .map(|f| {
                if f == field {
                    value.to_string()
                } else if self.field(f).show {
                    current.get(f.index()).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .collect()
    }

    /// Values to store when the question is submitted.
    ///
    /// All-blank input submits an empty list. Otherwise the five values are
    /// returned with the picked dialling code prefixed to the phone number.
    pub fn submission(&self, values: &[String], phone: &PhoneEntry) -> Vec<String> {
        let values = normalize_values(values);
        if values.iter().all(|v| v.trim().is_empty()) {
            return Vec::new();
        }
        ContactField::ALL
            .into_iter()
            .zip(values)
            .map(|(field, value)| match field {
                ContactField::Phone => phone.full_number(&value),
                _ => value,
            })
            .collect()
    }

    /// Submission keyed by question id, ready to accumulate into the survey state.
    pub fn submission_data(&self, values: &[String], phone: &PhoneEntry) -> ResponseData {
        let submitted = self.submission(values, phone);
        let mut data = ResponseData::new();
        data.insert(self.id.clone(), serde_json::json!(submitted));
        data
    }

    /// Check the values the way the rendered form would before submitting.
    pub fn validate(&self, values: &[String], phone: &PhoneEntry) -> ValidationResult {
        let values = normalize_values(values);
        let mut result = ValidationResult::new();

        for field in self.visible_fields() {
            let value = values[field.index()].as_str();
            let validator = FieldValidator::new(field.id(), value)
                .required_if(self.is_field_required(field))
                .max_chars(MAX_FIELD_LENGTH);
            let validator = match field {
                ContactField::Email => validator.matches(&EMAIL_PATTERN, "an email address"),
                ContactField::Phone => validator.matches(phone.pattern(), phone.hint()),
                _ => validator,
            };
            result.merge(validator.finish());
        }

        result
    }
}

/// Pad or cut `values` to exactly five entries.
fn normalize_values(values: &[String]) -> Vec<String> {
    ContactField::ALL
        .into_iter()
        .map(|field| values.get(field.index()).cloned().unwrap_or_default())
        .collect()
}

/// A dialling code picked from the country picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialCode {
    /// Display token, e.g. a flag emoji
    pub marker: String,
    /// Dialling code, e.g. `+49`
    pub code: String,
}

/// Phone field state: the number typed plus an optional picked code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneEntry {
    selected: Option<DialCode>,
}

impl PhoneEntry {
    /// Entry with no dialling code picked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry with `code` already picked.
    pub fn with_code(marker: impl Into<String>, code: impl Into<String>) -> Self {
        let mut entry = Self::new();
        entry.select(marker, code);
        entry
    }

    /// Pick a dialling code. A blank code clears the selection.
    pub fn select(&mut self, marker: impl Into<String>, code: impl Into<String>) {
        let code = code.into();
        if code.trim().is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(DialCode {
            marker: marker.into(),
            code,
        });
    }

    /// Drop the picked dialling code.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Dialling code picked so far.
    pub fn dial_code(&self) -> Option<&DialCode> {
        self.selected.as_ref()
    }

    /// Text for the picker button.
    pub fn label(&self) -> String {
        match &self.selected {
            Some(dial) => format!("{} {}", dial.marker, dial.code),
            None => UNSELECTED_LABEL.to_string(),
        }
    }

    /// Pattern the typed number has to match.
    pub fn pattern(&self) -> &'static Regex {
        if self.selected.is_some() {
            &PHONE_DIGITS_PATTERN
        } else {
            &PHONE_WITH_CODE_PATTERN
        }
    }

    /// Hint explaining [`pattern`](Self::pattern) to the respondent.
    pub fn hint(&self) -> &'static str {
        if self.selected.is_some() {
            PHONE_HINT_DIGITS
        } else {
            PHONE_HINT_WITH_CODE
        }
    }

    /// True when `number` matches the current [`pattern`](Self::pattern).
    pub fn is_valid_number(&self, number: &str) -> bool {
        self.pattern().is_match(number)
    }

    /// The number as stored: `"<code> <number>"` when a code is picked.
    ///
    /// A blank number stays blank.
    pub fn full_number(&self, number: &str) -> String {
        match &self.selected {
            Some(dial) if !number.trim().is_empty() => format!("{} {}", dial.code, number),
            _ => number.to_string(),
        }
    }
}

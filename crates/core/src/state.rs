//! Survey state accumulated while a respondent moves through a survey.
//!
//! Each question submits a partial [`ResponseUpdate`]; the state merges the
//! answers so that going back and forth between questions never loses data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Answers keyed by question id.
pub type ResponseData = BTreeMap<String, Value>;

/// Time to complete in milliseconds, keyed by question id.
pub type ResponseTtc = BTreeMap<String, f64>;

/// Hidden or computed survey variables.
pub type ResponseVariables = BTreeMap<String, Value>;

/// A partial response sent after a question is answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseUpdate {
    /// Whether the respondent reached the end
    pub finished: bool,
    /// Answers keyed by question id
    #[serde(default)]
    pub data: ResponseData,
    /// Time to complete per question, in milliseconds
    #[serde(default)]
    pub ttc: ResponseTtc,
    /// Hidden or computed variables
    #[serde(default)]
    pub variables: ResponseVariables,
    /// Display created for this response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
}

impl ResponseUpdate {
    /// An unfinished update carrying the given answers.
    pub fn with_data(data: ResponseData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }
}

/// Add `elapsed_ms` to the time already spent on `question_id`.
pub fn updated_ttc(ttc: &ResponseTtc, question_id: &str, elapsed_ms: f64) -> ResponseTtc {
    let mut updated = ttc.clone();
    *updated.entry(question_id.to_string()).or_insert(0.0) += elapsed_ms;
    updated
}

/// Per-respondent survey state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyState {
    survey_id: String,
    response_id: Option<String>,
    display_id: Option<String>,
    user_id: Option<String>,
    single_use_id: Option<String>,
    response_acc: ResponseUpdate,
}

impl SurveyState {
    /// Fresh state for a survey.
    pub fn new(survey_id: impl Into<String>) -> Self {
        Self {
            survey_id: survey_id.into(),
            response_id: None,
            display_id: None,
            user_id: None,
            single_use_id: None,
            response_acc: ResponseUpdate::default(),
        }
    }

    /// Attach a single-use link id.
    #[must_use]
    pub fn with_single_use_id(mut self, id: impl Into<String>) -> Self {
        self.single_use_id = Some(id.into());
        self
    }

    /// Resume an existing response.
    #[must_use]
    pub fn with_response_id(mut self, id: impl Into<String>) -> Self {
        self.response_id = Some(id.into());
        self
    }

    /// Attach the respondent's user id.
    #[must_use]
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Survey this state belongs to.
    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    /// Response id once the server created one.
    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    /// Display id once the server created one.
    pub fn display_id(&self) -> Option<&str> {
        self.display_id.as_deref()
    }

    /// Respondent's user id, if known.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Single-use link id, if any.
    pub fn single_use_id(&self) -> Option<&str> {
        self.single_use_id.as_deref()
    }

    /// The response accumulated so far.
    pub fn response(&self) -> &ResponseUpdate {
        &self.response_acc
    }

    /// Switch to another survey. The accumulated response is discarded.
    pub fn set_survey_id(&mut self, id: impl Into<String>) {
        self.survey_id = id.into();
        self.clear();
    }

    /// Independent copy for handing to another component.
    ///
    /// Carries the survey, single-use, response and user ids plus the
    /// accumulated response. The display id is not carried over; the copy
    /// gets its own once a display is created for it.
    pub fn copy(&self) -> Self {
        Self {
            survey_id: self.survey_id.clone(),
            response_id: self.response_id.clone(),
            display_id: None,
            user_id: self.user_id.clone(),
            single_use_id: self.single_use_id.clone(),
            response_acc: self.response_acc.clone(),
        }
    }

    /// Record the id of the response created on the server.
    pub fn update_response_id(&mut self, id: impl Into<String>) {
        self.response_id = Some(id.into());
    }

    /// Record the id of the display created on the server.
    pub fn update_display_id(&mut self, id: impl Into<String>) {
        self.display_id = Some(id.into());
    }

    /// Record the respondent's user id.
    pub fn update_user_id(&mut self, id: impl Into<String>) {
        self.user_id = Some(id.into());
    }

    /// Merge a partial response into the accumulator.
    ///
    /// Answers are merged key by key with the update winning; `finished`,
    /// `ttc`, `variables` and `display_id` are taken from the update as-is.
    pub fn accumulate_response(&mut self, update: ResponseUpdate) {
        let ResponseUpdate {
            finished,
            data,
            ttc,
            variables,
            display_id,
        } = update;

        let mut merged = std::mem::take(&mut self.response_acc.data);
        merged.extend(data);

        self.response_acc = ResponseUpdate {
            finished,
            data: merged,
            ttc,
            variables,
            display_id,
        };

        tracing::debug!(
            survey_id = %self.survey_id,
            answers = self.response_acc.data.len(),
            finished,
            "Accumulated response"
        );
    }

    /// Whether the last accumulated update finished the survey.
    pub fn is_response_finished(&self) -> bool {
        self.response_acc.finished
    }

    /// Forget the response id and everything accumulated.
    pub fn clear(&mut self) {
        self.response_id = None;
        self.response_acc = ResponseUpdate::default();
    }
}

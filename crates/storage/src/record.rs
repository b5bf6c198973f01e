use quiz_core::model::{Question, QuestionId, validate_question_set};
use serde::{Deserialize, Serialize};

use crate::provider::LoadError;

/// Wire shape of one question in the JSON payload.
///
/// Every field is optional here so a missing key is reported by name
/// instead of as a generic decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub id: Option<QuestionId>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: Some(question.id().clone()),
            question: Some(question.text().to_owned()),
            options: Some(question.options().to_vec()),
            answer: Some(question.answer().to_owned()),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// A missing `question` text renders as empty.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::MissingField` for absent `id`/`options`/`answer`,
    /// or `LoadError::InvalidQuestion` if the question fails validation.
    pub fn into_question(self, index: usize) -> Result<Question, LoadError> {
        let id = self.id.ok_or(LoadError::MissingField { index, field: "id" })?;
        let options = self
            .options
            .ok_or(LoadError::MissingField { index, field: "options" })?;
        let answer = self
            .answer
            .ok_or(LoadError::MissingField { index, field: "answer" })?;

        Question::new(id, self.question.unwrap_or_default(), options, answer)
            .map_err(|source| LoadError::InvalidQuestion { index, source })
    }
}

/// Decode a JSON array of question records into a validated question set.
///
/// # Errors
///
/// Returns `LoadError::Malformed` for invalid JSON, `LoadError::NotAnArray`
/// for any other top-level value, and per-question or set-level errors
/// for records that break the model invariants.
pub fn parse_payload(bytes: &[u8]) -> Result<Vec<Question>, LoadError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let serde_json::Value::Array(items) = value else {
        return Err(LoadError::NotAnArray);
    };

    let mut questions = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let record: QuestionRecord = serde_json::from_value(item)?;
        questions.push(record.into_question(index)?);
    }

    validate_question_set(&questions)?;
    Ok(questions)
}

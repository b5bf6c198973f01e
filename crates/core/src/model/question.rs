use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question must offer at least one option")]
    NoOptions,

    #[error("option {position} is empty")]
    EmptyOption { position: usize },

    #[error("option {0:?} appears more than once")]
    DuplicateOption(String),

    #[error("answer {0:?} is not one of the options")]
    AnswerNotInOptions(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set is empty")]
    Empty,

    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Invariants enforced on construction:
/// - `options` is non-empty and its entries are distinct and non-blank
/// - `answer` equals one of `options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    answer: String,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id is blank, the options are empty or
    /// repeated, or the answer is not among the options.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if id.is_empty() {
            return Err(QuestionError::EmptyId);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let mut seen = HashSet::with_capacity(options.len());
        for (position, option) in options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(QuestionError::EmptyOption { position });
            }
            if !seen.insert(option.as_str()) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }

        let answer = answer.into();
        if !seen.contains(answer.as_str()) {
            return Err(QuestionError::AnswerNotInOptions(answer));
        }

        Ok(Self {
            id,
            text: text.into(),
            options,
            answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// True when `selected` is present and equals the correct answer.
    #[must_use]
    pub fn is_correct(&self, selected: Option<&str>) -> bool {
        selected == Some(self.answer.as_str())
    }
}

/// Check the set-level invariants: non-empty, ids unique.
///
/// # Errors
///
/// Returns `QuestionSetError::Empty` or `QuestionSetError::DuplicateId`.
pub fn validate_question_set(questions: &[Question]) -> Result<(), QuestionSetError> {
    if questions.is_empty() {
        return Err(QuestionSetError::Empty);
    }
    let mut ids = HashSet::with_capacity(questions.len());
    for question in questions {
        if !ids.insert(question.id()) {
            return Err(QuestionSetError::DuplicateId(question.id().clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn question_requires_answer_among_options() {
        let err = Question::new(QuestionId::from(1), "2+2?", options(&["3", "5"]), "4").unwrap_err();
        assert_eq!(err, QuestionError::AnswerNotInOptions("4".into()));
    }

    #[test]
    fn question_rejects_duplicate_and_empty_options() {
        let dup = Question::new(QuestionId::from(1), "Q", options(&["a", "a"]), "a").unwrap_err();
        assert_eq!(dup, QuestionError::DuplicateOption("a".into()));

        let blank = Question::new(QuestionId::from(1), "Q", options(&["a", " "]), "a").unwrap_err();
        assert_eq!(blank, QuestionError::EmptyOption { position: 1 });

        let none = Question::new(QuestionId::from(1), "Q", Vec::new(), "a").unwrap_err();
        assert_eq!(none, QuestionError::NoOptions);
    }

    #[test]
    fn is_correct_treats_unanswered_as_wrong() {
        let q = Question::new(QuestionId::from(1), "Q", options(&["a", "b"]), "b").unwrap();
        assert!(q.is_correct(Some("b")));
        assert!(!q.is_correct(Some("a")));
        assert!(!q.is_correct(None));
    }

    #[test]
    fn set_validation_catches_duplicates_and_empty() {
        assert_eq!(validate_question_set(&[]), Err(QuestionSetError::Empty));

        let a = Question::new(QuestionId::from(1), "A", options(&["x"]), "x").unwrap();
        let b = Question::new(QuestionId::new("1"), "B", options(&["y"]), "y").unwrap();
        assert_eq!(
            validate_question_set(&[a.clone(), b]),
            Err(QuestionSetError::DuplicateId(QuestionId::from(1)))
        );
        assert_eq!(validate_question_set(&[a]), Ok(()));
    }
}

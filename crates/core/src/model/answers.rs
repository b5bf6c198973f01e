use std::collections::HashMap;

use crate::model::ids::QuestionId;

/// Selected option per question.
///
/// A question id is present only once an option was chosen for it; absence
/// means unanswered. Re-selecting overwrites the previous choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    selections: HashMap<QuestionId, String>,
}

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `option` for `question_id`, returning the previous choice if any.
    pub fn select(&mut self, question_id: QuestionId, option: impl Into<String>) -> Option<String> {
        self.selections.insert(question_id, option.into())
    }

    #[must_use]
    pub fn get(&self, question_id: &QuestionId) -> Option<&str> {
        self.selections.get(question_id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

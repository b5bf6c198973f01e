use quiz_core::model::Phase;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub phase: Phase,
    pub total: usize,
    pub answered: usize,
    pub current_index: usize,
    pub seconds_remaining: u32,
}

impl SessionProgress {
    /// True when the current question is the last one.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.total > 0 && self.current_index + 1 == self.total
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}

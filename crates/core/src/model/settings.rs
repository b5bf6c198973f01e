use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("time budget must be > 0 seconds")]
    InvalidTimeBudget,

    #[error("pass threshold must be between 0 and 100 percent")]
    InvalidPassThreshold,

    #[error("points per question must be > 0")]
    InvalidPointsPerQuestion,
}

/// Tunables for a quiz session.
///
/// Defaults: one minute, pass at 50%, ten points
/// per question, half a second of "computing" before the result shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    time_budget_secs: u32,
    pass_threshold_percent: u8,
    points_per_question: u32,
    scoring_delay_ms: u64,
}

impl QuizSettings {
    pub const DEFAULT_TIME_BUDGET_SECS: u32 = 60;
    pub const DEFAULT_PASS_THRESHOLD_PERCENT: u8 = 50;
    pub const DEFAULT_POINTS_PER_QUESTION: u32 = 10;
    pub const DEFAULT_SCORING_DELAY_MS: u64 = 500;

    /// Creates custom quiz settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the budget or points are zero, or the
    /// threshold exceeds 100.
    pub fn new(
        time_budget_secs: u32,
        pass_threshold_percent: u8,
        points_per_question: u32,
        scoring_delay_ms: u64,
    ) -> Result<Self, SettingsError> {
        if time_budget_secs == 0 {
            return Err(SettingsError::InvalidTimeBudget);
        }
        if pass_threshold_percent > 100 {
            return Err(SettingsError::InvalidPassThreshold);
        }
        if points_per_question == 0 {
            return Err(SettingsError::InvalidPointsPerQuestion);
        }

        Ok(Self {
            time_budget_secs,
            pass_threshold_percent,
            points_per_question,
            scoring_delay_ms,
        })
    }

    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.time_budget_secs
    }

    #[must_use]
    pub fn pass_threshold_percent(&self) -> u8 {
        self.pass_threshold_percent
    }

    #[must_use]
    pub fn points_per_question(&self) -> u32 {
        self.points_per_question
    }

    #[must_use]
    pub fn scoring_delay(&self) -> Duration {
        Duration::from_millis(self.scoring_delay_ms)
    }

    /// Same settings without the cosmetic scoring pause.
    #[must_use]
    pub fn without_scoring_delay(mut self) -> Self {
        self.scoring_delay_ms = 0;
        self
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_budget_secs: Self::DEFAULT_TIME_BUDGET_SECS,
            pass_threshold_percent: Self::DEFAULT_PASS_THRESHOLD_PERCENT,
            points_per_question: Self::DEFAULT_POINTS_PER_QUESTION,
            scoring_delay_ms: Self::DEFAULT_SCORING_DELAY_MS,
        }
    }
}

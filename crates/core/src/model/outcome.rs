use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AnswerSet, Question, QuizSettings};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutcomeError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many questions for a single quiz: {len}")]
    TooManyQuestions { len: usize },
}

/// Number of questions whose recorded answer equals the correct one.
///
/// Unanswered questions never match. The count does not depend on the order
/// of `questions`.
#[must_use]
pub fn count_correct(questions: &[Question], answers: &AnswerSet) -> usize {
    questions
        .iter()
        .filter(|q| q.is_correct(answers.get(q.id())))
        .count()
}

/// Final result of a quiz session, fixed when scoring begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    score: u32,
    total: u32,
    answered: u32,
    elapsed_secs: u32,
    pass_threshold_percent: u8,
    points_per_question: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizOutcome {
    /// Score `answers` against `questions`.
    ///
    /// `elapsed_secs` is the countdown budget minus the seconds left at the
    /// moment scoring began.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `OutcomeError::TooManyQuestions` if the question count cannot fit in `u32`.
    pub fn from_answers(
        questions: &[Question],
        answers: &AnswerSet,
        elapsed_secs: u32,
        settings: &QuizSettings,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, OutcomeError> {
        if completed_at < started_at {
            return Err(OutcomeError::InvalidTimeRange);
        }
        let too_many = || OutcomeError::TooManyQuestions {
            len: questions.len(),
        };
        let total = u32::try_from(questions.len()).map_err(|_| too_many())?;
        let score = u32::try_from(count_correct(questions, answers)).map_err(|_| too_many())?;
        let answered = questions
            .iter()
            .filter(|q| answers.get(q.id()).is_some())
            .count();
        let answered = u32::try_from(answered).map_err(|_| too_many())?;

        Ok(Self {
            score,
            total,
            answered,
            elapsed_secs,
            pass_threshold_percent: settings.pass_threshold_percent(),
            points_per_question: settings.points_per_question(),
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Share of correct answers in `[0, 100]`.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total) * 100.0
    }

    /// Pass when the percentage reaches the threshold.
    ///
    /// Compared in integers so 1/2 at a 50% threshold passes exactly.
    #[must_use]
    pub fn passed(&self) -> bool {
        u64::from(self.score) * 100
            >= u64::from(self.pass_threshold_percent) * u64::from(self.total)
    }

    #[must_use]
    pub fn points(&self) -> u64 {
        u64::from(self.score) * u64::from(self.points_per_question)
    }

    #[must_use]
    pub fn max_points(&self) -> u64 {
        u64::from(self.total) * u64::from(self.points_per_question)
    }
}

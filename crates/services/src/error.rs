//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{OutcomeError, Phase, QuestionId};
use storage::LoadError;

/// A caller asked for something the session cannot do in its current state.
///
/// Rejected operations never mutate the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidOperation {
    #[error("{operation} is not allowed while the quiz is {phase}")]
    WrongPhase {
        operation: &'static str,
        phase: Phase,
    },
    #[error("unknown question id {0}")]
    UnknownQuestion(QuestionId),
    #[error("option {option:?} is not offered by question {question_id}")]
    UnknownOption {
        question_id: QuestionId,
        option: String,
    },
    #[error("question {question_id} has no option {number}")]
    OptionOutOfRange {
        question_id: QuestionId,
        number: usize,
    },
}

/// Errors emitted by the countdown timer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimerError {
    #[error("countdown requires a running Tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Outcome(#[from] OutcomeError),
    #[error(transparent)]
    Timer(#[from] TimerError),
}

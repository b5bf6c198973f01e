use quiz_core::model::QuizOutcome;

use super::time_fmt::{format_clock, format_datetime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultStatus {
    Passed,
    Failed,
}

impl ResultStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ResultStatus::Passed => "Passed",
            ResultStatus::Failed => "Failed",
        }
    }
}

/// Pre-formatted result panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultVm {
    pub status: ResultStatus,
    pub points: u64,
    pub max_points: u64,
    pub percentage: f64,
    pub total_time: String,
    pub completed_at: String,
}

#[must_use]
pub fn map_result(outcome: &QuizOutcome) -> ResultVm {
    ResultVm {
        status: if outcome.passed() {
            ResultStatus::Passed
        } else {
            ResultStatus::Failed
        },
        points: outcome.points(),
        max_points: outcome.max_points(),
        percentage: outcome.percentage(),
        total_time: format_clock(outcome.elapsed_secs()),
        completed_at: format_datetime(outcome.completed_at()),
    }
}

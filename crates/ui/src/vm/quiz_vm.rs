use quiz_core::model::{Phase, QuestionId};
use services::{QuizSession, SessionProgress};

use super::result_vm::{ResultVm, map_result};
use super::time_fmt::format_clock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionCardVm {
    pub question_id: QuestionId,
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub options: Vec<OptionVm>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryAction {
    Next,
    Submit,
}

impl PrimaryAction {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PrimaryAction::Next => "Next",
            PrimaryAction::Submit => "Submit",
        }
    }
}

/// Previous is hidden on the first question; Submit replaces Next on the last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavControlsVm {
    pub show_previous: bool,
    pub primary: PrimaryAction,
    pub unanswered: usize,
}

impl NavControlsVm {
    fn from_progress(progress: &SessionProgress) -> Self {
        Self {
            show_previous: progress.current_index > 0,
            primary: if progress.is_last() {
                PrimaryAction::Submit
            } else {
                PrimaryAction::Next
            },
            unanswered: progress.unanswered(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum QuizScreenVm {
    Loading,
    Question {
        card: QuestionCardVm,
        controls: NavControlsVm,
        timer: String,
    },
    Computing {
        timer: String,
    },
    Result(ResultVm),
}

#[must_use]
pub fn map_quiz_screen(session: &QuizSession) -> QuizScreenVm {
    let timer = format_clock(session.seconds_remaining());
    match session.phase() {
        Phase::Loading => QuizScreenVm::Loading,
        Phase::Scoring => QuizScreenVm::Computing { timer },
        Phase::Finished => match session.outcome() {
            Some(outcome) => QuizScreenVm::Result(map_result(outcome)),
            None => QuizScreenVm::Computing { timer },
        },
        Phase::InProgress => {
            let progress = session.progress();
            match map_card(session, &progress) {
                Some(card) => QuizScreenVm::Question {
                    card,
                    controls: NavControlsVm::from_progress(&progress),
                    timer,
                },
                None => QuizScreenVm::Loading,
            }
        }
    }
}

fn map_card(session: &QuizSession, progress: &SessionProgress) -> Option<QuestionCardVm> {
    let question = session.current_question()?;
    let selected = session.selected_option(question.id());
    let options = question
        .options()
        .iter()
        .enumerate()
        .map(|(index, option)| OptionVm {
            label: format!("Option {}", index + 1),
            text: option.clone(),
            selected: selected == Some(option.as_str()),
        })
        .collect();

    Some(QuestionCardVm {
        question_id: question.id().clone(),
        number: progress.current_index + 1,
        total: progress.total,
        text: question.text().to_owned(),
        options,
    })
}

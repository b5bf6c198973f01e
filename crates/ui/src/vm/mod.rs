mod quiz_vm;
mod result_vm;
mod time_fmt;

pub use quiz_vm::{
    NavControlsVm, OptionVm, PrimaryAction, QuestionCardVm, QuizScreenVm, map_quiz_screen,
};
pub use result_vm::{ResultStatus, ResultVm, map_result};
pub use time_fmt::{format_clock, format_datetime};

mod answers;
mod ids;
mod outcome;
mod phase;
mod question;
mod settings;

pub use answers::AnswerSet;
pub use ids::QuestionId;
pub use outcome::{OutcomeError, QuizOutcome, count_correct};
pub use phase::Phase;
pub use question::{Question, QuestionError, QuestionSetError, validate_question_set};
pub use settings::{QuizSettings, SettingsError};

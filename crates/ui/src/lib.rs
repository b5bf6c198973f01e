pub mod views;
pub mod vm;

pub use views::render_screen;
pub use vm::{QuizScreenVm, map_quiz_screen};

use std::fmt::Write;

use crate::vm::{PrimaryAction, QuizScreenVm, ResultVm};

/// Plain-text rendering of a quiz screen for terminal hosts.
#[must_use]
pub fn render_screen(screen: &QuizScreenVm) -> String {
    let mut out = String::new();
    match screen {
        QuizScreenVm::Loading => out.push_str("Loading...\n"),
        QuizScreenVm::Computing { timer } => {
            let _ = writeln!(out, "Time left: {timer}");
            out.push_str("Calculating your score...\n");
        }
        QuizScreenVm::Question {
            card,
            controls,
            timer,
        } => {
            let _ = writeln!(out, "Time left: {timer}");
            let _ = writeln!(out, "[{}/{}] {}", card.number, card.total, card.text);
            for option in &card.options {
                let marker = if option.selected { '*' } else { ' ' };
                let _ = writeln!(out, " {marker} {}: {}", option.label, option.text);
            }
            let mut actions = Vec::new();
            if controls.show_previous {
                actions.push("[p] Previous".to_owned());
            }
            let key = match controls.primary {
                PrimaryAction::Next => 'n',
                PrimaryAction::Submit => 's',
            };
            actions.push(format!("[{key}] {}", controls.primary.label()));
            let _ = writeln!(out, "{}", actions.join("   "));
            if controls.primary == PrimaryAction::Submit && controls.unanswered > 0 {
                let _ = writeln!(out, "({} unanswered)", controls.unanswered);
            }
        }
        QuizScreenVm::Result(result) => render_result(&mut out, result),
    }
    out
}

fn render_result(out: &mut String, result: &ResultVm) {
    out.push_str("Your Score:\n");
    let _ = writeln!(out, "  {}", result.status.label());
    let _ = writeln!(
        out,
        "  {}/{} ({:.0}%)",
        result.points, result.max_points, result.percentage
    );
    let _ = writeln!(out, "  Total Time: {} sec", result.total_time);
    let _ = writeln!(out, "  Completed: {}", result.completed_at);
    out.push_str("[r] Restart   [q] Quit\n");
}

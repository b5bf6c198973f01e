use std::fmt;
use std::sync::Arc;

use quiz_core::model::QuizSettings;
use services::{
    Clock, InvalidOperation, Navigator, QuizIntent, QuizLoopService, QuizSession, Screen,
    SessionObserver,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use ui::vm::{QuizScreenVm, map_quiz_screen};
use ui::render_screen;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidSource { raw: String },
    Settings(quiz_core::model::SettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidSource { raw } => write!(f, "invalid --source value: {raw:?}"),
            ArgsError::Settings(err) => write!(f, "invalid quiz settings: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--source <path|url>] [--time <secs>] [--pass <percent>]");
    eprintln!("                      [--seed <u64>] [--no-delay] [--verbose]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --source quiz.json (see demos/quiz.json for the format)");
    eprintln!("  --time 60");
    eprintln!("  --pass 50");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_SOURCE, QUIZ_TIME_BUDGET, QUIZ_PASS_THRESHOLD, RUST_LOG");
    eprintln!();
    eprintln!("Keys while playing:");
    eprintln!("  1..9 select option, n next, p previous, s submit, r restart, q quit");
}

#[derive(Debug)]
struct Args {
    source: String,
    settings: QuizSettings,
    seed: Option<u64>,
    verbose: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut source = std::env::var("QUIZ_SOURCE").unwrap_or_else(|_| "quiz.json".into());
        let mut time_budget = match std::env::var("QUIZ_TIME_BUDGET") {
            Ok(raw) => parse_number("QUIZ_TIME_BUDGET", raw)?,
            Err(_) => QuizSettings::DEFAULT_TIME_BUDGET_SECS,
        };
        let mut pass_threshold = match std::env::var("QUIZ_PASS_THRESHOLD") {
            Ok(raw) => parse_number("QUIZ_PASS_THRESHOLD", raw)?,
            Err(_) => QuizSettings::DEFAULT_PASS_THRESHOLD_PERCENT,
        };
        let mut scoring_delay_ms = QuizSettings::DEFAULT_SCORING_DELAY_MS;
        let mut seed = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--source" => {
                    let value = require_value(args, "--source")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidSource { raw: value });
                    }
                    source = value;
                }
                "--time" => time_budget = parse_number("--time", require_value(args, "--time")?)?,
                "--pass" => {
                    pass_threshold = parse_number("--pass", require_value(args, "--pass")?)?;
                }
                "--seed" => seed = Some(parse_number("--seed", require_value(args, "--seed")?)?),
                "--no-delay" => scoring_delay_ms = 0,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let settings = QuizSettings::new(
            time_budget,
            pass_threshold,
            QuizSettings::DEFAULT_POINTS_PER_QUESTION,
            scoring_delay_ms,
        )
        .map_err(ArgsError::Settings)?;

        Ok(Some(Self {
            source,
            settings,
            seed,
            verbose,
        }))
    }
}

/// Routes restart requests to a banner; the terminal has one screen.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, screen: Screen) {
        match screen {
            Screen::QuizStart => println!("\n=== New quiz ===\n"),
        }
    }
}

#[derive(Default)]
struct TerminalObserver {
    last_screen: Option<QuizScreenVm>,
}

fn without_timer(screen: &QuizScreenVm) -> QuizScreenVm {
    match screen.clone() {
        QuizScreenVm::Question {
            card, controls, ..
        } => QuizScreenVm::Question {
            card,
            controls,
            timer: String::new(),
        },
        QuizScreenVm::Computing { .. } => QuizScreenVm::Computing {
            timer: String::new(),
        },
        other => other,
    }
}

impl SessionObserver for TerminalObserver {
    fn on_update(&mut self, session: &QuizSession) {
        let screen = map_quiz_screen(session);
        let changed = self
            .last_screen
            .as_ref()
            .is_none_or(|last| without_timer(last) != without_timer(&screen));

        if changed {
            print!("{}", render_screen(&screen));
        } else if session.seconds_remaining() % 10 == 0 && self.last_screen.as_ref() != Some(&screen)
        {
            if let QuizScreenVm::Question { timer, .. } = &screen {
                println!("Time left: {timer}");
            }
        }
        self.last_screen = Some(screen);
    }

    fn on_rejected(&mut self, error: &InvalidOperation) {
        println!("Not now: {error}");
    }
}

/// Number keys stay numbers; the loop resolves them against whichever
/// question is current when the intent is applied.
fn parse_intent(line: &str) -> Option<QuizIntent> {
    let key = line.trim();
    match key {
        "n" => Some(QuizIntent::Next),
        "p" => Some(QuizIntent::Prev),
        "s" => Some(QuizIntent::Submit),
        "r" => Some(QuizIntent::Restart),
        "q" => Some(QuizIntent::Quit),
        _ => key
            .parse::<usize>()
            .ok()
            .filter(|number| *number > 0)
            .map(QuizIntent::SelectOption),
    }
}

async fn read_intents(tx: mpsc::Sender<QuizIntent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => break,
        };
        match parse_intent(&line) {
            Some(intent) => {
                if tx.send(intent).await.is_err() {
                    return;
                }
            }
            None => println!("Unknown key {:?}", line.trim()),
        }
    }
    debug!("stdin closed");
    let _ = tx.send(QuizIntent::Quit).await;
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    // Logs go to stderr so the quiz itself stays readable on stdout.
    let default_filter = if parsed.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(source = %parsed.source, budget_secs = parsed.settings.time_budget_secs(), "Starting quiz");

    let provider = storage::provider_for_source(&parsed.source);
    let mut service = QuizLoopService::new(
        Clock::default_clock(),
        parsed.settings,
        provider,
        Arc::new(TerminalNavigator),
    );
    if let Some(seed) = parsed.seed {
        service = service.with_seed(seed);
    }

    let (tx, rx) = mpsc::channel(32);
    let reader = tokio::spawn(read_intents(tx));

    let mut observer = TerminalObserver::default();
    let result = service.run(rx, &mut observer).await;
    reader.abort();

    result?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

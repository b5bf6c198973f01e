mod navigation;
mod progress;
mod service;
mod shuffle;
mod timer;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use navigation::{Navigator, NoopNavigator, Screen};
pub use progress::SessionProgress;
pub use service::{QuizSession, TickOutcome};
pub use shuffle::{RandomSource, RngSource, shuffle};
pub use timer::{ManualTicker, Ticker, TokioTicker};
pub use workflow::{QuizIntent, QuizLoopService, SessionObserver};

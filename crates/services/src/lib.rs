#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{InvalidOperation, SessionError, TimerError};

pub use sessions::{
    ManualTicker, Navigator, NoopNavigator, QuizIntent, QuizLoopService, QuizSession,
    RandomSource, RngSource, Screen, SessionObserver, SessionProgress, TickOutcome, Ticker,
    TokioTicker, shuffle,
};

use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Phase, QuestionId, QuizOutcome, QuizSettings};
use storage::QuestionProvider;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::navigation::{Navigator, Screen};
use super::service::{QuizSession, TickOutcome};
use super::shuffle::{RandomSource, RngSource};
use super::timer::{Ticker, TokioTicker};
use crate::Clock;
use crate::error::{InvalidOperation, SessionError};

/// User intents forwarded by a presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizIntent {
    Select {
        question_id: QuestionId,
        option: String,
    },
    /// 1-based option number on the question current when the intent is applied.
    SelectOption(usize),
    Next,
    Prev,
    Submit,
    Restart,
    Quit,
}

/// Receives session snapshots from `QuizLoopService::run`.
pub trait SessionObserver: Send {
    /// Called after every event that may have changed what is on screen.
    fn on_update(&mut self, session: &QuizSession);

    /// Called when an intent was rejected; the session is unchanged.
    fn on_rejected(&mut self, error: &InvalidOperation) {
        debug!(%error, "Intent rejected");
    }
}

/// Orchestrates loading, scoring delay, restart and the event loop around a
/// `QuizSession`.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    settings: QuizSettings,
    provider: Arc<dyn QuestionProvider>,
    navigator: Arc<dyn Navigator>,
    seed: Option<u64>,
    tick_period: Duration,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        provider: Arc<dyn QuestionProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            clock,
            settings,
            provider,
            navigator,
            seed: None,
            tick_period: Duration::from_secs(1),
        }
    }

    /// Use a deterministic shuffle seed instead of OS randomness.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn random_source(&self) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_os()),
        }
    }

    /// Build a session in `Loading` driven by `ticker`.
    #[must_use]
    pub fn new_session(&self, ticker: Box<dyn Ticker>) -> QuizSession {
        QuizSession::new(
            self.settings.clone(),
            self.clock,
            self.random_source(),
            ticker,
        )
    }

    /// Fetch the question set and start the session.
    ///
    /// On failure the session stays in `Loading`; nothing retries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation::WrongPhase` if the session is not loading.
    /// Returns `SessionError::Load` if the provider fails.
    pub async fn load(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        if session.phase() != Phase::Loading {
            return Err(InvalidOperation::WrongPhase {
                operation: "load",
                phase: session.phase(),
            }
            .into());
        }

        let questions = self.provider.load().await.map_err(|err| {
            warn!(error = %err, "Failed to load questions");
            err
        })?;
        session.begin(questions)
    }

    /// Submit, hold in `Scoring` for the configured delay, then finish.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session is not in progress.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<QuizOutcome, SessionError> {
        self.submit_observed(session, None).await
    }

    async fn submit_observed(
        &self,
        session: &mut QuizSession,
        observer: Option<&mut dyn SessionObserver>,
    ) -> Result<QuizOutcome, SessionError> {
        session.submit()?;
        if let Some(observer) = observer {
            observer.on_update(session);
        }

        let delay = self.settings.scoring_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(session.finish_scoring()?.clone())
    }

    /// Discard a finished run, route to the quiz start screen, and load a
    /// fresh, re-shuffled question set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation::WrongPhase` if the session is not finished.
    /// Returns `SessionError::Load` if re-fetching fails.
    pub async fn restart(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        session.restart()?;
        self.navigator.navigate(Screen::QuizStart);
        self.load(session).await
    }

    async fn apply(
        &self,
        session: &mut QuizSession,
        intent: QuizIntent,
        observer: &mut dyn SessionObserver,
    ) -> Result<(), SessionError> {
        match intent {
            QuizIntent::Select {
                question_id,
                option,
            } => session.select_answer(&question_id, &option),
            QuizIntent::SelectOption(number) => session.select_option(number),
            QuizIntent::Next => session.next().map(|_| ()),
            QuizIntent::Prev => session.prev().map(|_| ()),
            QuizIntent::Submit => self.submit_observed(session, Some(observer)).await.map(|_| ()),
            QuizIntent::Restart => self.restart(session).await,
            QuizIntent::Quit => Ok(()),
        }
    }

    /// Run one quiz until the intent channel closes or `Quit` arrives.
    ///
    /// Owns the session for its whole life: loads it, applies intents and
    /// one-second ticks in arrival order, and drops it (cancelling the
    /// countdown) on exit. Rejected intents are reported to the observer and
    /// the loop continues.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` if the initial load or a restart load
    /// fails, and `SessionError::Timer` outside a Tokio runtime.
    pub async fn run(
        &self,
        mut intents: mpsc::Receiver<QuizIntent>,
        observer: &mut dyn SessionObserver,
    ) -> Result<(), SessionError> {
        let (ticker, mut ticks) = TokioTicker::new(self.tick_period)?;
        let mut session = self.new_session(Box::new(ticker));

        observer.on_update(&session);
        self.load(&mut session).await?;
        observer.on_update(&session);

        loop {
            tokio::select! {
                Some(epoch) = ticks.recv() => {
                    match session.tick(epoch)? {
                        TickOutcome::Ignored => continue,
                        TickOutcome::TimedOut => info!("Time is up"),
                        TickOutcome::Running { .. } => {}
                    }
                }
                intent = intents.recv() => {
                    let Some(intent) = intent else { break };
                    if intent == QuizIntent::Quit {
                        break;
                    }
                    match self.apply(&mut session, intent, observer).await {
                        Ok(()) => {}
                        Err(SessionError::InvalidOperation(error)) => observer.on_rejected(&error),
                        Err(other) => return Err(other),
                    }
                }
            }
            observer.on_update(&session);
        }

        info!(phase = %session.phase(), "Quiz loop stopped");
        Ok(())
    }
}

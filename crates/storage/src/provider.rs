use async_trait::async_trait;
use quiz_core::model::{Question, QuestionError, QuestionSetError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::json::{HttpProvider, JsonFileProvider};

/// Errors surfaced while fetching or decoding a question set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to read question source: {0}")]
    Io(#[from] std::io::Error),

    #[error("question request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("question request returned status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("malformed question payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("question payload is not a JSON array")]
    NotAnArray,

    #[error("question #{index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("question #{index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error(transparent)]
    InvalidSet(#[from] QuestionSetError),

    #[error("question source unavailable: {0}")]
    Unavailable(String),
}

/// Source of the question set for a quiz session.
///
/// Implementations return the questions in source order; shuffling is the
/// session's job.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch the full question set.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the source is unreachable or its payload is malformed.
    async fn load(&self) -> Result<Vec<Question>, LoadError>;
}

/// Simple in-memory provider for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryProvider {
    questions: Arc<Mutex<Vec<Question>>>,
    loads: Arc<AtomicUsize>,
}

impl InMemoryProvider {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Swap the served question set; later loads see the new one.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Unavailable` if the inner lock is poisoned.
    pub fn replace(&self, questions: Vec<Question>) -> Result<(), LoadError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| LoadError::Unavailable(e.to_string()))?;
        *guard = questions;
        Ok(())
    }

    /// Number of completed `load` calls.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionProvider for InMemoryProvider {
    async fn load(&self) -> Result<Vec<Question>, LoadError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| LoadError::Unavailable(e.to_string()))?;
        quiz_core::model::validate_question_set(&guard)?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(guard.clone())
    }
}

/// Pick a provider for a source string: `http(s)://` URLs are fetched over
/// HTTP, anything else is treated as a path to a local JSON file.
#[must_use]
pub fn provider_for_source(source: &str) -> Arc<dyn QuestionProvider> {
    let trimmed = source.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Arc::new(HttpProvider::new(trimmed))
    } else {
        Arc::new(JsonFileProvider::new(trimmed))
    }
}

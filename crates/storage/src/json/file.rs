use async_trait::async_trait;
use quiz_core::model::Question;
use std::path::PathBuf;
use tracing::debug;

use crate::provider::{LoadError, QuestionProvider};
use crate::record::parse_payload;

/// Reads the question set from a local JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionProvider for JsonFileProvider {
    async fn load(&self) -> Result<Vec<Question>, LoadError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let questions = parse_payload(&bytes)?;
        debug!(path = %self.path.display(), count = questions.len(), "Loaded question file");
        Ok(questions)
    }
}

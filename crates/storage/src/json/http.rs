use async_trait::async_trait;
use quiz_core::model::Question;
use reqwest::Client;
use tracing::debug;

use crate::provider::{LoadError, QuestionProvider};
use crate::record::parse_payload;

/// Fetches the question set with a single GET of a static JSON resource.
#[derive(Clone)]
pub struct HttpProvider {
    client: Client,
    url: String,
}

impl HttpProvider {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuestionProvider for HttpProvider {
    async fn load(&self) -> Result<Vec<Question>, LoadError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus(response.status()));
        }

        let bytes = response.bytes().await?;
        let questions = parse_payload(&bytes)?;
        debug!(url = %self.url, count = questions.len(), "Fetched question set");
        Ok(questions)
    }
}

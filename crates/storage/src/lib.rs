#![forbid(unsafe_code)]

pub mod json;
pub mod provider;
pub mod record;

pub use json::{HttpProvider, JsonFileProvider};
pub use provider::{InMemoryProvider, LoadError, QuestionProvider, provider_for_source};
pub use record::{QuestionRecord, parse_payload};

//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless completion client - each call is independent
///
/// The extractor holds an `Arc<dyn LlmClient>` and calls [`complete`]
/// exactly once per extraction.
///
/// [`complete`]: LlmClient::complete
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

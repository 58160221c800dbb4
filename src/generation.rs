use async_trait::async_trait;

pub use crate::error::GenerationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Let the backend pull in web context. Emma always sends `false`.
    pub allow_internet_context: bool,
}

/// Anything that can turn a rendered prompt into reply text.
///
/// Implementations own their timeout and cancellation policy. Whatever goes
/// wrong, they report a [`GenerationError`]; the engine turns every error
/// into the fallback reply.
#[async_trait]
pub trait GenerativeTextClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, GenerationError>;
}

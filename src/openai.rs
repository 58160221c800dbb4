use crate::config::Config;
use crate::generation::{GenerateOptions, GenerationError, GenerativeTextClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    message: String,
}

/// Chat-completions client for OpenAI or any compatible endpoint.
pub struct OpenAIClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAIClient {
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        // The whole prompt goes in as one user turn
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Pull the reply text out of a completion body.
fn extract_text(completion: ChatCompletionResponse) -> Result<String, GenerationError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

fn api_error(status: u16, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string());
    GenerationError::Api { status, message }
}

#[async_trait]
impl GenerativeTextClient for OpenAIClient {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, GenerationError> {
        if options.allow_internet_context {
            tracing::debug!(
                "internet context requested but not supported by chat completions; ignoring"
            );
        }

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &error_text));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        extract_text(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<String, GenerationError> {
        extract_text(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn test_extract_text_trims_first_choice() {
        let text = parse(
            r#"{"choices":[{"message":{"content":"  Hi there \n"}},{"message":{"content":"second"}}]}"#,
        );
        assert_eq!(text.unwrap(), "Hi there");
    }

    #[test]
    fn test_blank_or_missing_content_is_empty_response() {
        assert!(matches!(
            parse(r#"{"choices":[{"message":{"content":"   "}}]}"#),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            parse(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            parse(r#"{"choices":[]}"#),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_api_error_prefers_structured_message() {
        let body =
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        match api_error(401, body) {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match api_error(502, "Bad Gateway") {
            GenerationError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_request_carries_prompt_as_single_user_message() {
        let client = OpenAIClient::from_config(&Config::for_tests()).unwrap();
        let request = serde_json::to_value(client.build_request("hello")).unwrap();
        assert_eq!(request["model"], "gpt-4o");
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["messages"][0]["content"], "hello");
        assert_eq!(request["max_tokens"], 300);
    }
}

use crate::traits::AnswerGenerator;
use crate::{QaError, RetrievedChunk};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant that answers questions about the \
provided documents. Answer ONLY with information found in the context below. If the answer is \
not in the context, say that the documents do not contain it. Be precise and clear, and cite \
the sources when possible.";

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.1,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Formats retrieved chunks as `Source:`/`Content:` blocks separated by blank lines.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("Source: {}\nContent: {}", chunk.source_label, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_user_prompt(question: &str, chunks: &[RetrievedChunk]) -> String {
    format!(
        "Document context:\n{}\n\nQuestion: {question}\n\nAnswer:",
        build_context(chunks)
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Calls an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatGenerator {
    config: GeneratorConfig,
    client: Client,
}

impl OpenAiChatGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiChatGenerator {
    async fn generate(
        &self,
        question: &str,
        context: &[RetrievedChunk],
    ) -> Result<String, QaError> {
        let user_prompt = build_user_prompt(question, context);
        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut request = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .json(&payload);

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QaError::BackendResponse {
                backend: self.endpoint(),
                details: format!("status {status}: {body}"),
            });
        }

        let body = response.text().await?;
        parse_answer(&self.endpoint(), &body)
    }
}

fn parse_answer(backend: &str, body: &str) -> Result<String, QaError> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| QaError::BackendResponse {
            backend: backend.to_string(),
            details: "response carried no answer text".to_string(),
        })
}

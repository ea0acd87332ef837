use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::breaker::CircuitBreaker;
use crate::error::{FastOrderError, Result};
use crate::prompts::build_order_prompt;
use crate::sanitize::sanitize_order_output;
use crate::types::{BreakerConfig, GenerationRequest, LlmConfig};

/// Default time budget for one generation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Text completion provider behind the breaker
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a single-prompt completion and return the model's text
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Backend for any OpenAI-compatible chat completions endpoint
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiBackend {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(FastOrderError::Config("base URL is empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(FastOrderError::Config("model is empty".to_string()));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.base_url)
            .with_api_key(&config.api_key);

        // The breaker isolates failures; the client must not retry on its own.
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Ok(Self {
            client: Client::with_config(openai_config).with_backoff(no_retry),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?,
        )];

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            request_builder.temperature(temperature);
        }
        let request = request_builder.build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}

/// Deadline and cancellation for one call
#[derive(Debug, Clone)]
pub struct CallContext {
    budget: Duration,
    deadline: Instant,
    cancel: CancellationToken,
}

impl CallContext {
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            budget,
            deadline: Instant::now() + budget,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie the call to an outside cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

/// Model client wrapped in a circuit breaker and a time budget
pub struct ResilientLlm {
    backend: Arc<dyn ChatBackend>,
    breaker: CircuitBreaker,
}

impl ResilientLlm {
    pub fn new(backend: Arc<dyn ChatBackend>, breaker: CircuitBreaker) -> Self {
        Self { backend, breaker }
    }

    /// Build an OpenAI-compatible client guarded by a fresh breaker
    pub fn from_config(config: &LlmConfig, breaker_config: BreakerConfig) -> Result<Self> {
        let backend = OpenAiBackend::new(config)?;
        Ok(Self::new(Arc::new(backend), CircuitBreaker::new(breaker_config)))
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run one guarded upstream call
    ///
    /// No retries: a rejected or failed attempt is returned immediately.
    /// When the deadline passes or the token is cancelled the in-flight
    /// request future is dropped, which aborts the HTTP request.
    pub async fn generate(&self, ctx: &CallContext, prompt: &str) -> Result<String> {
        let permit = match self.breaker.try_acquire() {
            Ok(permit) => permit,
            Err(e) => {
                tracing::warn!(breaker = %self.breaker.config().name, "[LLM] rejected: {}", e);
                return Err(e);
            }
        };

        tracing::debug!(prompt_len = prompt.len(), "[LLM] prompt:\n{}", prompt);
        let started = Instant::now();

        let outcome = tokio::select! {
            result = self.backend.complete(prompt) => result,
            _ = tokio::time::sleep_until(ctx.deadline) => Err(FastOrderError::Timeout(ctx.budget)),
            _ = ctx.cancel.cancelled() => Err(FastOrderError::Cancelled),
        };

        match outcome {
            Ok(text) => {
                permit.success();
                tracing::debug!(elapsed = ?started.elapsed(), "[LLM] completion received");
                Ok(text)
            }
            Err(e) => {
                permit.failure();
                tracing::error!(
                    elapsed = ?started.elapsed(),
                    state = %self.breaker.state(),
                    "[LLM] ERROR: {}",
                    e
                );
                Err(e)
            }
        }
    }

    /// Prompt, call and clean up the output for one order request
    pub async fn generate_order(
        &self,
        ctx: &CallContext,
        request: &GenerationRequest,
    ) -> Result<String> {
        let prompt = build_order_prompt(request);
        let raw = self.generate(ctx, &prompt).await?;
        Ok(sanitize_order_output(&raw))
    }
}

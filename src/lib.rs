//! # Fast Order
//!
//! Formats a running lunch order list and appends one new entry by asking
//! an OpenAI-compatible model. The model call sits behind a circuit
//! breaker and a time budget, and its output is normalized before it is
//! handed back.

pub mod breaker;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod sanitize;
pub mod types;

// Re-exports
pub use breaker::{CircuitBreaker, Permit};
pub use error::{FastOrderError, Result};
pub use llm::{CallContext, ChatBackend, OpenAiBackend, ResilientLlm, DEFAULT_TIMEOUT};
pub use prompts::{build_order_prompt, build_prompt};
pub use sanitize::sanitize_order_output;
pub use types::{BreakerConfig, CircuitState, Counts, GenerationRequest, LlmConfig, Mode};

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::{FastOrderError, Result};

/// Generation mode
///
/// The set is closed: anything that is not `first-touch` or `nitro`
/// behaves like `normal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Mode {
    /// Menu (optional) plus current orders, append one entry
    #[default]
    Normal,
    /// No menu, pick from dishes already ordered
    Nitro,
    /// Menu only, produce entry #1
    FirstTouch,
}

impl Mode {
    /// Parse a wire mode name. Unknown names fall back to `Normal`.
    pub fn parse(s: &str) -> Self {
        match s {
            "first-touch" => Mode::FirstTouch,
            "nitro" => Mode::Nitro,
            _ => Mode::Normal,
        }
    }

    /// Pick a mode from which inputs are filled in
    ///
    /// Blank orders means nobody has ordered yet; a blank menu means only
    /// the existing orders can be used as a dish source.
    pub fn detect(menu_text: &str, current_orders: &str) -> Self {
        if current_orders.trim().is_empty() {
            Mode::FirstTouch
        } else if menu_text.trim().is_empty() {
            Mode::Nitro
        } else {
            Mode::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Nitro => "nitro",
            Mode::FirstTouch => "first-touch",
        }
    }
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        Mode::parse(&s)
    }
}

impl From<&str> for Mode {
    fn from(s: &str) -> Self {
        Mode::parse(s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation request, as handed over by the HTTP layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub mode: Mode,
    pub menu_text: String,
    pub current_orders: String,
}

impl GenerationRequest {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_menu(mut self, menu: impl Into<String>) -> Self {
        self.menu_text = menu.into();
        self
    }

    pub fn with_current_orders(mut self, orders: impl Into<String>) -> Self {
        self.current_orders = orders.into();
        self
    }

    /// Check that current orders are filled in unless this is the first order
    ///
    /// The menu is always optional.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            Mode::FirstTouch => {}
            // Unknown modes were already folded into Normal, so they need orders too.
            Mode::Normal | Mode::Nitro => {
                if self.current_orders.trim().is_empty() {
                    return Err(FastOrderError::Validation(
                        "Current orders is required".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Upstream endpoint configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: None,
        }
    }
}

impl LlmConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }
}

/// Circuit breaker tuning
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    pub name: String,
    /// Trip once consecutive failures reach this many
    pub failure_threshold: u32,
    /// Calls admitted while half-open; this many successes close the circuit
    pub max_trial_requests: u32,
    /// Counts in the closed state are cleared this often
    pub interval: Duration,
    /// Time spent open before probing
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "llm".to_string(),
            failure_threshold: 3,
            max_trial_requests: 3,
            interval: Duration::from_secs(60),
            cooldown: Duration::from_secs(30),
        }
    }
}

impl BreakerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_failure_threshold(mut self, n: u32) -> Self {
        self.failure_threshold = n;
        self
    }

    pub fn with_max_trial_requests(mut self, n: u32) -> Self {
        self.max_trial_requests = n;
        self
    }

    pub fn with_interval(mut self, d: Duration) -> Self {
        self.interval = d;
        self
    }

    pub fn with_cooldown(mut self, d: Duration) -> Self {
        self.cooldown = d;
        self
    }
}

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        };
        f.write_str(s)
    }
}

/// Request counters for the current breaker generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    pub(crate) fn on_request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    pub(crate) fn on_success(&mut self) {
        self.total_successes = self.total_successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    pub(crate) fn on_failure(&mut self) {
        self.total_failures = self.total_failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }

    pub(crate) fn clear(&mut self) {
        *self = Counts::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("first-touch"), Mode::FirstTouch);
        assert_eq!(Mode::parse("nitro"), Mode::Nitro);
        assert_eq!(Mode::parse("normal"), Mode::Normal);
        assert_eq!(Mode::parse(""), Mode::Normal);
        assert_eq!(Mode::parse("NITRO"), Mode::Normal);
    }

    #[test]
    fn test_mode_detect() {
        assert_eq!(Mode::detect("menu", "  "), Mode::FirstTouch);
        assert_eq!(Mode::detect("", "1. farid : nasi 1"), Mode::Nitro);
        assert_eq!(Mode::detect("menu", "1. farid : nasi 1"), Mode::Normal);
    }

    #[test]
    fn test_validate_requires_orders() {
        let req = GenerationRequest::new(Mode::Normal).with_menu("Fillet ayam");
        assert!(matches!(req.validate(), Err(FastOrderError::Validation(_))));

        let req = GenerationRequest::new(Mode::Nitro).with_current_orders("   \n");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_first_touch_needs_nothing() {
        let req = GenerationRequest::new(Mode::FirstTouch).with_menu("Fillet ayam");
        assert!(req.validate().is_ok());

        let req = GenerationRequest::new(Mode::FirstTouch).with_current_orders("1. farid");
        assert!(req.validate().is_ok());

        let req = GenerationRequest::new(Mode::FirstTouch).with_menu("  \n");
        assert!(req.validate().is_ok());
    }

    // Unrecognized modes are deliberately accepted and treated like normal,
    // which means they still need current orders.
    #[test]
    fn test_unknown_mode_is_kept_permissive() {
        let req = GenerationRequest::new(Mode::from("turbo")).with_current_orders("1. farid");
        assert_eq!(req.mode, Mode::Normal);
        assert!(req.validate().is_ok());

        let req = GenerationRequest::new(Mode::from("turbo"));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_counts_saturate() {
        let mut counts = Counts {
            requests: u32::MAX,
            total_successes: u32::MAX,
            total_failures: u32::MAX,
            consecutive_successes: u32::MAX,
            consecutive_failures: u32::MAX,
        };

        counts.on_request();
        counts.on_failure();
        assert_eq!(counts.requests, u32::MAX);
        assert_eq!(counts.total_failures, u32::MAX);
        assert_eq!(counts.consecutive_failures, u32::MAX);
        assert_eq!(counts.consecutive_successes, 0);

        counts.on_success();
        assert_eq!(counts.total_successes, u32::MAX);
        assert_eq!(counts.consecutive_successes, 1);
        assert_eq!(counts.consecutive_failures, 0);
    }

    #[test]
    fn test_breaker_config_default() {
        let config = BreakerConfig::default();
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.max_trial_requests, 3);
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.cooldown, Duration::from_secs(30));
    }

    #[test]
    fn test_llm_config_builder() {
        let config = LlmConfig::new("llama3")
            .with_api_key("sk-test")
            .with_base_url("http://localhost:11434/v1")
            .with_temperature(0.2);

        assert_eq!(config.model, "llama3");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.temperature, Some(0.2));
    }
}

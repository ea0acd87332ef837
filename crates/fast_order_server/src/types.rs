//! Request/response bodies for the order API

use fast_order::{GenerationRequest, Mode};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate-order`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOrderRequest {
    /// `normal`, `nitro` or `first-touch`; anything else acts as `normal`
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Full menu text
    #[serde(default)]
    pub list_menu: Option<String>,

    /// Orders placed so far
    #[serde(default)]
    pub current_orders: Option<String>,
}

impl GenerateOrderRequest {
    pub fn into_generation_request(self) -> GenerationRequest {
        GenerationRequest {
            mode: self.mode.unwrap_or_default(),
            menu_text: self.list_menu.unwrap_or_default(),
            current_orders: self.current_orders.unwrap_or_default(),
        }
    }
}

/// Response body, used for both success and failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOrderResponse {
    pub generated_message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateOrderResponse {
    pub fn success(message: String) -> Self {
        Self {
            generated_message: message,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            generated_message: String::new(),
            error: Some(error.into()),
        }
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;

/// Errors produced while handling a webhook call.
///
/// None of these escape a handler: admission handlers turn them into a
/// denial or an internal error response, the conversion handler into a
/// failure status on the review.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The embedded object could not be decoded
    #[error("failed to decode object: {0}")]
    Decode(String),

    /// The object is not a version of Pizza this service knows
    #[error("unexpected type {0}")]
    UnsupportedType(String),

    /// The requested version pair cannot be converted
    #[error("cannot convert {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    /// A v1beta1 topping carries a quantity below one
    #[error("topping {name:?} has invalid quantity {quantity}, must be at least 1")]
    InvalidQuantity { name: String, quantity: i64 },

    /// Expanding v1beta1 quantities would exceed the portion limit
    #[error("topping {name:?} takes the pizza over {limit} portions")]
    TooManyToppings { name: String, limit: usize },

    /// The topping catalog failed for a reason other than not-found
    #[error("failed to lookup topping {topping:?}: {source}")]
    Lookup {
        topping: String,
        #[source]
        source: anyhow::Error,
    },

    /// The topping catalog has not finished its initial sync
    #[error("informers not ready")]
    CacheNotReady,

    /// The outbound object or patch could not be produced
    #[error("unexpected encoding error: {0}")]
    Encode(String),

    /// The review envelope is missing its request
    #[error("invalid review: {0}")]
    InvalidReview(String),
}

impl WebhookError {
    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        WebhookError::Decode(err.to_string())
    }

    pub(crate) fn encode(err: impl std::fmt::Display) -> Self {
        WebhookError::Encode(err.to_string())
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        error!("internal error: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

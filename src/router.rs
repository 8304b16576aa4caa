use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::*;

use crate::conversion_handler::ConversionServer;
use crate::mutation_handler::MutationServer;
use crate::validation_handler::ValidationServer;

/// Routes of the three webhooks plus `/healthz`, with access logging
pub fn webhook_router(
    mutation_server: MutationServer,
    validation_server: ValidationServer,
    conversion_server: ConversionServer,
) -> Router {
    Router::new()
        .route(
            "/admit/v1beta1/pizza",
            post(move |review| {
                let mutator = mutation_server.clone();
                async move { mutator.handle(review).await }
            }),
        )
        .route(
            "/validate/v1beta1/pizza",
            post(move |review| {
                let validator = validation_server.clone();
                async move { validator.handle(review).await }
            }),
        )
        .route(
            "/convert/v1beta1/pizza",
            post(move |review| {
                let converter = conversion_server.clone();
                async move { converter.handle(review).await }
            }),
        )
        .route("/healthz", get(|| async { "ok" }))
        .layer(middleware::from_fn(log_requests))
}

/// Logs method, path, status and latency of every request
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;
    info!(
        "{} {} {} ({:?})",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    );
    response
}

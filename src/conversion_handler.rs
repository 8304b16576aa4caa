use axum::Json;
use kube::core::conversion::{ConversionRequest, ConversionResponse, ConversionReview};
use kube::core::response::Status;
use log::*;
use serde_json::Value;

use crate::convert::convert;
use crate::error::WebhookError;
use crate::pizza::PizzaObject;

/// Converts batches of Pizza objects between served versions
#[derive(Clone, Default)]
pub struct ConversionServer;

impl ConversionServer {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        Json(review): Json<ConversionReview>,
    ) -> Result<Json<ConversionReview>, WebhookError> {
        self.review(review).map(Json)
    }

    pub fn review(&self, review: ConversionReview) -> Result<ConversionReview, WebhookError> {
        let req = ConversionRequest::try_from(review)
            .map_err(|e| WebhookError::InvalidReview(e.to_string()))?;

        let converted = convert_objects(&req.objects, &req.desired_api_version);
        let uid = req.uid.clone();
        let res = ConversionResponse::for_request(req);
        let res = match converted {
            Ok(objects) => {
                info!("converted {} objects for request {}", objects.len(), uid);
                res.success(objects)
            }
            Err(err) => {
                warn!("conversion of request {} failed: {}", uid, err);
                res.failure(Status::failure(&err.to_string(), ""))
            }
        };
        Ok(res.into_review())
    }
}

/// Converts every object to `desired_api_version`, in order.
///
/// The first object that cannot be decoded or converted fails the whole
/// batch.
pub fn convert_objects(objects: &[Value], desired_api_version: &str) -> Result<Vec<Value>, WebhookError> {
    objects
        .iter()
        .map(|raw| {
            let obj = PizzaObject::decode(raw)?;
            convert(&obj, desired_api_version)?.encode()
        })
        .collect()
}

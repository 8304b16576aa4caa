use axum::extract::Json;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use kube::core::DynamicObject;
use log::*;
use serde_json::Value;

use crate::error::WebhookError;
use crate::pizza::PizzaObject;

/// Defaults the toppings of Pizza objects of either version
#[derive(Clone, Default)]
pub struct MutationServer;

impl MutationServer {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        Json(review): Json<AdmissionReview<DynamicObject>>,
    ) -> Result<Json<AdmissionReview<DynamicObject>>, WebhookError> {
        self.review(review).map(Json)
    }

    pub fn review(
        &self,
        review: AdmissionReview<DynamicObject>,
    ) -> Result<AdmissionReview<DynamicObject>, WebhookError> {
        let req: AdmissionRequest<DynamicObject> = match review.try_into() {
            Ok(req) => req,
            Err(err) => {
                error!("invalid request: {}", err);
                return Ok(AdmissionResponse::invalid(err.to_string()).into_review());
            }
        };
        Ok(self.mutate(&req)?.into_review())
    }

    fn mutate(&self, req: &AdmissionRequest<DynamicObject>) -> Result<AdmissionResponse, WebhookError> {
        let res = AdmissionResponse::from(req);
        // nothing to default on deletes
        let Some(obj) = req.object.as_ref() else {
            return Ok(res);
        };

        let original = serde_json::to_value(obj).map_err(WebhookError::decode)?;
        let mut pizza = PizzaObject::decode(&original)?;
        let changed = match pizza.apply_default_toppings() {
            Ok(changed) => changed,
            Err(err @ WebhookError::UnsupportedType(_)) => {
                warn!("denied: {:?} on {} ({})", req.operation, req.name, err);
                return Ok(res.deny(err.to_string()));
            }
            Err(err) => return Err(err),
        };
        if !changed {
            debug!("{} already has toppings", pizza.object_key());
            return Ok(res);
        }

        info!(
            "Defaulting {} in version {}",
            pizza.object_key(),
            pizza.api_version()
        );
        let defaulted = with_toppings_of(&original, &pizza.encode()?)?;
        let patch = json_patch::diff(&original, &defaulted);
        if patch.0.is_empty() {
            return Ok(res);
        }
        res.with_patch(patch).map_err(WebhookError::encode)
    }
}

/// Returns `original` with its `spec.toppings` taken from `defaulted`.
///
/// Everything else in the original document is left alone so the diff only
/// touches the toppings.
fn with_toppings_of(original: &Value, defaulted: &Value) -> Result<Value, WebhookError> {
    let toppings = defaulted
        .pointer("/spec/toppings")
        .cloned()
        .ok_or_else(|| WebhookError::Encode("defaulted object has no toppings".to_string()))?;

    let mut doc = original.clone();
    let root = doc
        .as_object_mut()
        .ok_or_else(|| WebhookError::Encode("object is not a JSON object".to_string()))?;
    let spec = root
        .entry("spec")
        .or_insert_with(|| Value::Object(Default::default()));
    if spec.is_null() {
        *spec = Value::Object(Default::default());
    }
    match spec.as_object_mut() {
        Some(spec) => {
            spec.insert("toppings".to_string(), toppings);
        }
        None => return Err(WebhookError::Encode("spec is not a JSON object".to_string())),
    }
    Ok(doc)
}

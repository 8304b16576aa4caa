use std::sync::Arc;

use axum::Json;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use kube::core::DynamicObject;
use log::*;

use crate::catalog::ToppingCatalog;
use crate::error::WebhookError;
use crate::pizza::PizzaObject;

/// Rejects Pizza objects that reference toppings missing from the catalog
#[derive(Clone)]
pub struct ValidationServer {
    catalog: Arc<dyn ToppingCatalog>,
}

impl ValidationServer {
    pub fn new(catalog: Arc<dyn ToppingCatalog>) -> Self {
        Self { catalog }
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
        // An incomplete catalog would deny valid toppings
        if !self.catalog.has_synced() {
            return Err(WebhookError::CacheNotReady);
        }

        let req: AdmissionRequest<DynamicObject> = match review.try_into() {
            Ok(req) => req,
            Err(err) => {
                error!("invalid request: {}", err);
                return Ok(AdmissionResponse::invalid(err.to_string()).into_review());
            }
        };

        let mut res = AdmissionResponse::from(&req);
        if let Some(obj) = req.object.as_ref() {
            let value = serde_json::to_value(obj).map_err(WebhookError::decode)?;
            let pizza = PizzaObject::decode(&value)?;
            res = match self.validate(&pizza)? {
                None => {
                    info!("accepted: {:?} on Pizza {}", req.operation, pizza.object_key());
                    res
                }
                Some(reason) => {
                    warn!(
                        "denied: {:?} on Pizza {} ({})",
                        req.operation,
                        pizza.object_key(),
                        reason
                    );
                    res.deny(reason)
                }
            };
        }
        Ok(res.into_review())
    }

    /// Returns the reason for denying `pizza`, if any.
    ///
    /// Stops at the first unknown topping.
    fn validate(&self, pizza: &PizzaObject) -> Result<Option<String>, WebhookError> {
        let names = match pizza.topping_names() {
            Ok(names) => names,
            Err(err @ WebhookError::UnsupportedType(_)) => return Ok(Some(err.to_string())),
            Err(err) => return Err(err),
        };
        for name in names {
            let found = self
                .catalog
                .get(name)
                .map_err(|source| WebhookError::Lookup {
                    topping: name.to_string(),
                    source,
                })?;
            if found.is_none() {
                return Ok(Some(format!("topping {:?} not known", name)));
            }
        }
        Ok(None)
    }
}

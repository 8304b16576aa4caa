//! Conversion of Pizza objects between v1alpha1 and v1beta1.
//!
//! v1alpha1 lists a topping once per portion, v1beta1 lists every topping
//! once together with its quantity. Converting v1alpha1 -> v1beta1 -> v1alpha1
//! keeps the number of portions per topping but groups repeated names.

use std::collections::HashMap;

use log::debug;

use crate::error::WebhookError;
use crate::pizza::{self, v1alpha1, v1beta1, PizzaObject};

/// Converts `obj` to `desired_api_version`.
///
/// Converting to the version the object already has is rejected, same as
/// converting to a version that is not served.
pub fn convert(obj: &PizzaObject, desired_api_version: &str) -> Result<PizzaObject, WebhookError> {
    match obj {
        PizzaObject::V1Alpha1(pizza) => {
            if desired_api_version != v1beta1::API_VERSION {
                return Err(unsupported_conversion(v1alpha1::API_VERSION, desired_api_version));
            }
            debug!(
                "Converting {} from {} to {}",
                obj.object_key(),
                v1alpha1::API_VERSION,
                desired_api_version
            );
            Ok(PizzaObject::V1Beta1(to_v1beta1(pizza)))
        }
        PizzaObject::V1Beta1(pizza) => {
            if desired_api_version != v1alpha1::API_VERSION {
                return Err(unsupported_conversion(v1beta1::API_VERSION, desired_api_version));
            }
            debug!(
                "Converting {} from {} to {}",
                obj.object_key(),
                v1beta1::API_VERSION,
                desired_api_version
            );
            Ok(PizzaObject::V1Alpha1(to_v1alpha1(pizza)?))
        }
        PizzaObject::Unsupported(types) => {
            debug!("Unknown type {}, Kind={}", types.api_version, types.kind);
            Err(pizza::unsupported(types))
        }
    }
}

/// Groups repeated toppings into quantities, keeping first-occurrence order.
pub fn to_v1beta1(pizza: &v1alpha1::Pizza) -> v1beta1::Pizza {
    let mut toppings: Vec<v1beta1::PizzaTopping> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for name in pizza.topping_names() {
        if let Some(&i) = index.get(name) {
            toppings[i].quantity += 1;
            continue;
        }
        index.insert(name, toppings.len());
        toppings.push(v1beta1::PizzaTopping::new(name, 1));
    }

    let mut types = pizza.types.clone();
    types.api_version = v1beta1::API_VERSION.to_string();
    v1beta1::Pizza {
        types,
        metadata: pizza.metadata.clone(),
        spec: v1beta1::PizzaSpec { toppings },
        status: pizza.status.clone(),
    }
}

/// Upper bound on the number of portions a converted v1alpha1 pizza may list
pub const MAX_TOPPINGS: usize = 1000;

/// Expands every topping into `quantity` consecutive entries.
pub fn to_v1alpha1(pizza: &v1beta1::Pizza) -> Result<v1alpha1::Pizza, WebhookError> {
    let mut toppings = Vec::new();
    for topping in &pizza.spec.toppings {
        if topping.quantity < 1 {
            return Err(WebhookError::InvalidQuantity {
                name: topping.name.clone(),
                quantity: topping.quantity,
            });
        }
        let quantity = usize::try_from(topping.quantity).unwrap_or(usize::MAX);
        if quantity > MAX_TOPPINGS - toppings.len() {
            return Err(WebhookError::TooManyToppings {
                name: topping.name.clone(),
                limit: MAX_TOPPINGS,
            });
        }
        toppings.extend(std::iter::repeat(topping.name.clone()).take(quantity));
    }

    let mut types = pizza.types.clone();
    types.api_version = v1alpha1::API_VERSION.to_string();
    Ok(v1alpha1::Pizza {
        types,
        metadata: pizza.metadata.clone(),
        spec: v1alpha1::PizzaSpec { toppings },
        status: pizza.status.clone(),
    })
}

fn unsupported_conversion(from: &str, to: &str) -> WebhookError {
    WebhookError::UnsupportedConversion {
        from: from.to_string(),
        to: to.to_string(),
    }
}

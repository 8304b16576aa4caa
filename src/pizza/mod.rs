//! The two served versions of the Pizza custom resource.
//!
//! Objects arrive as JSON with their `apiVersion` and `kind` embedded.
//! [`PizzaObject::decode`] turns them into a closed set of variants so that
//! every handler matches on the version exhaustively.

pub mod v1alpha1;
pub mod v1beta1;

use kube::core::TypeMeta;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::error::WebhookError;

pub const GROUP: &str = "restaurant.programming-kubernetes.info";
pub const KIND: &str = "Pizza";

/// Toppings put on a pizza that was ordered without any
pub const DEFAULT_TOPPINGS: [&str; 3] = ["tomato", "mozzarella", "salami"];

/// Status shared by both versions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PizzaStatus {
    /// Kept as the number that was sent, so `12` does not come back as `12.0`
    #[serde(default = "zero_cost")]
    pub cost: Number,
}

impl Default for PizzaStatus {
    fn default() -> Self {
        Self { cost: zero_cost() }
    }
}

fn zero_cost() -> Number {
    Number::from(0)
}

/// Reads an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, PartialEq)]
pub enum PizzaObject {
    V1Alpha1(v1alpha1::Pizza),
    V1Beta1(v1beta1::Pizza),
    /// A well-formed object of some other kind or version
    Unsupported(TypeMeta),
}

impl PizzaObject {
    /// Decodes a raw object, dispatching on its embedded type information.
    pub fn decode(value: &Value) -> Result<Self, WebhookError> {
        let types = TypeMeta::deserialize(value).map_err(WebhookError::decode)?;
        if types.kind != KIND {
            return Ok(PizzaObject::Unsupported(types));
        }
        match types.api_version.as_str() {
            v1alpha1::API_VERSION => v1alpha1::Pizza::deserialize(value)
                .map(PizzaObject::V1Alpha1)
                .map_err(WebhookError::decode),
            v1beta1::API_VERSION => v1beta1::Pizza::deserialize(value)
                .map(PizzaObject::V1Beta1)
                .map_err(WebhookError::decode),
            _ => Ok(PizzaObject::Unsupported(types)),
        }
    }

    pub fn encode(&self) -> Result<Value, WebhookError> {
        match self {
            PizzaObject::V1Alpha1(pizza) => serde_json::to_value(pizza).map_err(WebhookError::encode),
            PizzaObject::V1Beta1(pizza) => serde_json::to_value(pizza).map_err(WebhookError::encode),
            PizzaObject::Unsupported(types) => Err(unsupported(types)),
        }
    }

    pub fn api_version(&self) -> &str {
        match self {
            PizzaObject::V1Alpha1(pizza) => &pizza.types.api_version,
            PizzaObject::V1Beta1(pizza) => &pizza.types.api_version,
            PizzaObject::Unsupported(types) => &types.api_version,
        }
    }

    /// Returns `namespace/name` for logging
    pub fn object_key(&self) -> String {
        let metadata = match self {
            PizzaObject::V1Alpha1(pizza) => &pizza.metadata,
            PizzaObject::V1Beta1(pizza) => &pizza.metadata,
            PizzaObject::Unsupported(_) => return String::new(),
        };
        format!(
            "{}/{}",
            metadata.namespace.as_deref().unwrap_or_default(),
            metadata.name.as_deref().unwrap_or_default()
        )
    }

    /// Names of the referenced toppings in declared order
    pub fn topping_names(&self) -> Result<Vec<&str>, WebhookError> {
        match self {
            PizzaObject::V1Alpha1(pizza) => Ok(pizza.topping_names().collect()),
            PizzaObject::V1Beta1(pizza) => Ok(pizza.topping_names().collect()),
            PizzaObject::Unsupported(types) => Err(unsupported(types)),
        }
    }

    /// Fills in [`DEFAULT_TOPPINGS`] when no toppings were chosen.
    ///
    /// Returns whether the object changed.
    pub fn apply_default_toppings(&mut self) -> Result<bool, WebhookError> {
        match self {
            PizzaObject::V1Alpha1(pizza) => {
                if !pizza.spec.toppings.is_empty() {
                    return Ok(false);
                }
                pizza.spec.toppings = DEFAULT_TOPPINGS.iter().map(|t| t.to_string()).collect();
                Ok(true)
            }
            PizzaObject::V1Beta1(pizza) => {
                if !pizza.spec.toppings.is_empty() {
                    return Ok(false);
                }
                pizza.spec.toppings = DEFAULT_TOPPINGS
                    .iter()
                    .map(|t| v1beta1::PizzaTopping::new(*t, 1))
                    .collect();
                Ok(true)
            }
            PizzaObject::Unsupported(types) => Err(unsupported(types)),
        }
    }
}

pub(crate) fn unsupported(types: &TypeMeta) -> WebhookError {
    WebhookError::UnsupportedType(format!("{}, Kind={}", types.api_version, types.kind))
}

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::TypeMeta;
use serde::{Deserialize, Serialize};

pub use super::PizzaStatus;

pub const API_VERSION: &str = "restaurant.programming-kubernetes.info/v1alpha1";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PizzaSpec {
    /// Toppings of the pizza. A name listed twice means a double portion.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub toppings: Vec<String>,
}

/// Pizza as served by restaurant.programming-kubernetes.info/v1alpha1
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pizza {
    #[serde(flatten)]
    pub types: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub spec: PizzaSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PizzaStatus>,
}

impl Pizza {
    pub fn topping_names(&self) -> impl Iterator<Item = &str> {
        self.spec.toppings.iter().map(String::as_str)
    }
}

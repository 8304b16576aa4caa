use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::TypeMeta;
use serde::{Deserialize, Serialize};

pub use super::PizzaStatus;

pub const API_VERSION: &str = "restaurant.programming-kubernetes.info/v1beta1";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PizzaTopping {
    /// Name of a cluster-scoped Topping object
    pub name: String,
    /// How many portions of the topping. Expected to be at least 1.
    pub quantity: i64,
}

impl PizzaTopping {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PizzaSpec {
    /// Toppings of the pizza, each name listed at most once
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub toppings: Vec<PizzaTopping>,
}

/// Pizza as served by restaurant.programming-kubernetes.info/v1beta1
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
        self.spec.toppings.iter().map(|t| t.name.as_str())
    }
}

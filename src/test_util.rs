use kube::core::admission::AdmissionReview;
use kube::core::DynamicObject;
use serde_json::{json, Value};

use crate::pizza::GROUP;

pub const REQUEST_UID: &str = "705ab4f5-6393-11e8-b7cc-42010a800002";

/// Builds a CREATE review for a Pizza, as the API server would send it
pub fn admission_review(object: Option<Value>) -> AdmissionReview<DynamicObject> {
    let mut request = json!({
        "uid": REQUEST_UID,
        "kind": {"group": GROUP, "version": "v1beta1", "kind": "Pizza"},
        "resource": {"group": GROUP, "version": "v1beta1", "resource": "pizzas"},
        "name": "order-1",
        "namespace": "default",
        "operation": "CREATE",
        "userInfo": {"username": "kubernetes-admin"},
        "dryRun": false
    });
    if let Some(object) = object {
        request["object"] = object;
    }
    serde_json::from_value(json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": request
    }))
    .expect("valid admission review")
}

pub fn pizza(api_version: &str, toppings: Value) -> Value {
    json!({
        "apiVersion": api_version,
        "kind": "Pizza",
        "metadata": {"name": "order-1", "namespace": "default"},
        "spec": {"toppings": toppings}
    })
}

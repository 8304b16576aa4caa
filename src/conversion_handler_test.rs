use anyhow::Result;
use kube::core::conversion::{ConversionResponse, ConversionReview};
use serde_json::{json, Value};

use crate::conversion_handler::{convert_objects, ConversionServer};
use crate::error::WebhookError;
use crate::pizza::{v1alpha1, v1beta1};
use crate::test_util::{pizza, REQUEST_UID};

fn conversion_review(desired_api_version: &str, objects: Vec<Value>) -> Result<ConversionReview> {
    Ok(serde_json::from_value(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "ConversionReview",
        "request": {
            "uid": REQUEST_UID,
            "desiredAPIVersion": desired_api_version,
            "objects": objects
        }
    }))?)
}

fn convert_batch(desired_api_version: &str, objects: Vec<Value>) -> Result<ConversionResponse> {
    let review = ConversionServer::new().review(conversion_review(desired_api_version, objects)?)?;
    Ok(review.response.expect("review has a response"))
}

#[test]
fn test_converts_batch_in_order() -> Result<()> {
    let objects = vec![
        pizza(
            v1alpha1::API_VERSION,
            json!(["tomato", "salami", "tomato", "mozzarella", "salami", "salami"]),
        ),
        pizza(v1alpha1::API_VERSION, json!(["pineapple"])),
    ];

    let res = convert_batch(v1beta1::API_VERSION, objects)?;
    assert_eq!(res.uid, REQUEST_UID);
    assert_eq!(res.converted_objects.len(), 2);
    assert_eq!(
        res.converted_objects[0]["spec"]["toppings"],
        json!([
            {"name": "tomato", "quantity": 2},
            {"name": "salami", "quantity": 3},
            {"name": "mozzarella", "quantity": 1}
        ])
    );
    assert_eq!(
        res.converted_objects[1]["spec"]["toppings"],
        json!([{"name": "pineapple", "quantity": 1}])
    );
    for obj in &res.converted_objects {
        assert_eq!(obj["apiVersion"], v1beta1::API_VERSION);
        assert_eq!(obj["kind"], "Pizza");
        assert_eq!(obj["metadata"]["name"], "order-1");
    }
    Ok(())
}

#[test]
fn test_converts_back_to_v1alpha1() -> Result<()> {
    let mut input = pizza(
        v1beta1::API_VERSION,
        json!([
            {"name": "tomato", "quantity": 2},
            {"name": "salami", "quantity": 3},
            {"name": "mozzarella", "quantity": 1}
        ]),
    );
    input["status"] = json!({"cost": 9.5});

    let res = convert_batch(v1alpha1::API_VERSION, vec![input])?;
    assert_eq!(res.converted_objects.len(), 1);
    let out = &res.converted_objects[0];
    assert_eq!(out["apiVersion"], v1alpha1::API_VERSION);
    assert_eq!(
        out["spec"]["toppings"],
        json!(["tomato", "tomato", "salami", "salami", "salami", "mozzarella"])
    );
    assert_eq!(out["status"], json!({"cost": 9.5}));
    Ok(())
}

#[test]
fn test_copies_status_unchanged() -> Result<()> {
    let test_cases = vec![
        ("integer cost", json!({"cost": 12})),
        ("fractional cost", json!({"cost": 12.25})),
        ("missing cost", json!({})),
    ];

    for (name, status) in test_cases {
        let mut input = pizza(v1alpha1::API_VERSION, json!(["tomato"]));
        input["status"] = status.clone();
        let res = convert_batch(v1beta1::API_VERSION, vec![input])?;
        let expected = if status.get("cost").is_some() {
            status
        } else {
            json!({"cost": 0})
        };
        assert_eq!(
            res.converted_objects[0]["status"], expected,
            "Failed test case: {}",
            name
        );
    }
    Ok(())
}

#[test]
fn test_null_toppings_convert_as_empty() -> Result<()> {
    let test_cases = vec![
        ("v1alpha1 to v1beta1", pizza(v1alpha1::API_VERSION, Value::Null), v1beta1::API_VERSION),
        ("v1beta1 to v1alpha1", pizza(v1beta1::API_VERSION, Value::Null), v1alpha1::API_VERSION),
    ];

    for (name, input, target) in test_cases {
        let res = convert_batch(target, vec![input])?;
        assert_eq!(res.converted_objects.len(), 1, "Failed test case: {}", name);
        assert_eq!(
            res.converted_objects[0]["spec"]["toppings"],
            json!([]),
            "Failed test case: {}",
            name
        );
    }
    Ok(())
}

#[test]
fn test_batch_fails_fast() -> Result<()> {
    struct TestCase {
        name: &'static str,
        objects: Vec<Value>,
        message: &'static str,
    }

    let test_cases = vec![
        TestCase {
            name: "unknown kind in the middle",
            objects: vec![
                pizza(v1alpha1::API_VERSION, json!(["tomato"])),
                json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "menu"}}),
                pizza(v1alpha1::API_VERSION, json!(["salami"])),
            ],
            message: "unexpected type v1, Kind=ConfigMap",
        },
        TestCase {
            name: "already in desired version",
            objects: vec![
                pizza(v1alpha1::API_VERSION, json!(["tomato"])),
                pizza(v1beta1::API_VERSION, json!([{"name": "tomato", "quantity": 1}])),
            ],
            message: "cannot convert restaurant.programming-kubernetes.info/v1beta1 to restaurant.programming-kubernetes.info/v1beta1",
        },
        TestCase {
            name: "missing kind",
            objects: vec![
                pizza(v1alpha1::API_VERSION, json!(["tomato"])),
                json!({"apiVersion": v1alpha1::API_VERSION}),
            ],
            message: "failed to decode object: missing field `kind`",
        },
    ];

    for tc in test_cases {
        let res = convert_batch(v1beta1::API_VERSION, tc.objects)?;
        assert_eq!(res.uid, REQUEST_UID, "Failed test case: {}", tc.name);
        assert!(res.converted_objects.is_empty(), "Failed test case: {}", tc.name);
        assert_eq!(res.result.message, tc.message, "Failed test case: {}", tc.name);
    }
    Ok(())
}

#[test]
fn test_invalid_quantity_fails_batch() -> Result<()> {
    let objects = vec![pizza(
        v1beta1::API_VERSION,
        json!([{"name": "tomato", "quantity": 0}]),
    )];
    let res = convert_batch(v1alpha1::API_VERSION, objects)?;
    assert!(res.converted_objects.is_empty());
    assert_eq!(
        res.result.message,
        "topping \"tomato\" has invalid quantity 0, must be at least 1"
    );
    Ok(())
}

#[test]
fn test_empty_batch_succeeds() -> Result<()> {
    let res = convert_batch(v1beta1::API_VERSION, vec![])?;
    assert!(res.converted_objects.is_empty());
    assert!(res.result.message.is_empty());
    Ok(())
}

#[test]
fn test_review_without_request_is_internal() -> Result<()> {
    let review: ConversionReview = serde_json::from_value(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "ConversionReview"
    }))?;
    assert!(matches!(
        ConversionServer::new().review(review),
        Err(WebhookError::InvalidReview(_))
    ));
    Ok(())
}

#[test]
fn test_convert_objects_stops_at_first_failure() {
    let objects = vec![
        pizza(v1alpha1::API_VERSION, json!(["tomato"])),
        json!({"apiVersion": "v1", "kind": "Secret", "metadata": {"name": "recipe"}}),
        json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "menu"}}),
    ];
    match convert_objects(&objects, v1beta1::API_VERSION) {
        Err(WebhookError::UnsupportedType(t)) => assert_eq!(t, "v1, Kind=Secret"),
        other => panic!("expected unsupported type, got {:?}", other),
    }
}

//! Integration tests for the `/api/v1/forms` resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;

fn contact_values() -> serde_json::Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@x.com",
        "message": "Please call me about a fleet policy."
    })
}

#[tokio::test]
async fn lists_every_form_with_its_endpoint() {
    let response = get(common::build_test_app(), "/api/v1/forms").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let forms = json["data"].as_array().unwrap();
    let slugs: Vec<_> = forms.iter().map(|f| f["slug"].as_str().unwrap()).collect();
    assert_eq!(
        slugs,
        vec![
            "commercial-auto",
            "general-liability",
            "workers-comp",
            "contact",
            "newsletter"
        ]
    );
    assert_eq!(forms[0]["totalSteps"], 4);
    assert_eq!(forms[0]["endpoint"], "/api/quotes/commercial-auto");
}

#[tokio::test]
async fn get_form_returns_definition() {
    let response = get(common::build_test_app(), "/api/v1/forms/commercial-auto").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["formId"], "commercial_auto");
    assert_eq!(json["data"]["steps"].as_array().unwrap().len(), 4);
    assert_eq!(json["data"]["steps"][0]["fields"][0]["name"], "businessName");
    assert_eq!(json["data"]["slots"][0]["name"], "vehicleList");
}

#[tokio::test]
async fn unknown_form_returns_404() {
    let response = get(common::build_test_app(), "/api/v1/forms/boat-insurance").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "form 'boat-insurance' not found");
}

#[tokio::test]
async fn validate_step_reports_missing_business_name() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/forms/commercial-auto/validate",
        json!({
            "step": 1,
            "values": {
                "contactName": "Jane Doe",
                "email": "jane@x.com",
                "phone": "(555) 123-4567"
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["isValid"], false);
    let errors = json["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["field"], "businessName");
    assert_eq!(errors[0]["reason"], "missing");
}

#[tokio::test]
async fn validate_without_step_checks_whole_form() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/forms/contact/validate",
        json!({ "values": contact_values() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["isValid"], true, "{json}");
    assert_eq!(json["data"]["errors"], json!([]));
}

#[tokio::test]
async fn validate_out_of_range_step_returns_400() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/forms/contact/validate",
        json!({ "step": 9, "values": {} }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_validate_body_returns_json_400() {
    for body in [
        json!({ "step": 300, "values": {} }),
        json!({ "step": "two", "values": {} }),
        json!({ "values": ["not", "an", "object"] }),
    ] {
        let response = post_json(
            common::build_test_app(),
            "/api/v1/forms/contact/validate",
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );

        let json = body_json(response).await;
        assert_eq!(json["code"], "BAD_REQUEST");
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}

#[tokio::test]
async fn validate_unknown_form_returns_404() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/forms/boat-insurance/validate",
        json!({ "values": {} }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

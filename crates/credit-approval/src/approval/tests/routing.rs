use super::common::*;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::approval::router::{approval_router, predict_handler, PredictQuery};

fn predict_request(uri: &str, body: Value) -> Request<axum::body::Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("request builds")
}

fn applicant_json() -> Value {
    json!({
        "Age": 25,
        "Income": 3000.0,
        "CreditScore": 6,
        "Debt": 0.0,
        "YearsEmployed": 1.0,
        "Gender": "m",
        "Married": "y",
        "BankCustomer": "y",
        "Industry": "Finance",
        "Ethnicity": "White",
        "PriorDefault": "n",
        "Employed": "y",
        "Citizen": "By Birth",
        "IncomeType": "full_time",
        "AmbiguousIncome": "n",
        "IncomeRate": "Monthly"
    })
}

#[tokio::test]
async fn predict_route_returns_decision_and_applicant_summary() {
    let context = Arc::new(context_with(
        Arc::new(SpyModel::scalar(0.73)),
        Arc::new(SpyModel::scalar(0.2)),
    ));

    let response = approval_router(context)
        .oneshot(predict_request("/api/v1/approval/predict", applicant_json()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("decision"), Some(&json!("approved")));
    assert_eq!(payload.get("probability"), Some(&json!(0.73)));
    assert_eq!(payload.get("model"), Some(&json!("gam")));
    assert_eq!(payload.get("reason"), Some(&Value::Null));
    assert!(payload.get("evaluated_at").is_some());

    let applicant = payload
        .get("applicant")
        .and_then(Value::as_array)
        .expect("applicant rows");
    assert_eq!(applicant.len(), 16);
    assert_eq!(applicant[0], json!({ "feature": "Age", "value": "25" }));
    assert!(applicant.contains(&json!({ "feature": "Citizen", "value": "By Birth" })));
}

#[tokio::test]
async fn predict_route_honors_model_query() {
    let context = Arc::new(context_with(
        Arc::new(SpyModel::scalar(0.73)),
        Arc::new(SpyModel::scalar(0.2)),
    ));

    let response = approval_router(context)
        .oneshot(predict_request(
            "/api/v1/approval/predict?model=lgb",
            applicant_json(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("model"), Some(&json!("lgb")));
    assert_eq!(payload.get("decision"), Some(&json!("rejected")));
}

#[tokio::test]
async fn under_age_applicants_get_a_reason() {
    let gam = Arc::new(SpyModel::scalar(0.99));
    let context = Arc::new(context_with(gam.clone(), Arc::new(SpyModel::scalar(0.99))));
    let mut body = applicant_json();
    body["Age"] = json!(10);

    let response = approval_router(context)
        .oneshot(predict_request("/api/v1/approval/predict", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("decision"), Some(&json!("rejected")));
    assert_eq!(
        payload.get("reason"),
        Some(&json!("Applicant must be at least 18 years old."))
    );
    assert_eq!(payload.get("rule"), Some(&json!("under_minimum_age")));
    assert_eq!(payload.get("probability"), Some(&Value::Null));
    assert_eq!(gam.calls(), 0);
}

#[tokio::test]
async fn predict_handler_returns_unprocessable_for_negative_income() {
    let context = Arc::new(context_with(
        Arc::new(SpyModel::scalar(0.5)),
        Arc::new(SpyModel::scalar(0.5)),
    ));
    let mut record = applicant();
    record.income = -250.0;

    let response = predict_handler(
        State(context),
        Query(PredictQuery::default()),
        Json(record),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("Income"));
}

#[tokio::test]
async fn predict_handler_rejects_unknown_model() {
    let context = Arc::new(context_with(
        Arc::new(SpyModel::scalar(0.5)),
        Arc::new(SpyModel::scalar(0.5)),
    ));

    let response = predict_handler(
        State(context),
        Query(PredictQuery {
            model: Some("xgboost".to_string()),
        }),
        Json(applicant()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_handler_hides_inference_details() {
    let context = Arc::new(context_with(
        Arc::new(FailingModel),
        Arc::new(SpyModel::scalar(0.5)),
    ));

    let response = predict_handler(
        State(context),
        Query(PredictQuery::default()),
        Json(applicant()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .expect("error message");
    assert!(message.contains("prediction unavailable"));
    assert!(!message.contains("solver diverged"));
}

#[tokio::test]
async fn unknown_choices_are_rejected_by_the_extractor() {
    let context = Arc::new(context_with(
        Arc::new(SpyModel::scalar(0.5)),
        Arc::new(SpyModel::scalar(0.5)),
    ));
    let mut body = applicant_json();
    body["Industry"] = json!("Mining");

    let response = approval_router(context)
        .oneshot(predict_request("/api/v1/approval/predict", body))
        .await
        .expect("route executes");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn options_route_lists_form_choices() {
    let context = Arc::new(context_with(
        Arc::new(SpyModel::scalar(0.5)),
        Arc::new(SpyModel::scalar(0.5)),
    ));

    let response = approval_router(context)
        .oneshot(
            Request::get("/api/v1/approval/options")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let categorical = payload
        .get("categorical")
        .and_then(Value::as_array)
        .expect("categorical options");
    assert_eq!(categorical.len(), 11);
    assert_eq!(
        categorical[8],
        json!({
            "field": "IncomeType",
            "options": ["part_time/freelancer", "NA", "full_time", "full_time/freelancer"]
        })
    );
    let numeric = payload
        .get("numeric")
        .and_then(Value::as_array)
        .expect("numeric options");
    assert_eq!(numeric[0].get("default"), Some(&json!(25.0)));
    assert_eq!(numeric[0].get("max"), Some(&json!(100.0)));

    let income = &numeric[1];
    assert_eq!(income.get("field"), Some(&json!("Income")));
    assert_eq!(income.get("max"), None);
    assert_eq!(income.get("form_max"), Some(&json!(1_000_000.0)));
    assert_eq!(numeric[3].get("form_max"), Some(&json!(30.0)));
    assert_eq!(numeric[4].get("form_max"), Some(&json!(50.0)));
}

#[tokio::test]
async fn schema_route_reports_unmapped_options() {
    let context = Arc::new(context_with(
        Arc::new(SpyModel::scalar(0.5)),
        Arc::new(SpyModel::scalar(0.5)),
    ));

    let response = approval_router(context)
        .oneshot(
            Request::get("/api/v1/approval/schema")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    assert_eq!(
        payload
            .get("columns")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(schema_columns().len())
    );
    assert_eq!(payload.get("unmapped_options"), Some(&json!(["IncomeRate_NA"])));
}

// libs/doctor-cell/tests/handlers_test.rs
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::handlers::*;
use doctor_cell::models::ConsultationType;
use doctor_cell::router::doctor_routes;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockDirectoryResponses, TestConfig};

fn state_for(server: &MockServer) -> Arc<DoctorCellState> {
    Arc::new(DoctorCellState::new(TestConfig::with_directory(&server.uri()).to_arc()))
}

fn slugs(body: &Value, key: &str) -> Vec<String> {
    body[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["slug"].as_str().unwrap().to_string())
        .collect()
}

async fn mount_doctors(server: &MockServer, doctors: Value) {
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doctors))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_browse_caps_and_promotes_top_doctor() {
    let server = MockServer::start().await;
    let doctors: Vec<Value> = (0..8)
        .map(|i| {
            MockDirectoryResponses::rated_doctor(&format!("dr-{}", i), "Doctor", 4.0 + i as f64 * 0.1)
        })
        .collect();
    mount_doctors(&server, json!(doctors)).await;

    let Json(body) = search_doctors(
        State(state_for(&server)),
        HeaderMap::new(),
        Ok(Query(DoctorSearchQuery::default())),
    )
    .await
    .unwrap();

    assert_eq!(body["total"], 6);
    assert_eq!(body["name_search"], false);
    assert_eq!(slugs(&body, "doctors"), vec!["dr-6", "dr-7", "dr-5", "dr-4", "dr-3", "dr-2"]);
    assert_eq!(body["doctors"][1]["is_top_doctor"], true);
    assert_eq!(body["doctors"][0]["is_top_doctor"], false);
    assert_eq!(body["doctors"][1]["price"], "40 JOD / session");
}

#[tokio::test]
async fn test_name_search_keeps_api_order() {
    let server = MockServer::start().await;
    mount_doctors(
        &server,
        json!([
            MockDirectoryResponses::rated_doctor("low", "Dr. Sami", 2.0),
            MockDirectoryResponses::rated_doctor("high", "Dr. Samia", 5.0),
        ]),
    )
    .await;

    let query = DoctorSearchQuery {
        main_search: Some("Sami".to_string()),
        ..Default::default()
    };
    let Json(body) = search_doctors(State(state_for(&server)), HeaderMap::new(), Ok(Query(query)))
        .await
        .unwrap();

    assert_eq!(body["name_search"], true);
    assert_eq!(slugs(&body, "doctors"), vec!["low", "high"]);
    assert!(body["doctors"]
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["is_top_doctor"] == false));
}

#[tokio::test]
async fn test_filters_are_forwarded_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("specialty", "Anxiety"))
        .and(query_param("online_only", "true"))
        .and(query_param("max_price", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDirectoryResponses::doctor("dr-lina", "Dr. Lina")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = DoctorSearchQuery {
        specialty: Some("Anxiety".to_string()),
        consultation_type: Some(ConsultationType::Online),
        max_price: Some(50.0),
        ..Default::default()
    };
    let Json(body) = search_doctors(State(state_for(&server)), HeaderMap::new(), Ok(Query(query)))
        .await
        .unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["is_top_doctor"], true);
}

#[tokio::test]
async fn test_invalid_price_range_is_rejected() {
    let server = MockServer::start().await;
    let query = DoctorSearchQuery {
        min_price: Some(80.0),
        max_price: Some(20.0),
        ..Default::default()
    };

    let result = search_doctors(State(state_for(&server)), HeaderMap::new(), Ok(Query(query))).await;
    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_upstream_failure_maps_to_external_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_json(MockDirectoryResponses::error_response("boom")))
        .mount(&server)
        .await;

    let result = search_doctors(
        State(state_for(&server)),
        HeaderMap::new(),
        Ok(Query(DoctorSearchQuery::default())),
    )
    .await;
    assert_matches!(result, Err(AppError::ExternalService(_)));
}

#[tokio::test]
async fn test_older_search_in_same_session_is_superseded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("specialty", "Trauma"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([MockDirectoryResponses::doctor("slow", "Dr. Slow")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("specialty", "Anxiety"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([MockDirectoryResponses::doctor("fast", "Dr. Fast")])),
        )
        .mount(&server)
        .await;

    let state = state_for(&server);
    let mut headers = HeaderMap::new();
    headers.insert(SEARCH_SESSION_HEADER, HeaderValue::from_static("tab-1"));

    let older = DoctorSearchQuery {
        specialty: Some("Trauma".to_string()),
        ..Default::default()
    };
    let newer = DoctorSearchQuery {
        specialty: Some("Anxiety".to_string()),
        ..Default::default()
    };

    let (older, newer) = tokio::join!(
        search_doctors(State(state.clone()), headers.clone(), Ok(Query(older))),
        search_doctors(State(state.clone()), headers.clone(), Ok(Query(newer))),
    );

    assert_matches!(older, Err(AppError::Conflict(_)));
    let Json(body) = newer.unwrap();
    assert_eq!(slugs(&body, "doctors"), vec!["fast"]);
}

#[tokio::test]
async fn test_match_recommends_single_doctor() {
    let server = MockServer::start().await;
    let mut specialist = MockDirectoryResponses::doctor("specialist", "Dr. Rana");
    specialist["concerns"] = json!(["Trauma", "PTSD"]);
    let mut generalist = MockDirectoryResponses::doctor("generalist", "Dr. Omar");
    generalist["specialties"] = json!(["Career coaching"]);
    generalist["concerns"] = json!([]);
    mount_doctors(&server, json!([generalist, specialist])).await;

    let request = MatchRequest {
        answers: serde_json::from_value(json!({
            "care_goal": "trauma",
            "priority": "balanced"
        }))
        .unwrap(),
        lang: Some("en".to_string()),
    };

    let Json(body) = match_doctors(State(state_for(&server)), Json(request)).await.unwrap();

    assert_eq!(body["total"], 2);
    assert_eq!(body["matches"][0]["doctor"]["slug"], "specialist");
    assert_eq!(body["matches"][0]["is_recommended"], true);
    assert_eq!(body["matches"][1]["is_recommended"], false);
    assert_eq!(body["matches"][0]["explanation"][0], "Specializes in your concern");
}

#[tokio::test]
async fn test_search_route_localizes_output() {
    let server = MockServer::start().await;
    let mut doctor = MockDirectoryResponses::doctor("dr-lina", "Dr. Lina");
    doctor["pricing_per_session"] = Value::Null;
    doctor["headline"] = Value::Null;
    mount_doctors(&server, json!([doctor])).await;

    let app = doctor_routes(TestConfig::with_directory(&server.uri()).to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/search?lang=ar")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["doctors"][0]["price"], "تواصل لمعرفة السعر");
    assert_eq!(body["doctors"][0]["title"], "معالج نفسي");
    assert_eq!(
        body["doctors"][0]["photo_url"],
        format!("{}/media/dr-lina.jpg", server.uri())
    );
}

async fn route_get(server: &MockServer, uri: &str) -> (StatusCode, Value) {
    let app = doctor_routes(TestConfig::with_directory(&server.uri()).to_arc());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_city_filter_reaches_upstream_and_lifts_cap() {
    let server = MockServer::start().await;
    let everyone: Vec<Value> = (0..8)
        .map(|i| MockDirectoryResponses::doctor(&format!("d{}", i), "Doctor"))
        .collect();

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("city", "Irbid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDirectoryResponses::doctor("irbid", "Dr. Irbid")
        ])))
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(everyone)))
        .with_priority(2)
        .mount(&server)
        .await;

    let (status, body) = route_get(&server, "/search?city=Irbid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(slugs(&body, "doctors"), vec!["irbid"]);

    // The older parameter name still works.
    let (_, body) = route_get(&server, "/search?location=Irbid").await;
    assert_eq!(slugs(&body, "doctors"), vec!["irbid"]);
}

#[tokio::test]
async fn test_malformed_query_returns_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = route_get(&server, "/search?min_price=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
}

//! HTTP surface against the in-memory store.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use liftops::{app, apply_migrations, AppState, MemoryStore, TABLES};
use serde_json::{json, Value};

async fn server() -> TestServer {
    server_with_limit(4 * 1024 * 1024).await
}

async fn server_with_limit(body_limit: usize) -> TestServer {
    let store = MemoryStore::new();
    apply_migrations(&store, TABLES, "test").await.unwrap();
    TestServer::new(app(AppState::new(store), body_limit)).unwrap()
}

fn error_code(response: &axum_test::TestResponse) -> Value {
    response.json::<Value>()["error"]["code"].clone()
}

#[tokio::test]
async fn user_round_trip() {
    let server = server().await;
    let response = server
        .post("/api/v1/users")
        .json(&json!({ "email": "a@b.com", "encrypted_password": "x" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>()["data"].clone();
    assert!(created["id"].is_i64());
    assert!(created["created_at"].is_string());
    assert!(created["updated_at"].is_string());

    let id = created["id"].as_i64().unwrap();
    let response = server.get(&format!("/api/v1/users/{}", id)).await;
    response.assert_status_ok();
    let read = response.json::<Value>()["data"].clone();
    assert_eq!(read["email"], "a@b.com");
    assert_eq!(read, created);
}

#[tokio::test]
async fn list_filters_by_column() {
    let server = server().await;
    server
        .post("/api/v1/blazer_dashboard_queries")
        .json(&json!({ "dashboard_id": 5, "query_id": 7, "position": 1 }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/v1/blazer_dashboard_queries")
        .json(&json!({ "dashboard_id": 6, "query_id": 7, "position": 2 }))
        .await
        .assert_status(StatusCode::CREATED);

    let body = server
        .get("/api/v1/blazer_dashboard_queries")
        .add_query_param("dashboard_id", 5)
        .await
        .json::<Value>();
    assert_eq!(body["meta"]["count"], 1);
    let row = &body["data"][0];
    assert_eq!((row["dashboard_id"].clone(), row["query_id"].clone(), row["position"].clone()), (json!(5), json!(7), json!(1)));
}

#[tokio::test]
async fn update_keeps_key() {
    let server = server().await;
    let created = server
        .post("/api/v1/buildings")
        .json(&json!({ "customer_id": 3, "building_administrator_full_name": "Ann" }))
        .await
        .json::<Value>()["data"]
        .clone();
    let id = created["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/v1/buildings/{}", id))
        .json(&json!({ "building_administrator_full_name": "Bob" }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Value>()["data"].clone();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["customer_id"], 3);
    assert_eq!(updated["building_administrator_full_name"], "Bob");

    server
        .put(&format!("/api/v1/buildings/{}", id))
        .json(&json!({ "id": id + 1 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .put("/api/v1/buildings/999")
        .json(&json!({}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn delete_then_read_is_not_found() {
    let server = server().await;
    let created = server
        .post("/api/v1/interventions")
        .json(&json!({ "status": "Pending", "result": "Incomplete" }))
        .await
        .json::<Value>()["data"]
        .clone();
    let path = format!("/api/v1/interventions/{}", created["id"]);

    server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    let response = server.get(&path).await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
    server.delete(&path).await.assert_status_not_found();
}

#[tokio::test]
async fn list_returns_exactly_the_remaining_rows() {
    let server = server().await;
    let mut ids = Vec::new();
    for name in ["a", "b", "c", "d"] {
        let body = server
            .post("/api/v1/customers")
            .json(&json!({ "company_name": name }))
            .await
            .json::<Value>();
        ids.push(body["data"]["id"].as_i64().unwrap());
    }
    server
        .delete(&format!("/api/v1/customers/{}", ids[1]))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body = server.get("/api/v1/customers").await.json::<Value>();
    let listed: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[0], ids[2], ids[3]]);

    let page = server
        .get("/api/v1/customers")
        .add_query_param("limit", 1)
        .add_query_param("offset", 1)
        .await
        .json::<Value>();
    assert_eq!(page["data"][0]["id"], ids[2]);
}

#[tokio::test]
async fn missing_required_field_is_unprocessable() {
    let server = server().await;
    let response = server.post("/api/v1/users").json(&json!({ "email": "a@b.com" })).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");

    server
        .post("/api/v1/users")
        .json(&json!({ "email": "a@b.com", "encrypted_password": 5 }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn nullable_fields_may_be_omitted() {
    let server = server().await;
    let response = server.post("/api/v1/quotes").json(&json!({})).await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["data"]["final_price"], Value::Null);
}

#[tokio::test]
async fn duplicate_natural_key_conflicts() {
    let server = server().await;
    let body = json!({ "version": "20990101000000" });
    server.post("/api/v1/schema_migrations").json(&body).await.assert_status(StatusCode::CREATED);
    let response = server.post("/api/v1/schema_migrations").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["code"], "conflict");

    server
        .get("/api/v1/schema_migrations/20990101000000")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn bulk_create_is_all_or_nothing() {
    let server = server().await;
    let response = server
        .post("/api/v1/employees/bulk")
        .json(&json!([
            { "first_name": "Ann", "last_name": "Lee", "email": "ann@example.com" },
            { "first_name": "Bob", "last_name": "Ray", "email": "bob@example.com" }
        ]))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["meta"]["count"], 2);

    server
        .post("/api/v1/employees/bulk")
        .json(&json!([{ "first_name": "Cy", "last_name": "Ng", "email": "cy@example.com" }, { "first_name": "Di" }]))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = server.get("/api/v1/employees").await.json::<Value>();
    assert_eq!(body["meta"]["count"], 2);

    server
        .post("/api/v1/employees/bulk")
        .json(&json!({ "first_name": "Ann" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_body_gets_error_envelope() {
    let server = server().await;
    let response = server
        .post("/api/v1/customers")
        .bytes(Bytes::from_static(b"{\"company_name\": "))
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "bad_request");

    let response = server
        .patch("/api/v1/customers/1")
        .bytes(Bytes::from_static(b"not json"))
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "bad_request");
}

#[tokio::test]
async fn non_json_content_type_is_unsupported() {
    let server = server().await;
    let response = server.post("/api/v1/customers").text(r#"{"company_name":"a"}"#).await;
    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(error_code(&response), "unsupported_media_type");

    let response = server.post("/api/v1/customers/bulk").text("[]").await;
    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(error_code(&response), "unsupported_media_type");
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let server = server_with_limit(64).await;
    let response = server
        .post("/api/v1/customers")
        .json(&json!({ "company_name": "x".repeat(256) }))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_code(&response), "payload_too_large");

    server
        .post("/api/v1/customers")
        .json(&json!({ "company_name": "small" }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn bad_path_key_is_bad_request() {
    let server = server().await;
    let response = server.get("/api/v1/elevators/abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "bad_request");
}

#[tokio::test]
async fn binary_fields_round_trip_as_base64() {
    let server = server().await;
    let created = server
        .post("/api/v1/leads")
        .json(&json!({ "full_name": "Ada", "email": "ada@example.com", "attached_file": "aGVsbG8=" }))
        .await
        .json::<Value>()["data"]
        .clone();
    let read = server
        .get(&format!("/api/v1/leads/{}", created["id"]))
        .await
        .json::<Value>();
    assert_eq!(read["data"]["attached_file"], "aGVsbG8=");
}

#[tokio::test]
async fn common_routes_and_docs() {
    let server = server().await;
    server.get("/health").await.assert_json(&json!({ "status": "ok" }));
    server.get("/ready").await.assert_status_ok();
    assert_eq!(server.get("/version").await.json::<Value>()["name"], "liftops");

    let doc = server.get("/openapi.json").await.json::<Value>();
    assert!(doc["paths"].get("/api/v1/users").is_some());
    assert!(doc["paths"].get("/api/v1/schema_migrations/{version}").is_some());
    assert!(doc["components"]["schemas"].get("Elevator").is_some());
    server.get("/docs").await.assert_status_ok();
}

//! Integration tests for the HTTP surface
//!
//! Each test builds the full router over a throwaway SQLite file and drives it
//! in-process, so no port is bound.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use car_listing_api::{
    auth::models::UserRole,
    build_router,
    cars::models::Car,
    db::Database,
    AppServices,
};
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:3000";

struct TestApp {
    router: Router,
    services: AppServices,
    db: Database,
    _db_file: NamedTempFile,
}

async fn setup() -> TestApp {
    let db_file = NamedTempFile::new().unwrap();
    let db = Database::open(db_file.path().to_str().unwrap(), 4).unwrap();
    let services = AppServices::new(db.clone(), "integration-test-secret", 4).unwrap();

    let users = &services.auth.user_store;
    users
        .create_user("root", "admin-pass", Some("root@example.com"), UserRole::Admin)
        .await
        .unwrap();
    users
        .create_user("alice", "hunter2", Some("alice@example.com"), UserRole::Customer)
        .await
        .unwrap();

    let router = build_router(&services, &[ORIGIN.to_string()]);

    TestApp {
        router,
        services,
        db,
        _db_file: db_file,
    }
}

/// Run raw SQL behind the API's back
async fn exec_sql(app: &TestApp, sql: &'static str) {
    app.db
        .run(move |conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
        .await
        .unwrap();
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

fn civic() -> Value {
    json!({
        "car_name": "Civic",
        "car_description": "Compact sedan",
        "brand": "Honda",
        "price": 21000,
        "year": 2020,
        "stocks": 4,
        "car_image": "https://img.example.com/civic.png"
    })
}

async fn add_car(app: &TestApp, token: &str, car: Value) -> i64 {
    let (status, body) = send(app, Method::POST, "/addcar", Some(token), Some(car)).await;
    assert_eq!(status, StatusCode::CREATED, "add failed: {}", body);
    body["id"].as_i64().unwrap()
}

async fn all_cars(app: &TestApp) -> Vec<Car> {
    let (status, body) = send(app, Method::GET, "/allcars", None, None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_login_returns_token_and_sanitized_user() {
    let app = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "hunter2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "customer");
    assert!(body["user"].get("password").is_none());

    let claims = app
        .services
        .auth
        .jwt_handler
        .validate_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(json!(claims.user_id), body["user"]["userId"]);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, UserRole::Customer);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_field_was_wrong() {
    let app = setup().await;

    let wrong_password = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    let unknown_user = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "mallory", "password": "hunter2" })),
    )
    .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password.1["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_requires_username_and_password() {
    let app = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password required");

    let (status, _) = send(&app, Method::POST, "/login", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_is_public() {
    let app = setup().await;
    assert!(all_cars(&app).await.is_empty());
}

#[tokio::test]
async fn test_mutations_require_bearer_token() {
    let app = setup().await;

    let (status, body) = send(&app, Method::POST, "/addcar", None, Some(civic())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/deletecar/1")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid Authorization format");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/editcar/1",
        Some("not.a.token"),
        Some(json!({ "price": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid/Expired token");
}

#[tokio::test]
async fn test_token_from_another_secret_is_rejected() {
    let app = setup().await;
    let other = car_listing_api::auth::JwtHandler::new("some-other-secret");
    let user = app
        .services
        .auth
        .user_store
        .get_user_by_username("root")
        .await
        .unwrap()
        .unwrap();
    let forged = other.generate_token(&user).unwrap();

    let (status, _) = send(&app, Method::POST, "/addcar", Some(&forged), Some(civic())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(all_cars(&app).await.is_empty());
}

#[tokio::test]
async fn test_customer_cannot_mutate_cars() {
    let app = setup().await;
    let customer = login(&app, "alice", "hunter2").await;

    let (status, body) = send(&app, Method::POST, "/addcar", Some(&customer), Some(civic())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Admin role required.");

    let (status, _) = send(&app, Method::DELETE, "/deletecar/1", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_adds_car() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;

    let (status, body) = send(&app, Method::POST, "/addcar", Some(&admin), Some(civic())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Car Civic added successfully");

    let cars = all_cars(&app).await;
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].id, body["id"].as_i64().unwrap());
    assert_eq!(cars[0].brand.as_deref(), Some("Honda"));
    assert_eq!(cars[0].price, Some(21000.0));
}

#[tokio::test]
async fn test_incomplete_car_is_rejected() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/addcar",
        Some(&admin),
        Some(json!({ "car_name": "Civic", "brand": "Honda" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Missing required fields: car_description, price, year, stocks, car_image"
    );
    assert!(all_cars(&app).await.is_empty());
}

#[tokio::test]
async fn test_partial_update_changes_only_supplied_fields() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    let id = add_car(&app, &admin, civic()).await;
    let before = all_cars(&app).await.remove(0);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/editcar/{}", id),
        Some(&admin),
        Some(json!({ "price": 25000 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": format!("Car id {} updated successfully", id) }));

    let after = all_cars(&app).await.remove(0);
    assert_eq!(
        after,
        Car {
            price: Some(25000.0),
            ..before
        }
    );
}

#[tokio::test]
async fn test_null_field_keeps_stored_value() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    let id = add_car(&app, &admin, civic()).await;
    let before = all_cars(&app).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/editcar/{}", id),
        Some(&admin),
        Some(json!({ "brand": null })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(all_cars(&app).await, before);
}

#[tokio::test]
async fn test_empty_update_is_rejected_and_row_unchanged() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    let id = add_car(&app, &admin, civic()).await;
    let before = all_cars(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/editcar/{}", id),
        Some(&admin),
        Some(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Nothing to update");
    assert_eq!(all_cars(&app).await, before);
}

#[tokio::test]
async fn test_update_unknown_car_is_not_found() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/editcar/999",
        Some(&admin),
        Some(json!({ "stocks": 2 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Car not found");
}

#[tokio::test]
async fn test_delete_car() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    let id = add_car(&app, &admin, civic()).await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/deletecar/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affectedRows"], 1);
    assert!(all_cars(&app).await.is_empty());

    let (status, body) = send(&app, Method::DELETE, "/deletecar/999", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Car not found");
}

#[tokio::test]
async fn test_me_reports_token_identity() {
    let app = setup().await;
    let customer = login(&app, "alice", "hunter2").await;

    let (status, body) = send(&app, Method::GET, "/me", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "customer");

    let (status, _) = send(&app, Method::GET, "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cors_preflight_for_allowed_origin() {
    let app = setup().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/addcar")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ORIGIN
    );

    let request = Request::builder()
        .method(Method::GET)
        .uri("/allcars")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_listing_returns_rows_with_null_columns() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    let id = add_car(&app, &admin, civic()).await;
    exec_sql(
        &app,
        "INSERT INTO cars (car_name, brand, price, year, stocks) VALUES ('Beetle', 'VW', 9000, 1972, 1)",
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/allcars", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let cars = body.as_array().unwrap();
    assert_eq!(cars.len(), 2);
    assert_eq!(cars[0]["id"], id);
    assert_eq!(cars[0]["car_name"], "Civic");
    assert_eq!(cars[1]["car_name"], "Beetle");
    assert_eq!(cars[1]["car_description"], Value::Null);
    assert_eq!(cars[1]["car_image"], Value::Null);
}

#[tokio::test]
async fn test_update_with_wrongly_typed_field_names_the_problem() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    let id = add_car(&app, &admin, civic()).await;
    let before = all_cars(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/editcar/{}", id),
        Some(&admin),
        Some(json!({ "price": "cheap", "brand": "Ford" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid request body"), "{}", message);
    assert!(message.contains("price"), "{}", message);
    assert_eq!(all_cars(&app).await, before);
}

#[tokio::test]
async fn test_add_with_wrongly_typed_field_is_not_reported_as_missing() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;

    let mut car = civic();
    car["year"] = json!("twenty-twenty");
    let (status, body) = send(&app, Method::POST, "/addcar", Some(&admin), Some(car)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid request body"), "{}", message);
    assert!(message.contains("year"), "{}", message);
    assert!(all_cars(&app).await.is_empty());
}

#[tokio::test]
async fn test_malformed_json_body_is_rejected() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/editcar/1")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"price": 25000"#))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_update_without_json_body_is_nothing_to_update() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    let id = add_car(&app, &admin, civic()).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/editcar/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Nothing to update");
}

fn assert_generic_server_error(status: StatusCode, body: &Value, key: &str, expected: &str) {
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body[key], expected);
    assert_eq!(body.as_object().unwrap().len(), 1, "{}", body);
    assert!(!body.to_string().contains("no such table"));
}

#[tokio::test]
async fn test_car_store_faults_become_generic_500s() {
    let app = setup().await;
    let admin = login(&app, "root", "admin-pass").await;
    exec_sql(&app, "DROP TABLE cars").await;

    let (status, body) = send(&app, Method::GET, "/allcars", None, None).await;
    assert_generic_server_error(status, &body, "message", "Server error for allcars");

    let (status, body) = send(&app, Method::POST, "/addcar", Some(&admin), Some(civic())).await;
    assert_generic_server_error(
        status,
        &body,
        "message",
        "Server error - could not add car Civic",
    );

    let (status, body) = send(
        &app,
        Method::PUT,
        "/editcar/7",
        Some(&admin),
        Some(json!({ "stocks": 2 })),
    )
    .await;
    assert_generic_server_error(
        status,
        &body,
        "message",
        "Server error - could not update car id 7",
    );

    let (status, body) = send(&app, Method::DELETE, "/deletecar/7", Some(&admin), None).await;
    assert_generic_server_error(status, &body, "message", "Server error for deletecar");
}

#[tokio::test]
async fn test_credential_store_fault_becomes_generic_500() {
    let app = setup().await;
    exec_sql(&app, "DROP TABLE users").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "hunter2" })),
    )
    .await;
    assert_generic_server_error(status, &body, "error", "Server error during login");
}

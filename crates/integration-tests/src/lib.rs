//! End-to-end tests for the Storedesk API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database, migrate, and run the server
//! sd-cli migrate
//! cargo run -p storedesk-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p storedesk-integration-tests -- --ignored
//! ```
//!
//! Tests create their own records with unique emails, so they can run
//! against a database that already holds seed data. A few tests insert rows
//! directly, using `STOREDESK_DATABASE_URL` (or `DATABASE_URL`).
//!
//! This crate holds the shared helpers; the tests live in `tests/`.

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use uuid::Uuid;

use storedesk_api::db::{self, StaffRepository};
use storedesk_api::models::NewStaff;
use storedesk_core::{ActivityStatus, Email, StaffRole};

/// Base URL of the running API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREDESK_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Full URL for an `/api` path.
#[must_use]
pub fn api(path: &str) -> String {
    format!("{}/api{path}", base_url())
}

/// A JSON client.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email so reruns never collide.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@store.test", Uuid::new_v4().simple())
}

/// Read a JSON body.
pub async fn json_body(resp: Response) -> Value {
    resp.json().await.expect("Failed to parse JSON body")
}

/// Assert a 422 that names `field`.
pub async fn assert_field_error(resp: Response, field: &str) {
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert!(
        body["errors"][field].is_array(),
        "expected error on {field}, got {body}"
    );
}

/// Create a store and return its JSON.
pub async fn create_store(client: &Client, name: &str, address: &str) -> Value {
    let resp = client
        .post(api("/stores"))
        .json(&json!({
            "name": name,
            "address": address,
            "phone": "+1-555-0199",
            "email": unique_email("store"),
            "status": "active",
        }))
        .send()
        .await
        .expect("Failed to create store");

    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await
}

/// Create a staff member with a login and return its JSON.
///
/// `collection` is `store-managers` or `store-representatives`.
pub async fn create_staff(
    client: &Client,
    collection: &str,
    store_id: &str,
    email: &str,
    password: &str,
) -> Value {
    let resp = client
        .post(api(&format!("/{collection}")))
        .json(&json!({
            "name": "Test Staff",
            "email": email,
            "phone": "+1-555-3001",
            "storeId": store_id,
            "status": "active",
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to create staff member");

    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await
}

/// Log in and return the login response.
pub async fn login(client: &Client, email: &str, password: &str) -> Value {
    let resp = client
        .post(api("/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::OK);
    json_body(resp).await
}

/// The string `id` of a created resource.
#[must_use]
pub fn id_of(value: &Value) -> String {
    value["id"]
        .as_str()
        .expect("resource id should be a string")
        .to_string()
}

/// Database the running API uses.
fn database_url() -> SecretString {
    std::env::var("STOREDESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| "postgres://localhost/storedesk".to_string())
        .into()
}

/// Insert a staff record with no login credential and return its ID.
///
/// The API only creates staff together with a credential, so this goes
/// straight to the database, the same way seeding does.
pub async fn create_unlinked_staff(role: StaffRole, store_id: &str, email: &str) -> String {
    let pool = db::create_pool(&database_url())
        .await
        .expect("Failed to connect to database");

    let staff = NewStaff {
        name: "Unlinked Staff".to_string(),
        email: Email::parse(email).expect("test email should be valid"),
        phone: "+1-555-3009".to_string(),
        store_id: store_id.parse().expect("store id should be numeric"),
        status: ActivityStatus::Active,
    };

    let member = StaffRepository::new(&pool, role)
        .create_unlinked(&staff)
        .await
        .expect("Failed to insert staff record");

    member.id.to_string()
}

//! Login, logout, `/me` and the admin passcode gate.
//!
//! These tests require a running `storedesk-api` server.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::json;
use storedesk_integration_tests::{
    api, client, create_staff, create_store, id_of, json_body, login, unique_email,
};

#[tokio::test]
#[ignore = "Requires running storedesk-api server"]
async fn test_wrong_password_is_rejected() {
    let client = client();
    let store_id = id_of(&create_store(&client, "Auth Store", "12 Login Lane").await);
    let email = unique_email("wrongpw");
    create_staff(&client, "store-representatives", &store_id, &email, "password123").await;

    for (email, password) in [(email.as_str(), "password124"), ("nobody@store.test", "password123")]
    {
        let resp = client
            .post(api("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(resp).await,
            json!({ "message": "The provided credentials are incorrect." })
        );
    }
}

#[tokio::test]
#[ignore = "Requires running storedesk-api server"]
async fn test_user_without_staff_record_has_no_role() {
    let client = client();
    let store_id = id_of(&create_store(&client, "Roleless Store", "14 Login Lane").await);
    let email = unique_email("roleless");
    let rep = create_staff(
        &client,
        "store-representatives",
        &store_id,
        &email,
        "password123",
    )
    .await;

    // Deleting the staff record keeps the credential.
    client
        .delete(api(&format!("/store-representatives/{}", id_of(&rep))))
        .send()
        .await
        .unwrap();

    let session = login(&client, &email, "password123").await;
    assert_eq!(session["user"]["role"], serde_json::Value::Null);
    assert_eq!(session["user"]["roleId"], serde_json::Value::Null);
}

#[tokio::test]
#[ignore = "Requires running storedesk-api server"]
async fn test_logout_revokes_only_presented_token() {
    let client = client();
    let store_id = id_of(&create_store(&client, "Logout Store", "15 Login Lane").await);
    let email = unique_email("logout");
    create_staff(&client, "store-managers", &store_id, &email, "password123").await;

    let first = login(&client, &email, "password123").await;
    let second = login(&client, &email, "password123").await;
    let first = first["token"].as_str().unwrap();
    let second = second["token"].as_str().unwrap();

    let resp = client
        .get(api("/me"))
        .bearer_auth(first)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["user"]["email"], email.as_str());

    let resp = client
        .post(api("/logout"))
        .bearer_auth(first)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!({ "message": "Logged out successfully" })
    );

    let resp = client
        .get(api("/me"))
        .bearer_auth(first)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(api("/me"))
        .bearer_auth(second)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storedesk-api server"]
async fn test_passcode_is_required() {
    let resp = client()
        .post(api("/admin/verify-passcode"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(resp).await,
        json!({ "success": false, "message": "Passcode is required." })
    );
}

#[tokio::test]
#[ignore = "Requires running storedesk-api server"]
async fn test_health_endpoints() {
    let client = client();
    let base = storedesk_integration_tests::base_url();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

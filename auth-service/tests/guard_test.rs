mod common;

use common::{find_user_id, unique_email, TestApp, TEST_API_KEY};
use mongodb::bson::oid::ObjectId;

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn missing_or_unknown_api_key_is_forbidden() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .post(app.url("/auth/login/basic"))
        .json(&serde_json::json!({ "email": "a@b.com", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 403);

    let res = app
        .client
        .post(app.url("/auth/login/basic"))
        .header("x-api-key", "no-such-key")
        .json(&serde_json::json!({ "email": "a@b.com", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 403);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Permission denied");

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn api_key_permissions_must_cover_the_route() {
    let app = TestApp::spawn().await;

    // A key that exists but grants a different permission
    app.db
        .insert_api_key(&auth_service::models::ApiKey::new(
            "narrow-key".to_string(),
            1,
            vec!["REPORTS".to_string()],
            vec![],
        ))
        .await
        .unwrap();

    let res = app
        .client
        .post(app.url("/auth/login/basic"))
        .header("x-api-key", "narrow-key")
        .json(&serde_json::json!({ "email": "a@b.com", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 403);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn api_key_check_runs_before_the_access_guard() {
    let app = TestApp::spawn().await;

    // Bad api key and bad bearer together: the permission failure wins
    let res = app
        .client
        .get(app.url("/profile/my"))
        .header("x-api-key", "no-such-key")
        .header("authorization", "Bearer garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 403);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn expired_access_token_points_at_refresh() {
    let app = TestApp::spawn().await;
    let body = app.signup(&unique_email("expiredaccess"), "secret123").await;
    let user_id = find_user_id(&body);

    let prm = app
        .jwt
        .decode_unverified(body["tokens"]["access_token"].as_str().unwrap())
        .unwrap()
        .prm;
    let expired = app.mint_token(&user_id, &prm, -120);

    let res = app
        .client
        .get(app.url("/profile/my"))
        .header("x-api-key", TEST_API_KEY)
        .header("authorization", format!("Bearer {}", expired))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(
        res.headers().get("instruction").map(|v| v.to_str().unwrap()),
        Some("refresh_token")
    );

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn garbage_bearer_token_points_at_logout() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .get(app.url("/profile/my"))
        .header("x-api-key", TEST_API_KEY)
        .header("authorization", "Bearer not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(
        res.headers().get("instruction").map(|v| v.to_str().unwrap()),
        Some("logout")
    );

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn token_for_an_unknown_user_is_rejected() {
    let app = TestApp::spawn().await;

    // Validly signed, but the subject does not exist
    let ghost = ObjectId::new().to_hex();
    let token = app.mint_token(&ghost, "some-session-key", 3600);

    let res = app
        .client
        .get(app.url("/profile/my"))
        .header("x-api-key", TEST_API_KEY)
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn token_with_wrong_issuer_is_rejected() {
    let app = TestApp::spawn().await;
    let body = app.signup(&unique_email("issuer"), "secret123").await;
    let user_id = find_user_id(&body);

    let prm = app
        .jwt
        .decode_unverified(body["tokens"]["access_token"].as_str().unwrap())
        .unwrap()
        .prm;

    let payload = auth_service::services::TokenPayload::new(
        "some-other-issuer",
        common::TEST_AUDIENCE,
        &user_id,
        &prm,
        3600,
    );
    let token = app.jwt.sign(&payload).unwrap();

    let res = app
        .client
        .get(app.url("/profile/my"))
        .header("x-api-key", TEST_API_KEY)
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);

    app.cleanup().await;
}

mod common;

use common::{find_user_id, unique_email, TestApp, TEST_API_KEY};
use serde_json::json;

async fn refresh(app: &TestApp, access: &str, refresh: &str) -> reqwest::Response {
    app.client
        .post(app.url("/auth/token/refresh"))
        .header("x-api-key", TEST_API_KEY)
        .header("authorization", format!("Bearer {}", access))
        .json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .expect("refresh request failed")
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn refresh_rotates_the_token_pair() {
    let app = TestApp::spawn().await;
    let body = app.signup(&unique_email("rotate"), "secret123").await;
    let access = body["tokens"]["access_token"].as_str().unwrap();
    let refresh_token = body["tokens"]["refresh_token"].as_str().unwrap();

    let res = refresh(&app, access, refresh_token).await;
    assert_eq!(res.status().as_u16(), 200);
    let new_tokens: serde_json::Value = res.json().await.unwrap();

    assert_ne!(new_tokens["access_token"].as_str().unwrap(), access);
    assert_ne!(new_tokens["refresh_token"].as_str().unwrap(), refresh_token);

    // The new pair works against protected routes
    let res = app
        .client
        .get(app.url("/profile/my"))
        .header("x-api-key", TEST_API_KEY)
        .header(
            "authorization",
            format!("Bearer {}", new_tokens["access_token"].as_str().unwrap()),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn spent_pair_cannot_refresh_again() {
    let app = TestApp::spawn().await;
    let body = app.signup(&unique_email("spent"), "secret123").await;
    let access = body["tokens"]["access_token"].as_str().unwrap();
    let refresh_token = body["tokens"]["refresh_token"].as_str().unwrap();

    assert_eq!(refresh(&app, access, refresh_token).await.status().as_u16(), 200);

    // Same pair a second time: the keystore record is gone
    let res = refresh(&app, access, refresh_token).await;
    assert_eq!(res.status().as_u16(), 401);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn refresh_accepts_an_expired_access_token() {
    let app = TestApp::spawn().await;
    let body = app.signup(&unique_email("expired"), "secret123").await;
    let user_id = find_user_id(&body);
    let refresh_token = body["tokens"]["refresh_token"].as_str().unwrap();

    // Mint an already-expired access token bound to the same session
    let keystore = app
        .db
        .find_keystore_by_pair(
            mongodb::bson::oid::ObjectId::parse_str(&user_id).unwrap(),
            app.jwt
                .decode_unverified(body["tokens"]["access_token"].as_str().unwrap())
                .unwrap()
                .prm
                .as_str(),
            app.jwt.decode_unverified(refresh_token).unwrap().prm.as_str(),
        )
        .await
        .unwrap()
        .expect("session record exists");

    let expired_access = app.mint_token(&user_id, &keystore.primary_key, -120);

    let res = refresh(&app, &expired_access, refresh_token).await;
    assert_eq!(res.status().as_u16(), 200);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn mismatched_pair_is_rejected() {
    let app = TestApp::spawn().await;
    let email = unique_email("mismatch");
    let first = app.signup(&email, "secret123").await;

    let second: serde_json::Value = app
        .post_json(
            "/auth/login/basic",
            json!({ "email": email, "password": "secret123" }),
        )
        .await
        .json()
        .await
        .unwrap();

    // Access from one session, refresh from another
    let res = refresh(
        &app,
        first["tokens"]["access_token"].as_str().unwrap(),
        second["tokens"]["refresh_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 401);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn forged_subject_cannot_steal_a_session() {
    let app = TestApp::spawn().await;
    let victim = app.signup(&unique_email("victim"), "secret123").await;
    let attacker = app.signup(&unique_email("attacker"), "secret123").await;

    let victim_prm = app
        .jwt
        .decode_unverified(victim["tokens"]["access_token"].as_str().unwrap())
        .unwrap()
        .prm;

    // Attacker-signed access token naming the victim's subject and
    // session key, paired with the attacker's own refresh token. The
    // exact-pair lookup fails because no record joins the two sessions.
    let forged_access = app.mint_token(&find_user_id(&victim), &victim_prm, 3600);
    let res = refresh(
        &app,
        &forged_access,
        attacker["tokens"]["refresh_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 401);

    // The victim's session is untouched
    let res = app
        .client
        .get(app.url("/profile/my"))
        .header("x-api-key", TEST_API_KEY)
        .header(
            "authorization",
            format!("Bearer {}", victim["tokens"]["access_token"].as_str().unwrap()),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn expired_refresh_token_asks_for_relogin() {
    let app = TestApp::spawn().await;
    let body = app.signup(&unique_email("stale"), "secret123").await;
    let user_id = find_user_id(&body);
    let access = body["tokens"]["access_token"].as_str().unwrap();

    let refresh_prm = app
        .jwt
        .decode_unverified(body["tokens"]["refresh_token"].as_str().unwrap())
        .unwrap()
        .prm;
    let expired_refresh = app.mint_token(&user_id, &refresh_prm, -120);

    let res = refresh(&app, access, &expired_refresh).await;
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(
        res.headers().get("instruction").map(|v| v.to_str().unwrap()),
        Some("refresh_token")
    );

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn concurrent_refreshes_of_one_pair_yield_one_winner() {
    let app = TestApp::spawn().await;
    let body = app.signup(&unique_email("race"), "secret123").await;
    let access = body["tokens"]["access_token"].as_str().unwrap().to_string();
    let refresh_token = body["tokens"]["refresh_token"].as_str().unwrap().to_string();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let url = app.url("/auth/token/refresh");
        let client = app.client.clone();
        let access = access.clone();
        let refresh_token = refresh_token.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .header("x-api-key", TEST_API_KEY)
                .header("authorization", format!("Bearer {}", access))
                .json(&json!({ "refresh_token": refresh_token }))
                .send()
                .await
                .map(|r| r.status().as_u16())
                .unwrap_or(0)
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() == 200 {
            successes += 1;
        }
    }

    // Losers fail closed; nobody retries on their behalf
    assert_eq!(successes, 1);

    app.cleanup().await;
}

mod common;

use common::TestApp;

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn health_check_reports_healthy() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("health request failed");

    assert_eq!(res.status().as_u16(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn health_check_needs_no_api_key() {
    let app = TestApp::spawn().await;

    // No x-api-key header at all
    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);

    app.cleanup().await;
}

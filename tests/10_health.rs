mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn health_reports_ok_when_backend_answers() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let res = gateway.client.get(gateway.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["backend"], "ok");
    assert!(body["data"]["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_is_degraded_when_backend_is_down() -> Result<()> {
    let gateway = common::spawn_gateway_unreachable().await?;

    let res = gateway.client.get(gateway.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn health_skips_the_edge_interceptor() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    // An expired session on /health must not trigger a refresh
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(gateway.backend())
        .await;

    let cookies = format!("access_token={}; refresh_token=r1", common::expired_token("1"));
    let res = gateway.get_with_cookies("/health", &cookies).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(common::set_cookies(&res).is_empty());
    Ok(())
}

mod common;

use anyhow::Result;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn forwards_with_bearer_and_query() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    let access = common::fresh_token("42");

    Mock::given(method("GET"))
        .and(path("/tables/users"))
        .and(query_param("page", "2"))
        .and(header("authorization", format!("Bearer {}", access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [{ "id": 1 }] })))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let res = gateway
        .get_with_cookies("/api/tables/users?page=2", &format!("access_token={}; refresh_token=r1", access))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(common::set_cookies(&res).is_empty());
    assert!(res.headers()[CONTENT_TYPE].to_str()?.starts_with("application/json"));

    let body: Value = res.json().await?;
    assert_eq!(body["data"][0]["id"], 1);
    Ok(())
}

#[tokio::test]
async fn forwards_method_and_body_verbatim() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    Mock::given(method("PATCH"))
        .and(path("/tables/users/7"))
        .and(header("authorization", "Bearer a1"))
        .and(header("if-match", "\"v3\""))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({ "email": "new@example.com" })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "updated": true })))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let res = gateway
        .client
        .patch(gateway.url("/api/tables/users/7"))
        .header("cookie", "access_token=a1; refresh_token=r1")
        .header("if-match", "\"v3\"")
        .header("prefer", "return=representation")
        .json(&json!({ "email": "new@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await?;
    assert_eq!(body["updated"], true);

    // Session cookies stay at the gateway
    let received = gateway.backend().received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("cookie"));
    Ok(())
}

#[tokio::test]
async fn downstream_errors_pass_through_untouched() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    Mock::given(method("DELETE"))
        .and(path("/tables/users/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "no such record" })))
        .mount(gateway.backend())
        .await;

    let res = gateway
        .client
        .delete(gateway.url("/api/tables/users/7"))
        .header("cookie", "access_token=a1; refresh_token=r1")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(common::set_cookies(&res).is_empty());
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "no such record");
    Ok(())
}

#[tokio::test]
async fn retries_once_after_transparent_refresh() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    Mock::given(method("GET"))
        .and(path("/tables/users"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(gateway.backend())
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/users"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(gateway.backend())
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "new", "refreshToken": "r2" })))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let res = gateway
        .get_with_cookies("/api/tables/users", "access_token=old; refresh_token=r1")
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-auth-redirect").is_none());
    assert_eq!(common::cookie_value(&res, "access_token").as_deref(), Some("new"));
    assert_eq!(common::cookie_value(&res, "refresh_token").as_deref(), Some("r2"));
    Ok(())
}

#[tokio::test]
async fn second_401_is_terminal_and_signals_auth_redirect() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    Mock::given(method("GET"))
        .and(path("/tables/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(gateway.backend())
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "new", "refreshToken": "r2" })))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let res = gateway
        .get_with_cookies("/api/tables/users", "access_token=old; refresh_token=r1")
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["x-auth-redirect"], "true");
    assert!(common::location(&res).is_none());
    assert!(common::clears_cookie(&res, "access_token"));
    assert!(common::clears_cookie(&res, "refresh_token"));
    Ok(())
}

#[tokio::test]
async fn rejected_refresh_signals_auth_redirect() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    Mock::given(method("GET"))
        .and(path("/tables/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(gateway.backend())
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let res = gateway
        .get_with_cookies("/api/tables/users", "access_token=old; refresh_token=revoked")
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["x-auth-redirect"], "true");
    assert!(common::clears_cookie(&res, "refresh_token"));
    Ok(())
}

#[tokio::test]
async fn without_refresh_token_a_401_is_terminal() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    Mock::given(method("GET"))
        .and(path("/tables/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(gateway.backend())
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(gateway.backend())
        .await;

    let res = gateway.get_with_cookies("/api/tables/users", "access_token=old").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["x-auth-redirect"], "true");
    assert!(common::clears_cookie(&res, "access_token"));

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_service_unavailable() -> Result<()> {
    let gateway = common::spawn_gateway_unreachable().await?;

    let res = gateway
        .get_with_cookies("/api/tables/users", "access_token=a1; refresh_token=r1")
        .await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(res.headers().get("x-auth-redirect").is_none());
    assert!(common::set_cookies(&res).is_empty());

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

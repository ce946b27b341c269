mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn protected_path_without_cookies_redirects_to_login_with_callback() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    let res = gateway.get_with_cookies("/dashboard/tables?page=2", "").await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        common::location(&res).as_deref(),
        Some("/login?callbackUrl=%2Fdashboard%2Ftables%3Fpage%3D2")
    );

    let received = gateway.backend().received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "backend should not be contacted");
    Ok(())
}

#[tokio::test]
async fn root_without_cookies_goes_to_login() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    let res = gateway.get_with_cookies("/", "").await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&res).as_deref(), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn public_auth_page_renders_without_cookies() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    let res = gateway.get_with_cookies("/login?callbackUrl=%2Fdashboard%2Fusers", "").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let page = res.text().await?;
    assert!(page.contains("Sign in"));
    assert!(page.contains(r#"data-callback="/dashboard/users""#));
    Ok(())
}

#[tokio::test]
async fn login_page_ignores_foreign_callback() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    let res = gateway.get_with_cookies("/login?callbackUrl=https%3A%2F%2Fevil.example", "").await?;
    let page = res.text().await?;
    assert!(page.contains(r#"data-callback="/dashboard""#));
    assert!(!page.contains("evil.example"));
    Ok(())
}

#[tokio::test]
async fn authenticated_user_on_login_goes_to_landing_without_refresh() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(gateway.backend())
        .await;

    // Even an expired access token counts: tokens exist
    let cookies = format!("access_token={}; refresh_token=r1", common::expired_token("1"));
    let res = gateway.get_with_cookies("/login", &cookies).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&res).as_deref(), Some("/dashboard"));
    assert!(common::set_cookies(&res).is_empty());
    Ok(())
}

#[tokio::test]
async fn expired_access_with_valid_refresh_rotates_and_reloads_target() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    let new_access = common::fresh_token("42");

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": new_access,
            "refreshToken": "r2"
        })))
        .expect(1)
        .mount(gateway.backend())
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", format!("Bearer {}", new_access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::user_json("ada@example.com")))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let cookies = format!("access_token={}; refresh_token=r1", common::expired_token("42"));
    let res = gateway.get_with_cookies("/dashboard/tables", &cookies).await?;

    // Exactly one redirect, back to the same URL, carrying the new pair
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&res).as_deref(), Some("/dashboard/tables"));
    assert_eq!(common::cookie_value(&res, "access_token").as_deref(), Some(new_access.as_str()));
    assert_eq!(common::cookie_value(&res, "refresh_token").as_deref(), Some("r2"));

    let res = gateway.get_with_cookies("/dashboard/tables", &common::cookie_header(&res)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await?.contains("ada@example.com"));
    Ok(())
}

#[tokio::test]
async fn invalid_refresh_clears_cookies_and_redirects_to_login() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid refresh token" })))
        .expect(1)
        .mount(gateway.backend())
        .await;

    let cookies = format!("access_token={}; refresh_token=revoked", common::expired_token("1"));
    let res = gateway.get_with_cookies("/dashboard", &cookies).await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&res).as_deref(), Some("/login?callbackUrl=%2Fdashboard"));
    assert!(common::clears_cookie(&res, "access_token"));
    assert!(common::clears_cookie(&res, "refresh_token"));
    Ok(())
}

#[tokio::test]
async fn malformed_refresh_response_counts_as_failure() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": {} })))
        .mount(gateway.backend())
        .await;

    let res = gateway.get_with_cookies("/dashboard", "refresh_token=r1").await?;
    assert_eq!(common::location(&res).as_deref(), Some("/login?callbackUrl=%2Fdashboard"));
    assert!(common::clears_cookie(&res, "access_token"));
    assert!(common::clears_cookie(&res, "refresh_token"));
    Ok(())
}

#[tokio::test]
async fn cookies_are_http_only_lax_and_root_scoped() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": common::fresh_token("1"),
            "refreshToken": "r2"
        })))
        .mount(gateway.backend())
        .await;

    let res = gateway.get_with_cookies("/dashboard", "refresh_token=r1").await?;
    for name in ["access_token", "refresh_token"] {
        let cookie = common::set_cookie(&res, name).expect("cookie written");
        assert!(cookie.contains("HttpOnly"), "{}", cookie);
        assert!(cookie.contains("SameSite=Lax"), "{}", cookie);
        assert!(cookie.contains("Path=/"), "{}", cookie);
        // Development preset
        assert!(!cookie.contains("Secure"), "{}", cookie);
    }
    Ok(())
}

#[tokio::test]
async fn stale_access_without_refresh_ends_on_login_page() -> Result<()> {
    let gateway = common::spawn_gateway().await?;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(gateway.backend())
        .await;

    let mut cookies = format!("access_token={}", common::expired_token("1"));
    let mut target = "/dashboard".to_string();
    let mut hops = Vec::new();

    let page = loop {
        assert!(hops.len() < 5, "redirect chain did not settle: {:?}", hops);
        let res = gateway.get_with_cookies(&target, &cookies).await?;
        if common::clears_cookie(&res, "access_token") {
            cookies.clear();
        }
        match common::location(&res) {
            Some(next) => {
                assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
                hops.push(next.clone());
                target = next;
            }
            None => {
                assert_eq!(res.status(), StatusCode::OK);
                break res.text().await?;
            }
        }
    };

    assert_eq!(hops, vec!["/login?callbackUrl=%2Fdashboard".to_string()]);
    assert!(cookies.is_empty(), "stale access cookie should have been expired");
    assert!(page.contains("Sign in"));
    Ok(())
}

#[tokio::test]
async fn stale_access_without_refresh_on_login_renders_and_clears() -> Result<()> {
    let gateway = common::spawn_gateway().await?;

    let cookies = format!("access_token={}", common::expired_token("1"));
    let res = gateway.get_with_cookies("/login", &cookies).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(common::clears_cookie(&res, "access_token"));
    assert!(res.text().await?.contains("Sign in"));
    Ok(())
}

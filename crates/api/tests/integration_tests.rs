// Integration tests for the hardhat server
// Run with: cargo test -p api --test integration_tests

use anyhow::Result;
use axum::http::{Request, Response, StatusCode};
use axum::body::Body;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

mod helpers {
    use super::*;
    use hh_core::config::AppConfig;
    use std::sync::Arc;

    pub fn test_config() -> Result<AppConfig> {
        let mut cfg = AppConfig::load()?;
        let root = concat!(env!("CARGO_MANIFEST_DIR"), "/../..");
        cfg.app.public_dir = format!("{root}/public");
        cfg.app.views_dir = format!("{root}/views");
        cfg.http.force_https = false;
        cfg.http.trust_forwarded_proto = false;
        cfg.http.powered_by = "hardhat".into();
        cfg.policy.file = String::new();
        Ok(cfg)
    }

    pub fn setup_test_app() -> Result<axum::Router> {
        setup_with(test_config()?)
    }

    pub fn setup_with(cfg: AppConfig) -> Result<axum::Router> {
        Ok(api::app::build_app(Arc::new(cfg))?.router)
    }

    /// Writes `policy` to a fresh temp file and points the config at it.
    pub fn config_with_policy(policy: &str) -> Result<AppConfig> {
        let path = std::env::temp_dir().join(format!("hardhat-policy-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, policy)?;
        let mut cfg = test_config()?;
        cfg.policy.file = path.display().to_string();
        Ok(cfg)
    }

    pub async fn get(router: axum::Router, uri: &str) -> Result<Response<Body>> {
        Ok(router.oneshot(Request::builder().uri(uri).body(Body::empty())?).await?)
    }

    pub async fn post_json(router: axum::Router, uri: &str, body: Value) -> Result<Response<Body>> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?;
        Ok(router.oneshot(request).await?)
    }

    pub async fn json_body(response: Response<Body>) -> Result<Value> {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

use helpers::*;

#[tokio::test]
async fn test_index_with_default_policy() -> Result<()> {
    let response = get(setup_test_app()?, "/").await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-content-type-options"), Some("nosniff"));
    assert_eq!(header(&response, "x-download-options"), Some("noopen"));
    assert_eq!(header(&response, "x-frame-options"), Some("SAMEORIGIN"));
    assert_eq!(header(&response, "x-xss-protection"), Some("1; mode=block"));
    assert_eq!(header(&response, "x-dns-prefetch-control"), Some("off"));
    assert!(header(&response, "x-powered-by").is_none());
    assert!(header(&response, "strict-transport-security").is_none());
    assert!(header(&response, "content-security-policy").is_none());
    assert!(header(&response, "x-request-id").is_some());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert!(String::from_utf8(body.to_vec())?.contains("<h1>hardhat</h1>"));
    Ok(())
}

#[tokio::test]
async fn test_static_files_and_misses_get_policy_headers() -> Result<()> {
    let router = setup_test_app()?;

    let response = get(router.clone(), "/style.css").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-content-type-options"), Some("nosniff"));

    let missing = get(router, "/no-such-file.txt").await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&missing, "x-content-type-options"), Some("nosniff"));
    Ok(())
}

#[tokio::test]
async fn test_powered_by_is_advertised_without_policy_rule() -> Result<()> {
    let cfg = config_with_policy(r#"{"hidePoweredBy": false}"#)?;
    let response = get(setup_with(cfg)?, "/health").await?;
    assert_eq!(header(&response, "x-powered-by"), Some("hardhat"));
    Ok(())
}

#[tokio::test]
async fn test_hide_powered_by_replacement() -> Result<()> {
    let cfg = config_with_policy(r#"{"hidePoweredBy": {"setTo": "PHP 4.2.0"}}"#)?;
    let response = get(setup_with(cfg)?, "/health").await?;
    assert_eq!(header(&response, "x-powered-by"), Some("PHP 4.2.0"));
    Ok(())
}

#[tokio::test]
async fn test_full_policy_document() -> Result<()> {
    let policy = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/../../policy.example.json"))?;
    let cfg = config_with_policy(&policy)?;
    let response = get(setup_with(cfg)?, "/").await?;

    assert_eq!(header(&response, "x-powered-by"), Some("PHP 4.2.0"));
    assert_eq!(header(&response, "x-frame-options"), Some("DENY"));
    assert_eq!(header(&response, "strict-transport-security"), Some("max-age=7776000; includeSubDomains"));
    assert_eq!(header(&response, "x-dns-prefetch-control"), Some("off"));
    assert_eq!(header(&response, "cache-control"), Some("no-store, no-cache, must-revalidate, proxy-revalidate"));
    assert_eq!(header(&response, "pragma"), Some("no-cache"));
    assert_eq!(header(&response, "expires"), Some("0"));
    assert_eq!(
        header(&response, "content-security-policy"),
        Some("default-src 'self'; script-src 'self' trusted-cdn.com")
    );
    Ok(())
}

#[tokio::test]
async fn test_disabled_category_is_absent() -> Result<()> {
    let cfg = config_with_policy(r#"{"dnsPrefetchControl": false, "frameguard": {"action": "deny"}}"#)?;
    let response = get(setup_with(cfg)?, "/").await?;
    assert!(header(&response, "x-dns-prefetch-control").is_none());
    assert_eq!(header(&response, "x-frame-options"), Some("DENY"));
    Ok(())
}

#[tokio::test]
async fn test_hsts_follows_transport() -> Result<()> {
    let cfg = config_with_policy(r#"{"hsts": {"maxAge": 7776000}}"#)?;
    let router = setup_with(cfg)?;

    let plain = get(router.clone(), "/health").await?;
    assert!(header(&plain, "strict-transport-security").is_none());

    let tls = get(router, "https://example.com/health").await?;
    assert_eq!(header(&tls, "strict-transport-security"), Some("max-age=7776000; includeSubDomains"));
    Ok(())
}

#[tokio::test]
async fn test_hsts_behind_trusted_proxy() -> Result<()> {
    let forwarded = || Request::builder().uri("/health").header("x-forwarded-proto", "https").body(Body::empty());

    let untrusted = setup_test_app()?.oneshot(forwarded()?).await?;
    assert!(header(&untrusted, "strict-transport-security").is_none());

    let mut cfg = test_config()?;
    cfg.http.trust_forwarded_proto = true;
    let trusted = setup_with(cfg)?.oneshot(forwarded()?).await?;
    assert_eq!(header(&trusted, "strict-transport-security"), Some("max-age=15552000; includeSubDomains"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_category_fails_startup() -> Result<()> {
    let cfg = config_with_policy(r#"{"noChache": true}"#)?;
    let err = setup_with(cfg).err().expect("startup must fail");
    assert!(format!("{err:#}").contains("noChache"), "{err:#}");
    Ok(())
}

#[tokio::test]
async fn test_invalid_parameter_fails_startup() -> Result<()> {
    let cfg = config_with_policy(r#"{"contentSecurityPolicy": {"directives": {"defaultSrc": ["'self'"], "scriptSrc": "'self'"}}}"#)?;
    assert!(setup_with(cfg).is_err());

    let cfg = config_with_policy(r#"{"hsts": {"maxAge": -90}}"#)?;
    assert!(setup_with(cfg).is_err());

    let mut cfg = test_config()?;
    cfg.policy.file = "/nonexistent/hardhat-policy.json".into();
    assert!(setup_with(cfg).is_err());
    Ok(())
}

#[tokio::test]
async fn test_app_info_reports_policy() -> Result<()> {
    let response = get(setup_test_app()?, "/_api/app-info").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert_eq!(body["secure"], json!(false));
    assert!(body["appStack"].as_array().is_some_and(|s| s.contains(&json!("headerPolicy"))));
    let headers = body["headers"].as_array().cloned().unwrap_or_default();
    assert!(headers.contains(&json!({"name": "x-download-options", "value": "noopen"})));
    assert!(!headers.iter().any(|h| h["name"] == "strict-transport-security"));
    Ok(())
}

#[tokio::test]
async fn test_hash_then_verify() -> Result<()> {
    let router = setup_test_app()?;

    let response = post_json(router.clone(), "/_api/hash", json!({"password": "sUperpassw0rd!"})).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-content-type-options"), Some("nosniff"));
    let hash = json_body(response).await?["hash"].as_str().unwrap_or_default().to_string();
    assert!(hash.starts_with("$argon2id$"));

    let ok = post_json(router.clone(), "/_api/verify", json!({"password": "sUperpassw0rd!", "hash": hash})).await?;
    assert_eq!(json_body(ok).await?, json!({"valid": true}));

    let wrong = post_json(router, "/_api/verify", json!({"password": "pass123", "hash": hash})).await?;
    assert_eq!(json_body(wrong).await?, json!({"valid": false}));
    Ok(())
}

#[tokio::test]
async fn test_hash_rejects_weak_password() -> Result<()> {
    let response = post_json(setup_test_app()?, "/_api/hash", json!({"password": "pass123"})).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(header(&response, "x-download-options"), Some("noopen"));
    let body = json_body(response).await?;
    assert_eq!(body["error"]["code"], "unprocessable");
    Ok(())
}

#[tokio::test]
async fn test_verify_rejects_malformed_hash() -> Result<()> {
    let response = post_json(setup_test_app()?, "/_api/verify", json!({"password": "sUperpassw0rd!", "hash": "$argon2id$v=19$m=19456,t=2,p=1$@@@$@@@"})).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_rejection_carries_policy_headers() -> Result<()> {
    let mut cfg = test_config()?;
    cfg.http.max_request_size_bytes = 1024;
    let body = format!(r#"{{"password": "{}"}}"#, "a1".repeat(2048));
    let request = Request::builder()
        .method("POST")
        .uri("/_api/hash")
        .header("content-type", "application/json")
        .header("content-length", body.len().to_string())
        .body(Body::from(body))?;

    let response = setup_with(cfg)?.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(header(&response, "x-content-type-options"), Some("nosniff"));
    assert_eq!(header(&response, "x-download-options"), Some("noopen"));
    assert_eq!(header(&response, "x-frame-options"), Some("SAMEORIGIN"));
    Ok(())
}

#[tokio::test]
async fn test_dns_prefetch_can_be_allowed() -> Result<()> {
    let cfg = config_with_policy(r#"{"dnsPrefetchControl": {"allow": true}}"#)?;
    let response = get(setup_with(cfg)?, "/").await?;
    assert_eq!(header(&response, "x-dns-prefetch-control"), Some("on"));
    Ok(())
}

#[tokio::test]
async fn test_blank_or_smuggled_parameters_fail_startup() -> Result<()> {
    for policy in [
        r#"{"hidePoweredBy": {"setTo": ""}}"#,
        r#"{"xssFilter": {"reportUri": "/r; mode=off"}}"#,
        r#"{"frameguard": {"action": "allow-from", "domain": "https://a.example, https://b.example"}}"#,
    ] {
        let cfg = config_with_policy(policy)?;
        assert!(setup_with(cfg).is_err(), "{policy}");
    }
    Ok(())
}

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{http, middleware, Router};
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::request_id::{RequestId, MakeRequestId};
use tower_http::{trace::TraceLayer, request_id::{PropagateRequestIdLayer, SetRequestIdLayer}, limit::RequestBodyLimitLayer};
use hh_core::config::AppConfig;
use hh_policy::{HeaderPolicy, PolicyConfig};
use http::header::HeaderName;
use tracing::warn;
use crate::{routes, security::{apply_header_policy, powered_by}, state::AppState};
use uuid::Uuid;

#[derive(Clone)]
struct MakeRequestUuid;
impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        http::HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Builds the router. Fails when the header policy is invalid, so callers
/// must not bind a listener before this returns `Ok`.
pub fn build_app(cfg: Arc<AppConfig>) -> anyhow::Result<AppStateAndRouter> {
    let policy = load_policy(&cfg)?;
    enforce_prod_policy(&cfg, &policy);
    let state = AppState::new(cfg.clone(), Arc::new(policy));
    let request_id_header: HeaderName = cfg.logging.request_id_header.parse()
        .with_context(|| format!("invalid request id header name {:?}", cfg.logging.request_id_header))?;

    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &http::Request<_>| {
            let method = req.method().clone();
            let uri = req.uri().path().to_string();
            tracing::info_span!("request", %method, %uri, status = tracing::field::Empty)
        })
        .on_response(|res: &http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
            let status = res.status().as_u16();
            span.record("status", tracing::field::display(status));
            tracing::info!(parent: span, status, latency_ms = latency.as_millis(), "request.completed");
        });
    let body_limit = RequestBodyLimitLayer::new(cfg.http.max_request_size_bytes as usize);

    let stack = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id_header.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(trace)
        .layer(body_limit)
        .layer(ConcurrencyLimitLayer::new(cfg.http.max_concurrency));

    let mut router = routes::routes(&cfg);
    if let Some(advertise) = powered_by(&cfg)? {
        router = router.layer(advertise);
    }
    // Outermost, so rejections produced inside the stack (body limit 413) still carry the policy.
    let router = router
        .layer(stack)
        .layer(middleware::from_fn_with_state(state.clone(), apply_header_policy))
        .with_state(state.clone());
    Ok(AppStateAndRouter { state, router })
}

fn load_policy(cfg: &AppConfig) -> anyhow::Result<HeaderPolicy> {
    match cfg.policy_file() {
        Some(path) => HeaderPolicy::from_path(&path)
            .with_context(|| format!("loading header policy from {}", path.display())),
        None => HeaderPolicy::configure(PolicyConfig::default()).context("configuring default header policy"),
    }
}

fn enforce_prod_policy(cfg: &AppConfig, policy: &HeaderPolicy) {
    if !cfg.is_production() { return; }
    match policy.config().hsts.as_enabled() {
        None => warn!("hsts is disabled in production"),
        Some(hsts) if !hsts.force && !cfg.http.force_https && !cfg.http.trust_forwarded_proto => {
            warn!("hsts is enabled but no request can be recognised as secure; set FORCE_HTTPS or TRUST_FORWARDED_PROTO")
        }
        Some(_) => {}
    }
}

#[derive(Clone)]
pub struct AppStateAndRouter { pub state: AppState, pub router: Router }

pub fn server_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", cfg.app.host, cfg.app.port).parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.app.host, cfg.app.port))
}

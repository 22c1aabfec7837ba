//! Header policy middleware.
//!
//! The policy is resolved once at startup; per request this layer only works
//! out whether the transport was secure and writes the matching header set
//! onto the response. It never rejects or short-circuits a request.

use axum::{
    extract::{Request, State},
    http::{uri::Scheme, HeaderMap, HeaderValue, Uri},
    middleware::Next,
    response::Response,
};
use hh_core::config::{AppConfig, HttpSection};
use hh_policy::{rules::X_POWERED_BY, Transport};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

pub async fn apply_header_policy(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let transport = request_transport(req.uri(), req.headers(), &state.config().http);
    req.extensions_mut().insert(transport);

    let mut response = next.run(req).await;
    state.policy.apply(response.headers_mut(), transport);
    response
}

pub fn request_transport(uri: &Uri, headers: &HeaderMap, http: &HttpSection) -> Transport {
    if http.force_https || uri.scheme() == Some(&Scheme::HTTPS) {
        return Transport::Secure;
    }
    let forwarded_https = http.trust_forwarded_proto
        && headers
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));
    Transport::from_secure(forwarded_https)
}

/// Framework self-advertisement, applied inside the policy so `hidePoweredBy` can act on it.
pub fn powered_by(cfg: &AppConfig) -> anyhow::Result<Option<SetResponseHeaderLayer<HeaderValue>>> {
    let advertised = cfg.http.powered_by.trim();
    if advertised.is_empty() {
        return Ok(None);
    }
    let value = HeaderValue::from_str(advertised)
        .map_err(|_| anyhow::anyhow!("POWERED_BY {advertised:?} is not a valid header value"))?;
    Ok(Some(SetResponseHeaderLayer::if_not_present(X_POWERED_BY, value)))
}

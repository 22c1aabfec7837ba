//! One rule per header category.
//!
//! Rules are pure: parameters and transport in, header operations out. Any
//! failure here is a configuration problem and surfaces when the policy is
//! built, never while serving.

use http::{
    header::{
        CACHE_CONTROL, CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY_REPORT_ONLY, EXPIRES, PRAGMA,
        STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_DNS_PREFETCH_CONTROL, X_FRAME_OPTIONS,
        X_XSS_PROTECTION,
    },
    HeaderName, HeaderValue,
};

use crate::{
    config::{ContentSecurityPolicy, DnsPrefetchControl, FrameAction, Frameguard, HidePoweredBy, Hsts, XssFilter},
    engine::Transport,
    error::{ConfigError, ConfigResult},
    resolved::HeaderOp,
};

pub const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");
pub const X_DOWNLOAD_OPTIONS: HeaderName = HeaderName::from_static("x-download-options");

pub trait HeaderRule {
    /// Category name as written in a policy document.
    const CATEGORY: &'static str;

    fn headers(&self, transport: Transport) -> ConfigResult<Vec<HeaderOp>>;
}

fn value<R: HeaderRule + ?Sized>(raw: &str) -> ConfigResult<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|_| ConfigError::invalid(R::CATEGORY, format!("{raw:?} is not a valid header value")))
}

/// A parameter spliced into a `;`-separated header value must stay one token.
fn token<'a, R: HeaderRule + ?Sized>(field: &str, raw: &'a str) -> ConfigResult<&'a str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::invalid(R::CATEGORY, format!("`{field}` must not be empty")));
    }
    if raw.chars().any(|c| c == ';' || c == ',' || c.is_whitespace()) {
        return Err(ConfigError::invalid(R::CATEGORY, format!("`{field}` {raw:?} must not contain `;`, `,` or whitespace")));
    }
    Ok(raw)
}

impl HeaderRule for HidePoweredBy {
    const CATEGORY: &'static str = "hidePoweredBy";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        Ok(vec![match &self.set_to {
            Some(replacement) if replacement.trim().is_empty() => {
                return Err(ConfigError::invalid(Self::CATEGORY, "`setTo` must not be empty; omit it to remove the header"))
            }
            Some(replacement) => HeaderOp::Set(X_POWERED_BY, value::<Self>(replacement.trim())?),
            None => HeaderOp::Remove(X_POWERED_BY),
        }])
    }
}

impl HeaderRule for Frameguard {
    const CATEGORY: &'static str = "frameguard";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        let header = match (self.action, self.domain.as_deref()) {
            (FrameAction::Deny, None) => HeaderValue::from_static("DENY"),
            (FrameAction::SameOrigin, None) => HeaderValue::from_static("SAMEORIGIN"),
            (FrameAction::AllowFrom, Some(domain)) if !domain.trim().is_empty() => {
                value::<Self>(&format!("ALLOW-FROM {}", token::<Self>("domain", domain)?))?
            }
            (FrameAction::AllowFrom, _) => {
                return Err(ConfigError::invalid(Self::CATEGORY, "`allow-from` requires a non-empty `domain`"))
            }
            (_, Some(_)) => return Err(ConfigError::invalid(Self::CATEGORY, "`domain` is only valid with `allow-from`")),
        };
        Ok(vec![HeaderOp::Set(X_FRAME_OPTIONS, header)])
    }
}

impl HeaderRule for XssFilter {
    const CATEGORY: &'static str = "xssFilter";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        let mut raw = String::from("1");
        if self.block {
            raw.push_str("; mode=block");
        }
        if let Some(uri) = &self.report_uri {
            raw.push_str("; report=");
            raw.push_str(token::<Self>("reportUri", uri)?);
        }
        Ok(vec![HeaderOp::Set(X_XSS_PROTECTION, value::<Self>(&raw)?)])
    }
}

/// `noSniff`.
pub struct NoSniff;

impl HeaderRule for NoSniff {
    const CATEGORY: &'static str = "noSniff";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        Ok(vec![HeaderOp::Set(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"))])
    }
}

/// `ieNoOpen`.
pub struct IeNoOpen;

impl HeaderRule for IeNoOpen {
    const CATEGORY: &'static str = "ieNoOpen";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        Ok(vec![HeaderOp::Set(X_DOWNLOAD_OPTIONS, HeaderValue::from_static("noopen"))])
    }
}

impl HeaderRule for Hsts {
    const CATEGORY: &'static str = "hsts";

    fn headers(&self, transport: Transport) -> ConfigResult<Vec<HeaderOp>> {
        if transport == Transport::Insecure && !self.force {
            return Ok(Vec::new());
        }
        let mut raw = format!("max-age={}", self.max_age);
        if self.include_sub_domains {
            raw.push_str("; includeSubDomains");
        }
        if self.preload {
            raw.push_str("; preload");
        }
        Ok(vec![HeaderOp::Set(STRICT_TRANSPORT_SECURITY, value::<Self>(&raw)?)])
    }
}

impl HeaderRule for DnsPrefetchControl {
    const CATEGORY: &'static str = "dnsPrefetchControl";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        let raw = if self.allow { "on" } else { "off" };
        Ok(vec![HeaderOp::Set(X_DNS_PREFETCH_CONTROL, HeaderValue::from_static(raw))])
    }
}

/// `noCache`.
pub struct NoCache;

impl HeaderRule for NoCache {
    const CATEGORY: &'static str = "noCache";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        Ok(vec![
            HeaderOp::Set(CACHE_CONTROL, HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate")),
            HeaderOp::Set(PRAGMA, HeaderValue::from_static("no-cache")),
            HeaderOp::Set(EXPIRES, HeaderValue::from_static("0")),
        ])
    }
}

impl HeaderRule for ContentSecurityPolicy {
    const CATEGORY: &'static str = "contentSecurityPolicy";

    fn headers(&self, _: Transport) -> ConfigResult<Vec<HeaderOp>> {
        self.directives.validate().map_err(|msg| ConfigError::invalid(Self::CATEGORY, msg))?;
        let name = if self.report_only { CONTENT_SECURITY_POLICY_REPORT_ONLY } else { CONTENT_SECURITY_POLICY };
        Ok(vec![HeaderOp::Set(name, value::<Self>(&self.directives.render())?)])
    }
}

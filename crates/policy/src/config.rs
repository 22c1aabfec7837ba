//! Declarative policy schema.
//!
//! Each field is one header category. Unknown categories and unknown
//! parameters are rejected while parsing, so a typo never silently disables
//! a header.

use serde::Deserialize;

use crate::{csp::Directives, toggle::Toggle};

/// 180 days.
pub const DEFAULT_HSTS_MAX_AGE: u64 = 180 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(default = "Toggle::enabled")]
    pub hide_powered_by: Toggle<HidePoweredBy>,
    #[serde(default = "Toggle::enabled")]
    pub frameguard: Toggle<Frameguard>,
    #[serde(default = "Toggle::enabled")]
    pub xss_filter: Toggle<XssFilter>,
    #[serde(default = "Toggle::enabled")]
    pub no_sniff: Toggle<NoParams>,
    #[serde(default = "Toggle::enabled")]
    pub ie_no_open: Toggle<NoParams>,
    #[serde(default = "Toggle::enabled")]
    pub hsts: Toggle<Hsts>,
    #[serde(default = "Toggle::enabled")]
    pub dns_prefetch_control: Toggle<DnsPrefetchControl>,
    #[serde(default = "Toggle::disabled")]
    pub no_cache: Toggle<NoParams>,
    #[serde(default = "Toggle::disabled")]
    pub content_security_policy: Toggle<ContentSecurityPolicy>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            hide_powered_by: Toggle::enabled(),
            frameguard: Toggle::enabled(),
            xss_filter: Toggle::enabled(),
            no_sniff: Toggle::enabled(),
            ie_no_open: Toggle::enabled(),
            hsts: Toggle::enabled(),
            dns_prefetch_control: Toggle::enabled(),
            no_cache: Toggle::disabled(),
            content_security_policy: Toggle::disabled(),
        }
    }
}

impl PolicyConfig {
    pub fn enabled_categories(&self) -> Vec<&'static str> {
        [
            ("hidePoweredBy", self.hide_powered_by.is_enabled()),
            ("frameguard", self.frameguard.is_enabled()),
            ("xssFilter", self.xss_filter.is_enabled()),
            ("noSniff", self.no_sniff.is_enabled()),
            ("ieNoOpen", self.ie_no_open.is_enabled()),
            ("hsts", self.hsts.is_enabled()),
            ("dnsPrefetchControl", self.dns_prefetch_control.is_enabled()),
            ("noCache", self.no_cache.is_enabled()),
            ("contentSecurityPolicy", self.content_security_policy.is_enabled()),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

/// Parameters for categories that take none; only `{}` or `true` enable them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HidePoweredBy {
    /// Replacement value. When absent the header is removed.
    pub set_to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Frameguard {
    pub action: FrameAction,
    /// Origin allowed to frame the page; only meaningful for `allow-from`.
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FrameAction {
    Deny,
    #[default]
    SameOrigin,
    AllowFrom,
}

impl TryFrom<String> for FrameAction {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.to_ascii_lowercase().as_str() {
            "deny" => Ok(FrameAction::Deny),
            "sameorigin" => Ok(FrameAction::SameOrigin),
            "allow-from" | "allowfrom" => Ok(FrameAction::AllowFrom),
            _ => Err(format!("unknown frameguard action {raw:?}, expected `deny`, `sameorigin` or `allow-from`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct XssFilter {
    pub block: bool,
    pub report_uri: Option<String>,
}

impl Default for XssFilter {
    fn default() -> Self { Self { block: true, report_uri: None } }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Hsts {
    pub max_age: u64,
    #[serde(alias = "includeSubdomains")]
    pub include_sub_domains: bool,
    pub preload: bool,
    /// Emit the header even when the request did not arrive over TLS.
    pub force: bool,
}

impl Default for Hsts {
    fn default() -> Self {
        Self { max_age: DEFAULT_HSTS_MAX_AGE, include_sub_domains: true, preload: false, force: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DnsPrefetchControl {
    pub allow: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ContentSecurityPolicy {
    pub directives: Directives,
    pub report_only: bool,
}

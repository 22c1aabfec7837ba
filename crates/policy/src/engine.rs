//! Header Policy Engine.
//!
//! A [`HeaderPolicy`] is built once from a [`PolicyConfig`] and is immutable
//! afterwards. Both possible header sets (secure and insecure transport) are
//! resolved up front, so applying the policy to a response is a plain map
//! update that cannot fail.

use std::path::Path;

use http::HeaderMap;

use crate::{
    config::PolicyConfig,
    error::{ConfigError, ConfigResult},
    resolved::ResolvedHeaderSet,
    rules::{HeaderRule, IeNoOpen, NoCache, NoSniff},
};

/// Whether the request reached the server over a secure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Secure,
    Insecure,
}

impl Transport {
    pub fn from_secure(secure: bool) -> Self {
        if secure { Transport::Secure } else { Transport::Insecure }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    config: PolicyConfig,
    secure: ResolvedHeaderSet,
    insecure: ResolvedHeaderSet,
}

impl HeaderPolicy {
    /// Validates `config` and resolves its headers.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a category's parameters cannot
    /// produce a valid header.
    pub fn configure(config: PolicyConfig) -> ConfigResult<Self> {
        let secure = resolve(&config, Transport::Secure)?;
        let insecure = resolve(&config, Transport::Insecure)?;
        tracing::info!(
            enabled = ?config.enabled_categories(),
            secure_headers = secure.len(),
            insecure_headers = insecure.len(),
            "header policy configured"
        );
        Ok(Self { config, secure, insecure })
    }

    /// Parses a JSON policy document and configures it.
    pub fn from_json_str(document: &str) -> ConfigResult<Self> {
        Self::configure(serde_json::from_str(document)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_json_str(&document)
    }

    pub fn config(&self) -> &PolicyConfig { &self.config }

    pub fn resolved(&self, transport: Transport) -> &ResolvedHeaderSet {
        match transport {
            Transport::Secure => &self.secure,
            Transport::Insecure => &self.insecure,
        }
    }

    /// Writes the policy onto outgoing response headers.
    pub fn apply(&self, headers: &mut HeaderMap, transport: Transport) {
        self.resolved(transport).apply_to(headers);
    }
}

fn resolve(config: &PolicyConfig, transport: Transport) -> ConfigResult<ResolvedHeaderSet> {
    let mut set = ResolvedHeaderSet::default();
    push(&mut set, config.hide_powered_by.as_enabled(), transport)?;
    push(&mut set, config.frameguard.as_enabled(), transport)?;
    push(&mut set, config.xss_filter.as_enabled(), transport)?;
    push(&mut set, config.no_sniff.as_enabled().map(|_| &NoSniff), transport)?;
    push(&mut set, config.ie_no_open.as_enabled().map(|_| &IeNoOpen), transport)?;
    push(&mut set, config.hsts.as_enabled(), transport)?;
    push(&mut set, config.dns_prefetch_control.as_enabled(), transport)?;
    push(&mut set, config.no_cache.as_enabled().map(|_| &NoCache), transport)?;
    push(&mut set, config.content_security_policy.as_enabled(), transport)?;
    Ok(set)
}

fn push<R: HeaderRule>(set: &mut ResolvedHeaderSet, rule: Option<&R>, transport: Transport) -> ConfigResult<()> {
    if let Some(rule) = rule {
        for op in rule.headers(transport)? {
            set.push(op);
        }
    }
    Ok(())
}

impl TryFrom<PolicyConfig> for HeaderPolicy {
    type Error = ConfigError;

    fn try_from(config: PolicyConfig) -> ConfigResult<Self> { Self::configure(config) }
}

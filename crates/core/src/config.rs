use serde::Deserialize;
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSection,
    pub logging: LoggingSection,
    pub http: HttpSection,
    pub policy: PolicySection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub env: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub public_dir: String,
    pub views_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    pub log_format: String,
    pub request_id_header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSection {
    pub max_request_size_bytes: u64,
    pub max_concurrency: usize,
    /// TLS is terminated in front of this process; every request counts as secure.
    pub force_https: bool,
    pub trust_forwarded_proto: bool,
    /// Advertised in `X-Powered-By` unless the header policy hides it. Empty disables.
    pub powered_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicySection {
    /// JSON policy document. Empty means the built-in defaults.
    pub file: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        // Load .env if present
        let _ = dotenvy::dotenv();
        let builder = config::Config::builder()
            .set_default("app.env", env_or("APP_ENV", "local"))?
            .set_default("app.name", env_or("APP_NAME", "hardhat"))?
            .set_default("app.host", env_or("APP_HOST", "0.0.0.0"))?
            .set_default("app.port", env_or("PORT", "3000"))?
            .set_default("app.public_dir", env_or("PUBLIC_DIR", "public"))?
            .set_default("app.views_dir", env_or("VIEWS_DIR", "views"))?
            .set_default("logging.log_format", env_or("LOG_FORMAT", "text"))?
            .set_default("logging.request_id_header", env_or("REQUEST_ID_HEADER", "x-request-id"))?
            .set_default("http.max_request_size_bytes", env_or("MAX_REQUEST_SIZE_BYTES", "1048576"))?
            .set_default("http.max_concurrency", env_or("MAX_CONCURRENCY", "1024"))?
            .set_default("http.force_https", env_or("FORCE_HTTPS", "false"))?
            .set_default("http.trust_forwarded_proto", env_or("TRUST_FORWARDED_PROTO", "false"))?
            .set_default("http.powered_by", env_or("POWERED_BY", "hardhat"))?
            .set_default("policy.file", env_or("POLICY_FILE", ""))?;

        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn is_production(&self) -> bool { self.app.env == "production" }

    pub fn policy_file(&self) -> Option<PathBuf> {
        let file = self.policy.file.trim();
        (!file.is_empty()).then(|| PathBuf::from(file))
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

//! Security response headers computed from a declarative policy.
//!
//! ```
//! use hh_policy::{HeaderPolicy, Transport};
//!
//! let policy = HeaderPolicy::from_json_str(r#"{"frameguard": {"action": "deny"}}"#).unwrap();
//! let mut headers = http::HeaderMap::new();
//! policy.apply(&mut headers, Transport::Insecure);
//! assert_eq!(headers["x-frame-options"], "DENY");
//! ```

pub mod config;
pub mod csp;
pub mod engine;
pub mod error;
pub mod resolved;
pub mod rules;
pub mod toggle;

pub use config::PolicyConfig;
pub use engine::{HeaderPolicy, Transport};
pub use error::{ConfigError, ConfigResult};
pub use resolved::{HeaderOp, ResolvedHeaderSet};
pub use toggle::Toggle;

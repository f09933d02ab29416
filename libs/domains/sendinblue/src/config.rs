//! Client configuration and credential handling.

use crate::error::{SendinblueError, SendinblueResult};
use core_config::FromEnv;
use core_config::sendinblue::{DEFAULT_API_URL, SendinblueConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Identifier of the api key inside [`Configuration`], also the header name.
pub const API_KEY: &str = "api-key";

/// Transport configuration shared by the contacts and email endpoints.
#[derive(Debug, Clone)]
pub struct Configuration {
    host: String,
    api_keys: HashMap<String, String>,
    user_agent: String,
    timeout: Option<Duration>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_URL.to_string(),
            api_keys: HashMap::new(),
            user_agent: concat!("domain_sendinblue/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of the API, without trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into().trim_end_matches('/').to_string();
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.set_host(host);
        self
    }

    /// Stored key for `identifier`. Empty keys read as absent.
    pub fn api_key(&self, identifier: &str) -> Option<&str> {
        self.api_keys
            .get(identifier)
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }

    pub fn set_api_key(&mut self, identifier: &str, key: impl Into<String>) {
        self.api_keys.insert(identifier.to_string(), key.into());
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.set_api_key(API_KEY, key);
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<&SendinblueConfig> for Configuration {
    fn from(env: &SendinblueConfig) -> Self {
        let mut config = Configuration::new().with_host(env.api_url.clone());
        if let Some(key) = &env.api_key {
            config.set_api_key(API_KEY, key.trim());
        }
        if let Some(secs) = env.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

impl Configuration {
    /// Load the configuration from `SENDINBLUE_*` variables.
    pub fn from_env() -> SendinblueResult<Self> {
        let env = SendinblueConfig::from_env()?;
        Ok(Configuration::from(&env))
    }
}

/// Resolve the configuration an adapter starts with.
///
/// An explicit non-blank key, trimmed, overrides whatever the supplied
/// configuration holds; a blank one is ignored. Fails when no usable key
/// is left.
pub(crate) fn resolve_configuration(
    owner: &str,
    config: Option<Configuration>,
    apikey: Option<&str>,
) -> SendinblueResult<Configuration> {
    let mut config = config.unwrap_or_default();

    if let Some(apikey) = apikey.map(str::trim).filter(|key| !key.is_empty()) {
        config.set_api_key(API_KEY, apikey);
    }

    if config.api_key(API_KEY).is_none() {
        return Err(SendinblueError::Config(format!(
            "\"{}::apikey\" cannot be null.",
            owner
        )));
    }

    Ok(config)
}

/// Validate a credential and return its trimmed form.
pub fn validate_api_key(owner: &str, apikey: &str) -> SendinblueResult<String> {
    let trimmed = apikey.trim();
    if trimmed.is_empty() {
        return Err(SendinblueError::InvalidConfig {
            field: format!("{}::apikey", owner),
            reason: "length should be greater than 0.".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Validate a credential coming from an untyped source.
pub fn validate_api_key_value(owner: &str, apikey: &Value) -> SendinblueResult<String> {
    match apikey {
        Value::String(key) => validate_api_key(owner, key),
        other => Err(SendinblueError::InvalidConfig {
            field: format!("{}::apikey", owner),
            reason: format!("should be a string, \"{}\" given.", value_type_name(other)),
        }),
    }
}

/// Type name of a JSON value, spelled the way config errors report it.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use crate::{env_optional, env_or_default, env_parse, ConfigError, FromEnv};

pub const DEFAULT_API_URL: &str = "https://api.sendinblue.com/v3";

/// Sendinblue settings read from the environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendinblueConfig {
    pub api_key: Option<String>,
    pub default_list: Option<i64>,
    pub api_url: String,
    pub timeout_secs: Option<u64>,
}

impl FromEnv for SendinblueConfig {
    /// Reads from environment variables:
    /// - SENDINBLUE_API_KEY: optional here, the mailer rejects a missing key at init
    /// - SENDINBLUE_DEFAULT_LIST: optional contact list id
    /// - SENDINBLUE_API_URL: defaults to the v3 production endpoint
    /// - SENDINBLUE_TIMEOUT_SECS: optional request timeout
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_optional("SENDINBLUE_API_KEY"),
            default_list: env_parse("SENDINBLUE_DEFAULT_LIST")?,
            api_url: env_or_default("SENDINBLUE_API_URL", DEFAULT_API_URL),
            timeout_secs: env_parse("SENDINBLUE_TIMEOUT_SECS")?,
        })
    }
}

impl Default for SendinblueConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_list: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

//! Contact management in the Sendinblue CRM.

use crate::client::{ContactsApi, SendinblueClient};
use crate::config::{
    API_KEY, Configuration, resolve_configuration, validate_api_key, validate_api_key_value,
};
use crate::error::{SendinblueError, SendinblueResult};
use crate::models::{ContactDetails, CreateContact};
use chrono::NaiveDate;
use core_config::FromEnv;
use core_config::sendinblue::SendinblueConfig;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

const OWNER: &str = "Contacts";

/// Format used for date attributes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date attribute value in the format contacts expect.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Settings used to build a [`Contacts`] manager.
#[derive(Debug, Clone, Default)]
pub struct ContactsOptions {
    /// Api key, overrides the one stored in `config`.
    pub apikey: Option<String>,
    /// List new subscribers join by default.
    pub default_list: Option<i64>,
    /// Pre-built configuration.
    pub config: Option<Configuration>,
}

impl ContactsOptions {
    /// Options from `SENDINBLUE_*` variables.
    pub fn from_env() -> SendinblueResult<Self> {
        let env = SendinblueConfig::from_env()?;
        Ok(Self {
            apikey: None,
            default_list: env.default_list,
            config: Some(Configuration::from(&env)),
        })
    }
}

/// Result of a successful [`Contacts::create_contact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateContactOutcome {
    /// The contact was created or updated; `id` is set for new contacts.
    Created { id: Option<i64> },
    /// The contact already existed and the caller allowed updating it.
    /// Carries no identifier.
    Updated,
}

impl CreateContactOutcome {
    pub fn id(&self) -> Option<i64> {
        match self {
            CreateContactOutcome::Created { id } => *id,
            CreateContactOutcome::Updated => None,
        }
    }
}

/// Contact manager.
///
/// Every operation reports failure as `None` and logs the cause; only
/// construction and credential changes return errors.
pub struct Contacts<C: ContactsApi = SendinblueClient> {
    config: Configuration,
    client: C,
    default_list: Option<i64>,
}

impl Contacts<SendinblueClient> {
    /// Build a manager backed by the HTTP client.
    pub fn new(options: ContactsOptions) -> SendinblueResult<Self> {
        Self::with_client(options, SendinblueClient::new())
    }

    pub fn from_env() -> SendinblueResult<Self> {
        Self::new(ContactsOptions::from_env()?)
    }
}

impl<C: ContactsApi> Contacts<C> {
    /// Build a manager on top of any [`ContactsApi`] implementation.
    pub fn with_client(options: ContactsOptions, client: C) -> SendinblueResult<Self> {
        let config = resolve_configuration(OWNER, options.config, options.apikey.as_deref())?;
        Ok(Self {
            config,
            client,
            default_list: options.default_list,
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn default_list(&self) -> Option<i64> {
        self.default_list
    }

    pub fn set_default_list(&mut self, list_id: Option<i64>) {
        self.default_list = list_id;
    }

    /// Replace the api key. The trimmed key applies to the next request.
    pub fn set_apikey(&mut self, apikey: &str) -> SendinblueResult<()> {
        let apikey = validate_api_key(OWNER, apikey)?;
        self.config.set_api_key(API_KEY, apikey);
        Ok(())
    }

    /// Replace the api key from an untyped configuration value.
    pub fn set_apikey_value(&mut self, apikey: &Value) -> SendinblueResult<()> {
        let apikey = validate_api_key_value(OWNER, apikey)?;
        self.config.set_api_key(API_KEY, apikey);
        Ok(())
    }

    /// Create a contact.
    ///
    /// Returns `None` when `email` is empty (no request is made), when the
    /// contact exists and `update_if_exists` is false, and on any other
    /// failure. An existing contact with `update_if_exists` set yields
    /// [`CreateContactOutcome::Updated`], which has no identifier.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn create_contact(
        &self,
        email: &str,
        attributes: Map<String, Value>,
        list_ids: &[i64],
        update_if_exists: bool,
    ) -> Option<CreateContactOutcome> {
        if email.is_empty() {
            return None;
        }

        let contact = CreateContact {
            email: email.to_string(),
            attributes: (!attributes.is_empty()).then_some(attributes),
            list_ids: (!list_ids.is_empty()).then(|| list_ids.to_vec()),
            update_enabled: update_if_exists,
        };

        debug!(
            email = %contact.email,
            attributes = ?contact.attributes,
            list_ids = ?contact.list_ids,
            update_enabled = contact.update_enabled,
            "Creating Sendinblue contact"
        );

        match self.client.create_contact(&self.config, &contact).await {
            Ok(created) => {
                debug!(email = %email, id = ?created.id, "Sendinblue contact creation successful");
                Some(CreateContactOutcome::Created { id: created.id })
            }
            Err(SendinblueError::Api(api)) if api.is_duplicate() => {
                info!(email = %email, error = %api, "Sendinblue duplicate contact found");
                update_if_exists.then_some(CreateContactOutcome::Updated)
            }
            Err(SendinblueError::Api(api)) => {
                error!(email = %email, error = %api, "Sendinblue API request error");
                None
            }
            Err(e) => {
                error!(email = %email, error = %e, "Sendinblue API request general error");
                None
            }
        }
    }

    /// Create or update a contact in the default list, if one is configured.
    pub async fn subscribe(
        &self,
        email: &str,
        attributes: Map<String, Value>,
    ) -> Option<CreateContactOutcome> {
        let list_ids: Vec<i64> = self.default_list.into_iter().collect();
        self.create_contact(email, attributes, &list_ids, true).await
    }

    /// Fetch a contact's full record.
    ///
    /// Returns `None` for an empty email (no request is made), an unknown
    /// contact, or any other failure.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn get_contact(&self, email: &str) -> Option<ContactDetails> {
        debug!(email = %email, "Getting Sendinblue contact");

        if email.is_empty() {
            warn!("Sendinblue get_contact called without an email");
            return None;
        }

        match self.client.get_contact_info(&self.config, email).await {
            Ok(details) => {
                debug!(email = %email, id = ?details.id, "Sendinblue get_contact successful");
                Some(details)
            }
            Err(SendinblueError::Api(api)) if api.is_not_found() => {
                warn!(email = %email, "Sendinblue contact not found");
                None
            }
            Err(SendinblueError::Api(api)) => {
                error!(email = %email, error = %api, "Sendinblue API request error");
                None
            }
            Err(e) => {
                error!(email = %email, error = %e, "Sendinblue API request general error");
                None
            }
        }
    }
}

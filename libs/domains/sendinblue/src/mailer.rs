//! Mailer: composes messages and sends them through the transactional API.

use crate::client::{SendinblueClient, TransactionalApi};
use crate::config::{
    API_KEY, Configuration, resolve_configuration, validate_api_key, validate_api_key_value,
};
use crate::error::{ApiError, SendinblueError, SendinblueResult};
use crate::message::{
    MailMessage, Message, SmtpMessage, TemplateMessage, is_numeric, parse_template_id,
};
use crate::models::SentEmail;
use crate::views::{ViewEngine, ViewRenderer};
use core_config::FromEnv;
use core_config::sendinblue::SendinblueConfig;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

const OWNER: &str = "Mailer";

/// Values applied to every composed message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDefaults {
    /// Ignored by template messages.
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub charset: Option<String>,
}

/// Settings used to build a [`Mailer`].
#[derive(Debug, Clone, Default)]
pub struct MailerOptions {
    /// Api key, overrides the one stored in `config`.
    pub apikey: Option<String>,
    /// Pre-built configuration.
    pub config: Option<Configuration>,
    pub message_defaults: MessageDefaults,
}

impl MailerOptions {
    /// Options from `SENDINBLUE_*` variables.
    pub fn from_env() -> SendinblueResult<Self> {
        let env = SendinblueConfig::from_env()?;
        Ok(Self {
            apikey: None,
            config: Some(Configuration::from(&env)),
            message_defaults: MessageDefaults::default(),
        })
    }
}

/// What [`Mailer::compose`] builds a message from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ComposeTarget {
    /// An empty free-form message.
    #[default]
    Empty,
    /// A free-form message with bodies rendered from a view.
    View(String),
    /// A template message.
    Template(i64),
}

impl From<i64> for ComposeTarget {
    fn from(id: i64) -> Self {
        ComposeTarget::Template(id)
    }
}

impl From<i32> for ComposeTarget {
    fn from(id: i32) -> Self {
        ComposeTarget::Template(id.into())
    }
}

impl From<u32> for ComposeTarget {
    fn from(id: u32) -> Self {
        ComposeTarget::Template(id.into())
    }
}

/// Numeric text, exponent forms included, selects a template; anything
/// else names a view.
impl From<&str> for ComposeTarget {
    fn from(target: &str) -> Self {
        if is_numeric(target) {
            ComposeTarget::Template(parse_template_id(target))
        } else {
            ComposeTarget::View(target.to_string())
        }
    }
}

impl From<String> for ComposeTarget {
    fn from(target: String) -> Self {
        ComposeTarget::from(target.as_str())
    }
}

/// Mailer bound to one api key.
///
/// `send` needs `&mut self` because it records the last API error; share a
/// mailer across tasks behind a lock.
pub struct Mailer<A: TransactionalApi = SendinblueClient> {
    config: Configuration,
    api: A,
    views: Arc<dyn ViewRenderer>,
    message_defaults: MessageDefaults,
    last_error: Option<ApiError>,
}

impl Mailer<SendinblueClient> {
    /// Build a mailer backed by the HTTP client.
    pub fn new(options: MailerOptions) -> SendinblueResult<Self> {
        Self::with_api(options, SendinblueClient::new())
    }

    pub fn from_env() -> SendinblueResult<Self> {
        Self::new(MailerOptions::from_env()?)
    }
}

impl<A: TransactionalApi> Mailer<A> {
    /// Build a mailer on top of any [`TransactionalApi`] implementation.
    pub fn with_api(options: MailerOptions, api: A) -> SendinblueResult<Self> {
        let config = resolve_configuration(OWNER, options.config, options.apikey.as_deref())?;
        Ok(Self {
            config,
            api,
            views: Arc::new(ViewEngine::new()),
            message_defaults: options.message_defaults,
            last_error: None,
        })
    }

    /// Use `views` to render view-based messages.
    pub fn with_views(mut self, views: impl ViewRenderer + 'static) -> Self {
        self.views = Arc::new(views);
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn message_defaults(&self) -> &MessageDefaults {
        &self.message_defaults
    }

    /// Error payload of the most recent failed send. A later successful
    /// send leaves it in place.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Replace the api key. The trimmed key applies to the next send.
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

    /// Create an empty message of either variant with the defaults applied.
    pub fn create_message(&self, use_template: bool) -> Message {
        let mut message = if use_template {
            Message::Template(TemplateMessage::new())
        } else {
            Message::Smtp(SmtpMessage::new())
        };

        let defaults = &self.message_defaults;
        if let Some(from) = &defaults.from {
            message.set_from(from);
        }
        if let Some(reply_to) = &defaults.reply_to {
            message.set_reply_to(reply_to);
        }
        if let Some(charset) = &defaults.charset {
            message.set_charset(charset);
        }

        message
    }

    /// Build a message.
    ///
    /// A template target yields a template message carrying `params` as its
    /// attributes (`{"PLACEHOLDER": ""}` when `params` is null). A view
    /// target renders the view with `params` into the bodies of a free-form
    /// message.
    pub fn compose(
        &self,
        target: impl Into<ComposeTarget>,
        params: Value,
    ) -> SendinblueResult<Message> {
        match target.into() {
            ComposeTarget::Template(id) => {
                let params = if params.is_null() {
                    json!({"PLACEHOLDER": ""})
                } else {
                    params
                };

                let mut message = self.create_message(true);
                if let Some(template) = message.as_template_mut() {
                    template.set_template(id).set_attributes(params);
                }
                Ok(message)
            }
            ComposeTarget::View(view) => {
                let rendered = self.views.render(&view, &params)?;

                let mut message = self.create_message(false);
                if let Some(html) = &rendered.html {
                    message.set_html_body(html);
                }
                if let Some(text) = &rendered.text {
                    message.set_text_body(text);
                }
                Ok(message)
            }
            ComposeTarget::Empty => Ok(self.create_message(false)),
        }
    }

    /// Send a message; `true` when the API accepted it.
    pub async fn send(&mut self, message: &Message) -> bool {
        self.try_send(message).await.is_ok()
    }

    /// Send a message and return the API's answer.
    ///
    /// Template messages go to the template endpoint, free-form messages to
    /// the transactional endpoint. An API error is also stored as
    /// [`last_error`](Self::last_error).
    #[instrument(skip_all, fields(template = message.is_template()))]
    pub async fn try_send(&mut self, message: &Message) -> SendinblueResult<SentEmail> {
        debug!(message = %message, "Sendinblue mailer sending email");

        let result = match message {
            Message::Template(template) => match template.template() {
                Some(template_id) => {
                    self.api
                        .send_template(&self.config, template_id, template.sendinblue_model())
                        .await
                }
                None => Err(SendinblueError::InvalidMessage(
                    "template message without a template id".to_string(),
                )),
            },
            Message::Smtp(smtp) => {
                self.api
                    .send_transac_email(&self.config, smtp.sendinblue_model())
                    .await
            }
        };

        match result {
            Ok(sent) => {
                info!(message_id = ?sent.message_id, "Sendinblue mailer sent email");
                Ok(sent)
            }
            Err(SendinblueError::Api(api)) => {
                error!(error = %api, "Sendinblue API client error");
                self.last_error = Some(api.clone());
                Err(SendinblueError::Api(api))
            }
            Err(e) => {
                error!(error = %e, "Sendinblue mailer error");
                Err(e)
            }
        }
    }

    /// Send messages one by one; returns how many were accepted.
    pub async fn send_multiple(&mut self, messages: &[Message]) -> usize {
        let mut sent = 0;
        for message in messages {
            if self.send(message).await {
                sent += 1;
            }
        }
        sent
    }
}

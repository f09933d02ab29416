//! HTTP implementation of the Sendinblue API contract.

use super::{ContactsApi, TransactionalApi};
use crate::config::{API_KEY, Configuration};
use crate::error::{ApiError, SendinblueResult};
use crate::models::{
    ContactDetails, CreateContact, CreateModel, SendEmail, SendSmtpEmail, SentEmail,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Sendinblue v3 client.
///
/// Holds only the connection pool; host, key and timeout are read from the
/// [`Configuration`] passed with every call, so a key changed on the owning
/// adapter applies to the next request.
#[derive(Debug, Clone, Default)]
pub struct SendinblueClient {
    client: Client,
}

impl SendinblueClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Reuse an existing reqwest client (proxy, TLS settings, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn url(config: &Configuration, path: &str) -> String {
        format!("{}{}", config.host(), path)
    }

    fn contact_url(config: &Configuration, email: &str) -> String {
        Self::url(config, &format!("/contacts/{}", urlencoding::encode(email)))
    }

    fn template_url(config: &Configuration, template_id: i64) -> String {
        Self::url(config, &format!("/smtp/templates/{}/send", template_id))
    }

    /// Send the request and decode a success body, or turn the failure
    /// payload into an [`ApiError`]. Empty success bodies decode to `T::default()`.
    async fn execute<T>(
        &self,
        config: &Configuration,
        request: RequestBuilder,
    ) -> SendinblueResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let mut request = request
            .header(API_KEY, config.api_key(API_KEY).unwrap_or_default())
            .header(USER_AGENT, config.user_agent())
            .header(ACCEPT, "application/json");

        if let Some(timeout) = config.timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        trace!(status = %status, body = %body, "Sendinblue response");

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), body).into());
        }

        if body.trim().is_empty() {
            return Ok(T::default());
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContactsApi for SendinblueClient {
    async fn create_contact(
        &self,
        config: &Configuration,
        contact: &CreateContact,
    ) -> SendinblueResult<CreateModel> {
        debug!(email = %contact.email, "POST /contacts");
        let request = self.client.post(Self::url(config, "/contacts")).json(contact);
        self.execute(config, request).await
    }

    async fn get_contact_info(
        &self,
        config: &Configuration,
        email: &str,
    ) -> SendinblueResult<ContactDetails> {
        debug!(email = %email, "GET /contacts/{{email}}");
        let request = self.client.get(Self::contact_url(config, email));
        self.execute(config, request).await
    }
}

#[async_trait]
impl TransactionalApi for SendinblueClient {
    async fn send_transac_email(
        &self,
        config: &Configuration,
        email: &SendSmtpEmail,
    ) -> SendinblueResult<SentEmail> {
        debug!("POST /smtp/email");
        let request = self.client.post(Self::url(config, "/smtp/email")).json(email);
        self.execute(config, request).await
    }

    async fn send_template(
        &self,
        config: &Configuration,
        template_id: i64,
        email: &SendEmail,
    ) -> SendinblueResult<SentEmail> {
        debug!(template_id, "POST /smtp/templates/{{id}}/send");
        let request = self
            .client
            .post(Self::template_url(config, template_id))
            .json(email);
        self.execute(config, request).await
    }
}

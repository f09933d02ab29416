//! Remote API contract.
//!
//! The contact manager and the mailer only see these traits; the HTTP
//! implementation lives in [`http`].

mod http;

pub use http::SendinblueClient;

use crate::config::Configuration;
use crate::error::SendinblueResult;
use crate::models::{
    ContactDetails, CreateContact, CreateModel, SendEmail, SendSmtpEmail, SentEmail,
};
use async_trait::async_trait;

/// Contacts endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactsApi: Send + Sync {
    /// Create a contact, or update it when `update_enabled` is set.
    async fn create_contact(
        &self,
        config: &Configuration,
        contact: &CreateContact,
    ) -> SendinblueResult<CreateModel>;

    /// Fetch the full record of a contact.
    async fn get_contact_info(
        &self,
        config: &Configuration,
        email: &str,
    ) -> SendinblueResult<ContactDetails>;
}

/// Transactional email endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionalApi: Send + Sync {
    /// Send a free-form email.
    async fn send_transac_email(
        &self,
        config: &Configuration,
        email: &SendSmtpEmail,
    ) -> SendinblueResult<SentEmail>;

    /// Send an email built from a stored template.
    async fn send_template(
        &self,
        config: &Configuration,
        template_id: i64,
        email: &SendEmail,
    ) -> SendinblueResult<SentEmail>;
}

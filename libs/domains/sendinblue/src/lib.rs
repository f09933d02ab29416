//! Sendinblue Domain
//!
//! Adapter around the Sendinblue (Brevo) v3 API for contacts and
//! transactional email.
//!
//! # Features
//!
//! - Contact creation with list membership and duplicate handling
//! - Contact lookup by email
//! - Free-form emails with html/text bodies and attachments
//! - Template emails with flattened, upper-cased attributes
//! - Handlebars views rendered into free-form message bodies
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │    Contacts     │     │     Mailer      │  ← compose / send
//! └────────┬────────┘     └────────┬────────┘
//!          │                       │
//!          │              ┌────────▼────────┐
//!          │              │ Smtp / Template │  ← Message variants
//!          │              └────────┬────────┘
//!          │                       │
//! ┌────────▼───────────────────────▼────────┐
//! │   ContactsApi / TransactionalApi        │  ← SendinblueClient (reqwest)
//! └────────────────────┬────────────────────┘
//!                      │
//!             ┌────────▼────────┐
//!             │ Sendinblue API  │
//!             └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_sendinblue::{MailMessage, Mailer, MailerOptions};
//! use serde_json::json;
//!
//! let mut mailer = Mailer::new(MailerOptions {
//!     apikey: Some(api_key),
//!     ..Default::default()
//! })?;
//!
//! let mut message = mailer.compose(12, json!({"order": {"id": 1001}}))?;
//! message.set_to("jane@example.com");
//!
//! if !mailer.send(&message).await {
//!     tracing::warn!(error = ?mailer.last_error(), "email rejected");
//! }
//! ```

pub mod client;
pub mod config;
pub mod contacts;
pub mod error;
pub mod mailer;
pub mod message;
pub mod models;
pub mod views;

pub use client::{ContactsApi, SendinblueClient, TransactionalApi};
pub use config::Configuration;
pub use contacts::{Contacts, ContactsOptions, CreateContactOutcome, DATE_FORMAT, format_date};
pub use error::{ApiError, SendinblueError, SendinblueResult};
pub use mailer::{ComposeTarget, Mailer, MailerOptions, MessageDefaults};
pub use message::{
    AttachmentOptions, MailMessage, Message, OneOrMany, SmtpMessage, TemplateMessage,
};
pub use models::*;
pub use views::{RenderedView, ViewEngine, ViewRenderer};

use super::{AttachmentOptions, MailMessage, OneOrMany};
use crate::models::{EmailAddress, SendSmtpEmail, SendSmtpEmailAttachment};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Free-form email sent through the transactional endpoint.
///
/// Every address is wrapped in an [`EmailAddress`] record; getters unwrap
/// them back to plain strings in the original order.
#[derive(Debug, Clone, Default)]
pub struct SmtpMessage {
    charset: Option<String>,
    model: SendSmtpEmail,
}

impl SmtpMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request body sent to the API.
    pub fn sendinblue_model(&self) -> &SendSmtpEmail {
        &self.model
    }

    pub fn attachments(&self) -> &[SendSmtpEmailAttachment] {
        self.model.attachment.as_deref().unwrap_or_default()
    }

    fn wrap_addresses(recipients: OneOrMany) -> Option<Vec<EmailAddress>> {
        if recipients.is_empty() {
            return None;
        }
        Some(recipients.into_vec().into_iter().map(EmailAddress::new).collect())
    }

    fn unwrap_addresses(recipients: &Option<Vec<EmailAddress>>) -> Option<Vec<String>> {
        recipients
            .as_ref()
            .map(|list| list.iter().map(|r| r.email.clone()).collect())
    }
}

impl MailMessage for SmtpMessage {
    fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    fn set_charset(&mut self, charset: &str) -> &mut Self {
        self.charset = Some(charset.to_string());
        self
    }

    fn from_address(&self) -> Option<&str> {
        self.model.sender.as_ref().map(|s| s.email.as_str())
    }

    fn set_from(&mut self, from: &str) -> &mut Self {
        self.model.sender = Some(EmailAddress::new(from));
        self
    }

    fn reply_to(&self) -> Option<&str> {
        self.model.reply_to.as_ref().map(|r| r.email.as_str())
    }

    fn set_reply_to(&mut self, reply_to: &str) -> &mut Self {
        self.model.reply_to = Some(EmailAddress::new(reply_to));
        self
    }

    fn to(&self) -> Option<Vec<String>> {
        Self::unwrap_addresses(&self.model.to)
    }

    fn set_to(&mut self, to: impl Into<OneOrMany>) -> &mut Self {
        self.model.to = Self::wrap_addresses(to.into());
        self
    }

    fn cc(&self) -> Option<Vec<String>> {
        Self::unwrap_addresses(&self.model.cc)
    }

    fn set_cc(&mut self, cc: impl Into<OneOrMany>) -> &mut Self {
        self.model.cc = Self::wrap_addresses(cc.into());
        self
    }

    fn bcc(&self) -> Option<Vec<String>> {
        Self::unwrap_addresses(&self.model.bcc)
    }

    fn set_bcc(&mut self, bcc: impl Into<OneOrMany>) -> &mut Self {
        self.model.bcc = Self::wrap_addresses(bcc.into());
        self
    }

    fn subject(&self) -> Option<&str> {
        self.model.subject.as_deref()
    }

    fn set_subject(&mut self, subject: &str) -> &mut Self {
        self.model.subject = Some(subject.to_string());
        self
    }

    fn set_text_body(&mut self, text: &str) -> &mut Self {
        self.model.text_content = Some(text.to_string());
        self
    }

    fn set_html_body(&mut self, html: &str) -> &mut Self {
        self.model.html_content = Some(html.to_string());
        self
    }

    fn attach_content(&mut self, content: &[u8], options: AttachmentOptions) -> &mut Self {
        self.model
            .attachment
            .get_or_insert_with(Vec::new)
            .push(SendSmtpEmailAttachment {
                content: Some(STANDARD.encode(content)),
                name: options.file_name,
                url: None,
            });
        self
    }

    fn to_json(&self) -> String {
        serde_json::to_string(&self.model).unwrap_or_default()
    }
}

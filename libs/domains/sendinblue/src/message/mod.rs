//! Outgoing email messages.
//!
//! Two variants share one setter/getter surface ([`MailMessage`]):
//!
//! - [`SmtpMessage`]: free-form email (subject, bodies, attachments)
//! - [`TemplateMessage`]: email rendered remotely from a stored template
//!
//! [`Message`] is what the mailer composes and sends.

mod attributes;
mod smtp;
mod template;

pub use attributes::{KEY_SEPARATOR, flatten_attributes, flatten_record};
pub use smtp::SmtpMessage;
pub use template::{TemplateMessage, is_numeric, parse_template_id};

use crate::error::SendinblueResult;
use std::path::Path;

/// One value or a list of values, as accepted by list-valued setters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneOrMany(Vec<String>);

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for OneOrMany {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&String> for OneOrMany {
    fn from(value: &String) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for OneOrMany {
    fn from(values: &[&str]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}

impl From<&[String]> for OneOrMany {
    fn from(values: &[String]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Options recognised when attaching content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentOptions {
    /// Name shown to the recipient.
    pub file_name: Option<String>,
    /// MIME type. The API infers it from the name, so it is not transmitted.
    pub content_type: Option<String>,
}

impl AttachmentOptions {
    pub fn named(file_name: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: None,
        }
    }
}

/// Uniform surface of both message variants.
///
/// Setters return `&mut Self` for chaining. Fields a variant does not
/// support are accepted and ignored.
pub trait MailMessage {
    fn charset(&self) -> Option<&str>;
    fn set_charset(&mut self, charset: &str) -> &mut Self;

    fn from_address(&self) -> Option<&str>;
    fn set_from(&mut self, from: &str) -> &mut Self;

    fn reply_to(&self) -> Option<&str>;
    fn set_reply_to(&mut self, reply_to: &str) -> &mut Self;

    fn to(&self) -> Option<Vec<String>>;
    fn set_to(&mut self, to: impl Into<OneOrMany>) -> &mut Self;

    fn cc(&self) -> Option<Vec<String>>;
    fn set_cc(&mut self, cc: impl Into<OneOrMany>) -> &mut Self;

    fn bcc(&self) -> Option<Vec<String>>;
    fn set_bcc(&mut self, bcc: impl Into<OneOrMany>) -> &mut Self;

    fn subject(&self) -> Option<&str>;
    fn set_subject(&mut self, subject: &str) -> &mut Self;

    fn set_text_body(&mut self, text: &str) -> &mut Self;
    fn set_html_body(&mut self, html: &str) -> &mut Self;

    /// Append `content` as a base64 encoded attachment.
    fn attach_content(&mut self, content: &[u8], options: AttachmentOptions) -> &mut Self;

    /// Append the file at `path`. The attachment is named after the file
    /// unless `options.file_name` is set.
    fn attach(
        &mut self,
        path: impl AsRef<Path>,
        mut options: AttachmentOptions,
    ) -> SendinblueResult<&mut Self>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let content = std::fs::read(path)?;

        if options.file_name.is_none() {
            options.file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }

        Ok(self.attach_content(&content, options))
    }

    /// Inline content is sent as a regular attachment.
    fn embed(
        &mut self,
        path: impl AsRef<Path>,
        options: AttachmentOptions,
    ) -> SendinblueResult<&mut Self>
    where
        Self: Sized,
    {
        self.attach(path, options)
    }

    fn embed_content(&mut self, content: &[u8], options: AttachmentOptions) -> &mut Self {
        self.attach_content(content, options)
    }

    /// JSON rendering of the request body.
    fn to_json(&self) -> String;
}

/// A composed message, exactly one of the two variants.
#[derive(Debug, Clone)]
pub enum Message {
    Smtp(SmtpMessage),
    Template(TemplateMessage),
}

impl Message {
    pub fn is_template(&self) -> bool {
        matches!(self, Message::Template(_))
    }

    pub fn as_smtp(&self) -> Option<&SmtpMessage> {
        match self {
            Message::Smtp(message) => Some(message),
            Message::Template(_) => None,
        }
    }

    pub fn as_smtp_mut(&mut self) -> Option<&mut SmtpMessage> {
        match self {
            Message::Smtp(message) => Some(message),
            Message::Template(_) => None,
        }
    }

    pub fn as_template(&self) -> Option<&TemplateMessage> {
        match self {
            Message::Template(message) => Some(message),
            Message::Smtp(_) => None,
        }
    }

    pub fn as_template_mut(&mut self) -> Option<&mut TemplateMessage> {
        match self {
            Message::Template(message) => Some(message),
            Message::Smtp(_) => None,
        }
    }
}

impl From<SmtpMessage> for Message {
    fn from(message: SmtpMessage) -> Self {
        Message::Smtp(message)
    }
}

impl From<TemplateMessage> for Message {
    fn from(message: TemplateMessage) -> Self {
        Message::Template(message)
    }
}

macro_rules! dispatch {
    ($self:ident, $message:ident => $call:expr) => {
        match $self {
            Message::Smtp($message) => $call,
            Message::Template($message) => $call,
        }
    };
}

macro_rules! dispatch_mut {
    ($self:ident, $message:ident => $call:expr) => {{
        match $self {
            Message::Smtp($message) => {
                $call;
            }
            Message::Template($message) => {
                $call;
            }
        }
        $self
    }};
}

impl MailMessage for Message {
    fn charset(&self) -> Option<&str> {
        dispatch!(self, m => m.charset())
    }

    fn set_charset(&mut self, charset: &str) -> &mut Self {
        dispatch_mut!(self, m => m.set_charset(charset))
    }

    fn from_address(&self) -> Option<&str> {
        dispatch!(self, m => m.from_address())
    }

    fn set_from(&mut self, from: &str) -> &mut Self {
        dispatch_mut!(self, m => m.set_from(from))
    }

    fn reply_to(&self) -> Option<&str> {
        dispatch!(self, m => m.reply_to())
    }

    fn set_reply_to(&mut self, reply_to: &str) -> &mut Self {
        dispatch_mut!(self, m => m.set_reply_to(reply_to))
    }

    fn to(&self) -> Option<Vec<String>> {
        dispatch!(self, m => m.to())
    }

    fn set_to(&mut self, to: impl Into<OneOrMany>) -> &mut Self {
        let to = to.into();
        dispatch_mut!(self, m => m.set_to(to))
    }

    fn cc(&self) -> Option<Vec<String>> {
        dispatch!(self, m => m.cc())
    }

    fn set_cc(&mut self, cc: impl Into<OneOrMany>) -> &mut Self {
        let cc = cc.into();
        dispatch_mut!(self, m => m.set_cc(cc))
    }

    fn bcc(&self) -> Option<Vec<String>> {
        dispatch!(self, m => m.bcc())
    }

    fn set_bcc(&mut self, bcc: impl Into<OneOrMany>) -> &mut Self {
        let bcc = bcc.into();
        dispatch_mut!(self, m => m.set_bcc(bcc))
    }

    fn subject(&self) -> Option<&str> {
        dispatch!(self, m => m.subject())
    }

    fn set_subject(&mut self, subject: &str) -> &mut Self {
        dispatch_mut!(self, m => m.set_subject(subject))
    }

    fn set_text_body(&mut self, text: &str) -> &mut Self {
        dispatch_mut!(self, m => m.set_text_body(text))
    }

    fn set_html_body(&mut self, html: &str) -> &mut Self {
        dispatch_mut!(self, m => m.set_html_body(html))
    }

    fn attach_content(&mut self, content: &[u8], options: AttachmentOptions) -> &mut Self {
        dispatch_mut!(self, m => m.attach_content(content, options))
    }

    fn to_json(&self) -> String {
        dispatch!(self, m => m.to_json())
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn variants() -> Vec<Message> {
        vec![
            Message::Smtp(SmtpMessage::new()),
            Message::Template(TemplateMessage::new()),
        ]
    }

    #[test]
    fn test_one_or_many_conversions() {
        assert_eq!(OneOrMany::from("a@example.com").into_vec(), vec!["a@example.com"]);
        assert_eq!(
            OneOrMany::from(["a@example.com", "b@example.com"]).into_vec(),
            vec!["a@example.com", "b@example.com"]
        );
        assert!(OneOrMany::from(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_single_recipient_reads_back_as_list_for_both_variants() {
        for mut message in variants() {
            message.set_to("x@a.com");
            assert_eq!(message.to(), Some(vec!["x@a.com".to_string()]));
        }
    }

    #[test]
    fn test_recipient_list_keeps_order_for_both_variants() {
        for mut message in variants() {
            message
                .set_to(vec!["x@a.com", "y@a.com"])
                .set_cc(["c1@a.com", "c2@a.com"])
                .set_bcc("b@a.com");

            assert_eq!(
                message.to(),
                Some(vec!["x@a.com".to_string(), "y@a.com".to_string()])
            );
            assert_eq!(
                message.cc(),
                Some(vec!["c1@a.com".to_string(), "c2@a.com".to_string()])
            );
            assert_eq!(message.bcc(), Some(vec!["b@a.com".to_string()]));
        }
    }

    #[test]
    fn test_template_variant_ignores_exclusive_fields() {
        let mut message = Message::Template(TemplateMessage::new());
        message
            .set_from("from@example.com")
            .set_subject("Subject")
            .set_text_body("text")
            .set_html_body("<p>html</p>");

        assert_eq!(message.from_address(), None);
        assert_eq!(message.subject(), None);
        assert_eq!(
            message.as_template().unwrap().sendinblue_model(),
            TemplateMessage::new().sendinblue_model()
        );
    }

    #[test]
    fn test_attach_content_appends_for_both_variants() {
        for mut message in variants() {
            message
                .attach_content(b"first", AttachmentOptions::named("one.txt"))
                .embed_content(b"second", AttachmentOptions::default());

            let contents: Vec<String> = match &message {
                Message::Smtp(m) => m
                    .attachments()
                    .iter()
                    .filter_map(|a| a.content.clone())
                    .collect(),
                Message::Template(m) => m.attachments().iter().map(|a| a.content.clone()).collect(),
            };

            assert_eq!(contents.len(), 2);
            assert_eq!(STANDARD.decode(&contents[0]).unwrap(), b"first");
            assert_eq!(STANDARD.decode(&contents[1]).unwrap(), b"second");
        }
    }

    #[test]
    fn test_attach_reads_file_and_names_it() {
        let path = std::env::temp_dir().join(format!("attach-{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"id,total\n1,10\n").unwrap();

        let mut message = Message::Smtp(SmtpMessage::new());
        message.attach(&path, AttachmentOptions::default()).unwrap();
        message
            .embed(&path, AttachmentOptions::named("report.csv"))
            .unwrap();

        let attachments = message.as_smtp().unwrap().attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(
            attachments[0].name.as_deref(),
            path.file_name().and_then(|n| n.to_str())
        );
        assert_eq!(attachments[1].name.as_deref(), Some("report.csv"));
        assert_eq!(
            STANDARD.decode(attachments[0].content.as_deref().unwrap()).unwrap(),
            b"id,total\n1,10\n"
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_attach_missing_file_is_io_error() {
        let mut message = Message::Template(TemplateMessage::new());
        let err = message
            .attach("/definitely/not/here.pdf", AttachmentOptions::default())
            .unwrap_err();
        assert!(matches!(err, crate::error::SendinblueError::Io(_)));
    }

    #[test]
    fn test_display_renders_model_json() {
        let mut message = Message::Smtp(SmtpMessage::new());
        message.set_subject("Hello");
        assert_eq!(message.to_string(), r#"{"subject":"Hello"}"#);
    }
}

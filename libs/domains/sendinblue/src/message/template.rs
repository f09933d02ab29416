use super::attributes::flatten_attributes;
use super::{AttachmentOptions, MailMessage, OneOrMany};
use crate::error::SendinblueResult;
use crate::models::{SendEmail, SendEmailAttachment};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Email rendered remotely from a stored template.
///
/// Sender, subject and bodies belong to the template: their setters are
/// accepted and ignored, and `from_address()` / `subject()` are always `None`.
#[derive(Debug, Clone, Default)]
pub struct TemplateMessage {
    charset: Option<String>,
    template: Option<i64>,
    attributes: Option<Value>,
    model: SendEmail,
}

impl TemplateMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request body sent to the API.
    pub fn sendinblue_model(&self) -> &SendEmail {
        &self.model
    }

    pub fn template(&self) -> Option<i64> {
        self.template
    }

    pub fn set_template(&mut self, template: i64) -> &mut Self {
        self.template = Some(template);
        self
    }

    /// Set the template from a loosely typed id, see [`parse_template_id`].
    pub fn set_template_str(&mut self, template: &str) -> &mut Self {
        self.set_template(parse_template_id(template))
    }

    /// Flattened attributes, as transmitted.
    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        self.model.attributes.as_ref()
    }

    /// Attributes in the nested form they were set with.
    pub fn attributes_original(&self) -> Option<&Value> {
        self.attributes.as_ref()
    }

    pub fn set_attributes(&mut self, attributes: Value) -> &mut Self {
        self.model.attributes = Some(flatten_attributes(&attributes));
        self.attributes = Some(attributes);
        self
    }

    /// Set attributes from any serializable record.
    pub fn set_attributes_from<T: Serialize>(
        &mut self,
        attributes: &T,
    ) -> SendinblueResult<&mut Self> {
        let value = serde_json::to_value(attributes)?;
        Ok(self.set_attributes(value))
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.model.tags.as_deref()
    }

    pub fn set_tags(&mut self, tags: impl Into<OneOrMany>) -> &mut Self {
        self.model.tags = Some(tags.into().into_vec());
        self
    }

    /// Custom headers, `None` when no header is set.
    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.model.headers.as_ref().filter(|headers| !headers.is_empty())
    }

    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.model.headers = Some(
            headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn attachments(&self) -> &[SendEmailAttachment] {
        self.model.attachment.as_deref().unwrap_or_default()
    }
}

impl MailMessage for TemplateMessage {
    fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    fn set_charset(&mut self, charset: &str) -> &mut Self {
        self.charset = Some(charset.to_string());
        self
    }

    fn from_address(&self) -> Option<&str> {
        None
    }

    fn set_from(&mut self, _from: &str) -> &mut Self {
        self
    }

    fn reply_to(&self) -> Option<&str> {
        self.model.reply_to.as_deref()
    }

    fn set_reply_to(&mut self, reply_to: &str) -> &mut Self {
        self.model.reply_to = Some(reply_to.to_string());
        self
    }

    fn to(&self) -> Option<Vec<String>> {
        Some(self.model.email_to.clone()).filter(|to| !to.is_empty())
    }

    fn set_to(&mut self, to: impl Into<OneOrMany>) -> &mut Self {
        self.model.email_to = to.into().into_vec();
        self
    }

    fn cc(&self) -> Option<Vec<String>> {
        self.model.email_cc.clone()
    }

    fn set_cc(&mut self, cc: impl Into<OneOrMany>) -> &mut Self {
        self.model.email_cc = Some(cc.into().into_vec()).filter(|cc| !cc.is_empty());
        self
    }

    fn bcc(&self) -> Option<Vec<String>> {
        self.model.email_bcc.clone()
    }

    fn set_bcc(&mut self, bcc: impl Into<OneOrMany>) -> &mut Self {
        self.model.email_bcc = Some(bcc.into().into_vec()).filter(|bcc| !bcc.is_empty());
        self
    }

    fn subject(&self) -> Option<&str> {
        None
    }

    fn set_subject(&mut self, _subject: &str) -> &mut Self {
        self
    }

    fn set_text_body(&mut self, _text: &str) -> &mut Self {
        self
    }

    fn set_html_body(&mut self, _html: &str) -> &mut Self {
        self
    }

    fn attach_content(&mut self, content: &[u8], options: AttachmentOptions) -> &mut Self {
        self.model
            .attachment
            .get_or_insert_with(Vec::new)
            .push(SendEmailAttachment {
                content: STANDARD.encode(content),
                name: options.file_name,
            });
        self
    }

    fn to_json(&self) -> String {
        serde_json::to_string(&self.model).unwrap_or_default()
    }
}

/// Integer value of a template id given as text.
///
/// Numeric text (see [`is_numeric`]) is truncated towards zero, so `"7.9"`
/// gives 7 and `"1e3"` gives 1000. Other text yields its leading integer
/// (optional sign and digits after whitespace), or `0` without one.
pub fn parse_template_id(raw: &str) -> i64 {
    let raw = raw.trim();
    if is_numeric(raw) {
        if let Ok(value) = raw.parse::<f64>() {
            return value as i64;
        }
    }

    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let value = digits[..end].parse::<i64>().unwrap_or(0);
    if negative { -value } else { value }
}

/// Decimal number with optional sign, fraction and exponent. Surrounding
/// whitespace is allowed; `inf`, `nan` and hex forms are not numeric.
pub fn is_numeric(raw: &str) -> bool {
    let raw = raw.trim();
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = !(whole.is_empty() && fraction.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit());

    let exponent_ok = exponent.is_none_or(|exp| {
        let digits = exp.strip_prefix(['-', '+']).unwrap_or(exp);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    });

    mantissa_ok && exponent_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_id() {
        let mut message = TemplateMessage::new();
        assert_eq!(message.template(), None);

        message.set_template(12);
        assert_eq!(message.template(), Some(12));

        message.set_template_str("34");
        assert_eq!(message.template(), Some(34));
    }

    #[test]
    fn test_parse_template_id() {
        assert_eq!(parse_template_id("7"), 7);
        assert_eq!(parse_template_id(" 42abc"), 42);
        assert_eq!(parse_template_id("-3"), -3);
        assert_eq!(parse_template_id("welcome"), 0);
        assert_eq!(parse_template_id(""), 0);
        assert_eq!(parse_template_id("7.9"), 7);
        assert_eq!(parse_template_id("1e3"), 1000);
        assert_eq!(parse_template_id(" 2E+2 "), 200);
        assert_eq!(parse_template_id("12e"), 12);
    }

    #[test]
    fn test_is_numeric() {
        for numeric in ["12", " -4 ", "+1.5", ".5", "5.", "1e3", "2.5E-1"] {
            assert!(is_numeric(numeric), "{numeric:?} should be numeric");
        }
        for text in ["", ".", "e3", "1e", "1e+", "inf", "NaN", "0x1A", "12abc", "1 2"] {
            assert!(!is_numeric(text), "{text:?} should not be numeric");
        }
    }

    #[test]
    fn test_recipients_are_plain_lists() {
        let mut message = TemplateMessage::new();
        assert_eq!(message.to(), None);
        assert_eq!(message.cc(), None);
        assert_eq!(message.bcc(), None);

        message.set_to("to@example.com").set_cc(vec!["c1@example.com", "c2@example.com"]);

        assert_eq!(message.sendinblue_model().email_to, vec!["to@example.com"]);
        assert_eq!(
            message.sendinblue_model().email_cc,
            Some(vec!["c1@example.com".to_string(), "c2@example.com".to_string()])
        );
    }

    #[test]
    fn test_reply_to_passthrough() {
        let mut message = TemplateMessage::new();
        assert_eq!(message.reply_to(), None);

        message.set_reply_to("reply@example.com");
        assert_eq!(message.reply_to(), Some("reply@example.com"));
        assert_eq!(
            message.sendinblue_model().reply_to.as_deref(),
            Some("reply@example.com")
        );
    }

    #[test]
    fn test_exclusive_fields_are_noops() {
        let mut message = TemplateMessage::new();
        message
            .set_from("from@example.com")
            .set_subject("Ignored")
            .set_text_body("ignored")
            .set_html_body("<p>ignored</p>");

        assert_eq!(message.from_address(), None);
        assert_eq!(message.subject(), None);
        assert_eq!(message.to_json(), r#"{"emailTo":[]}"#);
    }

    #[test]
    fn test_attributes_flattened_and_original() {
        let mut message = TemplateMessage::new();
        assert_eq!(message.attributes(), None);
        assert_eq!(message.attributes_original(), None);

        let nested = json!({"order": {"id": 1001, "total": "10.00"}, "name": "Jane"});
        message.set_attributes(nested.clone());

        assert_eq!(message.attributes_original(), Some(&nested));
        assert_eq!(
            message.attributes().cloned().map(Value::Object),
            Some(json!({"ORDER__ID": 1001, "ORDER__TOTAL": "10.00", "NAME": "Jane"}))
        );
    }

    #[test]
    fn test_attributes_from_record() {
        #[derive(Serialize)]
        struct Welcome<'a> {
            first_name: &'a str,
            plan: Plan,
        }

        #[derive(Serialize)]
        struct Plan {
            name: String,
            seats: u32,
        }

        let mut message = TemplateMessage::new();
        message
            .set_attributes_from(&Welcome {
                first_name: "Jane",
                plan: Plan {
                    name: "team".to_string(),
                    seats: 5,
                },
            })
            .unwrap();

        let attributes = message.attributes().unwrap();
        assert_eq!(attributes["FIRST_NAME"], json!("Jane"));
        assert_eq!(attributes["PLAN__NAME"], json!("team"));
        assert_eq!(attributes["PLAN__SEATS"], json!(5));
    }

    #[test]
    fn test_tags() {
        let mut message = TemplateMessage::new();
        assert_eq!(message.tags(), None);

        message.set_tags("welcome");
        assert_eq!(message.tags(), Some(&["welcome".to_string()][..]));

        message.set_tags(["welcome", "onboarding"]);
        assert_eq!(message.tags().map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_headers() {
        let mut message = TemplateMessage::new();
        assert_eq!(message.headers(), None);

        message.set_headers(Vec::<(String, String)>::new());
        assert_eq!(message.headers(), None);

        message.set_headers([("X-Mailin-custom", "order:1001"), ("idempotencyKey", "abc")]);
        let headers = message.headers().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-Mailin-custom"], "order:1001");
    }

    #[test]
    fn test_attach_content_twice_appends() {
        let mut message = TemplateMessage::new();
        message
            .attach_content(b"abc", AttachmentOptions::named("abc.txt"))
            .attach_content(b"def", AttachmentOptions::named("def.txt"));

        let attachments = message.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].content, "YWJj");
        assert_eq!(attachments[1].content, "ZGVm");
        assert_eq!(attachments[1].name.as_deref(), Some("def.txt"));
    }
}

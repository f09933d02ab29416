//! Request and response models of the Sendinblue v3 API.
//!
//! Only the fields this crate reads or writes are modelled. Field names
//! follow the API's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// Transactional email (`POST /smtp/email`)
// ============================================================================

/// Address record used for sender, recipients and reply-to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }
}

/// Attachment of a transactional email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSmtpEmailAttachment {
    /// Base64 encoded content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absolute URL of a remote attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Body of a transactional email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmtpEmail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<EmailAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<EmailAddress>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<EmailAddress>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<EmailAddress>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<EmailAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Vec<SendSmtpEmailAttachment>>,
}

// ============================================================================
// Template email (`POST /smtp/templates/{templateId}/send`)
// ============================================================================

/// Attachment of a template email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailAttachment {
    /// Base64 encoded content.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of a template email. Sender and subject come from the template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmail {
    #[serde(default)]
    pub email_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_cc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_bcc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Vec<SendEmailAttachment>>,
}

/// Acknowledgement of an accepted email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmail {
    #[serde(default)]
    pub message_id: Option<String>,
}

// ============================================================================
// Contacts (`POST /contacts`, `GET /contacts/{email}`)
// ============================================================================

/// Body of a contact creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_ids: Option<Vec<i64>>,
    pub update_enabled: bool,
}

/// Identifier assigned to a created contact. Updates answer without a body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateModel {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Full contact record as stored remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub email: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email_blacklisted: bool,
    #[serde(default)]
    pub sms_blacklisted: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub list_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_unsubscribed: Option<Vec<i64>>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Value>,
}

/// Error payload returned with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModel {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_smtp_email_skips_unset_fields() {
        let email = SendSmtpEmail {
            sender: Some(EmailAddress::new("from@example.com")),
            to: Some(vec![EmailAddress::new("to@example.com")]),
            subject: Some("Hello".to_string()),
            reply_to: Some(EmailAddress::new("reply@example.com")),
            ..Default::default()
        };

        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(
            value,
            json!({
                "sender": {"email": "from@example.com"},
                "to": [{"email": "to@example.com"}],
                "replyTo": {"email": "reply@example.com"},
                "subject": "Hello",
            })
        );
    }

    #[test]
    fn test_send_email_uses_camel_case() {
        let email = SendEmail {
            email_to: vec!["to@example.com".to_string()],
            email_cc: Some(vec!["cc@example.com".to_string()]),
            reply_to: Some("reply@example.com".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(value["emailTo"], json!(["to@example.com"]));
        assert_eq!(value["emailCc"], json!(["cc@example.com"]));
        assert_eq!(value["replyTo"], json!("reply@example.com"));
        assert!(value.get("emailBcc").is_none());
    }

    #[test]
    fn test_create_contact_always_sends_update_flag() {
        let contact = CreateContact {
            email: "someone@example.com".to_string(),
            attributes: None,
            list_ids: None,
            update_enabled: false,
        };

        assert_eq!(
            serde_json::to_value(&contact).unwrap(),
            json!({"email": "someone@example.com", "updateEnabled": false})
        );
    }

    #[test]
    fn test_contact_details_deserialize() {
        let details: ContactDetails = serde_json::from_value(json!({
            "email": "someone@example.com",
            "id": 42,
            "emailBlacklisted": false,
            "smsBlacklisted": true,
            "createdAt": "2017-05-02T16:40:31.000+02:00",
            "modifiedAt": "2017-05-02T16:40:31Z",
            "listIds": [2, 4],
            "attributes": {"FIRSTNAME": "Jane"}
        }))
        .unwrap();

        assert_eq!(details.id, Some(42));
        assert!(details.sms_blacklisted);
        assert_eq!(details.list_ids, vec![2, 4]);
        assert_eq!(details.attributes["FIRSTNAME"], json!("Jane"));
        assert!(details.created_at.is_some());
    }
}

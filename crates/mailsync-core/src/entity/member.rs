//! MailChimp list member (subscriber)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SyncEntity;
use crate::error::{Error, Result};
use crate::validation::{FieldRule, FieldType, RuleSet};

/// Subscriber's current status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Subscribed,
    Unsubscribed,
    Cleaned,
    Pending,
}

/// Type of email the member asked to receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Html,
    Text,
}

/// Subscriber location; coordinates are kept exactly as supplied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingPermission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_permission_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Remote-facing member fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFields {
    pub email_address: String,
    pub status: MemberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_type: Option<EmailType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_fields: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_permissions: Option<Vec<MarketingPermission>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_signup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_signup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_opt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_opt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl MemberFields {
    /// Minimal field set: an address and a status
    pub fn new(email_address: impl Into<String>, status: MemberStatus) -> Self {
        Self {
            email_address: email_address.into(),
            status,
            email_type: None,
            merge_fields: None,
            interests: None,
            language: None,
            vip: None,
            location: None,
            marketing_permissions: None,
            ip_signup: None,
            timestamp_signup: None,
            ip_opt: None,
            timestamp_opt: None,
            tags: None,
        }
    }
}

const MEMBER_RULES: &RuleSet = &[
    FieldRule::required("email_address", FieldType::String),
    FieldRule::nullable("email_type", FieldType::String).one_of(&["html", "text"]),
    FieldRule::required("status", FieldType::String).one_of(&[
        "subscribed",
        "unsubscribed",
        "cleaned",
        "pending",
    ]),
    FieldRule::nullable("merge_fields", FieldType::Object),
    FieldRule::nullable("interests", FieldType::Object),
    FieldRule::nullable("language", FieldType::String),
    FieldRule::nullable("vip", FieldType::Boolean),
    FieldRule::nullable("location", FieldType::Object),
    FieldRule::nullable("location.latitude", FieldType::Numeric),
    FieldRule::nullable("location.longitude", FieldType::Numeric),
    FieldRule::nullable("marketing_permissions", FieldType::Array),
    FieldRule::required("marketing_permissions.*", FieldType::Object),
    FieldRule::nullable(
        "marketing_permissions.*.marketing_permission_id",
        FieldType::String,
    ),
    FieldRule::nullable("marketing_permissions.*.enabled", FieldType::Boolean),
    FieldRule::nullable("ip_signup", FieldType::Ip),
    FieldRule::nullable("timestamp_signup", FieldType::String),
    FieldRule::nullable("ip_opt", FieldType::Ip),
    FieldRule::nullable("timestamp_opt", FieldType::String),
    FieldRule::nullable("tags", FieldType::Array),
    FieldRule::required("tags.*", FieldType::String),
];

/// A member of a MailChimp list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailChimpMember {
    /// Local identifier, assigned by the store on first save
    pub member_id: Option<String>,
    /// MailChimp's identifier, set once the remote create succeeds
    pub mail_chimp_id: Option<String>,
    /// Local identifier of the owning list
    pub list_id: String,
    #[serde(flatten)]
    pub fields: MemberFields,
}

impl SyncEntity for MailChimpMember {
    type Fields = MemberFields;

    const KIND: &'static str = "MailChimpMember";
    const TABLE: &'static str = "mail_chimp_member";
    const PARENT_KIND: Option<&'static str> = Some(super::MailChimpList::KIND);

    fn new(parent_id: Option<String>, fields: MemberFields) -> Result<Self> {
        let list_id = parent_id
            .ok_or_else(|| Error::config("MailChimpMember must belong to a MailChimpList"))?;
        Ok(Self {
            member_id: None,
            mail_chimp_id: None,
            list_id,
            fields,
        })
    }

    fn rules() -> &'static RuleSet {
        MEMBER_RULES
    }

    fn collection_path(parent_remote_id: Option<&str>) -> String {
        format!("lists/{}/members", parent_remote_id.unwrap_or_default())
    }

    fn local_id(&self) -> Option<&str> {
        self.member_id.as_deref()
    }

    fn set_local_id(&mut self, id: String) {
        self.member_id = Some(id);
    }

    fn remote_id(&self) -> Option<&str> {
        self.mail_chimp_id.as_deref()
    }

    fn set_remote_id(&mut self, id: String) {
        self.mail_chimp_id = Some(id);
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.list_id)
    }

    fn fields(&self) -> &MemberFields {
        &self.fields
    }

    fn set_fields(&mut self, fields: MemberFields) {
        self.fields = fields;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_remote_payload_excludes_identifiers() {
        let mut member = MailChimpMember::new(
            Some("list-1".to_string()),
            MemberFields::new("a@b.com", MemberStatus::Subscribed),
        )
        .unwrap();
        member.set_local_id("local-1".to_string());
        member.set_remote_id("remote-1".to_string());

        let payload = member.remote_payload().unwrap();
        assert_eq!(payload.get("email_address"), Some(&json!("a@b.com")));
        assert_eq!(payload.get("status"), Some(&json!("subscribed")));
        assert!(!payload.contains_key("member_id"));
        assert!(!payload.contains_key("mail_chimp_id"));
        assert!(!payload.contains_key("list_id"));
        assert!(!payload.contains_key("vip"));
    }

    #[test]
    fn test_public_representation_carries_identifiers() {
        let member = MailChimpMember::new(
            Some("list-1".to_string()),
            MemberFields::new("a@b.com", MemberStatus::Pending),
        )
        .unwrap();

        let public = serde_json::to_value(&member).unwrap();
        assert_eq!(public["list_id"], json!("list-1"));
        assert_eq!(public["member_id"], Value::Null);
        assert_eq!(public["mail_chimp_id"], Value::Null);
        assert_eq!(public["status"], json!("pending"));
    }

    #[test]
    fn test_member_requires_parent() {
        let result =
            MailChimpMember::new(None, MemberFields::new("a@b.com", MemberStatus::Subscribed));
        assert!(result.is_err());
    }

    #[test]
    fn test_descriptive_fields_round_trip_verbatim() {
        let input = object(json!({
            "email_address": "test-task@test.com.ua",
            "email_type": "html",
            "status": "subscribed",
            "language": "en",
            "vip": false,
            "location": { "latitude": "13.756331", "longitude": 100.501762 },
            "marketing_permissions": [{ "marketing_permission_id": "mp1", "enabled": true }],
            "ip_signup": "202.44.213.160",
            "timestamp_signup": "2019-03-27T17:25:58+00:00",
            "ip_opt": "202.44.213.161",
            "timestamp_opt": "2019-03-27T17:28:58+00:00",
            "tags": ["vip", "2019"],
        }));

        entity::validate::<MailChimpMember>(&input).unwrap();
        let fields = entity::decode::<MailChimpMember>(input.clone()).unwrap();
        let member = MailChimpMember::new(Some("list-1".to_string()), fields).unwrap();

        assert_eq!(member.remote_payload().unwrap(), input);
    }

    #[test]
    fn test_merge_patch_keeps_unsupplied_fields() {
        let mut fields = MemberFields::new("a@b.com", MemberStatus::Subscribed);
        fields.language = Some("en".to_string());
        let member = MailChimpMember::new(Some("list-1".to_string()), fields).unwrap();

        let merged =
            entity::merged(&member, object(json!({ "email_type": "text", "member_id": "x" })))
                .unwrap();
        assert_eq!(merged["email_type"], json!("text"));
        assert_eq!(merged["language"], json!("en"));
        assert_eq!(merged["email_address"], json!("a@b.com"));
        assert!(!merged.contains_key("member_id"));
    }

    #[test]
    fn test_collection_path_uses_parent_remote_id() {
        assert_eq!(
            MailChimpMember::collection_path(Some("abc123")),
            "lists/abc123/members"
        );
    }
}

//! MailChimp audience list

use serde::{Deserialize, Serialize};

use super::SyncEntity;
use crate::error::Result;
use crate::validation::{FieldRule, FieldType, RuleSet};

/// Whether the list's archive is public
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Pub,
    Prv,
}

/// Postal contact shown in campaign footers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub company: String,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Defaults applied to campaigns sent to the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDefaults {
    pub from_name: String,
    pub from_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub language: String,
}

/// Remote-facing list fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListFields {
    pub name: String,
    pub permission_reminder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_archive_bar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_on_subscribe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_on_unsubscribe: Option<String>,
    pub email_type_option: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub contact: Contact,
    pub campaign_defaults: CampaignDefaults,
}

const LIST_RULES: &RuleSet = &[
    FieldRule::required("name", FieldType::String),
    FieldRule::required("permission_reminder", FieldType::String),
    FieldRule::nullable("use_archive_bar", FieldType::Boolean),
    FieldRule::nullable("notify_on_subscribe", FieldType::Email),
    FieldRule::nullable("notify_on_unsubscribe", FieldType::Email),
    FieldRule::required("email_type_option", FieldType::Boolean),
    FieldRule::nullable("visibility", FieldType::String).one_of(&["pub", "prv"]),
    FieldRule::required("contact", FieldType::Object),
    FieldRule::required("contact.company", FieldType::String),
    FieldRule::required("contact.address1", FieldType::String),
    FieldRule::nullable("contact.address2", FieldType::String),
    FieldRule::required("contact.city", FieldType::String),
    FieldRule::required("contact.state", FieldType::String),
    FieldRule::required("contact.zip", FieldType::String),
    FieldRule::required("contact.country", FieldType::String).size(2),
    FieldRule::nullable("contact.phone", FieldType::String),
    FieldRule::required("campaign_defaults", FieldType::Object),
    FieldRule::required("campaign_defaults.from_name", FieldType::String),
    FieldRule::required("campaign_defaults.from_email", FieldType::Email),
    FieldRule::nullable("campaign_defaults.subject", FieldType::String),
    FieldRule::required("campaign_defaults.language", FieldType::String),
];

/// A MailChimp list; the root of the resource tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailChimpList {
    /// Local identifier, assigned by the store on first save
    pub list_id: Option<String>,
    /// MailChimp's identifier, set once the remote create succeeds
    pub mail_chimp_id: Option<String>,
    #[serde(flatten)]
    pub fields: ListFields,
}

impl SyncEntity for MailChimpList {
    type Fields = ListFields;

    const KIND: &'static str = "MailChimpList";
    const TABLE: &'static str = "mail_chimp_list";
    const PARENT_KIND: Option<&'static str> = None;

    fn new(_parent_id: Option<String>, fields: ListFields) -> Result<Self> {
        Ok(Self {
            list_id: None,
            mail_chimp_id: None,
            fields,
        })
    }

    fn rules() -> &'static RuleSet {
        LIST_RULES
    }

    fn collection_path(_parent_remote_id: Option<&str>) -> String {
        "lists".to_string()
    }

    fn local_id(&self) -> Option<&str> {
        self.list_id.as_deref()
    }

    fn set_local_id(&mut self, id: String) {
        self.list_id = Some(id);
    }

    fn remote_id(&self) -> Option<&str> {
        self.mail_chimp_id.as_deref()
    }

    fn set_remote_id(&mut self, id: String) {
        self.mail_chimp_id = Some(id);
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn fields(&self) -> &ListFields {
        &self.fields
    }

    fn set_fields(&mut self, fields: ListFields) {
        self.fields = fields;
    }
}

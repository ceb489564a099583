//! Entity model
//!
//! Every synchronized resource is a plain record made of three identifiers
//! (local, remote, parent) plus a typed set of remote-facing fields.
//! [`SyncEntity`] is the capability shape the `Synchronizer` works against.
//!
//! The remote-facing fields are what gets validated, sent to the provider,
//! and merged on update. Identifiers never leave the local side.

pub mod list;
pub mod member;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::validation::{self, RuleSet};

pub use list::{CampaignDefaults, Contact, ListFields, MailChimpList, Visibility};
pub use member::{
    EmailType, Location, MailChimpMember, MarketingPermission, MemberFields, MemberStatus,
};

/// Capability shape shared by every synchronized entity
pub trait SyncEntity:
    Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Typed remote-facing fields
    type Fields: Debug + Clone + Serialize + DeserializeOwned + Send + Sync;

    /// Entity kind used in messages (e.g. `MailChimpMember`)
    const KIND: &'static str;

    /// Storage name for this kind (e.g. `mail_chimp_member`)
    const TABLE: &'static str;

    /// Kind of the owning entity, `None` for root entities
    const PARENT_KIND: Option<&'static str>;

    /// Build a fresh, unsaved entity
    fn new(parent_id: Option<String>, fields: Self::Fields) -> Result<Self>;

    /// Rule set applied to the remote-facing representation
    fn rules() -> &'static RuleSet;

    /// Remote collection path, given the parent's remote id
    fn collection_path(parent_remote_id: Option<&str>) -> String;

    fn local_id(&self) -> Option<&str>;
    fn set_local_id(&mut self, id: String);
    fn remote_id(&self) -> Option<&str>;
    fn set_remote_id(&mut self, id: String);
    fn parent_id(&self) -> Option<&str>;
    fn fields(&self) -> &Self::Fields;
    fn set_fields(&mut self, fields: Self::Fields);

    /// Remote-facing representation: the fields without any identifiers
    fn remote_payload(&self) -> Result<Map<String, Value>> {
        to_object(self.fields())
    }
}

/// Candidate representation for a create: declared keys of `input` only
pub fn candidate<E: SyncEntity>(input: Map<String, Value>) -> Map<String, Value> {
    validation::retain_declared(input, E::rules())
}

/// Merge-patch `patch` over the entity's current representation
///
/// Supplied keys overwrite, omitted keys keep their prior value, and an
/// explicit `null` clears the field.
pub fn merged<E: SyncEntity>(entity: &E, patch: Map<String, Value>) -> Result<Map<String, Value>> {
    let mut current = entity.remote_payload()?;
    for (key, value) in validation::retain_declared(patch, E::rules()) {
        current.insert(key, value);
    }
    Ok(current)
}

/// Validate a representation against the entity's rule set
pub fn validate<E: SyncEntity>(payload: &Map<String, Value>) -> Result<()> {
    validation::validate(payload, E::rules()).map_err(Error::validation)
}

/// Decode a validated representation into typed fields
pub fn decode<E: SyncEntity>(payload: Map<String, Value>) -> Result<E::Fields> {
    Ok(serde_json::from_value(Value::Object(payload))?)
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Other(format!(
            "Expected an object representation, got {other}"
        ))),
    }
}

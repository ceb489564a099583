// # mailsync-core
//
// Core library for keeping local MailChimp records in step with MailChimp.
//
// ## Architecture Overview
//
// This library provides the core functionality for local/remote synchronization:
// - **LocalStore**: Trait for the local system of record (existence, field values)
// - **RemoteClient**: Trait for write-only calls to the email-marketing provider
// - **Synchronizer**: Orchestrates validate → persist → remote call for one entity kind
// - **SyncEntity**: Capability shape shared by lists and members
// - **ClientRegistry**: Plugin-based registry for remote clients
//
// ## Design Principles
//
// 1. **Local First**: Reads are served locally; the provider is never queried
// 2. **Rules as Data**: Validation rule sets are static tables, one interpreter
// 3. **Plugin-Based**: Remote clients are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library
// 5. **No Compensation**: Partial failures are reported, never rolled back

pub mod traits;
pub mod engine;
pub mod entity;
pub mod validation;
pub mod registry;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{
    ChildLookup, LocalStore, ParentLookup, RemoteClient, StoreChildren, StoreParents,
};
pub use engine::Synchronizer;
pub use entity::{MailChimpList, MailChimpMember, SyncEntity};
pub use registry::ClientRegistry;
pub use config::{RemoteConfig, StoreConfig, SyncConfig};
pub use error::{Error, Result};
pub use state::{FileStore, MemoryStore};

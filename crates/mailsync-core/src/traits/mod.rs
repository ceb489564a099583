//! Core traits for the mailsync system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`LocalStore`]: Local system of record for entities
//! - [`RemoteClient`]: Write-only integration with the remote provider
//! - [`ParentLookup`]: Parent resolution for scoped entities
//! - [`ChildLookup`]: Dependent counting before a parent is deleted

pub mod local_store;
pub mod remote_client;

pub use local_store::{
    ChildLookup, LocalStore, ParentLookup, ParentRecord, StoreChildren, StoreParents,
};
pub use remote_client::{RemoteClient, RemoteClientFactory, RemoteRecord};

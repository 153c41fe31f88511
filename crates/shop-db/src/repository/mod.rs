//! # Repository Module
//!
//! Database repositories for the storefront's local storage.
//!
//! - [`local_storage::LocalStorageRepository`] - Key-value buckets for guest state

pub mod local_storage;

//! Domain logic for the Flowsync template sync service.
//!
//! Everything in this crate is pure: tier/feature policy, template metadata
//! parsing, access decisions, and the report types returned by the sync
//! engine. No I/O, no database, no logging -- those live in `flowsync-db`
//! and `flowsync-api`.

pub mod access;
pub mod entitlement;
pub mod error;
pub mod report;
pub mod template;
pub mod tier;
pub mod types;
pub mod workspace;

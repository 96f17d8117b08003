//! Back-office server of the institute portal.
//!
//! - `store`: object store and table seams, with the local filesystem and
//!   SQLite implementations.
//! - `identity`: session lookup and the admin check used by every write.
//! - `ingest`: the results upload orchestrator and the delete workflow.
//! - `documents`: notices and study materials.
//! - `services`: the actix-web routes.

pub mod config;
pub mod documents;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod services;
pub mod state;
pub mod store;
pub mod upload_controller;

//! Adapters for the filesystem, GitHub and inbound HTTP.

pub mod file_store;
pub mod github;
pub mod webhook_http;

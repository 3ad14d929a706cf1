//! GitHub implementation of the [`RemoteClient`](crate::domain::ports::RemoteClient) port.
//!
//! Issues and issue comments come from the REST API (Link-header
//! pagination); discussions and their comments come from GraphQL.

pub mod client;
pub mod graphql;

pub use client::{GitHubClient, RateLimiter};

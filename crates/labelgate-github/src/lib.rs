//! GitHub REST implementation of [`labelgate_core::RepositoryApi`].
//!
//! - [`GitHubClient`] speaks the REST v3 endpoints the engine needs
//! - [`link`] follows `Link: <...>; rel="next"` pagination
//! - [`wire`] holds the response shapes and their mapping into core types

pub mod client;
pub mod link;
pub mod wire;

pub use client::{GitHubClient, GitHubConfig, DEFAULT_API_URL, PER_PAGE};
pub use link::{next_link, parse_next_link};

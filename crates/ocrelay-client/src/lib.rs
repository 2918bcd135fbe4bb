//! HTTP client for the OpenCode Server REST API.
//!
//! [`OpenCodeClient`] is the reqwest-backed implementation; the command
//! dispatcher only sees the [`OpenCodeApi`] trait.

pub mod api;
pub mod client;
pub mod error;

pub use api::OpenCodeApi;
pub use client::OpenCodeClient;
pub use error::ClientError;

//! Boundary to the remote Wing session service.
//!
//! The orchestration engine in `wing-rs` only talks to the service through the
//! [`SessionService`] trait. This crate provides the production HTTP
//! implementation, the configuration it is built from, the transport error
//! taxonomy, and an in-memory [`fake::FakeSessionService`] for tests.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod fake;
pub mod http;
pub mod service;

pub use config::{ClientConfig, OAuthCredentials};
pub use endpoint::Endpoint;
pub use error::{Result, ServiceError};
pub use http::HttpSessionService;
pub use service::SessionService;

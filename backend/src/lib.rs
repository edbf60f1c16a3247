//! Feedback board backend library.
//!
//! Layout follows ports and adapters: `domain` holds the model, policy, and
//! use-case services; `inbound` drives them over HTTP; `outbound` provides
//! the token, credential, and storage adapters.

#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;

//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod feedback;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod users;

pub use error::ApiResult;

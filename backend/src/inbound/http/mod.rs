//! HTTP inbound adapter exposing REST endpoints.

pub mod account;
pub mod admin;
pub mod error;
pub mod health;
pub mod search;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

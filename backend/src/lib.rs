//! Fatwa search portal backend.
//!
//! Quota-metered search against an external fatwa API: a tier policy maps
//! subscription tiers to search allowances, a usage ledger records admitted
//! searches, and capability-gated admin operations manage accounts. Layout is
//! hexagonal: `domain` holds the types, ports, and services; `inbound` and
//! `outbound` hold the HTTP, persistence, and search-client adapters;
//! `server` wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;

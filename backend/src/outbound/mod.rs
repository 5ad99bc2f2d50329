//! Outbound adapters: the driven side of the hexagon.
//!
//! Each submodule implements one or more domain ports against a concrete
//! technology (PostgreSQL, the external search HTTP API). Nothing in here is
//! visible to the domain except through those ports.

pub mod persistence;
pub mod search;

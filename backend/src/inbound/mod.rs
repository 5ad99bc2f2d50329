//! Inbound adapters: the driving side of the hexagon.

pub mod http;

//! Infrastructure adapters. Implement outbound ports and serve the inbound one.
//!
//! Completion services, storage, HTTP. Map errors to DomainError.

pub mod ai;
pub mod http;
pub mod persistence;

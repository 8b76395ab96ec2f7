//! career-coach: Guided career-coaching chat service with Hexagonal Architecture.
//!
//! A student works through five coaching domains. Each turn is scored against the domain's
//! goal, escalated by turn count, and answered by a single completion call.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

//! Application use cases. Orchestrate domain logic via ports.

pub mod coaching_service;
pub mod session_service;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use coaching_service::CoachingService;
pub use session_service::{SessionService, SessionTurn};

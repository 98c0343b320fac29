//! Banking Support Core
//!
//! The service core behind a mobile banking-support app:
//! - Verifies a live human is present via a challenge-response liveness session
//! - Classifies support tickets into discrete urgency levels
//! - Files and tracks tickets through a pluggable store and a small REST API
//!
//! FLOW:
//! camera frames → liveness session → verified user → ticket desk → urgency → store

pub mod api;
pub mod error;
pub mod liveness;
pub mod models;
pub mod tickets;
pub mod urgency;

pub use error::Result;

// Re-export common types
pub use liveness::LivenessSession;
pub use models::*;
pub use tickets::{InMemoryTicketStore, TicketDesk};
pub use urgency::UrgencyClassifier;

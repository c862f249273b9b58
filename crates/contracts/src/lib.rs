//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - An [`AuditEvent`] is built once by the security-decision layer and never mutated
//! - Sinks consume shared references; events are safe to share across delivery attempts
//! - Backend acceptance is reported through [`AuditSink::store`]; an `Err` triggers
//!   fallback delegation in the dispatcher

mod category;
mod config;
mod error;
mod event;
mod sink;

pub use category::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use sink::*;

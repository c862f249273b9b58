//! Built-in backend adapters
//!
//! Contains DebugSink, NoopSink, StructuredLogSink, InternalIndexSink,
//! ExternalIndexSink, and WebhookSink.

mod debug;
mod external;
mod index;
mod log;
mod noop;
mod webhook;

pub use self::debug::DebugSink;
pub use self::external::ExternalIndexSink;
pub use self::index::InternalIndexSink;
pub use self::log::StructuredLogSink;
pub use self::noop::NoopSink;
pub use self::webhook::{WebhookFormat, WebhookSink};

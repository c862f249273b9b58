//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Task queue full - submission rejected synchronously
    #[error("dispatch queue full for sink '{sink_name}', depth={depth}")]
    QueueFull { sink_name: String, depth: usize },

    /// Pool is shutting down and no longer accepts tasks
    #[error("dispatch pool closed")]
    PoolClosed,

    /// Contract-level error
    #[error("audit error: {0}")]
    Contract(#[from] contracts::AuditError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

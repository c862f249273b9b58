//! Configuration parsing
//!
//! Supports TOML (primary) and JSON formats.

use contracts::{AuditBlueprint, AuditError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse configuration content into an [`AuditBlueprint`]
pub fn parse(content: &str, format: ConfigFormat) -> Result<AuditBlueprint, AuditError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| AuditError::config_parse(format!("TOML parse error: {e}"))),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| AuditError::config_parse(format!("JSON parse error: {e}"))),
    }
}

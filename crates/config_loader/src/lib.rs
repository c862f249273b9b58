//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `AuditBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("audit.toml")).unwrap();
//! println!("Endpoints: {}", blueprint.endpoints.len());
//! ```

mod parser;
mod validator;

pub use contracts::AuditBlueprint;
pub use parser::ConfigFormat;

use contracts::AuditError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<AuditBlueprint, AuditError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<AuditBlueprint, AuditError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize AuditBlueprint to TOML string
    pub fn to_toml(blueprint: &AuditBlueprint) -> Result<String, AuditError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| AuditError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize AuditBlueprint to JSON string
    pub fn to_json(blueprint: &AuditBlueprint) -> Result<String, AuditError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| AuditError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, AuditError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            AuditError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| AuditError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, AuditError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AuditBlueprint, AuditError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

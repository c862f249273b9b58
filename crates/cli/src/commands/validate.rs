//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::SinkKind;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    endpoint_count: usize,
    rule_count: usize,
    disabled_category_count: usize,
    pool_workers: usize,
    pool_queue_depth: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    endpoint_count: blueprint.endpoints.len(),
                    rule_count: blueprint.routing.rules.len(),
                    disabled_category_count: blueprint.routing.disabled_categories.len(),
                    pool_workers: blueprint.pool.worker_count,
                    pool_queue_depth: blueprint.pool.max_queue_depth,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::AuditBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let declared: Vec<&str> = blueprint.endpoints.iter().map(|e| e.name.as_str()).collect();

    if blueprint.endpoints.is_empty() {
        warnings.push("No endpoints configured - all events go to the debug sink".to_string());
    }

    for endpoint in &blueprint.endpoints {
        if SinkKind::resolve(&endpoint.kind).is_none() {
            warnings.push(format!(
                "Endpoint '{}' has unknown kind '{}' - the debug sink will be substituted",
                endpoint.name, endpoint.kind
            ));
        }
        match endpoint.fallback.as_deref() {
            None => warnings.push(format!(
                "Endpoint '{}' has no fallback - events are dropped if it fails",
                endpoint.name
            )),
            Some(fallback) if !declared.contains(&fallback) => warnings.push(format!(
                "Endpoint '{}' falls back to undeclared '{}' - the debug sink will be substituted",
                endpoint.name, fallback
            )),
            Some(_) => {}
        }
    }

    for rule in &blueprint.routing.rules {
        if !declared.contains(&rule.endpoint.as_str()) {
            warnings.push(format!(
                "Routing rule targets undeclared endpoint '{}' - the rule will be dropped",
                rule.endpoint
            ));
        }
    }

    if let Some(default) = blueprint.routing.default_endpoint.as_deref() {
        if !declared.contains(&default) {
            warnings.push(format!(
                "Default endpoint '{}' is not declared - the debug sink will be substituted",
                default
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Endpoints: {}", summary.endpoint_count);
            println!("  Routing rules: {}", summary.rule_count);
            println!("  Disabled categories: {}", summary.disabled_category_count);
            println!(
                "  Pool: {} workers, queue depth {}",
                summary.pool_workers, summary.pool_queue_depth
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

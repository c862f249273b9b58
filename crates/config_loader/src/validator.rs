//! Configuration validation
//!
//! Rejects structural impossibilities: duplicate endpoint names, fallback
//! cycles, out-of-range pool sizing. Unknown backend kinds and dangling
//! fallback references are deliberately NOT rejected here: sink construction
//! substitutes the debug sink for those so the process still starts.

use std::collections::{HashMap, HashSet};

use contracts::{AuditBlueprint, AuditError};
use validator::Validate;

/// Validate a parsed blueprint
pub fn validate(blueprint: &AuditBlueprint) -> Result<(), AuditError> {
    check_unique_endpoint_names(blueprint)?;
    check_fallback_cycles(blueprint)?;
    check_pool(blueprint)?;
    Ok(())
}

fn check_unique_endpoint_names(blueprint: &AuditBlueprint) -> Result<(), AuditError> {
    let mut seen = HashSet::new();
    for endpoint in &blueprint.endpoints {
        if endpoint.name.is_empty() {
            return Err(AuditError::config_validation(
                "endpoints.name",
                "endpoint name must not be empty",
            ));
        }
        if !seen.insert(endpoint.name.as_str()) {
            return Err(AuditError::config_validation(
                "endpoints.name",
                format!("duplicate endpoint name '{}'", endpoint.name),
            ));
        }
    }
    Ok(())
}

/// A sink must never be, directly or transitively, its own fallback.
///
/// Only edges to declared endpoints are walked; dangling references are left
/// for the factory to substitute.
fn check_fallback_cycles(blueprint: &AuditBlueprint) -> Result<(), AuditError> {
    let fallback_of: HashMap<&str, &str> = blueprint
        .endpoints
        .iter()
        .filter_map(|e| e.fallback.as_deref().map(|f| (e.name.as_str(), f)))
        .collect();
    let declared: HashSet<&str> = blueprint.endpoints.iter().map(|e| e.name.as_str()).collect();

    for endpoint in &blueprint.endpoints {
        let mut visited = HashSet::new();
        let mut current = endpoint.name.as_str();
        while let Some(&next) = fallback_of.get(current) {
            if !declared.contains(next) {
                break;
            }
            if !visited.insert(next) || next == endpoint.name {
                return Err(AuditError::config_validation(
                    "endpoints.fallback",
                    format!("fallback cycle involving endpoint '{}'", endpoint.name),
                ));
            }
            current = next;
        }
    }
    Ok(())
}

fn check_pool(blueprint: &AuditBlueprint) -> Result<(), AuditError> {
    blueprint.pool.validate().map_err(|e| {
        AuditError::config_validation("pool", format!("invalid pool sizing: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{EndpointConfig, PoolConfig, RoutingConfig};
    use std::collections::HashMap;

    fn endpoint(name: &str, fallback: Option<&str>) -> EndpointConfig {
        EndpointConfig {
            name: name.to_string(),
            kind: "debug".to_string(),
            mode: None,
            params: HashMap::new(),
            fallback: fallback.map(String::from),
        }
    }

    fn blueprint(endpoints: Vec<EndpointConfig>) -> AuditBlueprint {
        AuditBlueprint {
            version: Default::default(),
            endpoints,
            routing: RoutingConfig::default(),
            pool: PoolConfig::default(),
        }
    }

    #[test]
    fn test_accepts_valid_chain() {
        let bp = blueprint(vec![
            endpoint("a", Some("b")),
            endpoint("b", Some("c")),
            endpoint("c", None),
        ]);
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let bp = blueprint(vec![endpoint("a", None), endpoint("a", None)]);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_self_fallback() {
        let bp = blueprint(vec![endpoint("a", Some("a"))]);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_rejects_transitive_cycle() {
        let bp = blueprint(vec![
            endpoint("a", Some("b")),
            endpoint("b", Some("c")),
            endpoint("c", Some("a")),
        ]);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_dangling_fallback_is_not_rejected() {
        // Substituted by the factory, not a validation error
        let bp = blueprint(vec![endpoint("a", Some("nowhere"))]);
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_rejects_zero_worker_pool() {
        let mut bp = blueprint(vec![endpoint("a", None)]);
        bp.pool.worker_count = 0;
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("pool"));
    }
}

//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    endpoints: Vec<EndpointInfo>,
    routing: RoutingInfo,
    pool: PoolInfo,
}

#[derive(Serialize)]
struct EndpointInfo {
    name: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain: Option<String>,
}

#[derive(Serialize)]
struct RoutingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    default_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    disabled_categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rules: Vec<RuleInfo>,
}

#[derive(Serialize)]
struct RuleInfo {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compliance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant: Option<String>,
    endpoint: String,
}

#[derive(Serialize)]
struct PoolInfo {
    worker_count: usize,
    max_queue_depth: usize,
    shutdown_grace_ms: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

/// Declared fallback chain as "a -> b -> c", following configured references
fn fallback_chain(blueprint: &contracts::AuditBlueprint, name: &str) -> String {
    let mut chain = vec![name.to_string()];
    let mut current = name;
    // The loader rejects cycles; bound the walk anyway
    for _ in 0..blueprint.endpoints.len() {
        let next = blueprint
            .endpoints
            .iter()
            .find(|e| e.name == current)
            .and_then(|e| e.fallback.as_deref());
        match next {
            Some(next) => {
                chain.push(next.to_string());
                current = next;
            }
            None => break,
        }
    }
    chain.join(" -> ")
}

fn build_config_info(blueprint: &contracts::AuditBlueprint, args: &InfoArgs) -> ConfigInfo {
    let endpoints = blueprint
        .endpoints
        .iter()
        .map(|e| EndpointInfo {
            name: e.name.clone(),
            kind: e.kind.clone(),
            mode: e.mode.map(|m| format!("{m:?}").to_lowercase()),
            fallback: e.fallback.clone(),
            chain: args
                .chains
                .then(|| fallback_chain(blueprint, &e.name)),
        })
        .collect();

    let rules = if args.rules {
        blueprint
            .routing
            .rules
            .iter()
            .map(|r| RuleInfo {
                categories: r.categories.iter().map(|c| c.to_string()).collect(),
                compliance: r.compliance,
                tenant: r.tenant.clone(),
                endpoint: r.endpoint.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        endpoints,
        routing: RoutingInfo {
            default_endpoint: blueprint.routing.default_endpoint.clone(),
            disabled_categories: blueprint
                .routing
                .disabled_categories
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rules,
        },
        pool: PoolInfo {
            worker_count: blueprint.pool.worker_count,
            max_queue_depth: blueprint.pool.max_queue_depth,
            shutdown_grace_ms: blueprint.pool.shutdown_grace_ms,
        },
    }
}

fn print_config_info(blueprint: &contracts::AuditBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Audit Relay Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Endpoints
    println!("📤 Endpoints ({})", blueprint.endpoints.len());
    for (i, endpoint) in blueprint.endpoints.iter().enumerate() {
        let is_last = i == blueprint.endpoints.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {} ({})", prefix, endpoint.name, endpoint.kind);

        if args.chains {
            println!(
                "   {}  └─ chain: {}",
                child_prefix,
                fallback_chain(blueprint, &endpoint.name)
            );
        } else if let Some(ref fallback) = endpoint.fallback {
            println!("   {}  └─ fallback: {}", child_prefix, fallback);
        }
    }

    // Routing
    println!("\n⚙️  Routing");
    match blueprint.routing.default_endpoint.as_deref() {
        Some(default) => println!("   ├─ Default endpoint: {}", default),
        None => println!("   ├─ Default endpoint: (first declared)"),
    }
    if blueprint.routing.disabled_categories.is_empty() {
        println!("   ├─ Disabled categories: none");
    } else {
        let names: Vec<String> = blueprint
            .routing
            .disabled_categories
            .iter()
            .map(|c| c.to_string())
            .collect();
        println!("   ├─ Disabled categories: {}", names.join(", "));
    }
    println!("   └─ Rules: {}", blueprint.routing.rules.len());

    if args.rules && !blueprint.routing.rules.is_empty() {
        for (i, rule) in blueprint.routing.rules.iter().enumerate() {
            let is_last = i == blueprint.routing.rules.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            let categories = if rule.categories.is_empty() {
                "any".to_string()
            } else {
                rule.categories
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join("|")
            };
            println!(
                "      {} [{}] compliance={:?} tenant={:?} -> {}",
                prefix, categories, rule.compliance, rule.tenant, rule.endpoint
            );
        }
    }

    // Pool
    println!("\n🧵 Dispatch Pool");
    println!("   ├─ Workers: {}", blueprint.pool.worker_count);
    println!("   ├─ Max queue depth: {}", blueprint.pool.max_queue_depth);
    println!("   └─ Shutdown grace: {} ms", blueprint.pool.shutdown_grace_ms);

    println!();
}

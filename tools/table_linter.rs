/// Table Linter — static checks over axis and exclusion tables.
///
/// Usage: table_linter [--kind <Both>] [--axes <file>]... [--exclusions <file>]...
use clap::Parser;
use condition_engine::catalog::{self, ConditionKind};
use condition_engine::schema::axis::{AxisRegistry, MergeOrder};
use condition_engine::schema::exclusion::ExclusionTable;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "table_linter", about = "Validate condition axis and exclusion tables")]
struct Args {
    /// Start from a built-in catalog (None, Character, Facial, Both).
    #[arg(long)]
    kind: Option<ConditionKind>,
    /// Axis table RON files, appended in order.
    #[arg(long = "axes")]
    axes: Vec<PathBuf>,
    /// Exclusion table RON files, unioned.
    #[arg(long = "exclusions")]
    exclusions: Vec<PathBuf>,
}

fn main() {
    // Findings are logged at warn/error, so show them without RUST_LOG.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (mut registry, mut exclusions) = match args.kind.map(catalog::tables).transpose() {
        Ok(Some(tables)) => tables,
        Ok(None) => (AxisRegistry::default(), ExclusionTable::default()),
        Err(e) => {
            eprintln!("ERROR: Failed to load catalog: {}", e);
            process::exit(1);
        }
    };

    for path in &args.axes {
        let loaded = AxisRegistry::load_from_ron(path)
            .and_then(|loaded| AxisRegistry::merge(&registry, &loaded, &MergeOrder::new()));
        match loaded {
            Ok(merged) => {
                println!("  Loaded: {}", path.display());
                registry = merged;
            }
            Err(e) => {
                eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    for path in &args.exclusions {
        match ExclusionTable::load_from_ron(path) {
            Ok(loaded) => {
                println!("  Loaded: {}", path.display());
                exclusions =
                    ExclusionTable::merge(&exclusions, &loaded, &ExclusionTable::default());
            }
            Err(e) => {
                eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    println!(
        "Loaded {} axes and {} exclusion triggers",
        registry.len(),
        exclusions.len()
    );

    let (errors, warnings) = lint_tables(&registry, &exclusions);

    println!("\n=== Table Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    for error in &errors {
        tracing::error!("{}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_tables(
    registry: &AxisRegistry,
    exclusions: &ExclusionTable,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = exclusions.validate(registry) {
        errors.push(e.to_string());
        return (errors, warnings);
    }

    for axis in registry.get_axes() {
        if axis.domain().len() == 1 && !axis.is_mandatory() {
            warnings.push(format!(
                "Optional axis '{}' has a single value",
                axis.name()
            ));
        }
    }

    let rules = exclusions.rules();

    for rule in &rules {
        let (trigger_axis, trigger_value) = &rule.trigger;

        if rule.forbids.contains_key(trigger_axis) {
            warnings.push(format!(
                "Rule ({}, {}) restricts its own axis, which never has a second value",
                trigger_axis, trigger_value
            ));
        }

        for (target, values) in &rule.forbids {
            if values.is_empty() {
                warnings.push(format!(
                    "Rule ({}, {}) lists '{}' with no forbidden values",
                    trigger_axis, trigger_value, target
                ));
            }

            let Ok(axis) = registry.get(target) else {
                continue;
            };
            if axis.values().all(|v| values.contains(v)) {
                let message = format!(
                    "Rule ({}, {}) forbids every value of '{}'",
                    trigger_axis, trigger_value, target
                );
                if axis.is_mandatory() {
                    errors.push(message);
                } else {
                    warnings.push(message);
                }
            }
        }
    }

    // Two triggers on different axes may together close a mandatory axis.
    for (i, a) in rules.iter().enumerate() {
        for b in rules.iter().skip(i + 1) {
            if a.trigger.0 == b.trigger.0 {
                continue;
            }
            for axis in registry.get_axes().iter().filter(|axis| axis.is_mandatory()) {
                let mut union: BTreeSet<&str> = BTreeSet::new();
                for rule in [a, b] {
                    if let Some(values) = rule.forbids.get(axis.name()) {
                        union.extend(values.iter().map(String::as_str));
                    }
                }
                let covered_by_one = [a, b].iter().any(|rule| {
                    rule.forbids
                        .get(axis.name())
                        .is_some_and(|values| axis.values().all(|v| values.contains(v)))
                });
                if !covered_by_one && axis.values().all(|v| union.contains(v)) {
                    warnings.push(format!(
                        "({}, {}) with ({}, {}) leaves mandatory axis '{}' unsatisfiable",
                        a.trigger.0, a.trigger.1, b.trigger.0, b.trigger.1, axis.name()
                    ));
                }
            }
        }
    }

    (errors, warnings)
}

/// Preview — generate condition sets from the command line.
///
/// Usage: preview [--kind Both] [--seed <n>] [--count <n>] [--pin axis=value]...
///                [--probability <p>] [--max-optional <n>]
///                [--axes <file>]... [--exclusions <file>]... [--stats]
use clap::Parser;
use condition_engine::catalog::ConditionKind;
use condition_engine::core::pipeline::ConditionEngine;
use condition_engine::schema::condition::Overrides;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "preview", about = "Generate and render condition sets")]
struct Args {
    /// Built-in tables to start from (None, Character, Facial, Both).
    #[arg(long, default_value = "Both")]
    kind: ConditionKind,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of consecutive seeds to generate.
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Pin an axis: `--pin age=ancient`.
    #[arg(long = "pin", value_parser = parse_pin)]
    pins: Vec<(String, String)>,
    #[arg(long)]
    probability: Option<f64>,
    #[arg(long)]
    max_optional: Option<usize>,
    #[arg(long = "axes")]
    axes: Vec<PathBuf>,
    #[arg(long = "exclusions")]
    exclusions: Vec<PathBuf>,
    /// Print per-value frequencies instead of each fragment.
    #[arg(long)]
    stats: bool,
}

fn parse_pin(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((axis, value)) if !axis.is_empty() && !value.is_empty() => {
            Ok((axis.to_string(), value.to_string()))
        }
        _ => Err(format!("expected axis=value, got '{}'", s)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = ConditionEngine::builder().kind(args.kind);
    for path in &args.axes {
        builder = builder.axes_file(path);
    }
    for path in &args.exclusions {
        builder = builder.exclusions_file(path);
    }
    if let Some(p) = args.probability {
        builder = builder.optional_probability(p);
    }
    if let Some(n) = args.max_optional {
        builder = builder.max_optional(n);
    }

    let engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let overrides: Overrides = args.pins.into_iter().collect();
    let mut frequencies: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut failures = 0usize;

    for offset in 0..args.count as u64 {
        let seed = args.seed.wrapping_add(offset);
        match engine.generate_with(seed, &overrides) {
            Ok(set) => {
                if args.stats {
                    for (axis, value) in set.iter() {
                        *frequencies
                            .entry((axis.to_string(), value.to_string()))
                            .or_default() += 1;
                    }
                } else {
                    println!("[{}] {}", seed, engine.render(&set));
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("[{}] ERROR: {}", seed, e);
            }
        }
    }

    if args.stats {
        print_stats(&engine, &frequencies, args.count);
    }

    if failures > 0 {
        eprintln!("{} of {} generations failed", failures, args.count);
        process::exit(1);
    }
}

fn print_stats(
    engine: &ConditionEngine,
    frequencies: &BTreeMap<(String, String), usize>,
    count: usize,
) {
    println!("=== {} generations ===", count);
    for axis in engine.registry().get_axes() {
        let present: usize = axis
            .values()
            .filter_map(|v| frequencies.get(&(axis.name().to_string(), v.to_string())))
            .sum();
        println!(
            "\n{} ({}, present in {}/{})",
            axis.name(),
            if axis.is_mandatory() { "mandatory" } else { "optional" },
            present,
            count
        );
        for value in axis.values() {
            let n = frequencies
                .get(&(axis.name().to_string(), value.to_string()))
                .copied()
                .unwrap_or(0);
            println!("  {:<16} {:>6}", value, n);
        }
    }
}

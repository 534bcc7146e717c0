use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "mapset workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmarks against the std baselines and write a report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

const BENCHES: &[&str] = &["keyed_set_store_benchmark", "linked_hash_benchmark"];

/// Implementations every other row of a workload is compared against.
/// Criterion replaces `:` with `_` in directory names.
const BASELINES: &[&str] = &["std", "std__HashMap"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    for bench in BENCHES {
        println!("\n>>> Running {bench}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.arg("bench").arg("--bench").arg(bench);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if quick {
            cmd.arg("--measurement-time").arg("0.1");
            cmd.arg("--noplot");
            cmd.arg("--sample-size").arg("10");
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench {bench}"))?;

        if status.success() {
            println!("Finished {bench} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark {bench} failed");
        }
    }

    Ok(())
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

/// workload -> implementation -> ops/s
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let results = collect_results(criterion_dir)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(report_path, render_report(&results))
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn render_report(results: &Results) -> String {
    let mut out = String::from("# Benchmark Report\n\n");
    out.push_str("| Workload | Implementation | Ops/s | vs std |\n");
    out.push_str("|---|---|---|---|\n");

    for (workload, impls) in results {
        let baseline = BASELINES
            .iter()
            .find_map(|name| impls.get(*name))
            .copied()
            .unwrap_or(0.0);

        for (name, ops) in impls {
            let rel = if baseline > 0.0 { ops / baseline } else { 0.0 };
            out.push_str(&format!(
                "| {workload} | {name} | {} | **{rel:.2}x** |\n",
                format_ops(*ops)
            ));
        }
    }
    out
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

/// Reads `<workload>/<implementation>/new/estimates.json` for every criterion run.
fn collect_results(criterion_dir: &Path) -> Result<Results> {
    let mut results = Results::new();

    let workloads = fs::read_dir(criterion_dir)
        .with_context(|| format!("Failed to read {}", criterion_dir.display()))?;
    for workload in workloads.flatten() {
        let workload_dir = workload.path();
        let Some(workload_name) = dir_name(&workload_dir) else {
            continue;
        };
        if !workload_dir.is_dir() || workload_name == "report" {
            continue;
        }

        for implementation in fs::read_dir(&workload_dir)?.flatten() {
            let impl_dir = implementation.path();
            let Some(impl_name) = dir_name(&impl_dir) else {
                continue;
            };
            if !impl_dir.is_dir() || impl_name == "report" {
                continue;
            }
            if let Some(ops) = read_ops_per_sec(&impl_dir.join("new"))? {
                results
                    .entry(workload_name.clone())
                    .or_default()
                    .insert(impl_name, ops);
            }
        }
    }

    Ok(results)
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

fn read_ops_per_sec(run_dir: &Path) -> Result<Option<f64>> {
    let estimates_path = run_dir.join("estimates.json");
    if !estimates_path.exists() {
        return Ok(None);
    }

    // Throughput, when declared, turns iterations/s into elements/s.
    let mut elements = 1.0;
    let bench_json = run_dir.join("benchmark.json");
    if let Ok(content) = fs::read_to_string(&bench_json) {
        let json: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Malformed {}", bench_json.display()))?;
        if let Some(t) = json.get("throughput").and_then(|t| t.get("Elements")) {
            elements = t.as_f64().unwrap_or(1.0);
        }
    }

    let content = fs::read_to_string(&estimates_path)
        .with_context(|| format!("Failed to read {}", estimates_path.display()))?;
    let estimates: Estimates = serde_json::from_str(&content)
        .with_context(|| format!("Malformed {}", estimates_path.display()))?;

    let time_ns = estimates.mean.point_estimate;

    Ok((time_ns > 0.0).then(|| elements * 1e9 / time_ns))
}

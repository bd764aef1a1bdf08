// src/lib.rs

pub mod chart;
pub mod cli;
pub mod completion;
pub mod config;
pub mod errors;
pub mod logging;
pub mod ops;
pub mod plan;
pub mod simulation;
pub mod slack;
pub mod types;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::ConfigFile;
use crate::config::loader::load_or_default;
use crate::ops::{EditSession, recipes};
use crate::plan::serialized::load_plan;
use crate::plan::{Plan, Precision};
use crate::simulation::simulate_plan;
use crate::slack::{compute_slack, critical_path, early_spans};

/// High-level entry point used by `main.rs`.
///
/// Loads the configuration, then the plan named by the subcommand, and runs
/// that subcommand to completion.
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref()).context("loading configuration")?;
    debug!(?cfg, "configuration loaded");

    match args.command {
        Command::Validate { plan } => run_validate(&plan),
        Command::Slack { plan } => run_slack(&plan, &cfg),
        Command::Simulate { plan, loops, seed } => run_simulate(&plan, &cfg, loops, seed),
        Command::Catchup {
            plan,
            today,
            output,
        } => run_catchup(&plan, &cfg, today, output.as_deref()),
    }
}

fn open_plan(path: &Path) -> Result<Plan> {
    load_plan(path).with_context(|| format!("loading plan from {:?}", path))
}

fn run_validate(path: &Path) -> Result<()> {
    let plan = open_plan(path)?;
    let chart = plan.chart();
    println!(
        "plan OK: {} tasks, {} edges, {} completion records",
        chart.len().saturating_sub(2),
        chart.edges().len(),
        plan.task_completions().len()
    );
    Ok(())
}

fn run_slack(path: &Path, cfg: &ConfigFile) -> Result<()> {
    let plan = open_plan(path)?;
    let chart = plan.chart();
    let round = Precision::new(cfg.slack.precision).rounder();
    let started = |_: usize, id: &crate::chart::TaskId| plan.actual_start(id);

    let slacks = compute_slack(chart, None, &round, Some(&started))?;
    let path = critical_path(chart, &slacks, &round);

    println!(
        "{:<4} {:<24} {:>10} {:>10} {:>10} {:>10} {:>8}",
        "#", "task", "early.s", "early.f", "late.s", "late.f", "slack"
    );
    for (index, (task, s)) in chart.vertices().iter().zip(&slacks).enumerate() {
        println!(
            "{:<4} {:<24} {:>10} {:>10} {:>10} {:>10} {:>8}",
            index, task.name, s.early.start, s.early.finish, s.late.start, s.late.finish, s.slack
        );
    }
    println!();
    println!("critical path: {}", describe_path(&plan, &path));
    Ok(())
}

fn run_simulate(
    path: &Path,
    cfg: &ConfigFile,
    loops: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let plan = open_plan(path)?;
    let loops = loops.unwrap_or(cfg.simulation.loops);
    let seed = seed.or(cfg.simulation.seed);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(loops, ?seed, "running simulation");

    let precision = Precision::new(cfg.simulation.precision);
    let results = simulate_plan(&plan, loops, precision, &mut rng)?;

    let mut paths: Vec<_> = results.paths.values().collect();
    paths.sort_by(|a, b| b.count.cmp(&a.count));

    println!("critical paths ({loops} rounds):");
    for entry in paths {
        println!(
            "  {:>6}  {}",
            entry.count,
            describe_path(&plan, &entry.critical_path)
        );
    }
    println!();
    println!("tasks on critical paths:");
    for entry in &results.tasks {
        let name = plan
            .chart()
            .task(entry.task_index)
            .map(|t| t.name.as_str())
            .unwrap_or("?");
        println!(
            "  {:<24} duration {:>8}  appeared {:>6}",
            name, entry.duration, entry.num_times_appeared
        );
    }
    Ok(())
}

fn run_catchup(path: &Path, cfg: &ConfigFile, today: f64, output: Option<&Path>) -> Result<()> {
    let plan = open_plan(path)?;
    let round = Precision::new(cfg.slack.precision).rounder();
    let slacks = compute_slack(plan.chart(), None, &round, None)?;

    let mut session = EditSession::from_config(plan, &cfg.edit);
    session.execute(&recipes::catchup(today, early_spans(&slacks)))?;
    let text = session.into_plan().to_json_text()?;

    match output {
        Some(out) => {
            fs::write(out, text).with_context(|| format!("writing plan to {:?}", out))?;
            info!(path = %out.display(), "wrote caught-up plan");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn describe_path(plan: &Plan, path: &[usize]) -> String {
    if path.is_empty() {
        return "(none)".to_string();
    }
    path.iter()
        .map(|&i| {
            plan.chart()
                .task(i)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| i.to_string())
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

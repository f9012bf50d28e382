mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use radtask_core::execution::TokioExecutor;
use radtask_core::models::{InputValues, TaskId};
use radtask_core::registry::Registry;
use radtask_core::runner::{RunConfig, TaskRunner};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Commands, InputArgs, ResolveArgs, RunArgs};

const LOG_ENV: &str = "RADTASK_LOG";

#[derive(Serialize)]
struct ListEntry {
    name: &'static str,
    key: String,
    family: radtask_core::models::TaskFamily,
    description: &'static str,
}

#[tokio::main]
async fn main() {
    init_logging();

    let args = Args::parse();
    if let Err(error) = run(args).await {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(args: Args) -> Result<()> {
    let registry = Registry::load().context("failed to load task registry")?;

    match args.command {
        Commands::List { json } => list(&registry, json),
        Commands::Describe { task } => describe(&registry, &task),
        Commands::Resolve(resolve_args) => resolve(&registry, resolve_args),
        Commands::Run(run_args) => run_task(&registry, run_args).await,
    }
}

fn list(registry: &Registry, json: bool) -> Result<()> {
    let entries: Vec<ListEntry> = registry
        .descriptors()
        .map(|descriptor| ListEntry {
            name: descriptor.id.as_str(),
            key: descriptor.id.cli_key(),
            family: descriptor.family,
            description: descriptor.description,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = entries
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(0);
    for entry in entries {
        println!("{:width$}  {}", entry.name, entry.description);
    }
    Ok(())
}

fn describe(registry: &Registry, task: &str) -> Result<()> {
    let id: TaskId = task.parse()?;
    let descriptor = registry
        .descriptor(id)
        .ok_or_else(|| anyhow!("task {id} is not registered"))?;
    println!("{}", serde_json::to_string_pretty(descriptor)?);
    Ok(())
}

fn bind_inputs(target: &InputArgs) -> InputValues {
    target
        .inputs
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn resolve(registry: &Registry, args: ResolveArgs) -> Result<()> {
    let resolution = registry.resolve_named(&args.target.task, &bind_inputs(&args.target))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{}", resolution.command);
    }
    Ok(())
}

async fn run_task(registry: &Registry, args: RunArgs) -> Result<()> {
    let resolution = registry.resolve_named(&args.target.task, &bind_inputs(&args.target))?;

    let mut config = RunConfig::from_env()?;
    if let Some(seconds) = args.timeout_secs {
        config = config.timeout(Duration::from_secs(seconds));
    }
    if let Some(bin_dir) = args.bin_dir {
        config = config.bin_dir(bin_dir);
    }
    for (key, value) in args.env {
        config = config.env(key, value);
    }
    tracing::debug!(
        timeout = ?config.timeout,
        bin_dir = ?config.bin_dir,
        env = config.env.len(),
        "run configuration"
    );

    let runner = TaskRunner::new(Arc::new(TokioExecutor), config);
    let outcome = runner
        .run(&resolution, &args.work_dir)
        .await
        .with_context(|| format!("task {} failed", resolution.task))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.outputs)?);
    } else {
        for output in &outcome.outputs {
            println!(
                "{}\t{}\t{}",
                output.name,
                output.kind.as_str(),
                output.path.display()
            );
        }
    }
    Ok(())
}

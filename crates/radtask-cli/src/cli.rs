use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "radtask", version, about = "Resolve and run Radiance toolkit tasks")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every registered task.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the input/output schema of one task as JSON.
    Describe { task: String },
    /// Print the command line a task resolves to.
    Resolve(ResolveArgs),
    /// Stage inputs, run the task's command, and report its outputs.
    Run(RunArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InputArgs {
    /// Task name (`SumRow`) or key (`sum-row`).
    pub task: String,

    /// Input binding as NAME=VALUE. Can be specified multiple times.
    #[arg(short = 'i', long = "input", value_parser = parse_binding, action = clap::ArgAction::Append)]
    pub inputs: Vec<(String, String)>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: InputArgs,

    /// Print the full resolution (arguments, staged inputs, outputs) as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: InputArgs,

    /// Directory inputs are staged into and the command runs in.
    #[arg(long)]
    pub work_dir: PathBuf,

    /// Kill the command after this many seconds (overrides RADTASK_TIMEOUT_SECS).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory prepended to PATH (overrides RADTASK_BIN_DIR).
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    /// Extra environment variables for the command (KEY=VALUE).
    #[arg(long = "env", value_parser = parse_binding, action = clap::ArgAction::Append)]
    pub env: Vec<(String, String)>,

    #[arg(long)]
    pub json: bool,
}

fn parse_binding(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("binding '{raw}' has an empty name"));
    }
    Ok((name.to_string(), value.to_string()))
}

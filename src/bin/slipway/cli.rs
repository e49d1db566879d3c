//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use slipway::{Optimization, Platform, Target, Toolchain};

/// Slipway - a declarative multi-target build-project generator
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate project and solution descriptors from a catalogue
    Generate(GenerateArgs),

    /// List the expanded target matrix per solution and project
    Targets(TargetsArgs),

    /// Display the project dependency tree for a target
    Tree(TreeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the catalogue manifest
    #[arg(long, default_value = "Slipway.toml")]
    pub manifest: PathBuf,

    /// Output root directory
    #[arg(short, long, default_value = "generated")]
    pub out: PathBuf,

    /// Solutions to generate (defaults to every registered solution)
    #[arg(short, long)]
    pub solution: Vec<String>,

    /// Bare projects to emit standalone descriptors for
    #[arg(short, long)]
    pub project: Vec<String>,

    /// Restrict generation to these platforms
    #[arg(long)]
    pub platform: Vec<Platform>,

    /// Restrict generation to these toolchains
    #[arg(long)]
    pub toolchain: Vec<Toolchain>,

    /// Restrict generation to these optimization profiles
    #[arg(long)]
    pub optimization: Vec<Optimization>,

    /// Number of parallel configuration jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Path to the catalogue manifest
    #[arg(long, default_value = "Slipway.toml")]
    pub manifest: PathBuf,

    /// Only show this solution
    #[arg(short, long)]
    pub solution: Option<String>,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Path to the catalogue manifest
    #[arg(long, default_value = "Slipway.toml")]
    pub manifest: PathBuf,

    /// Root project (defaults to every registered project)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Target to resolve edges under, e.g. win64-msvc2019-debug
    /// (defaults to the first target of each root's space)
    #[arg(short, long)]
    pub target: Option<Target>,

    /// Maximum tree depth
    #[arg(short, long)]
    pub depth: Option<usize>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::{RawSettings, RawTreeParams};

/// Synthetic fault tree generator: random gate/event DAGs as OpenPSA MEF fixtures
#[derive(Parser, Debug)]
#[command(name = "ftgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fault tree and write it as OpenPSA MEF
    Generate {
        #[command(flatten)]
        tree: TreeArgs,

        /// Output file, "-" for stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

    /// Generate a fault tree and print its structure without writing it
    Preview {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Generation parameters; unset flags keep the configured value.
#[derive(Args, Debug, Default, Clone)]
pub struct TreeArgs {
    /// Name for the fault tree
    #[arg(long)]
    pub ft_name: Option<String>,

    /// Name for the root gate
    #[arg(long)]
    pub root: Option<String>,

    /// Seed of the random number generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of unique primary events
    #[arg(short = 'p', long, allow_negative_numbers = true)]
    pub nprimary: Option<i64>,

    /// Average number of children per gate
    #[arg(short = 'c', long, allow_negative_numbers = true)]
    pub nchildren: Option<i64>,

    /// Primary events to gates ratio per new node
    #[arg(long, allow_negative_numbers = true)]
    pub ratio: Option<f64>,

    /// Probability of reusing an existing primary event (max 0.9)
    #[arg(long, allow_negative_numbers = true)]
    pub reuse_p: Option<f64>,

    /// Approximate share of repeated gates (max 0.9, reserved)
    #[arg(long, allow_negative_numbers = true)]
    pub reuse_g: Option<f64>,

    /// Maximum probability for primary events
    #[arg(long, allow_negative_numbers = true)]
    pub maxprob: Option<f64>,

    /// Minimum probability for primary events
    #[arg(long, allow_negative_numbers = true)]
    pub minprob: Option<f64>,

    /// Minimal number of primary events for the root gate
    #[arg(long, allow_negative_numbers = true)]
    pub ptop: Option<i64>,

    /// Fixed number of children for the root gate (0 for random)
    #[arg(long, allow_negative_numbers = true)]
    pub ctop: Option<i64>,
}

impl From<&TreeArgs> for RawTreeParams {
    fn from(args: &TreeArgs) -> Self {
        Self {
            ft_name: args.ft_name.clone(),
            root: args.root.clone(),
            seed: args.seed,
            nprimary: args.nprimary,
            nchildren: args.nchildren,
            ratio: args.ratio,
            reuse_p: args.reuse_p,
            reuse_g: args.reuse_g,
            maxprob: args.maxprob,
            minprob: args.minprob,
            ptop: args.ptop,
            ctop: args.ctop,
        }
    }
}

impl TreeArgs {
    /// Command line layer on top of the loaded settings.
    pub fn to_overlay(&self, out: Option<PathBuf>) -> RawSettings {
        RawSettings {
            out,
            tree: self.into(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create the global config instead of ./ftgen.toml
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

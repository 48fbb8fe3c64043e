//! CLI argument definitions using clap

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::KeyKind;

/// Red-black tree engine with an ordered mutation trace and file import/export
#[derive(Parser, Debug)]
#[command(name = "rbtrace")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .rbtrace.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply insert/delete/find operations to a tree
    Run {
        /// Key kind of the fresh tree: number, text or char (N/T/C)
        #[arg(short, long)]
        kind: Option<KeyKind>,

        /// Start from a tree file instead of an empty tree
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        import: Option<PathBuf>,

        /// Write the resulting tree to this file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        export: Option<PathBuf>,

        /// Print the event log of every operation
        #[arg(long)]
        events: bool,

        /// Import without checking the red-black rules (tree becomes read-only)
        #[arg(long)]
        no_validate: bool,

        /// Operations: insert:KEY (i:KEY), delete:KEY (d:KEY), find:KEY (f:KEY)
        ops: Vec<Operation>,
    },

    /// Convert a tree file between formats (chosen by extension)
    Convert {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Skip red-black validation of the input
        #[arg(long)]
        no_validate: bool,
    },

    /// Check a tree file against the red-black rules
    Validate {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print a tree file as a diagram
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Skip red-black validation
        #[arg(long)]
        no_validate: bool,
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a template config file
    Template,
    /// Show config file locations
    Path,
}

/// A single tree operation given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert(String),
    Delete(String),
    Find(String),
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, key) = s
            .split_once(':')
            .ok_or_else(|| format!("expected OP:KEY, got '{}'", s))?;
        let key = key.to_string();
        match op.to_ascii_lowercase().as_str() {
            "insert" | "i" => Ok(Operation::Insert(key)),
            "delete" | "d" => Ok(Operation::Delete(key)),
            "find" | "f" => Ok(Operation::Find(key)),
            _ => Err(format!(
                "unknown operation '{}' (expected insert, delete or find)",
                op
            )),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert(k) => write!(f, "insert {}", k),
            Operation::Delete(k) => write!(f, "delete {}", k),
            Operation::Find(k) => write!(f, "find {}", k),
        }
    }
}

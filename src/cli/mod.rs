pub mod format;
pub mod toml_config;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Serialize absent JSON fields as type-appropriate defaults.
#[derive(Parser, Debug)]
#[command(name = "nullfill", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill absent fields of JSON documents (reads stdin when no paths are given)
    Fill {
        /// Files or directories to fill
        paths: Vec<PathBuf>,

        /// Path to the schema file
        #[arg(short, long, default_value = "nullfill.toml")]
        config: PathBuf,

        /// Registered type the documents are instances of
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Only fill files matching this pattern when walking directories
        #[arg(long, default_value = "*.json")]
        glob: String,

        /// Output format (defaults to the schema's `pretty` setting)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate a schema and show each field's effective rule
    Check {
        /// Path to the schema file
        #[arg(short, long, default_value = "nullfill.toml")]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Compact,
    /// One compact document per line
    Lines,
}

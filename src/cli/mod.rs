pub mod config;
pub mod lint;
pub mod why;

use clap::{Parser, Subcommand};
use json_lint::OutputFormat;
use json_lint::parser::LanguageMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "json-lint")]
#[command(author, version, about = "Lint JSON, JSONC and JSON5 files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Files or directories to lint, or `-` to read from stdin
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Dialect for every file (default: by file extension)
    #[arg(long, value_enum, value_name = "LANGUAGE")]
    pub language: Option<Language>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "errorformat")]
    pub format: Format,

    /// Automatically fix problems
    #[arg(long)]
    pub fix: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not exit with non-zero code on warnings (only fail on errors)
    #[arg(long)]
    pub no_fail_on_warnings: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration file management
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
    /// Show detailed documentation for a rule
    Why {
        /// Rule name (e.g., "no-duplicate-keys")
        rule: Option<String>,

        /// List all available rules
        #[arg(short, long)]
        list: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum Format {
    Errorformat,
    Json,
    GithubActions,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Errorformat => OutputFormat::ErrorFormat,
            Format::Json => OutputFormat::Json,
            Format::GithubActions => OutputFormat::GithubActions,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum Language {
    Json,
    Jsonc,
    Json5,
}

impl From<Language> for LanguageMode {
    fn from(l: Language) -> Self {
        match l {
            Language::Json => LanguageMode::Json,
            Language::Jsonc => LanguageMode::Jsonc,
            Language::Json5 => LanguageMode::Json5,
        }
    }
}

//! CLI command definitions for the `gupshup` binary.
//!
//! Uses clap derive macros for argument parsing. Running `gupshup` with no
//! subcommand starts a terminal chat.

pub mod chat;
pub mod personas;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use gupshup_infra::config::ConfigOverrides;

use crate::state::StartupOptions;

/// Chat with a persona backed by Gemini.
#[derive(Parser)]
#[command(name = "gupshup", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Built-in persona to run (overrides config.toml).
    #[arg(long, global = true, env = "GUPSHUP_PERSONA")]
    pub persona: Option<String>,

    /// Load a custom persona from a TOML file.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "persona")]
    pub persona_file: Option<PathBuf>,

    /// Gemini model name (overrides config.toml).
    #[arg(long, global = true, env = "GUPSHUP_MODEL")]
    pub model: Option<String>,

    /// Number of recent exchanges sent to the model as context.
    #[arg(short = 'k', long, global = true, value_name = "K")]
    pub memory_window: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat in the terminal (default).
    Chat,

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// List the built-in personas.
    #[command(alias = "ls")]
    Personas,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            persona: self.persona.clone(),
            model: self.model.clone(),
            memory_window: self.memory_window,
        }
    }

    pub fn startup_options(&self) -> StartupOptions {
        StartupOptions {
            overrides: self.overrides(),
            persona_file: self.persona_file.clone(),
        }
    }
}

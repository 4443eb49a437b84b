//! Clap derive structures for the `hearth` CLI.

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hearth -- command-line client for a home-automation hub
#[derive(Debug, Parser)]
#[command(
    name = "hearth",
    version,
    about = "Observe and switch home-automation entities from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Hub base URL (overrides the config file)
    #[arg(long, short = 'u', env = "HEARTH_URL", global = true)]
    pub url: Option<String>,

    /// Long-lived access token (overrides the config file)
    #[arg(long, env = "HEARTH_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save hub connection settings to the config file
    Login {
        /// Hub base URL, e.g. http://homeassistant.local:8123
        url: String,
        /// Long-lived access token
        token: String,
    },

    /// List all classified entities
    Entities,

    /// Show one entity in detail
    State {
        /// Namespaced entity id, e.g. light.living_room
        entity_id: String,
    },

    /// Toggle an entity and print its reconciled state
    Toggle {
        /// Namespaced entity id, e.g. switch.outdoor_light
        entity_id: String,
    },

    /// Turn an entity on and print its reconciled state
    On {
        /// Namespaced entity id
        entity_id: String,
    },

    /// Turn an entity off and print its reconciled state
    Off {
        /// Namespaced entity id
        entity_id: String,
    },

    /// Poll the hub continuously, printing each state change (Ctrl-C to stop)
    Watch,
}

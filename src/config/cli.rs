use crate::core::tip::TipPreset;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "quick-calc")]
#[command(about = "Tip, percentage and currency calculators")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

// Numeric arguments stay as text so they coerce the same way form fields do.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Tip amount, total and per-person share of a bill
    Tip {
        #[arg(long, default_value = "")]
        bill: String,

        /// Preset tip percentage; defaults to the configured preset
        #[arg(long, value_enum)]
        tip: Option<TipPreset>,

        /// Custom tip percentage, overrides --tip when non-empty
        #[arg(long, default_value = "")]
        custom_tip: String,

        #[arg(long, default_value = "1")]
        people: String,
    },

    /// Percentage calculations
    Percent {
        #[command(subcommand)]
        mode: PercentCommand,
    },

    /// Convert an amount using live exchange rates
    Convert {
        #[arg(long, default_value = "")]
        amount: String,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// Keep converting as rates refresh in the background, until Ctrl-C
    Watch {
        #[arg(long, default_value = "")]
        amount: String,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Refresh interval in seconds, overrides the configured one
        #[arg(long)]
        interval: Option<u64>,
    },

    /// List the currencies offered by default
    Currencies,
}

#[derive(Debug, Clone, Subcommand)]
pub enum PercentCommand {
    /// What is X% of Y?
    Of {
        #[arg(long, default_value = "")]
        percentage: String,

        #[arg(long, default_value = "")]
        base: String,
    },

    /// X is what percent of Y?
    What {
        #[arg(long, default_value = "")]
        part: String,

        #[arg(long, default_value = "")]
        total: String,
    },
}

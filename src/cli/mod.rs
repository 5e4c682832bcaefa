pub mod check;
pub mod choices;
pub mod dashboard;
pub mod export;
pub mod init;
pub mod show;
pub mod tables;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::error::Result;
use crate::pipeline::Dataset;
use crate::settings::{load_settings, shellexpand_path, Settings};
use crate::tables::{LookupTables, Variant};

#[derive(Parser)]
#[command(
    name = "impact-dash",
    about = "Reshape economic-impact CSV extracts into comparative bar charts."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
pub struct GlobalArgs {
    /// Directory of input CSV files (default: from settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
    /// Lookup-table preset
    #[arg(long, value_enum, global = true)]
    pub variant: Option<Variant>,
    /// JSON file with custom lookup tables (overrides --variant)
    #[arg(long, global = true)]
    pub tables: Option<String>,
    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the default data directory and preset.
    Init,
    /// Print the active lookup tables as JSON.
    Tables,
    /// List the available effects and scales of effect.
    Choices,
    /// Print the chart rows for one effect and scale.
    Show {
        /// Effect (metric), e.g. 'Number of Jobs'
        #[arg(long)]
        effect: Option<String>,
        /// Scale of effect (attribute), e.g. 'Direct'
        #[arg(long)]
        scale: Option<String>,
        /// Only this scenario
        #[arg(long)]
        scenario: Option<String>,
        /// Only this period label, e.g. '05-10'
        #[arg(long)]
        year: Option<String>,
    },
    /// Run the pipeline and report row counts and scenario alignment.
    Check,
    /// Write the chart rows (CSV) and chart description (JSON).
    Export {
        #[arg(long)]
        effect: Option<String>,
        #[arg(long)]
        scale: Option<String>,
        /// Output directory (default: <data_dir>/exports/chart-YYYY-MM-DD)
        #[arg(long)]
        output: Option<String>,
    },
    /// Interactive dashboard (default when no command is given).
    Dashboard,
}

/// Settings merged with command-line overrides.
pub struct Context {
    pub settings: Settings,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn resolve(global: &GlobalArgs) -> Self {
        let mut settings = load_settings();
        if let Some(dir) = &global.data_dir {
            settings.data_dir = shellexpand_path(dir);
        }
        if let Some(variant) = global.variant {
            settings.variant = variant;
            settings.tables = None;
        }
        if let Some(tables) = &global.tables {
            settings.tables = Some(tables.clone());
        }
        let data_dir = PathBuf::from(&settings.data_dir);
        debug!(data_dir = %data_dir.display(), variant = settings.variant.key(), "resolved settings");
        Self { settings, data_dir }
    }

    pub fn tables(&self) -> Result<LookupTables> {
        self.settings.lookup_tables()
    }

    pub fn dataset(&self) -> Result<Dataset> {
        Dataset::load(&self.data_dir, self.tables()?)
    }
}

//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    features::FeaturesArgs, init::InitArgs, load::LoadArgs, summary::SummaryArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "secom-seed")]
#[command(author, version, about = "SECOM manufacturing-quality database seeder")]
#[command(long_about = "Generates feature metadata for the 590 SECOM sensor features and loads the raw SECOM files as enriched production lots, measurements and quality results.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// SQLite database file (default: secom.db)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Directory holding secom.data and secom_labels.data
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    /// Layered configuration with command-line flags applied last
    pub fn config(&self) -> Config {
        let mut config = Config::load();
        self.apply(&mut config);
        config
    }

    fn apply(&self, config: &mut Config) {
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = Some(data_dir.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the feature metadata as an SQL script
    Features(FeaturesArgs),

    /// Create the schema, seed reference data and load feature metadata
    Init(InitArgs),

    /// Load the SECOM files as enriched production data
    Load(LoadArgs),

    /// Show row counts and quality statistics of the database
    Summary(SummaryArgs),
}

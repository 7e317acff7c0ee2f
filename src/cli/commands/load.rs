//! `secom-seed load` command - Load the SECOM files as production data
//!
//! Every record becomes one lot, one measurement per loaded feature and one
//! quality result. Feature metadata is created first if the database has
//! none yet.

use console::style;
use miette::Result;

use crate::catalog;
use crate::cli::helpers::{connect, rng_for, seed_metadata, summary_table};
use crate::cli::GlobalOpts;
use crate::core::DataFiles;
use crate::pipeline::{LoadOptions, Pipeline, SourceRecords};

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Seed for the random source; the same seed reproduces the same data
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: LoadArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = global.config();
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let files = DataFiles::resolve(&config);
    tracing::info!(
        features = %files.features.display(),
        labels = %files.labels.display(),
        "resolved input files"
    );

    // Read and check alignment before touching the database
    let source = SourceRecords::read(&files)?;

    let store = connect(&config, global.quiet)?;
    if !store.is_initialized()? {
        seed_metadata(&store, false)?;
        if !global.quiet {
            println!(
                "{} Created schema and loaded {} feature definitions",
                style("→").blue(),
                catalog::FEATURE_COUNT
            );
        }
    }

    if !global.quiet {
        println!(
            "{} Loading {} records from {}",
            style("→").blue(),
            style(source.len()).cyan(),
            files.features.display()
        );
    }

    let quiet = global.quiet;
    let mut pipeline = Pipeline::new(&store, rng_for(config.seed), LoadOptions::from(&config));
    let stats = pipeline.run(&source, |progress| {
        if !quiet {
            println!(
                "  Processed {}/{} records ({} measurements)",
                progress.processed, progress.total, progress.measurements
            );
        }
    })?;

    if !global.quiet {
        println!(
            "{} Loaded {} lots in {}ms",
            style("✓").green(),
            style(stats.lots).cyan(),
            stats.duration_ms
        );
        println!("  Measurements: {}", stats.measurements);
        println!("  Out of spec:  {}", style(stats.out_of_spec).yellow());
        println!("  Failed lots:  {}", style(stats.failures).red());
        println!();
        println!("{}", summary_table(&store.summary()?));
    }

    Ok(())
}

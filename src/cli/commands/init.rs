//! `secom-seed init` command - Create the schema and load feature metadata

use console::style;
use miette::{bail, Result};

use crate::catalog;
use crate::cli::helpers::{connect, seed_metadata};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Drop and recreate every table, discarding loaded data
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let store = connect(&config, global.quiet)?;

    let initialized = store.is_initialized()?;
    if initialized && !args.force {
        bail!(
            "Already initialized: {} (use --force to recreate it)",
            config.database.display()
        );
    }

    let (refs, features) = seed_metadata(&store, args.force)?;
    if initialized && !global.quiet {
        println!("{} Dropped existing tables", style("→").blue());
    }

    if !global.quiet {
        println!(
            "{} Initialized database at {}",
            style("✓").green(),
            style(config.database.display()).cyan()
        );
        println!("  Shifts:        {}", refs.shifts);
        println!("  Operators:     {}", refs.operators);
        println!("  Equipment:     {}", refs.equipment);
        println!("  Product types: {}", refs.product_types);
        println!(
            "  Features:      {} ({} critical)",
            style(features).cyan(),
            (0..catalog::FEATURE_COUNT).filter(|&fid| catalog::is_critical(fid)).count()
        );
        println!();
        println!("Next: {}", style("secom-seed load").yellow());
    }

    Ok(())
}

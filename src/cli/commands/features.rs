//! `secom-seed features` command - Print the feature metadata as SQL

use miette::{IntoDiagnostic, Result};
use std::io::{BufWriter, Write};

use crate::catalog;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct FeaturesArgs {
    /// Rows per INSERT statement (default: sql_batch_size from config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Schema named in the USE statement (default: schema_name from config)
    #[arg(long)]
    pub schema: Option<String>,
}

pub fn run(args: FeaturesArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let batch_size = args.batch_size.unwrap_or(config.sql_batch_size);
    let schema = args.schema.unwrap_or(config.schema_name);

    let defs = catalog::definitions();
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    catalog::render_sql(&mut out, &defs, &schema, batch_size).into_diagnostic()?;
    out.flush().into_diagnostic()?;

    tracing::info!(features = defs.len(), batch_size, "feature metadata script written");
    Ok(())
}

//! `secom-seed summary` command - Verify the loaded data and report on it

use console::style;
use miette::{bail, Result};

use crate::cli::helpers::{
    connect, defect_table, equipment_table, high_risk_table, shift_table, summary_table,
};
use crate::cli::GlobalOpts;
use crate::core::store::{DEFAULT_HIGH_RISK_LIMIT, DEFAULT_RISK_THRESHOLD};
use crate::core::ProductionStore;

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Also check that every lot has one measurement per feature
    #[arg(long)]
    pub check: bool,

    /// Lot outcomes, staffing and equipment use per shift
    #[arg(long)]
    pub shifts: bool,

    /// Throughput, failures and health score per piece of equipment
    #[arg(long)]
    pub equipment: bool,

    /// Failed lots per defect type with their share of all failures
    #[arg(long)]
    pub defects: bool,

    /// Lots whose predicted risk is at or above THRESHOLD (0.0 to 1.0, default 0.7)
    #[arg(long, value_name = "THRESHOLD", num_args = 0..=1, default_missing_value = "0.7", value_parser = parse_threshold)]
    pub high_risk: Option<f64>,

    /// Most high-risk lots to list
    #[arg(long, default_value_t = DEFAULT_HIGH_RISK_LIMIT, requires = "high_risk")]
    pub limit: usize,
}

fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside 0.0..=1.0", value))
    }
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let store = connect(&config, global.quiet)?;

    if !store.is_initialized()? {
        bail!(
            "No feature metadata in {} (run `secom-seed init` first)",
            config.database.display()
        );
    }

    let summary = store.summary()?;
    println!("{}", style("Database Summary").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Location: {}", style(config.database.display()).cyan());
    println!();
    println!("{}", summary_table(&summary));

    if args.check {
        let incomplete: Vec<(String, usize)> = store
            .measurements_per_lot()?
            .into_iter()
            .filter(|(_, n)| *n != summary.feature_count)
            .collect();

        if summary.quality_count != summary.lot_count {
            bail!(
                "{} lots but {} quality results",
                summary.lot_count,
                summary.quality_count
            );
        }
        if !incomplete.is_empty() {
            for (lot, n) in incomplete.iter().take(10) {
                println!(
                    "  {} {} has {} measurements",
                    style("✗").red(),
                    lot,
                    n
                );
            }
            bail!(
                "{} lot(s) do not have {} measurements",
                incomplete.len(),
                summary.feature_count
            );
        }
        println!(
            "{} Every lot has {} measurements and one quality result",
            style("✓").green(),
            summary.feature_count
        );
    }

    print_reports(&store, &args)
}

fn print_section(title: &str) {
    println!();
    println!("{}", style(title).bold());
    println!("{}", style("─".repeat(40)).dim());
}

fn print_reports(store: &ProductionStore, args: &SummaryArgs) -> Result<()> {
    if args.shifts {
        print_section("Shift Performance");
        println!("{}", shift_table(&store.shift_performance()?));
    }

    if args.equipment {
        print_section("Equipment Health");
        println!("{}", equipment_table(&store.equipment_health()?));
    }

    if args.defects {
        print_section("Defect Breakdown");
        let defects = store.defect_breakdown()?;
        if defects.is_empty() {
            println!("  No failed lots");
        } else {
            println!("{}", defect_table(&defects));
        }
    }

    if let Some(threshold) = args.high_risk {
        print_section(&format!("High-Risk Lots (predicted risk >= {:.2})", threshold));
        let lots = store.high_risk_lots(threshold, args.limit)?;
        if lots.is_empty() {
            println!("  No lots at or above the threshold");
        } else {
            println!("{}", high_risk_table(&lots));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::cli::Commands;
    use clap::Parser;

    fn summary_args(argv: &[&str]) -> SummaryArgs {
        let mut full = vec!["secom-seed", "summary"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Summary(args) => args,
            _ => panic!("expected summary"),
        }
    }

    #[test]
    fn test_high_risk_defaults_to_threshold() {
        let args = summary_args(&["--high-risk"]);
        assert_eq!(args.high_risk, Some(DEFAULT_RISK_THRESHOLD));
        assert_eq!(args.limit, DEFAULT_HIGH_RISK_LIMIT);
    }

    #[test]
    fn test_high_risk_explicit_threshold_and_limit() {
        let args = summary_args(&["--high-risk", "0.9", "--limit", "5", "--defects"]);
        assert_eq!(args.high_risk, Some(0.9));
        assert_eq!(args.limit, 5);
        assert!(args.defects);
        assert!(!args.shifts);
    }

    #[test]
    fn test_high_risk_rejects_out_of_range_threshold() {
        let argv = ["secom-seed", "summary", "--high-risk", "1.5"];
        assert!(Cli::try_parse_from(argv).is_err());
        assert!(parse_threshold("abc").is_err());
        assert_eq!(parse_threshold("0"), Ok(0.0));
    }

    #[test]
    fn test_reports_absent_without_flags() {
        let args = summary_args(&[]);
        assert!(!args.shifts && !args.equipment && !args.defects);
        assert_eq!(args.high_risk, None);
    }
}

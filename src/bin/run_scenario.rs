//! Run buy-versus-rent projections for one or more scenarios
//!
//! Writes one monthly comparison CSV per scenario and prints a summary table.

use anyhow::{Context, Result};
use clap::Parser;
use housing_sim::config::{load_scenarios, ExtraPayments};
use housing_sim::projection::{run_scenarios, ScenarioSummary};
use housing_sim::{ScenarioConfig, Settings};
use log::info;
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(about = "Project the monthly cost of buying versus renting")]
struct Args {
    /// JSON file with a scenario object or an array of them; defaults apply otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the per-scenario CSV files
    #[arg(short, long, default_value = "scenario_output")]
    output: PathBuf,

    /// Extra principal paid every month, applied to every scenario
    #[arg(long)]
    extra_payment: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = Settings::from_env();
    info!("Market data cache: {}", settings.data_dir.display());

    let start = Instant::now();
    let mut configs = match &args.config {
        Some(path) => load_scenarios(path)
            .with_context(|| format!("failed to load scenarios from {}", path.display()))?,
        None => vec![ScenarioConfig::default()],
    };
    if let Some(amount) = args.extra_payment {
        for config in &mut configs {
            config.extra_payments = Some(ExtraPayments::Amount(amount));
        }
    }
    info!("Loaded {} scenarios in {:?}", configs.len(), start.elapsed());

    let proj_start = Instant::now();
    let outcomes = run_scenarios(&configs);
    println!("Projections complete in {:?}", proj_start.elapsed());

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let mut summaries: Vec<ScenarioSummary> = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let result = match outcome.result {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Scenario '{}' failed: {}", outcome.name, e);
                continue;
            }
        };

        let path = args.output.join(format!("{}_comparison.csv", outcome.name));
        let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        result.comparison.write_csv(file)?;

        let path = args.output.join(format!("{}_home.csv", outcome.name));
        let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        result.home.write_csv(file)?;

        let path = args.output.join(format!("{}_mortgage.csv", outcome.name));
        let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        result.mortgage.write_csv(file)?;

        summaries.push(result.summary);
    }

    let summary_path = args.output.join("summary.csv");
    let mut wtr = csv::Writer::from_path(&summary_path)
        .with_context(|| format!("failed to create {}", summary_path.display()))?;
    for summary in &summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    println!("Output written to {}", args.output.display());

    println!("\nScenario Summary:");
    println!(
        "{:<16} {:>10} {:>8} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "Scenario", "Payment", "Payoff", "Interest", "Extra", "Indirect", "Rent", "Equity"
    );
    for s in &summaries {
        let payoff = s
            .payoff_month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:>10.2} {:>8} {:>14.0} {:>14.0} {:>14.0} {:>14.0} {:>14.0}",
            s.name,
            s.fixed_monthly_payment,
            payoff,
            s.total_interest,
            s.total_extra_principal,
            s.total_indirect,
            s.total_rent,
            s.final_home_equity
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

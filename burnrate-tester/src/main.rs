mod oracle;
mod scenario;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use scenario::{ALL_SCENARIOS, ScenarioOutcome, run_scenario};

#[derive(Debug, Parser)]
#[command(name = "burnrate-tester", version = "0.1.0")]
#[command(about = "Automated QA for the Burnrate engine - scripted oracle sessions with invariant checks")]
struct Args {
    /// Scenarios to run (comma-separated), or "all"
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Turns to play per scenario
    #[arg(long, default_value_t = 12)]
    turns: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Optional path to write the report instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    generated_at: String,
    turns_per_run: u32,
    outcomes: Vec<ScenarioOutcome>,
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_seeds(input: &str) -> Result<Vec<u64>> {
    split_csv(input)
        .iter()
        .map(|raw| {
            raw.parse::<u64>()
                .with_context(|| format!("invalid seed `{raw}`"))
        })
        .collect()
}

fn resolve_scenarios(input: &str) -> Result<Vec<String>> {
    if input.trim() == "all" {
        return Ok(ALL_SCENARIOS.iter().map(ToString::to_string).collect());
    }
    let requested = split_csv(input);
    for name in &requested {
        if !ALL_SCENARIOS.contains(&name.as_str()) {
            bail!(
                "unknown scenario `{name}` (available: {})",
                ALL_SCENARIOS.join(", ")
            );
        }
    }
    Ok(requested)
}

fn print_console(outcomes: &[ScenarioOutcome], verbose: bool) {
    for outcome in outcomes {
        let label = format!("{} (seed {})", outcome.scenario, outcome.seed);
        if outcome.passed {
            println!(
                "{} {label} - {} turns resolved",
                "PASS".green().bold(),
                outcome.turns_resolved
            );
        } else {
            println!(
                "{} {label} - {} turns resolved",
                "FAIL".red().bold(),
                outcome.turns_resolved
            );
            for failure in &outcome.failures {
                println!("       {}", failure.red());
            }
        }
        if verbose && outcome.passed {
            for failure in &outcome.failures {
                println!("       {failure}");
            }
        }
    }

    let failed = outcomes.iter().filter(|o| !o.passed).count();
    let total = outcomes.len();
    if failed == 0 {
        println!("{}", format!("{total}/{total} runs passed").green().bold());
    } else {
        println!(
            "{}",
            format!("{failed}/{total} runs failed").red().bold()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenarios = resolve_scenarios(&args.scenarios)?;
    let seeds = parse_seeds(&args.seeds)?;

    let mut outcomes = Vec::new();
    for scenario in &scenarios {
        for &seed in &seeds {
            let outcome = run_scenario(scenario, seed, args.turns)
                .await
                .with_context(|| format!("scenario `{scenario}` seed {seed} crashed"))?;
            outcomes.push(outcome);
        }
    }

    match args.report.as_str() {
        "json" => {
            let report = Report {
                generated_at: chrono::Utc::now().to_rfc3339(),
                turns_per_run: args.turns,
                outcomes,
            };
            let body = serde_json::to_string_pretty(&report)?;
            match &args.output {
                Some(path) => fs::write(path, body)
                    .with_context(|| format!("writing report to {}", path.display()))?,
                None => println!("{body}"),
            }
            if report.outcomes.iter().any(|o| !o.passed) {
                bail!("one or more scenario runs failed");
            }
        }
        _ => {
            print_console(&outcomes, args.verbose);
            if outcomes.iter().any(|o| !o.passed) {
                bail!("one or more scenario runs failed");
            }
        }
    }

    Ok(())
}

//! Intrinsic - JSON-in/JSON-out valuation CLI.
//!
//! Reads request payloads from a file (or stdin with `-`), runs the
//! deterministic valuation pipeline and prints the result on stdout.
//! Logs go to stderr, so output can be piped as-is.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use intrinsic_common::logging::init_logging;
use intrinsic_common::numeric::sanitize;
use intrinsic_common::{Result, ResultExt};
use serde::Deserialize;
use serde_json::json;

use intrinsic_engine::cost_of_capital::CostOfCapitalCalculator;
use intrinsic_engine::dcf::{
    scenario_config, Archetype, DcfEngine, ScenarioPreset, ValuationRequest,
};
use intrinsic_engine::metrics::StatementHistory;

/// Deterministic DCF valuations from financial statement data.
#[derive(Parser, Debug)]
#[command(name = "intrinsic")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Deterministic DCF valuations from financial statement data.", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a valuation from a JSON request file
    Valuate {
        /// Request file; `-` reads stdin
        input: PathBuf,

        /// Scenario preset (conservative, base, optimistic)
        #[arg(short, long)]
        scenario: Option<String>,

        /// Projection horizon in years (scenario bundles may pin their own)
        #[arg(long)]
        horizon: Option<i32>,

        /// Terminal growth rate, clamped to the scenario band
        #[arg(long)]
        terminal_growth: Option<f64>,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// Derive metrics and cost of capital from statement history
    Derive {
        /// Company data file; `-` reads stdin
        input: PathBuf,

        /// Override the derived growth-model label
        #[arg(long)]
        growth_model: Option<String>,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// Print every scenario assumption bundle
    Scenarios {
        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },
}

/// Statement history plus quote data, as consumed by `derive`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DeriveRequest {
    statements: StatementHistory,
    quote: QuoteSnapshot,
}

/// Market quote fields that statements alone cannot provide.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSnapshot {
    beta: Option<f64>,
    market_cap: Option<f64>,
    shares_outstanding: Option<f64>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);
    tracing::debug!("Intrinsic v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(cli.command) {
        let payload = err.to_payload();
        println!(
            "{}",
            json!({ "error": payload.error, "message": payload.message })
        );
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Valuate {
            input,
            scenario,
            horizon,
            terminal_growth,
            pretty,
        } => {
            let raw = read_input(&input)?;
            let mut request: ValuationRequest =
                serde_json::from_str(&raw).context("Failed to parse valuation request")?;
            if scenario.is_some() {
                request.scenario = scenario;
            }
            if horizon.is_some() {
                request.horizon_years = horizon;
            }
            if terminal_growth.is_some() {
                request.g_terminal = terminal_growth;
            }

            let result = DcfEngine::new().run(&request)?;
            print_payload(&result, pretty)
        }

        Commands::Derive {
            input,
            growth_model,
            pretty,
        } => {
            let raw = read_input(&input)?;
            let request: DeriveRequest =
                serde_json::from_str(&raw).context("Failed to parse company data")?;

            let quote = &request.quote;
            let shares = quote.shares_outstanding.and_then(sanitize).unwrap_or(0.0);
            let market_cap = quote
                .market_cap
                .and_then(sanitize)
                .filter(|m| *m >= 0.0)
                .unwrap_or(0.0);

            let mut metrics = request.statements.to_metrics();
            metrics.shares_outstanding = Some(shares);
            if growth_model.is_some() {
                metrics.growth_model = growth_model;
            }

            let inputs = request
                .statements
                .capital_inputs(quote.beta, Some(market_cap));
            let cost_of_capital = CostOfCapitalCalculator::new().build_snapshot(&inputs);

            print_payload(
                &json!({ "metrics": metrics, "costOfCapital": cost_of_capital }),
                pretty,
            )
        }

        Commands::Scenarios { pretty } => print_payload(
            &json!({
                "mature": archetype_bundles(Archetype::Mature),
                "hypergrowth": archetype_bundles(Archetype::Hypergrowth),
            }),
            pretty,
        ),
    }
}

// ===== Helper Functions =====

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))
}

fn print_payload<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

fn archetype_bundles(archetype: Archetype) -> serde_json::Value {
    json!({
        "conservative": scenario_config(ScenarioPreset::Conservative, archetype),
        "base": scenario_config(ScenarioPreset::Base, archetype),
        "optimistic": scenario_config(ScenarioPreset::Optimistic, archetype),
    })
}

//! Weight Rationale - command-line reports for portfolio weights.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use weight_common::logging::init_logging_with_exclusions;
use weight_common::{Config, Error};
use weight_rationale::{
    AugmentOptions, AugmentationStatus, BatchExplainer, ReportRequest, WeightRationaleEngine,
};

#[derive(Parser, Debug)]
#[command(name = "weight-rationale")]
#[command(version)]
#[command(about = "Explain portfolio weights from fundamentals and recent news.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Ticker symbol
    ticker: String,

    /// Portfolio weight as a fraction in [0, 1]
    #[arg(allow_negative_numbers = true)]
    weight: f64,

    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    as_of: Option<String>,

    /// Replace the rule-based bullets with language-model output when possible
    #[arg(long)]
    augment: bool,

    /// Model override for --augment (e.g. gpt-4o-mini, gemini-2.0-flash, openai:my-model)
    #[arg(long, requires = "augment")]
    model: Option<String>,
}

#[derive(Args, Debug)]
struct WindowArgs {
    /// News lookback in days (default from config)
    #[arg(long)]
    lookback_days: Option<i64>,

    /// Maximum number of scored articles (default from config)
    #[arg(long)]
    max_articles: Option<i64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fundamentals-based rationale
    Fundamentals {
        #[command(flatten)]
        report: ReportArgs,

        /// Omit the metrics table
        #[arg(long)]
        no_metrics: bool,
    },

    /// News-flow review
    News {
        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Omit the headline table
        #[arg(long)]
        no_articles: bool,
    },

    /// Combined review of both evidence streams
    Summary {
        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Append both component reports
        #[arg(long)]
        components: bool,
    },

    /// Write combined reports for every allocation of a decision step
    Batch {
        /// Decision step, converted to base_date + step days
        #[arg(long)]
        step: u64,

        /// Allocations as TICKER=WEIGHT, e.g. AAPL=0.12
        #[arg(required = true, value_parser = parse_allocation)]
        allocations: Vec<(String, f64)>,

        /// Keep only the k largest allocations
        #[arg(long)]
        top_k: Option<usize>,

        /// Output directory (default from config)
        #[arg(long)]
        report_dir: Option<std::path::PathBuf>,

        /// Request augmentation for every report
        #[arg(long)]
        augment: bool,
    },
}

fn parse_allocation(raw: &str) -> std::result::Result<(String, f64), String> {
    let (ticker, weight) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=WEIGHT, got {raw:?}"))?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight in {raw:?}: {e}"))?;
    Ok((ticker.trim().to_string(), weight))
}

impl ReportArgs {
    fn request(&self) -> ReportRequest {
        let mut request = ReportRequest::new(&self.ticker, self.weight);
        if let Some(as_of) = &self.as_of {
            request = request.as_of(as_of.clone());
        }
        if self.augment {
            request = request.augment(self.model.clone());
        }
        request
    }
}

fn with_window(request: ReportRequest, window: &WindowArgs, config: &Config) -> ReportRequest {
    request
        .lookback_days(window.lookback_days.unwrap_or(config.news.lookback_days))
        .max_articles(window.max_articles.unwrap_or(config.news.max_articles))
}

fn status_line(status: &AugmentationStatus) -> String {
    match status {
        AugmentationStatus::NotRequested => "augmentation: not requested".to_string(),
        AugmentationStatus::Generated { provider, model } => {
            format!("augmentation: generated by {provider} ({model})")
        }
        AugmentationStatus::Declined { reason } => format!("augmentation: declined ({reason})"),
    }
}

/// Exit status for a failed run: the shared taxonomy when present, else 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_and_validate().map_err(|e| Error::Config(format!("{e:#}")))?;
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );
    tracing::debug!("weight-rationale v{}", env!("CARGO_PKG_VERSION"));

    let engine = WeightRationaleEngine::from_config(&config);

    match cli.command {
        Commands::Fundamentals { report, no_metrics } => {
            let result = engine.fundamentals_report(&report.request()).await.map_err(Error::from)?;
            println!("{}", result.to_markdown(!no_metrics));
            eprintln!("{}", status_line(&result.augmentation));
        }
        Commands::News {
            report,
            window,
            no_articles,
        } => {
            let request = with_window(report.request(), &window, &config);
            let result = engine.news_report(&request).await.map_err(Error::from)?;
            println!("{}", result.to_markdown(!no_articles));
            eprintln!("{}", status_line(&result.augmentation));
        }
        Commands::Summary {
            report,
            window,
            components,
        } => {
            let request = with_window(report.request(), &window, &config);
            let result = engine.combined_report(&request).await.map_err(Error::from)?;
            println!("{}", result.to_markdown(components, true, true));
            eprintln!("{}", status_line(&result.augmentation));
        }
        Commands::Batch {
            step,
            allocations,
            top_k,
            report_dir,
            augment,
        } => {
            let mut config = config;
            if let Some(dir) = report_dir {
                config.batch.report_dir = dir;
            }
            if top_k.is_some() {
                config.batch.top_k = top_k;
            }
            let mut explainer = BatchExplainer::from_config(engine, &config);
            if augment {
                explainer = explainer.augment(AugmentOptions::with_model(None));
            }

            let outcome = explainer
                .explain_step(step, &allocations)
                .await
                .map_err(Error::from)
                .with_context(|| format!("Failed to explain step {step}"))?;
            for path in &outcome.written {
                println!("{}", path.display());
            }
            if !outcome.is_complete() {
                for failure in &outcome.failures {
                    eprintln!("{}: {}", failure.ticker, failure.reason);
                }
                return Err(Error::Report(format!(
                    "{} of {} allocation(s) failed",
                    outcome.failures.len(),
                    outcome.failures.len() + outcome.written.len()
                ))
                .into());
            }
        }
    }

    Ok(())
}

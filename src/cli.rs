//! Command-line interface for the news/price analysis pipeline.

use newsquant::analytics::ResultFormatter;
use newsquant::batch::{
    self, BatchDriver, BatchReport, IndicatorReport, MetricsReport, SkippedTicker,
};
use newsquant::config::AnalysisFileConfig;
use newsquant::data::discover_tickers;
use newsquant::eda::{CountEntry, NewsSummary};
use newsquant::error::Result;
use newsquant::sentiment::{PolarityScorer, VaderScorer};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// newsquant - Correlate financial news sentiment with stock returns.
#[derive(Parser)]
#[command(name = "newsquant")]
#[command(version)]
#[command(about = "Correlate financial news sentiment with daily stock returns")]
#[command(long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (TOML); defaults are used when absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input/output directory overrides shared by the data commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DirArgs {
    /// Directory with the news file and price files
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the outputs
    #[arg(short = 'O', long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Correlate daily headline sentiment with daily returns per ticker
    Correlate {
        /// Comma-separated tickers (overrides the configuration)
        #[arg(short, long, value_delimiter = ',')]
        tickers: Option<Vec<String>>,

        /// Minimum number of aligned dates
        #[arg(short, long)]
        min_samples: Option<usize>,

        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Descriptive statistics of the news corpus
    Eda {
        /// Entries per top-N list
        #[arg(long)]
        top: Option<usize>,

        /// Headlines sampled for keyword extraction
        #[arg(long)]
        keyword_sample: Option<usize>,

        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Compute return and risk metrics per ticker
    Metrics {
        /// Comma-separated tickers (overrides the configuration)
        #[arg(short, long, value_delimiter = ',', conflicts_with = "all")]
        tickers: Option<Vec<String>>,

        /// Process every ticker with a price file in the input directory
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Compute SMA/RSI/MACD processed-price tables per ticker
    Indicators {
        /// Comma-separated tickers (overrides the configuration)
        #[arg(short, long, value_delimiter = ',', conflicts_with = "all")]
        tickers: Option<Vec<String>>,

        /// Process every ticker with a price file in the input directory
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Print the polarity score of a headline
    Score {
        /// Text to score
        text: String,
    },

    /// Create an example configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "newsquant.toml")]
        output: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl Cli {
    /// Initialize logging based on verbosity level.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("warning: a tracing subscriber is already installed");
        }
    }

    fn file_config(&self) -> Result<AnalysisFileConfig> {
        match &self.config {
            Some(path) => AnalysisFileConfig::load(path),
            None => Ok(AnalysisFileConfig::default()),
        }
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    match &cli.command {
        Commands::Correlate {
            tickers,
            min_samples,
            dirs,
        } => {
            let mut config = cli.file_config()?;
            apply_dirs(&mut config, dirs);
            if let Some(tickers) = tickers {
                config.pipeline.tickers = tickers.clone();
            }
            if let Some(min_samples) = min_samples {
                config.pipeline.min_samples = *min_samples;
            }
            run_correlate(&config, cli.output)
        }

        Commands::Eda {
            top,
            keyword_sample,
            dirs,
        } => {
            let mut config = cli.file_config()?;
            apply_dirs(&mut config, dirs);
            if let Some(top) = top {
                config.eda.top_n = *top;
            }
            if let Some(sample) = keyword_sample {
                config.eda.keyword_sample = *sample;
            }
            run_eda(&config, cli.output)
        }

        Commands::Metrics { tickers, all, dirs } => {
            let mut config = cli.file_config()?;
            apply_dirs(&mut config, dirs);
            if *all {
                config.pipeline.tickers = discover_tickers(&config.pipeline.input_dir)?;
            } else if let Some(tickers) = tickers {
                config.pipeline.tickers = tickers.clone();
            }
            run_metrics(&config, cli.output)
        }

        Commands::Indicators { tickers, all, dirs } => {
            let mut config = cli.file_config()?;
            apply_dirs(&mut config, dirs);
            if *all {
                config.pipeline.tickers = discover_tickers(&config.pipeline.input_dir)?;
            } else if let Some(tickers) = tickers {
                config.pipeline.tickers = tickers.clone();
            }
            run_indicators(&config, cli.output)
        }

        Commands::Score { text } => {
            score_text(text, cli.output);
            Ok(())
        }

        Commands::Init { output } => init_config(output),
    }
}

fn apply_dirs(config: &mut AnalysisFileConfig, dirs: &DirArgs) {
    if let Some(dir) = &dirs.input_dir {
        config.pipeline.input_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(dir) = &dirs.output_dir {
        config.pipeline.output_dir = dir.to_string_lossy().into_owned();
    }
}

fn skipped_json(skipped: &[SkippedTicker]) -> serde_json::Value {
    skipped
        .iter()
        .map(|s| {
            json!({
                "ticker": s.ticker,
                "kind": s.reason.kind(),
                "reason": s.reason.to_string(),
            })
        })
        .collect()
}

fn print_skips_csv(skipped: &[SkippedTicker]) {
    for s in skipped {
        eprintln!("skipped,{},{}", s.ticker, s.reason.kind());
    }
}

fn run_correlate(config: &AnalysisFileConfig, output: OutputFormat) -> Result<()> {
    let batch_config = config.to_batch_config()?;
    info!(
        "Correlating {} tickers from {}",
        batch_config.tickers.len(),
        batch_config.input_dir.display()
    );

    let driver = BatchDriver::new(batch_config, Box::new(VaderScorer::new()));
    let report: BatchReport = driver.run()?;

    match output {
        OutputFormat::Text => ResultFormatter::print_batch_report(&report),
        OutputFormat::Json => {
            let value = json!({
                "results": report.results,
                "skipped": skipped_json(&report.skipped),
            });
            println!("{}", ResultFormatter::to_json(&value));
        }
        OutputFormat::Csv => {
            println!("{}", ResultFormatter::csv_header());
            for result in &report.results {
                println!("{}", ResultFormatter::to_csv_line(result));
            }
            print_skips_csv(&report.skipped);
        }
    }
    Ok(())
}

fn print_counts_csv(section: &str, counts: &[CountEntry]) {
    for entry in counts {
        println!("{},{},{}", section, entry.label.replace(',', " "), entry.count);
    }
}

fn run_eda(config: &AnalysisFileConfig, output: OutputFormat) -> Result<()> {
    let batch_config = config.to_batch_config()?;
    let summary: NewsSummary = batch::run_news_summary(&batch_config, &config.to_eda_config())?;

    match output {
        OutputFormat::Text => ResultFormatter::print_news_summary(&summary),
        OutputFormat::Json => println!("{}", ResultFormatter::to_json(&summary)),
        OutputFormat::Csv => {
            println!("section,label,count");
            print_counts_csv("publisher", &summary.top_publishers);
            print_counts_csv("domain", &summary.top_domains);
            print_counts_csv("keyword", &summary.top_keywords);
            for (hour, count) in summary.hourly_counts.iter().enumerate() {
                println!("hour,{:02},{}", hour, count);
            }
        }
    }
    Ok(())
}

fn run_metrics(config: &AnalysisFileConfig, output: OutputFormat) -> Result<()> {
    let batch_config = config.to_batch_config()?;
    let report: MetricsReport =
        batch::run_metrics(&batch_config, config.metrics.periods_per_year)?;

    match output {
        OutputFormat::Text => {
            ResultFormatter::print_metrics_table(&report.metrics);
            for s in &report.skipped {
                println!("  {} {:<6} {}", "warning:".yellow().bold(), s.ticker, s.reason);
            }
        }
        OutputFormat::Json => {
            let value = json!({
                "metrics": report.metrics,
                "skipped": skipped_json(&report.skipped),
            });
            println!("{}", ResultFormatter::to_json(&value));
        }
        OutputFormat::Csv => {
            println!("{}", ResultFormatter::metrics_csv_header());
            for m in &report.metrics {
                println!("{}", ResultFormatter::metrics_csv_line(m));
            }
            print_skips_csv(&report.skipped);
        }
    }
    Ok(())
}

fn run_indicators(config: &AnalysisFileConfig, output: OutputFormat) -> Result<()> {
    let batch_config = config.to_batch_config()?;
    let indicator_config = config.to_indicator_config()?;
    let report: IndicatorReport = batch::run_indicators(&batch_config, &indicator_config)?;

    match output {
        OutputFormat::Text => {
            ResultFormatter::print_indicator_table(&report.processed);
            for s in &report.skipped {
                println!("  {} {:<6} {}", "warning:".yellow().bold(), s.ticker, s.reason);
            }
        }
        OutputFormat::Json => {
            let processed: Vec<_> = report
                .processed
                .iter()
                .map(|p| {
                    json!({
                        "ticker": p.ticker,
                        "path": p.path.display().to_string(),
                        "rows": p.rows,
                        "latest": p.latest,
                    })
                })
                .collect();
            let value = json!({
                "processed": processed,
                "skipped": skipped_json(&report.skipped),
            });
            println!("{}", ResultFormatter::to_json(&value));
        }
        OutputFormat::Csv => {
            println!("ticker,rows,path");
            for p in &report.processed {
                println!("{},{},{}", p.ticker, p.rows, p.path.display());
            }
            print_skips_csv(&report.skipped);
        }
    }
    Ok(())
}

fn score_text(text: &str, output: OutputFormat) {
    let scorer = VaderScorer::new();
    let score = scorer.score(text);

    match output {
        OutputFormat::Json => {
            let value = json!({ "scorer": scorer.name(), "text": text, "score": score });
            println!("{}", ResultFormatter::to_json(&value));
        }
        OutputFormat::Csv => println!("{},{:.4}", scorer.name(), score),
        OutputFormat::Text => {
            let colored = if score > 0.0 {
                format!("{:+.4}", score).green()
            } else if score < 0.0 {
                format!("{:+.4}", score).red()
            } else {
                format!("{:.4}", score).normal()
            };
            println!("Polarity ({}): {}", scorer.name(), colored);
        }
    }
}

fn init_config(output: &PathBuf) -> Result<()> {
    let example = AnalysisFileConfig::example();
    fs::write(output, example)?;
    println!("Created example configuration file: {}", output.display());
    println!("\nEdit this file to customize the run, then run:");
    println!("  newsquant -c {} correlate", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from([
            "newsquant",
            "-vv",
            "correlate",
            "--tickers",
            "AAPL,TSLA",
            "--min-samples",
            "8",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Correlate {
                tickers,
                min_samples,
                ..
            } => {
                assert_eq!(tickers, Some(vec!["AAPL".to_string(), "TSLA".to_string()]));
                assert_eq!(min_samples, Some(8));
            }
            _ => panic!("expected correlate"),
        }
    }

    #[test]
    fn test_metrics_all_conflicts_with_tickers() {
        let cli = Cli::try_parse_from(["newsquant", "metrics", "--all", "--tickers", "AAPL"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_indicators_command() {
        let cli = Cli::try_parse_from(["newsquant", "indicators", "--tickers", "AAPL,TSLA"])
            .unwrap();
        match cli.command {
            Commands::Indicators { tickers, all, .. } => {
                assert!(!all);
                assert_eq!(tickers, Some(vec!["AAPL".to_string(), "TSLA".to_string()]));
            }
            _ => panic!("expected indicators"),
        }

        let cli = Cli::try_parse_from(["newsquant", "indicators", "--all", "-t", "AAPL"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_score_and_init_commands() {
        assert!(Cli::try_parse_from(["newsquant", "score", "Shares jump"]).is_ok());
        assert!(Cli::try_parse_from(["newsquant", "-o", "json", "init"]).is_ok());
    }
}

mod api;
mod insights;
mod llm;
mod server;
mod store;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use topic_insight::{
    build_topic_sections, format_count_cn, format_float, format_percent, parse_articles,
    prepare_corpus, quality_report, select_top_articles, sort_articles, AnalyticsConfig, Article,
    ReportBuilder, SortKey,
};

use crate::llm::LlmClient;
use crate::store::{AnalysisRecord, AnalysisStore};

#[derive(Parser)]
#[command(
    name = "topic-insight",
    about = "Keyword analytics and topic suggestions for WeChat article corpora"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Config file (defaults to ANALYTICS_CONFIG_PATH or config/analytics.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the analytics report for a corpus
    Report(ReportArgs),
    /// Generate topic suggestions and analysis sections
    Insights(InsightsArgs),
    /// Check article data quality
    Validate(InputArgs),
    /// List articles in ranking order
    Sort(SortArgs),
    /// Store a corpus as a new analysis
    Import(ImportArgs),
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default config
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// JSON file with articles; reads stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ReportArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    keyword: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct InsightsArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    keyword: String,
    /// Ask the LLM before falling back to rules
    #[arg(long)]
    ai: bool,
    #[arg(long)]
    ai_model: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct SortArgs {
    #[command(flatten)]
    input: InputArgs,
    /// praise, read or publish_time
    #[arg(long, default_value = "praise")]
    by: String,
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

#[derive(Args, Debug, Clone)]
struct ImportArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    keyword: String,
    /// Keep articles published within this many days (0 keeps all)
    #[arg(long, default_value_t = 0)]
    time_range_days: u32,
    /// Keep at most this many articles (0 keeps all)
    #[arg(long, default_value_t = 0)]
    limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "web/dist")]
    web_root: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    load_dotenv();

    // RUST_LOG wins over --quiet, which wins over -v.
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let (config, config_path) = AnalyticsConfig::load(cli.config.clone())?;
    debug!(config = ?config_path, "config loaded");

    match cli.command {
        Command::Report(args) => run_report(args, &config),
        Command::Insights(args) => run_insights(args, &config).await,
        Command::Validate(args) => run_validate(args),
        Command::Sort(args) => run_sort(args),
        Command::Import(args) => run_import(args, &config).await,
        Command::Config { command } => match command {
            ConfigCommand::Init { path, force } => {
                let target = path
                    .or(config_path)
                    .unwrap_or_else(|| PathBuf::from("config/analytics.toml"));
                run_config_init(&target, force)
            }
        },
        Command::Serve(args) => server::serve(args, config).await,
    }
}

fn run_report(args: ReportArgs, config: &AnalyticsConfig) -> Result<()> {
    let articles = read_articles(&args.input)?;
    let now = Utc::now().timestamp();
    let report = ReportBuilder::from_config(config).build(&articles, args.keyword.as_deref(), now);

    if args.input.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!(
        "Articles: {} | avg read {} | avg praise {} | avg engagement {}",
        summary.total_articles,
        format_count_cn(summary.avg_read_count as f64),
        format_count_cn(summary.avg_praise_count as f64),
        format_percent(summary.avg_engagement_rate)
    );

    if !report.top_liked_articles.is_empty() {
        println!("\nTop liked:");
        for item in &report.top_liked_articles {
            println!(
                "  {}. {} ({}) praise {} | read {}",
                item.index + 1,
                item.title,
                item.wx_name,
                item.like_count,
                format_count_cn(item.read_count as f64)
            );
        }
    }

    if !report.top_engagement_articles.is_empty() {
        println!("\nTop engagement:");
        for item in &report.top_engagement_articles {
            println!(
                "  {}. {} ({}) rate {} | score {}",
                item.index + 1,
                item.title,
                item.wx_name,
                format_percent(item.engagement_rate),
                format_float(item.engagement_score, 2)
            );
        }
    }

    if !report.word_cloud.is_empty() {
        let terms: Vec<String> = report
            .word_cloud
            .iter()
            .map(|term| format!("{}({})", term.word, format_float(term.score, 2)))
            .collect();
        println!("\nWord cloud: {}", terms.join(" "));
    }

    println!("\nRead distribution:");
    for bucket in &summary.read_count_distribution {
        println!("  {:>8}: {}", bucket.label, bucket.count);
    }
    println!("Publish time distribution:");
    for bucket in &summary.publish_time_distribution {
        println!("  {:>8}: {}", bucket.label, bucket.count);
    }

    println!("\nInsights:");
    for insight in &report.insights {
        println!("- {}", insight);
    }
    Ok(())
}

async fn run_insights(args: InsightsArgs, config: &AnalyticsConfig) -> Result<()> {
    let articles = read_articles(&args.input)?;
    let now = Utc::now().timestamp();
    let top = select_top_articles(&articles, config.insights.top_articles);

    let client = if args.ai {
        let client = LlmClient::from_env(&config.llm, args.ai_model.clone())
            .context("OPENROUTER_API_KEY is not set")?;
        Some(client)
    } else {
        None
    };

    let progress = |event: &str, message: &str| debug!(event, "{}", message);
    let (outcome, warnings) =
        insights::suggest(client.as_ref(), &args.keyword, &top, config, now, &progress).await;
    let sections = build_topic_sections(&args.keyword, &top, &outcome.suggestions, now);
    // Without --ai the missing-key notice is expected, not a warning.
    let warnings = if args.ai { warnings } else { Vec::new() };

    if args.input.json {
        let payload = serde_json::json!({
            "insights": outcome.suggestions,
            "origin": outcome.origin,
            "modelUsed": outcome.model_used,
            "topicAnalysis": sections,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for warning in &warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "Suggestions for {} ({}, {}):",
        args.keyword,
        outcome.origin.label(),
        outcome.model_used
    );
    for suggestion in &outcome.suggestions {
        println!("\n## {}\n{}\n> {}", suggestion.title, suggestion.reason, suggestion.data_support);
    }

    let blocks = [
        ("Trends", &sections.trends_and_directions),
        ("Pain points", &sections.user_pain_points),
        ("Keywords", &sections.high_frequency_keywords),
        ("Title structure", &sections.content_structure_patterns),
        ("High engagement", &sections.high_engagement_traits),
    ];
    for (heading, lines) in blocks {
        println!("\n{}:", heading);
        for line in lines {
            println!("- {}", line);
        }
    }
    Ok(())
}

fn run_validate(args: InputArgs) -> Result<()> {
    let articles = read_articles(&args)?;
    let report = quality_report(&articles, Utc::now().timestamp());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.summary);
    let validation = &report.validation;
    println!(
        "valid {} | invalid {} | total {}",
        validation.valid, validation.invalid, validation.total
    );
    for error in &validation.errors {
        println!("error: {}", error);
    }
    for warning in &validation.warnings {
        println!("warning: {}", warning);
    }
    for recommendation in &report.recommendations {
        println!("- {}", recommendation);
    }
    if !validation.is_valid {
        bail!("{} article(s) failed validation", validation.errors.len());
    }
    Ok(())
}

fn run_sort(args: SortArgs) -> Result<()> {
    let key: SortKey = args.by.parse()?;
    let articles = read_articles(&args.input)?;
    let sorted: Vec<&Article> = sort_articles(&articles, key).into_iter().take(args.limit).collect();

    if args.input.json {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
        return Ok(());
    }

    for (rank, article) in sorted.iter().enumerate() {
        println!(
            "{:>3}. {} ({}) praise {} | read {} | {}",
            rank + 1,
            article.title,
            article.wx_name,
            article.praise,
            format_count_cn(article.read as f64),
            article.publish_time_str.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn run_import(args: ImportArgs, config: &AnalyticsConfig) -> Result<()> {
    let keyword = args.keyword.trim();
    if keyword.is_empty() {
        bail!("keyword must not be empty");
    }
    let articles = read_articles(&args.input)?;
    let now = Utc::now();
    let corpus = prepare_corpus(articles, args.time_range_days, args.limit, now.timestamp());

    let store = AnalysisStore::load(config.store.path.clone()).await?;
    let record = store
        .add_analysis(AnalysisRecord::new(keyword, corpus, now))
        .await?;
    info!(id = %record.id, store = %config.store.path.display(), "analysis imported");
    println!("{}", record.id);
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    AnalyticsConfig::default().write(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn read_articles(args: &InputArgs) -> Result<Vec<Article>> {
    let payload = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            if io::stdin().is_terminal() {
                bail!("missing articles: pass --input or pipe JSON on stdin");
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed reading stdin")?;
            buffer
        }
    };

    let articles = parse_articles(&payload)?;
    debug!(count = articles.len(), "articles parsed");
    Ok(articles)
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}

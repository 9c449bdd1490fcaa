//! award-crawler CLI - crawl, clean, validate and analyze award announcements.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use award_crawler::analyzer::{self, AwardAnalyzer};
use award_crawler::crawler::save_results;
use award_crawler::engines::{create_engine, supported_engines};
use award_crawler::parser::AwardParser;
use award_crawler::processor::{transformer, DataCleaner};
use award_crawler::settings::Settings;
use award_crawler::text::raw_results_filename;
use award_crawler::validator::DataValidator;
use award_crawler::{HttpFetcher, MultiCrawler, SearchQuery};

/// Award crawler - collects and analyzes science and technology award announcements
#[derive(Parser)]
#[command(name = "award-crawler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available search engines
    Engines,

    /// Search engines for award announcements and save the raw hits
    Crawl(CrawlArgs),

    /// Fetch one announcement page and print the parsed award
    Parse {
        /// Announcement URL
        url: String,

        /// Proxy URL (e.g., http://127.0.0.1:8080 or socks5://127.0.0.1:1080)
        #[arg(long)]
        proxy: Option<String>,
    },

    /// Clean a raw crawl file into award records
    Clean {
        /// Raw crawl file (JSON array of search results)
        input: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean raw crawl files and write award, project and winner tables
    Process {
        /// Raw crawl files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for the CSV and JSON tables
        #[arg(short, long, default_value = "data/processed")]
        output: PathBuf,
    },

    /// Report data quality of a tables directory
    Validate {
        /// Directory holding awards.csv, projects.csv and winners.csv
        dir: PathBuf,
    },

    /// Run statistics and network analysis over a tables directory
    Analyze(AnalyzeArgs),
}

#[derive(Parser)]
struct CrawlArgs {
    /// Search keyword
    keyword: String,

    /// Search engines to use (comma-separated)
    /// Available: baidu, bing
    #[arg(short, long, value_delimiter = ',')]
    engines: Option<Vec<String>>,

    /// Maximum number of result pages per engine
    #[arg(short, long)]
    pages: Option<u32>,

    /// Output file; data/raw/search_results_<timestamp>.json when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Proxy URL (e.g., http://127.0.0.1:8080 or socks5://127.0.0.1:1080)
    #[arg(long)]
    proxy: Option<String>,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Directory holding awards.csv, projects.csv and winners.csv
    dir: PathBuf,

    /// Output directory for analysis results
    #[arg(short, long, default_value = "data/analysis")]
    output: PathBuf,

    /// Drop co-winner edges lighter than this many shared projects
    #[arg(long)]
    min_weight: Option<u32>,

    /// Length of the organization and winner rankings
    #[arg(long, default_value = "10")]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Engines => list_engines(),
        Commands::Crawl(args) => run_crawl(args, settings).await,
        Commands::Parse { url, proxy } => run_parse(&url, proxy, &settings).await,
        Commands::Clean { input, output } => run_clean(&input, output.as_deref(), &settings),
        Commands::Process { inputs, output } => run_process(&inputs, &output, &settings),
        Commands::Validate { dir } => run_validate(&dir),
        Commands::Analyze(args) => run_analyze(args),
    }
}

fn list_engines() -> Result<()> {
    println!("Available search engines:\n");
    println!("    baidu    - Baidu (百度)");
    println!("    bing     - Bing China (必应中国), alias bing_cn");
    println!();
    println!("Usage: award-crawler crawl \"科技进步奖 获奖名单\" -e {}", supported_engines().join(","));
    Ok(())
}

fn build_fetcher(settings: &Settings, proxy: Option<&str>) -> Result<HttpFetcher> {
    let mut builder = HttpFetcher::builder(&settings.crawler);
    if let Some(proxy) = proxy {
        eprintln!("Using proxy: {}", proxy);
        builder = builder.proxy(proxy);
    }
    Ok(builder.build()?)
}

async fn run_crawl(args: CrawlArgs, settings: Settings) -> Result<()> {
    let fetcher = Arc::new(build_fetcher(&settings, args.proxy.as_deref())?);
    let mut crawler = MultiCrawler::new(fetcher, settings);

    let names = args
        .engines
        .unwrap_or_else(|| supported_engines().iter().map(|s| s.to_string()).collect());
    for name in &names {
        match create_engine(name) {
            Ok(engine) => crawler.add_engine(engine),
            Err(e) => eprintln!("Warning: {}, skipping", e),
        }
    }
    if crawler.engine_count() == 0 {
        anyhow::bail!("No valid engines specified");
    }

    let mut query = SearchQuery::new(&args.keyword);
    if let Some(pages) = args.pages {
        query = query.with_max_pages(pages);
    }
    let results = crawler.crawl(query).await?;

    let output = args
        .output
        .unwrap_or_else(|| Path::new("data/raw").join(raw_results_filename()));
    save_results(&results, &output)?;

    println!(
        "Collected {} results for \"{}\" -> {}",
        results.len(),
        args.keyword,
        output.display()
    );
    Ok(())
}

async fn run_parse(url: &str, proxy: Option<String>, settings: &Settings) -> Result<()> {
    let fetcher = build_fetcher(settings, proxy.as_deref())?;
    let Some(award) = AwardParser::new().fetch_and_parse(&fetcher, url).await? else {
        anyhow::bail!("Page {} is empty", url);
    };
    let record = award.into_record(url);
    match DataCleaner::new(settings.text.clone()).clean_award(record.clone()) {
        Some(cleaned) => println!("{}", serde_json::to_string_pretty(&cleaned)?),
        None => {
            eprintln!("Warning: page did not yield a valid award, printing raw fields");
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}

fn run_clean(input: &Path, output: Option<&Path>, settings: &Settings) -> Result<()> {
    let awards = DataCleaner::new(settings.text.clone()).clean_file(input)?;
    let json = serde_json::to_string_pretty(&awards)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
            println!("Wrote {} awards to {}", awards.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_process(inputs: &[PathBuf], output: &Path, settings: &Settings) -> Result<()> {
    let cleaner = DataCleaner::new(settings.text.clone());
    let mut tables = Vec::with_capacity(inputs.len());
    for input in inputs {
        let awards = cleaner
            .clean_file(input)
            .with_context(|| format!("Failed to clean {}", input.display()))?;
        tables.push(transformer::to_tables(&awards));
    }
    let tables = transformer::merge(tables);

    transformer::write_csv(&tables, output)?;
    transformer::write_json(&tables, output.join("tables.json"))?;
    info!("Processed {} files", inputs.len());

    println!(
        "{} awards, {} projects, {} winners -> {}",
        tables.awards.len(),
        tables.projects.len(),
        tables.winners.len(),
        output.display()
    );
    Ok(())
}

fn run_validate(dir: &Path) -> Result<()> {
    let tables = transformer::read_csv(dir)?;
    if tables.is_empty() {
        anyhow::bail!("No tables found in {}", dir.display());
    }
    let report = DataValidator::new().evaluate_quality(&tables)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    for issue in report.issues() {
        eprintln!("  - {}", issue);
    }
    eprintln!("Overall quality score: {:.2}", report.overall_score);
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let tables = transformer::read_csv(&args.dir)?;
    if tables.is_empty() {
        anyhow::bail!("No tables found in {}", args.dir.display());
    }

    let award_analyzer = AwardAnalyzer::new(tables).with_top_n(args.top);
    let mut report = award_analyzer.analyze();
    report.network = Some(award_analyzer.network_analysis(args.min_weight));
    analyzer::save_results(&report, &args.output)?;

    let stats = &report.basic_stats;
    println!(
        "Analyzed {} awards, {} projects, {} winners -> {}",
        stats.total_awards,
        stats.total_projects,
        stats.total_winners,
        args.output.display()
    );
    Ok(())
}

use chrono::Utc;
use clap::Parser;
use reddit_client::RedditClient;
use scraper_core::{
    CoreError, Credentials, ErrorReporter, ScraperConfig, SearchCriteria, Settings,
    ALL_SUBREDDITS, DEFAULT_TIMEFRAME_DAYS,
};
use scraper_pipeline::Pipeline;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "reddit_scraper=info,scraper_pipeline=info,reddit_client=info";
const DATA_DIR: &str = "data";

/// Scrape Reddit posts and their top comments into a JSON file.
#[derive(Debug, Parser)]
#[command(name = "reddit-scraper", version, about)]
struct Cli {
    /// Output JSON file; bare file names are placed under data/
    #[arg(short, long)]
    output: PathBuf,

    /// Subreddit to scan, or "all" to search every subreddit
    #[arg(short, long, default_value = ALL_SUBREDDITS)]
    subreddit: String,

    /// Term that must appear in the post title
    #[arg(short, long)]
    title: Option<String>,

    /// Term that must appear in the post body
    #[arg(short, long)]
    content: Option<String>,

    /// How many days back to scan
    #[arg(long, alias = "tf", default_value_t = DEFAULT_TIMEFRAME_DAYS)]
    timeframe: i64,

    /// Stop after this many posts
    #[arg(short, long)]
    limit: Option<u32>,

    /// TOML file overriding collector and client settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let reporter = ErrorReporter::new();
            reporter.report_error(&e);
            eprintln!("{}", reporter.render(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CoreError> {
    let criteria = SearchCriteria::from_timeframe(
        &cli.subreddit,
        cli.title,
        cli.content,
        cli.timeframe,
        cli.limit,
        Utc::now(),
    )?;
    let config = load_config(cli.config.as_deref())?;
    let output = resolve_output(&cli.output);

    tracing::info!("Starting Reddit scraper");
    let client = RedditClient::connect(config.credentials, &config.settings.client).await?;

    let records = Pipeline::new(&client, &config.settings.collector)
        .run_to_file(&criteria, &output)
        .await?;

    println!("Saved {} posts to {}", records.len(), output.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ScraperConfig, CoreError> {
    let settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    Ok(ScraperConfig {
        credentials: Credentials::from_env()?,
        settings,
    })
}

/// Bare file names land in `data/`; anything with a directory is used as given.
fn resolve_output(output: &Path) -> PathBuf {
    let has_dir = output
        .parent()
        .map(|p| !p.as_os_str().is_empty())
        .unwrap_or(false);
    if has_dir || output.is_absolute() {
        output.to_path_buf()
    } else {
        Path::new(DATA_DIR).join(output)
    }
}

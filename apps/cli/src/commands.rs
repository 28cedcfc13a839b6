//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use draftforge_clients::{GenerativeClient, SearchClient};
use draftforge_core::pipeline::ProgressReporter;
use draftforge_shared::{
    AppConfig, ArticleId, UserId, config::api_key_from_env, config_file_path, init_config,
    load_config, validate_api_keys,
};
use draftforge_storage::Storage;

/// Database file name inside the data directory.
const DB_FILE_NAME: &str = "draftforge.db";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DraftForge — assemble long-form articles from a keyword.
#[derive(Parser)]
#[command(
    name = "draftforge",
    version,
    about = "Assemble long-form articles from search research and template-steered generation.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Assemble a new article for a keyword.
    Create {
        /// Keyword to write about.
        keyword: String,

        /// Owning user id.
        #[arg(short, long)]
        user: i64,

        /// Search location (defaults to the configured location).
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Show one article.
    Get {
        /// Article id.
        id: i64,

        /// Owning user id.
        #[arg(short, long)]
        user: i64,
    },

    /// List a user's articles.
    List {
        /// Owning user id.
        #[arg(short, long)]
        user: i64,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Create {
            keyword,
            user,
            location,
        } => cmd_create(&keyword, user, location.as_deref()).await,
        Command::Get { id, user } => cmd_get(id, user).await,
        Command::List { user } => cmd_list(user).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Composition helpers
// ---------------------------------------------------------------------------

/// Expand a leading `~` in the configured data dir.
fn data_dir(config: &AppConfig) -> Result<PathBuf> {
    let raw = &config.defaults.data_dir;
    if let Some(rest) = raw.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| eyre!("could not determine home directory"))?;
        Ok(home.join(rest))
    } else if raw == "~" {
        dirs::home_dir().ok_or_else(|| eyre!("could not determine home directory"))
    } else {
        Ok(PathBuf::from(raw))
    }
}

async fn open_storage(config: &AppConfig) -> Result<Storage> {
    let db_path = data_dir(config)?.join(DB_FILE_NAME);
    Ok(Storage::open(&db_path).await?)
}

fn build_clients(config: &AppConfig) -> Result<(SearchClient, GenerativeClient)> {
    let serp_key = api_key_from_env(&config.serp.api_key_env)?;
    let generation_key = api_key_from_env(&config.generation.api_key_env)?;

    let search = SearchClient::new(&config.serp.base_url, serp_key)?;
    let generator = GenerativeClient::new(&config.generation.base_url, generation_key)?;
    Ok((search, generator))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_create(keyword: &str, user: i64, location: Option<&str>) -> Result<()> {
    let config = load_config()?;
    validate_api_keys(&config)?;

    let location = location
        .map(String::from)
        .unwrap_or_else(|| config.defaults.location.clone());

    let (search, generator) = build_clients(&config)?;
    let storage = open_storage(&config).await?;

    info!(keyword, %location, user, "assembling article");

    let reporter = CliProgress::new();
    let started = std::time::Instant::now();

    let article_id = draftforge_core::pipeline::create_article(
        &search,
        &generator,
        &storage,
        UserId(user),
        keyword,
        &location,
        &reporter,
    )
    .await;
    reporter.finish();
    let article_id = article_id?;

    println!();
    println!("  Article assembled successfully!");
    println!("  ID:       {article_id}");
    println!("  Keyword:  {keyword}");
    println!("  Location: {location}");
    println!("  Time:     {:.1}s", started.elapsed().as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_get(id: i64, user: i64) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config).await?;

    let info =
        draftforge_core::pipeline::get_article(&storage, UserId(user), ArticleId(id)).await?;

    println!();
    println!("  Article {id}");
    println!("  Keyword:  {}", info.keyword);
    println!("  Location: {}", info.location);
    println!("  Status:   {}", info.status);
    println!("  Created:  {}", info.created_at.to_rfc3339());

    if let Some(content) = storage
        .get_article_content(UserId(user), ArticleId(id))
        .await?
    {
        println!("  Sections:");
        println!(
            "    related answers: {}",
            content.related_questions_answers.len()
        );
        println!("    ai answers:      {}", content.ai_questions_answers.len());
        println!(
            "    quora answers:   {}",
            content.quora_questions_answers.len()
        );
        println!("    paragraphs:      {}", content.headings_paragraphs.len());
    }
    println!();

    Ok(())
}

async fn cmd_list(user: i64) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config).await?;

    let articles = draftforge_core::pipeline::get_all_articles(&storage, UserId(user)).await?;

    println!();
    for article in &articles {
        println!(
            "  [{}] {:<12} {}  ({})",
            article.id,
            article.status.as_str(),
            article.keyword,
            article.location
        );
    }
    println!();
    println!("  {} article(s)", articles.len());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file at {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let path = config_file_path()?;
    let config = load_config()?;

    println!("Config file: {}", path.display());
    println!("  data_dir:            {}", config.defaults.data_dir);
    println!("  location:            {}", config.defaults.location);
    println!("  serp base_url:       {}", config.serp.base_url);
    println!("  serp api_key_env:    {}", config.serp.api_key_env);
    println!("  gen base_url:        {}", config.generation.base_url);
    println!("  gen api_key_env:     {}", config.generation.api_key_env);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }
}

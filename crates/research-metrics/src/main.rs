//! Research Metrics - Entry Point
//!
//! Runs single dashboard queries from the command line or serves them over HTTP.

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use research_metrics::{
    config::Config,
    formatters,
    models::OutputFormat,
    pipeline::{self, PipelineContext},
    server::DashboardServer,
};

#[derive(Parser, Debug)]
#[command(name = "research-metrics")]
#[command(about = "OpenAlex and PubMed research-metrics dashboards")]
#[command(version)]
struct Cli {
    /// Contact address for the OpenAlex polite pool
    #[arg(long, env = "OPENALEX_MAILTO", global = true)]
    mailto: Option<String>,

    /// NCBI E-utilities API key (optional, raises the PubMed rate limit)
    #[arg(long, env = "NCBI_API_KEY", global = true)]
    ncbi_api_key: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown, global = true)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Retry transient upstream failures this many times (default: no retries)
    #[arg(long, env = "RESEARCH_METRICS_MAX_RETRIES", global = true)]
    max_retries: Option<u32>,

    /// Cache identical GET requests for this many seconds (default: no cache)
    #[arg(long, env = "RESEARCH_METRICS_CACHE_TTL", global = true)]
    cache_ttl: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Is my research used in clinical trials?
    Citations {
        /// DOI of the cited publication
        doi: String,
        /// Only list clinical trials
        #[arg(long)]
        trials_only: bool,
        /// First publication year to list
        #[arg(long = "from")]
        year_from: Option<i32>,
        /// Last publication year to list
        #[arg(long = "to")]
        year_to: Option<i32>,
    },
    /// Find institutions by partial name
    SuggestInstitutions {
        /// Partial institution name
        query: String,
    },
    /// Find authors by partial name
    SuggestAuthors {
        /// Partial author name
        query: String,
    },
    /// Does my institute collaborate with the global south?
    GlobalSouth {
        /// OpenAlex institution ids (repeatable)
        #[arg(long = "institution")]
        institution_ids: Vec<String>,
        /// Years looked back from the current year
        #[arg(long, env = "RESEARCH_METRICS_LOOKBACK_YEARS")]
        lookback_years: Option<i32>,
    },
    /// What is my coauthor network?
    Coauthors {
        /// Display name of the root author
        #[arg(long)]
        name: String,
        /// OpenAlex author ids, root first (repeatable)
        #[arg(long = "author", required = true)]
        author_ids: Vec<String>,
        /// Reduce the network to primary and secondary affiliations
        #[arg(long)]
        affiliations_only: bool,
    },
    /// Serve the dashboards over HTTP
    Serve {
        /// HTTP server port
        #[arg(long, default_value = "8000", env = "PORT")]
        port: u16,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so rendered output can be piped
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), command = ?cli.command, "Starting research-metrics");

    let mut config = Config::from_env()?;
    config.mailto = cli.mailto.or(config.mailto);
    config.ncbi_api_key = cli.ncbi_api_key.or(config.ncbi_api_key);
    if let Some(retries) = cli.max_retries {
        config.max_retries = retries;
    }
    if let Some(seconds) = cli.cache_ttl {
        config.cache_ttl = std::time::Duration::from_secs(seconds);
    }
    if let Command::GlobalSouth { lookback_years: Some(years), .. } = &cli.command {
        config.lookback_years = *years;
    }
    config.validate()?;

    if !config.has_mailto() {
        tracing::warn!("OPENALEX_MAILTO not set; requests use the common pool");
    }

    let ctx = PipelineContext::from_config(config)?;
    let format = cli.format;

    let output = match cli.command {
        Command::Citations { doi, trials_only, year_from, year_to } => {
            let input = json!({
                "doi": doi,
                "trialsOnly": trials_only,
                "yearFrom": year_from,
                "yearTo": year_to,
            });
            render(&ctx, "clinical_trials", input, format).await?
        }
        Command::SuggestInstitutions { query } => {
            let matches = pipeline::suggest_institutions(&ctx, &query).await.map_err(user_error)?;
            formatters::render_suggestions(&matches, format).map_err(user_error)?
        }
        Command::SuggestAuthors { query } => {
            let matches = pipeline::suggest_authors(&ctx, &query).await.map_err(user_error)?;
            formatters::render_suggestions(&matches, format).map_err(user_error)?
        }
        Command::GlobalSouth { institution_ids, .. } => {
            render(&ctx, "global_south", json!({ "institutionIds": institution_ids }), format).await?
        }
        Command::Coauthors { name, author_ids, affiliations_only } => {
            let input = json!({
                "authorIds": author_ids,
                "authorName": name,
                "affiliationsOnly": affiliations_only,
            });
            render(&ctx, "coauthor_network", input, format).await?
        }
        Command::Serve { port } => {
            DashboardServer::new(ctx).run_http(port).await?;
            return Ok(());
        }
    };

    println!("{output}");
    Ok(())
}

fn user_error(err: research_metrics::PipelineError) -> anyhow::Error {
    tracing::debug!(error = ?err, "Query failed");
    anyhow::anyhow!(err.to_user_message())
}

async fn render(
    ctx: &PipelineContext,
    name: &str,
    input: serde_json::Value,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let dashboards = pipeline::register_all_dashboards();
    let dashboard = pipeline::find_dashboard(&dashboards, name)
        .ok_or_else(|| anyhow::anyhow!("unknown dashboard: {name}"))?;
    let snapshot = dashboard.execute(ctx, input, None).await.map_err(user_error)?;
    formatters::render_snapshot(&snapshot, format).map_err(user_error)
}

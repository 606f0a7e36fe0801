//! Configuration for the research-metrics pipeline.

use std::time::Duration;

use anyhow::Context;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the OpenAlex API.
    pub const OPENALEX_API: &str = "https://api.openalex.org";

    /// Base URL for NCBI E-utilities.
    pub const EUTILS_API: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Delay between OpenAlex requests (100ms = 10 req/s polite limit).
    pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(100);

    /// GET cache TTL. Zero disables the cache; results live only in session snapshots.
    pub const CACHE_TTL: Duration = Duration::ZERO;

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Page size for citing-work traversal.
    pub const WORKS_PER_PAGE: u32 = 100;

    /// Page size for author work traversal (OpenAlex maximum).
    pub const AUTHOR_WORKS_PER_PAGE: u32 = 200;

    /// Maximum ids returned by one esearch call.
    pub const ESEARCH_RETMAX: u32 = 10_000;

    /// PMIDs per esearch term.
    pub const ESEARCH_BATCH: usize = 1000;

    /// Years looked back from the current year in ratio series.
    pub const LOOKBACK_YEARS: i32 = 10;

    /// Largest accepted lookback. The window spans `lookback + 2` years and
    /// OpenAlex accepts at most 100 values in one OR filter.
    pub const MAX_LOOKBACK_YEARS: i32 = 98;

    /// Transient-failure retries performed by the HTTP middleware (opt-in).
    pub const MAX_RETRIES: u32 = 0;
}

/// OpenAlex `select` field sets.
pub mod fields {
    /// Fields needed for a citing-work record.
    pub const CITING: &[&str] = &["id", "doi", "title", "publication_year", "ids"];

    /// Fields needed to build a co-author network.
    pub const AUTHORSHIPS: &[&str] = &["id", "authorships"];

    /// Fields needed to resolve a DOI to a work id.
    pub const LOOKUP: &[&str] = &["id", "doi", "title", "publication_year"];
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contact address for the OpenAlex polite pool (optional).
    pub mailto: Option<String>,

    /// NCBI API key (optional, raises the E-utilities rate limit).
    pub ncbi_api_key: Option<String>,

    /// OpenAlex base URL (for testing with mock servers).
    pub openalex_url: String,

    /// E-utilities base URL (for testing with mock servers).
    pub eutils_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Delay before each request.
    pub rate_limit_delay: Duration,

    /// GET cache TTL (zero disables the cache).
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// Retries for transient failures.
    pub max_retries: u32,

    /// Years looked back in ratio series.
    pub lookback_years: i32,
}

impl Config {
    /// Create a new configuration with optional credentials.
    #[must_use]
    pub fn new(mailto: Option<String>, ncbi_api_key: Option<String>) -> Self {
        Self {
            mailto,
            ncbi_api_key,
            openalex_url: api::OPENALEX_API.to_string(),
            eutils_url: api::EUTILS_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_delay: api::RATE_LIMIT_DELAY,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            max_retries: api::MAX_RETRIES,
            lookback_years: api::LOOKBACK_YEARS,
        }
    }

    /// Create a test configuration pointing both APIs at one mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            mailto: None,
            ncbi_api_key: None,
            openalex_url: base_url.to_string(),
            eutils_url: format!("{}/entrez/eutils", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_delay: Duration::from_millis(0), // No delay in tests
            cache_ttl: Duration::from_secs(0),          // No caching in tests
            cache_max_size: 0,
            max_retries: 0,
            lookback_years: api::LOOKBACK_YEARS,
        }
    }

    /// Create configuration from environment variables (and a `.env` file if present).
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mailto = std::env::var("OPENALEX_MAILTO").ok().filter(|v| !v.is_empty());
        let ncbi_api_key = std::env::var("NCBI_API_KEY").ok().filter(|v| !v.is_empty());
        let mut config = Self::new(mailto, ncbi_api_key);

        if let Ok(years) = std::env::var("RESEARCH_METRICS_LOOKBACK_YEARS") {
            config.lookback_years = years
                .parse()
                .with_context(|| format!("RESEARCH_METRICS_LOOKBACK_YEARS is not a number: {years}"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that base URLs parse and the lookback window is in range.
    ///
    /// # Errors
    ///
    /// Returns error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.openalex_url)
            .with_context(|| format!("invalid OpenAlex URL: {}", self.openalex_url))?;
        url::Url::parse(&self.eutils_url)
            .with_context(|| format!("invalid E-utilities URL: {}", self.eutils_url))?;
        anyhow::ensure!(
            (1..=api::MAX_LOOKBACK_YEARS).contains(&self.lookback_years),
            "lookback years must be between 1 and {}, got {}",
            api::MAX_LOOKBACK_YEARS,
            self.lookback_years
        );
        Ok(())
    }

    /// Check if an OpenAlex contact address is configured.
    #[must_use]
    pub const fn has_mailto(&self) -> bool {
        self.mailto.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}

//! OpenAlex and PubMed E-utilities client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Opt-in retry middleware with exponential backoff for transient failures
//! - Cursor pagination exposed as a stream of pages
//! - Opt-in response caching of GET requests

mod middleware;

use futures::{Stream, StreamExt};
use moka::future::Cache;
use reqwest_middleware::ClientWithMiddleware;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AutocompleteEntity, AutocompleteMatch, AutocompleteResponse, ESearchForm, ESearchResponse,
    ESearchResult, GroupByBucket, GroupByPage, Work, WorksPage,
};

/// Cursor value that starts a traversal.
pub const FIRST_CURSOR: &str = "*";

/// Client for the bibliometric (OpenAlex) and literature-search (E-utilities) APIs.
#[derive(Clone)]
pub struct ScholarlyClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache for GET requests; `None` when the TTL is zero.
    cache: Option<Cache<String, serde_json::Value>>,

    /// OpenAlex polite-pool contact (optional).
    mailto: Option<String>,

    /// NCBI API key (optional).
    ncbi_api_key: Option<String>,

    /// OpenAlex base URL.
    openalex_url: String,

    /// E-utilities base URL.
    eutils_url: String,

    /// Delay before each uncached request.
    rate_limit_delay: std::time::Duration,
}

impl ScholarlyClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = middleware::build_http_client(&config)?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(config.cache_max_size)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            client,
            cache,
            mailto: config.mailto,
            ncbi_api_key: config.ncbi_api_key,
            openalex_url: config.openalex_url.trim_end_matches('/').to_string(),
            eutils_url: config.eutils_url.trim_end_matches('/').to_string(),
            rate_limit_delay: config.rate_limit_delay,
        })
    }

    /// Check if an OpenAlex contact address is configured.
    #[must_use]
    pub fn has_mailto(&self) -> bool {
        self.mailto.is_some()
    }

    /// Resolve a DOI to its OpenAlex work. Returns `None` when nothing matches.
    ///
    /// If several works carry the DOI the first one is used.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn find_work_by_doi(&self, doi: &str, select: &[&str]) -> ClientResult<Option<Work>> {
        let url = format!("{}/works", self.openalex_url);
        let mut params = vec![("filter".to_string(), format!("doi:{doi}"))];
        if !select.is_empty() {
            params.push(("select".to_string(), select.join(",")));
        }

        let page: WorksPage = self.get(&url, &params).await?;
        Ok(page.results.into_iter().next())
    }

    /// Fetch one page of `/works`.
    ///
    /// # Errors
    ///
    /// Returns error on API failure or if the page does not match the schema.
    pub async fn works_page(
        &self,
        filter: &str,
        cursor: &str,
        per_page: u32,
        select: &[&str],
    ) -> ClientResult<WorksPage> {
        let url = format!("{}/works", self.openalex_url);

        let mut params = vec![
            ("filter".to_string(), filter.to_string()),
            ("cursor".to_string(), cursor.to_string()),
            ("per-page".to_string(), per_page.to_string()),
        ];
        if !select.is_empty() {
            params.push(("select".to_string(), select.join(",")));
        }

        self.get(&url, &params).await
    }

    /// Walk `/works` with cursor pagination, yielding each page.
    ///
    /// The stream ends when the API reports no further cursor (or an empty
    /// page). The first error ends the stream.
    pub fn paginate_works<'a>(
        &'a self,
        filter: &'a str,
        per_page: u32,
        select: &'a [&'a str],
    ) -> impl Stream<Item = ClientResult<WorksPage>> + 'a {
        async_stream::try_stream! {
            let mut cursor = FIRST_CURSOR.to_string();
            let mut page_number = 0_usize;
            loop {
                let page = self.works_page(filter, &cursor, per_page, select).await?;
                page_number += 1;

                let next = if page.results.is_empty() {
                    None
                } else {
                    page.next_cursor().map(str::to_string)
                };
                tracing::debug!(
                    filter,
                    page = page_number,
                    results = page.results.len(),
                    has_next = next.is_some(),
                    "Fetched works page"
                );

                yield page;

                match next {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        }
    }

    /// Collect every work matching a filter.
    ///
    /// No partial results: an error on any page discards the pages already read.
    ///
    /// # Errors
    ///
    /// Returns the first page error.
    #[tracing::instrument(skip(self, select), level = "debug")]
    pub async fn fetch_all_works(
        &self,
        filter: &str,
        per_page: u32,
        select: &[&str],
    ) -> ClientResult<Vec<Work>> {
        let mut pages = std::pin::pin!(self.paginate_works(filter, per_page, select));
        let mut works = Vec::new();

        while let Some(page) = pages.next().await {
            works.extend(page?.results);
        }

        Ok(works)
    }

    /// Count works matching a filter, grouped by a field.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn group_works_by(
        &self,
        filter: &str,
        group_by: &str,
    ) -> ClientResult<Vec<GroupByBucket>> {
        let url = format!("{}/works", self.openalex_url);
        let params = vec![
            ("filter".to_string(), filter.to_string()),
            ("group_by".to_string(), group_by.to_string()),
        ];

        let page: GroupByPage = self.get(&url, &params).await?;
        Ok(page.group_by)
    }

    /// Autocomplete a partial name.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn autocomplete(
        &self,
        entity: AutocompleteEntity,
        query: &str,
    ) -> ClientResult<Vec<AutocompleteMatch>> {
        let url = format!("{}/autocomplete/{}", self.openalex_url, entity.path());
        let params = vec![("q".to_string(), query.to_string())];

        let result: AutocompleteResponse = self.get(&url, &params).await?;
        Ok(result.results)
    }

    /// Run a PubMed esearch with a form-encoded POST body.
    ///
    /// # Errors
    ///
    /// Returns error on API failure or when E-utilities reports an error.
    #[tracing::instrument(skip(self, term), fields(term_len = term.len()), level = "debug")]
    pub async fn esearch_pubmed(&self, term: &str, retmax: u32) -> ClientResult<ESearchResult> {
        let url = format!("{}/esearch.fcgi", self.eutils_url);

        let form = ESearchForm {
            term,
            db: "pubmed",
            retmax,
            retmode: "json",
            api_key: self.ncbi_api_key.as_deref(),
        };
        let body = serde_urlencoded::to_string(&form)
            .map_err(|e| ClientError::bad_request(e.to_string()))?;

        let response: ESearchResponse = self.post_form(&url, body).await?;
        let result = response.esearchresult;

        if let Some(error) = result.error {
            return Err(ClientError::malformed(format!("esearch reported: {error}")));
        }

        Ok(result)
    }

    /// Make a GET request against OpenAlex.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut params = params.to_vec();
        if let Some(ref mailto) = self.mailto {
            params.push(("mailto".to_string(), mailto.clone()));
        }

        // Check cache
        let cache_key = self.cache_key("GET", url, &params);
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                return serde_json::from_value(cached).map_err(ClientError::from);
            }
        }

        // Rate limit
        tokio::time::sleep(self.rate_limit_delay).await;

        let response = self.client.get(url).query(&params).send().await?;

        let response = self.handle_response(response).await?;
        let bytes = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, value.clone()).await;
        }

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Make a form-encoded POST request.
    async fn post_form<T>(&self, url: &str, body: String) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        tokio::time::sleep(self.rate_limit_delay).await;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for ScholarlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScholarlyClient")
            .field("openalex_url", &self.openalex_url)
            .field("eutils_url", &self.eutils_url)
            .field("has_mailto", &self.has_mailto())
            .finish()
    }
}

//! SEC EDGAR HTTP client with rate limiting.

use super::filings::{CompanyFilings, pad_cik};
use crate::error::{DataError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Host of the submissions API.
const DATA_BASE_URL: &str = "https://data.sec.gov";

/// Host of the filing archives and the ticker list.
const ARCHIVES_BASE_URL: &str = "https://www.sec.gov";

/// Default rate limit: 10 requests per second (SEC requirement)
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// User agent for SEC EDGAR requests (SEC requires identifying information)
pub const DEFAULT_USER_AGENT: &str = "filingfacts/0.1 (contact@example.com)";

/// Company entry of `company_tickers.json`:
/// `{"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}`
#[derive(Debug, Deserialize)]
struct CompanyTicker {
    cik_str: u64,
    ticker: String,
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// SEC EDGAR client.
///
/// Every request goes through one shared rate limiter, so clones of the
/// client inside one process together stay under the SEC limit.
#[derive(Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl EdgarClient {
    /// Create a client with the default user agent and rate limit (10 req/sec).
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_USER_AGENT, DEFAULT_RATE_LIMIT)
    }

    /// Create a client with a custom user agent and minimum request interval.
    ///
    /// The SEC asks for a user agent naming the requester and a contact
    /// address.
    ///
    /// # Example
    /// ```no_run
    /// use filingfacts_data::EdgarClient;
    /// use std::time::Duration;
    ///
    /// # fn example() -> filingfacts_data::Result<()> {
    /// // 5 requests per second
    /// let client = EdgarClient::with_options("acme research ops@acme.test", Duration::from_millis(200))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_options(user_agent: &str, min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "GET {} returned HTTP {}",
                url,
                response.status()
            )));
        }
        Ok(response)
    }

    /// Look up a company's CIK from its ticker symbol.
    ///
    /// Returns the CIK zero-padded to 10 digits.
    ///
    /// # Errors
    /// Returns `DataError::CikNotFound` if the ticker is not listed.
    pub async fn get_company_cik(&self, ticker: &str) -> Result<String> {
        if ticker.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }

        let url = format!("{}/files/company_tickers.json", ARCHIVES_BASE_URL);
        let data: HashMap<String, CompanyTicker> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| DataError::EdgarApi(format!("Failed to parse company tickers: {}", e)))?;

        data.values()
            .find(|company| company.ticker.eq_ignore_ascii_case(ticker.trim()))
            .map(|company| pad_cik(&company.cik_str.to_string()))
            .ok_or_else(|| DataError::CikNotFound(ticker.to_string()))
    }

    /// Fetch a company's filing history from the submissions API.
    pub async fn get_company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        if cik.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty CIK".to_string()));
        }

        let url = format!("{}/submissions/CIK{}.json", DATA_BASE_URL, pad_cik(cik));
        self.get(&url)
            .await?
            .json()
            .await
            .map_err(|e| DataError::EdgarApi(format!("Failed to parse company filings: {}", e)))
    }

    /// Download the complete submission text file of a filing.
    pub async fn get_full_submission(&self, cik: &str, accession: &str) -> Result<Vec<u8>> {
        if accession.trim().is_empty() {
            return Err(DataError::EdgarApi("Empty accession number".to_string()));
        }

        let url = full_submission_url(cik, accession);
        let bytes = self.get(&url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// URL of the complete submission text file of a filing.
///
/// ```
/// # use filingfacts_data::edgar::client::full_submission_url;
/// assert_eq!(
///     full_submission_url("0000320193", "0000320193-23-000106"),
///     "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/0000320193-23-000106.txt"
/// );
/// ```
pub fn full_submission_url(cik: &str, accession: &str) -> String {
    let cik = cik.trim_start_matches('0');
    format!(
        "{}/Archives/edgar/data/{}/{}/{}.txt",
        ARCHIVES_BASE_URL,
        cik,
        accession.replace('-', ""),
        accession
    )
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient").finish_non_exhaustive()
    }
}

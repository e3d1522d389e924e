//! SEC EDGAR retrieval.
//!
//! This module provides:
//! - Company CIK lookup from ticker symbols
//! - 10-K and 10-Q filing listings from the submissions API
//! - Complete submission downloads into a local [`FilingCache`](crate::FilingCache)
//!
//! # Example
//!
//! ```no_run
//! use filingfacts_data::{EdgarClient, EdgarDownloader, FetchRequest, FilingCache};
//! use filingfacts_extract::FilingCategory;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = EdgarDownloader::new(EdgarClient::new()?, FilingCache::new("filings"));
//!     let summary = downloader
//!         .download("AAPL", FilingCategory::Quarterly, &FetchRequest::latest(4))
//!         .await?;
//!     println!("Downloaded {} filings", summary.downloaded);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod downloader;
pub mod filings;

pub use client::{DEFAULT_RATE_LIMIT, DEFAULT_USER_AGENT, EdgarClient};
pub use downloader::{DownloadSummary, EdgarDownloader};
pub use filings::{CompanyFilings, FilingHistory, FilingInfo, RecentFilings, pad_cik};

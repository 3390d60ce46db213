//! Lawyer profile search
//!
//! Scrapes lawyer biography pages into a profile store, then filters the
//! store against free-text criteria.
//!
//! # Pipeline
//!
//! 1. **Ingest** - [`ingest()`] runs a [`ProfileFetcher`] over a URL list.
//!    Blocked pages and failed fetches are logged and left out.
//! 2. **Store** - [`ProfileStore`] keeps `{url, text}` records in input order
//!    and round-trips them through a JSON file.
//! 3. **Query** - [`QueryRunner`] applies an [`Evaluator`] to each profile
//!    and collects matching URLs in store order.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lawyer_search::{ingest, Evaluator, HttpFetcher, QueryRunner};
//!
//! let fetcher = HttpFetcher::new()?;
//! let report = ingest(&fetcher, &urls).await;
//!
//! let runner = QueryRunner::new(report.store, Evaluator::substring());
//! let result = runner.run("securities litigation").await;
//! for url in &result.matches {
//!     println!("{url}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`fetcher`] - HTTP page fetching and visible-text extraction
//! - [`profile`] - Profile records, JSON store, URL list parsing
//! - [`ingest`](mod@ingest) - Store construction from URLs
//! - [`evaluator`] - Substring and LLM evaluation strategies
//! - [`judge`] - LLM prompt and tagged-answer parsing
//! - [`runner`] - Query execution across the store
//! - [`session`] - Interactive query loop
//! - [`config`] - Environment configuration
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod error;
pub mod evaluator;
pub mod fetcher;
pub mod ingest;
pub mod judge;
pub mod profile;
pub mod runner;
pub mod session;
pub mod testing;

pub use config::Config;
pub use error::{FetchError, JudgeError, StoreError};
pub use evaluator::{Evaluator, Outcome, SkipReason, Strategy};
pub use fetcher::{HttpFetcher, ProfileFetcher};
pub use ingest::{ingest, IngestReport};
pub use judge::{parse_verdict, ChatModel, Judge, LlmChatModel, ParseMode};
pub use profile::{parse_url_list, read_url_list, Profile, ProfileStore};
pub use runner::{ProfileOutcome, QueryReport, QueryRunner};
pub use session::{run_session, write_report, LineInput, QueryInput};
pub use testing::{MockChatModel, MockFetcher};

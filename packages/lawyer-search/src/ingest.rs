//! Build a profile store from a list of URLs.

use tracing::{error, info, warn};

use crate::fetcher::ProfileFetcher;
use crate::profile::{Profile, ProfileStore};

/// Result of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Profiles with usable text, in input order
    pub store: ProfileStore,

    /// URLs skipped because the site refused us
    pub blocked: Vec<String>,

    /// URLs whose fetch failed, with the error message
    pub failed: Vec<(String, String)>,

    /// URLs that fetched fine but had no visible text
    pub empty: Vec<String>,
}

/// Fetch every URL once, in order, keeping only pages with text.
///
/// Per-URL failures are logged and recorded in the report; they never stop
/// the run.
pub async fn ingest<F>(fetcher: &F, urls: &[String]) -> IngestReport
where
    F: ProfileFetcher + ?Sized,
{
    info!(url_count = urls.len(), "Ingestion starting");
    let mut report = IngestReport::default();

    for url in urls {
        match fetcher.fetch(url).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                report.store.push(Profile::new(url.as_str(), text));
            }
            Ok(Some(_)) => {
                warn!(url = %url, "Page has no visible text");
                report.empty.push(url.clone());
            }
            Ok(None) => report.blocked.push(url.clone()),
            Err(e) => {
                error!(url = %url, error = %e, "Failed to fetch profile");
                report.failed.push((url.clone(), e.to_string()));
            }
        }
    }

    info!(
        profiles = report.store.len(),
        blocked = report.blocked.len(),
        failed = report.failed.len(),
        empty = report.empty.len(),
        "Ingestion completed"
    );

    report
}

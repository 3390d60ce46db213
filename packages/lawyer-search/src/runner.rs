//! Run one query across the profile store.

use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::evaluator::{Evaluator, Outcome};
use crate::profile::ProfileStore;

/// Outcome of one profile within a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOutcome {
    pub url: String,
    pub outcome: Outcome,
}

/// Everything a query produced.
#[derive(Debug, Clone)]
pub struct QueryReport {
    /// Matching URLs, in store order
    pub matches: Vec<String>,

    /// Per-profile outcomes, in store order
    pub outcomes: Vec<ProfileOutcome>,

    /// Wall-clock time spent evaluating
    pub elapsed: Duration,
}

impl QueryReport {
    pub fn scanned(&self) -> usize {
        self.outcomes.len()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|p| pred(&p.outcome)).count()
    }
}

/// Evaluates a criterion against every in-scope profile.
#[derive(Debug, Clone)]
pub struct QueryRunner {
    store: ProfileStore,
    evaluator: Evaluator,
    scan_limit: Option<usize>,
    concurrency: usize,
}

impl QueryRunner {
    pub fn new(store: ProfileStore, evaluator: Evaluator) -> Self {
        Self {
            store,
            evaluator,
            scan_limit: None,
            concurrency: 1,
        }
    }

    /// Only scan the first `limit` profiles. `None` scans all of them.
    pub fn with_scan_limit(mut self, limit: Option<usize>) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Evaluate up to `concurrency` profiles at once (minimum 1).
    /// Results keep store order regardless.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Run the query and return matching URLs in store order.
    pub async fn run(&self, criterion: &str) -> QueryReport {
        let start = Instant::now();
        let limit = self.scan_limit.unwrap_or(usize::MAX);

        info!(
            criterion = %criterion,
            profiles = self.store.len(),
            scan_limit = ?self.scan_limit,
            concurrency = self.concurrency,
            strategy = ?self.evaluator.strategy(),
            "Query starting"
        );

        let evaluator = &self.evaluator;
        let outcomes: Vec<ProfileOutcome> = stream::iter(self.store.iter().take(limit))
            .map(|profile| async move {
                let outcome = evaluator.evaluate(profile, criterion).await;
                debug!(url = %profile.url, outcome = ?outcome, "Profile evaluated");
                ProfileOutcome {
                    url: profile.url.clone(),
                    outcome,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let matches = outcomes
            .iter()
            .filter(|p| p.outcome.is_match())
            .map(|p| p.url.clone())
            .collect();

        let report = QueryReport {
            matches,
            outcomes,
            elapsed: start.elapsed(),
        };

        info!(
            matches = report.matches.len(),
            scanned = report.scanned(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Query completed in {:.2} seconds",
            report.elapsed.as_secs_f64()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::Judge;
    use crate::profile::Profile;
    use crate::testing::MockChatModel;
    use std::sync::Arc;

    fn store() -> ProfileStore {
        vec![
            Profile::new("https://firm.com/zoe", "Zoe Tax is a tax partner"),
            Profile::without_text("https://firm.com/blocked"),
            Profile::new("https://firm.com/abe", "Abe Ames, litigation"),
            Profile::new("https://firm.com/mia", "Mia Moss, tax counsel"),
        ]
        .into()
    }

    #[tokio::test]
    async fn test_run_collects_matches_in_store_order() {
        let runner = QueryRunner::new(store(), Evaluator::substring());

        let report = runner.run("TAX").await;

        assert_eq!(
            report.matches,
            vec!["https://firm.com/zoe", "https://firm.com/mia"]
        );
        assert_eq!(report.scanned(), 4);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 0);
    }

    #[tokio::test]
    async fn test_scan_limit_caps_prefix() {
        let runner = QueryRunner::new(store(), Evaluator::substring()).with_scan_limit(Some(3));

        let report = runner.run("tax").await;

        assert_eq!(report.scanned(), 3);
        assert_eq!(report.matches, vec!["https://firm.com/zoe"]);
    }

    #[tokio::test]
    async fn test_concurrent_run_keeps_order_and_isolates_failures() {
        let model = Arc::new(
            MockChatModel::new("<answer>Pass</answer>")
                .with_response_for("Abe Ames", "no verdict here")
                .with_failure_for("Mia Moss", "upstream timeout"),
        );
        let runner = QueryRunner::new(store(), Evaluator::judge(Judge::new(model.clone())))
            .with_concurrency(3);

        let report = runner.run("any lawyer").await;

        let urls: Vec<_> = report.outcomes.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://firm.com/zoe",
                "https://firm.com/blocked",
                "https://firm.com/abe",
                "https://firm.com/mia",
            ]
        );
        assert_eq!(report.matches, vec!["https://firm.com/zoe"]);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(model.calls().len(), 3);
    }

    #[test]
    fn test_concurrency_floor() {
        let runner = QueryRunner::new(ProfileStore::new(), Evaluator::substring()).with_concurrency(0);
        assert_eq!(runner.concurrency, 1);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let runner = QueryRunner::new(ProfileStore::new(), Evaluator::substring());
        let report = runner.run("anything").await;
        assert!(report.matches.is_empty());
        assert_eq!(report.scanned(), 0);
    }
}

pub mod aggregate;
pub mod bucket;
pub mod exec;
pub mod merge;
pub mod output;

pub use aggregate::{aggregate_all, aggregate_bundle, aggregate_owners};
pub use bucket::{bucket_by_quarter, bucket_dates, count_by_date, sum_counts};
pub use exec::exec;
pub use merge::{merge_owners, MergedRepo};
pub use output::{output_json, output_summary};

use crate::config::{Config, RepositoryConfig};
use crate::error::{MetricsError, Result};
use crate::model::{AggregatedBundle, MetricsFile, RawBundle, RawData, SeriesKind, SkippedRepo};
use indexmap::IndexMap;
use log::{info, warn};

/// Result of aggregating every configured repository.
#[derive(Debug, Clone, Default)]
pub struct AggregateRun {
    pub metrics: MetricsFile,
    pub skipped: Vec<SkippedRepo>,
}

fn raw_bundle<'a>(raw: &'a RawData, repo: &str, owner: &str) -> Result<&'a RawBundle> {
    raw.get(owner)
        .and_then(|repos| repos.get(repo))
        .ok_or_else(|| MetricsError::UnknownRepository {
            repo: repo.to_string(),
            owner: owner.to_string(),
        })
}

/// Aggregates one repository: a single owner is bucketed directly, two owners
/// are merged first and all three views (both owners and `total`) bucketed.
pub fn aggregate_repository(
    entry: &RepositoryConfig,
    raw: &RawData,
    series: &[SeriesKind],
) -> Result<IndexMap<String, AggregatedBundle>> {
    let repo = entry.repo.as_str();
    match entry.owners.as_slice() {
        [owner] => {
            let bundle = aggregate_bundle(repo, owner, raw_bundle(raw, repo, owner)?, series)?;
            let mut owners = IndexMap::with_capacity(1);
            owners.insert(owner.clone(), bundle);
            Ok(owners)
        }
        [owner_a, owner_b] => {
            let a = raw_bundle(raw, repo, owner_a)?;
            let b = raw_bundle(raw, repo, owner_b)?;
            let merged = merge_owners(repo, (owner_a.as_str(), a), (owner_b.as_str(), b))?;
            aggregate_owners(repo, &merged, series)
        }
        owners => Err(MetricsError::Config(format!(
            "repository `{repo}` must have one or two owners, found {}",
            owners.len()
        ))),
    }
}

/// Aggregates every configured repository in config order.
///
/// A repository that fails is logged and skipped, unless `strict` is set, in
/// which case the first failure is returned.
pub fn aggregate_repositories(config: &Config, raw: &RawData, strict: bool) -> Result<AggregateRun> {
    let mut run = AggregateRun::default();
    for entry in &config.repositories {
        match aggregate_repository(entry, raw, &config.series) {
            Ok(owners) => {
                info!("Aggregated {} ({} views)", entry.repo, owners.len());
                run.metrics.insert(entry.repo.clone(), owners);
            }
            Err(e) if !strict => {
                warn!("Skipping {}: {e}", entry.repo);
                run.skipped.push(SkippedRepo {
                    repo: entry.repo.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(run)
}

use super::bucket::bucket_dates;
use crate::error::{MetricsError, Result};
use crate::model::{AggregatedBundle, RawBundle, ScalarKind, SeriesKind};
use indexmap::IndexMap;
use log::debug;

/// Buckets the requested series of one (repo, owner) bundle by quarter.
///
/// Series are emitted in the order of `series`. Known series that were not
/// requested are dropped, unrecognised fields are carried over as-is and
/// both open counts are copied through unchanged.
pub fn aggregate_bundle(
    repo: &str,
    owner: &str,
    raw: &RawBundle,
    series: &[SeriesKind],
) -> Result<AggregatedBundle> {
    let mut bucketed = IndexMap::with_capacity(series.len());
    for kind in series {
        let dates = raw
            .series
            .get(kind)
            .ok_or_else(|| MetricsError::missing_field(repo, owner, kind))?;
        let counts = bucket_dates(dates);
        debug!(
            "{repo}/{owner}: {kind} {} events in {} quarters",
            dates.len(),
            counts.len()
        );
        bucketed.insert(*kind, counts);
    }

    for kind in raw.series.keys().filter(|kind| !series.contains(*kind)) {
        debug!("{repo}/{owner}: {kind} not requested, left out");
    }

    let scalar = |kind: ScalarKind| {
        raw.scalar(kind)
            .ok_or_else(|| MetricsError::missing_field(repo, owner, kind))
    };

    Ok(AggregatedBundle {
        series: bucketed,
        open_issues_count: scalar(ScalarKind::OpenIssuesCount)?,
        open_pulls_count: scalar(ScalarKind::OpenPullsCount)?,
        extra: raw.extra.clone(),
    })
}

/// Buckets every series present in the bundle, in bundle order.
pub fn aggregate_all(repo: &str, owner: &str, raw: &RawBundle) -> Result<AggregatedBundle> {
    let series: Vec<SeriesKind> = raw.series.keys().copied().collect();
    aggregate_bundle(repo, owner, raw, &series)
}

/// Aggregates each owner of an ordered (owner -> raw bundle) map, keeping the order.
pub fn aggregate_owners(
    repo: &str,
    owners: &IndexMap<String, RawBundle>,
    series: &[SeriesKind],
) -> Result<IndexMap<String, AggregatedBundle>> {
    owners
        .iter()
        .map(|(owner, raw)| Ok((owner.clone(), aggregate_bundle(repo, owner, raw, series)?)))
        .collect()
}

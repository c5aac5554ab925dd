use crate::error::{MetricsError, Result};
use crate::model::{MetricName, RawBundle, ScalarKind, TOTAL_OWNER};
use indexmap::IndexMap;
use log::info;
use std::collections::BTreeSet;

/// Raw bundles of one repository keyed by owner: both owners, then `total`.
pub type MergedRepo = IndexMap<String, RawBundle>;

/// Combines the raw metrics two organizations hold for the same repository.
///
/// Both bundles are kept as they are and a third `total` entry is added in
/// which date lists are concatenated (A then B) and open counts are summed.
/// Unrecognised fields of `total` are taken from owner A.
pub fn merge_owners(
    repo: &str,
    (owner_a, a): (&str, &RawBundle),
    (owner_b, b): (&str, &RawBundle),
) -> Result<MergedRepo> {
    if owner_a == owner_b {
        return Err(MetricsError::InvalidOwner(format!(
            "{repo}: cannot merge {owner_a} with itself"
        )));
    }
    for owner in [owner_a, owner_b] {
        if owner == TOTAL_OWNER {
            return Err(MetricsError::InvalidOwner(format!(
                "{repo}: `{TOTAL_OWNER}` is reserved for the merged view"
            )));
        }
    }
    check_schema(repo, (owner_a, a), (owner_b, b))?;

    info!("Merging {repo} from {owner_a} and {owner_b}");

    let mut total = RawBundle::new();
    for (kind, dates_a) in &a.series {
        let mut dates = dates_a.clone();
        // present in b, checked by the schema comparison
        if let Some(dates_b) = b.series.get(kind) {
            dates.extend_from_slice(dates_b);
        }
        total.series.insert(*kind, dates);
    }
    for kind in ScalarKind::ALL {
        if let (Some(count_a), Some(count_b)) = (a.scalar(kind), b.scalar(kind)) {
            let sum = count_a.checked_add(count_b).ok_or_else(|| {
                MetricsError::Overflow(format!("{repo}: {kind} of {owner_a} ({count_a}) + {owner_b} ({count_b})"))
            })?;
            total = total.with_scalar(kind, sum);
        }
    }
    total.extra = a.extra.clone();

    let mut merged = MergedRepo::with_capacity(3);
    merged.insert(owner_a.to_string(), a.clone());
    merged.insert(owner_b.to_string(), b.clone());
    merged.insert(TOTAL_OWNER.to_string(), total);
    Ok(merged)
}

fn check_schema(
    repo: &str,
    (owner_a, a): (&str, &RawBundle),
    (owner_b, b): (&str, &RawBundle),
) -> Result<()> {
    let fields_a: BTreeSet<MetricName> = a.field_names().into_iter().collect();
    let fields_b: BTreeSet<MetricName> = b.field_names().into_iter().collect();
    if fields_a == fields_b {
        return Ok(());
    }
    Err(MetricsError::SchemaMismatch {
        repo: repo.to_string(),
        owner_a: owner_a.to_string(),
        owner_b: owner_b.to_string(),
        only_in_a: fields_a.difference(&fields_b).map(ToString::to_string).collect(),
        only_in_b: fields_b.difference(&fields_a).map(ToString::to_string).collect(),
    })
}

use super::AggregateRun;
use crate::model::{
    AggregateSummary, AggregatedBundle, RepoSummary, SCHEMA_VERSION, TOTAL_OWNER,
};
use anyhow::Result;
use chrono::Utc;
use console::style;
use indexmap::IndexMap;
use std::path::Path;

/// Events of the combined view when there is one, otherwise of the sole owner.
fn repo_events(owners: &IndexMap<String, AggregatedBundle>) -> u64 {
    let bundle = owners.get(TOTAL_OWNER).or_else(|| owners.values().next());
    bundle
        .map(|b| {
            b.series
                .keys()
                .fold(0u64, |acc, kind| acc.saturating_add(b.total_events(*kind)))
        })
        .unwrap_or(0)
}

fn summarize(run: &AggregateRun) -> Vec<RepoSummary> {
    run.metrics
        .iter()
        .map(|(repo, owners)| RepoSummary {
            repo: repo.clone(),
            owners: owners.keys().cloned().collect(),
            events: repo_events(owners),
        })
        .collect()
}

pub fn output_json(run: &AggregateRun) -> Result<()> {
    let output = AggregateSummary {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repositories: summarize(run),
        skipped: run.skipped.clone(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_summary(run: &AggregateRun, out: &Path) -> Result<()> {
    println!("{}", style("Aggregation Summary").bold());
    println!("{}", "─".repeat(50));

    for summary in summarize(run) {
        println!(
            "{:<24} {:>8} events  {}",
            summary.repo,
            style(summary.events).cyan(),
            style(summary.owners.join(", ")).dim()
        );
    }

    for skipped in &run.skipped {
        println!(
            "{:<24} {} {}",
            skipped.repo,
            style("skipped").yellow(),
            style(&skipped.reason).dim()
        );
    }

    println!("\nWrote {}", style(out.display()).green());
    Ok(())
}

use crate::contributors::ContributorFilter;
use crate::error::{MetricsError, Result};
use crate::model::{SeriesKind, TOTAL_OWNER};
use crate::report::{CellRef, ReportLayout};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repo: String,
    /// One owner, or two owners whose data is merged into a `total` view.
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RepositoryConfig {
    pub fn new(repo: impl ToString, owners: &[&str]) -> Self {
        Self {
            repo: repo.to_string(),
            owners: owners.iter().map(|o| o.to_string()).collect(),
            url: None,
        }
    }
}

/// Punctual indicator cells in A1 notation. Unset cells go under the
/// `count` label of their own block (`K3`/`N3` for the reported series).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_issues_cell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_pulls_cell: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repositories: Vec<RepositoryConfig>,
    /// Series bucketed into `metrics.json`, in report column order.
    pub series: Vec<SeriesKind>,
    /// Logins treated as organization members when filtering comments.
    pub org_members: Vec<String>,
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repositories: vec![
                RepositoryConfig::new("gtfs-validator", &["MobilityData"]),
                RepositoryConfig::new("transit", &["MobilityData", "google"]),
                RepositoryConfig::new("gbfs", &["MobilityData", "NABSA"]),
            ],
            series: SeriesKind::REPORTED.to_vec(),
            org_members: Vec::new(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Reads the config at `path`, or the built-in default when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_json(&fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.repositories {
            if !seen.insert(entry.repo.as_str()) {
                return Err(MetricsError::Config(format!(
                    "repository `{}` is listed twice",
                    entry.repo
                )));
            }
            if !(1..=2).contains(&entry.owners.len()) {
                return Err(MetricsError::Config(format!(
                    "repository `{}` must have one or two owners, found {}",
                    entry.repo,
                    entry.owners.len()
                )));
            }
            if entry.owners.iter().any(|o| o == TOTAL_OWNER) {
                return Err(MetricsError::Config(format!(
                    "repository `{}`: owner name `{TOTAL_OWNER}` is reserved",
                    entry.repo
                )));
            }
        }
        let mut series = HashSet::new();
        for kind in &self.series {
            if !series.insert(kind) {
                return Err(MetricsError::Config(format!("series `{kind}` is listed twice")));
            }
        }
        self.report_layout()?;
        Ok(())
    }

    pub fn report_layout(&self) -> Result<ReportLayout> {
        let cell = |a1: &Option<String>| a1.as_deref().map(CellRef::from_a1).transpose();
        Ok(ReportLayout {
            open_issues_cell: cell(&self.report.open_issues_cell)?,
            open_pulls_cell: cell(&self.report.open_pulls_cell)?,
        })
    }

    pub fn contributor_filter(&self) -> ContributorFilter {
        ContributorFilter::new(self.org_members.iter())
    }
}

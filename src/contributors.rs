//! External contributor detection.
//!
//! A comment author is external when their login is not on the configured
//! organization member list. Organization membership is not looked up
//! remotely, so a member missing from the list counts as external.

use crate::cli::CommonArgs;
use crate::config::Config;
use crate::error::Result;
use crate::model::{ExternalCommentsOutput, SCHEMA_VERSION};
use crate::pipeline::bucket_dates;
use crate::util::parse_event_date;
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use console::style;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub login: String,
}

/// An issue or pull request comment as listed by the GitHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(default)]
    pub user: Option<CommentAuthor>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContributorFilter {
    members: HashSet<String>,
}

impl ContributorFilter {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            members: members
                .into_iter()
                .map(|login| login.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// GitHub logins are case-insensitive.
    pub fn is_external(&self, login: &str) -> bool {
        !self.members.contains(&login.to_lowercase())
    }

    /// Dates of comments written by external contributors, ascending.
    /// Comments without an author (deleted accounts) are skipped.
    pub fn external_comment_dates(&self, comments: &[CommentRecord]) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        for comment in comments {
            let Some(author) = &comment.user else {
                continue;
            };
            if self.is_external(&author.login) {
                dates.push(parse_event_date(&comment.created_at)?);
            }
        }
        dates.sort();
        Ok(dates)
    }
}

pub fn exec(common: CommonArgs, comments_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(common.config.as_deref()).context("Failed to load config")?;
    let filter = config.contributor_filter();

    let contents = fs::read_to_string(comments_path)
        .with_context(|| format!("Failed to read {}", comments_path.display()))?;
    let comments: Vec<CommentRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", comments_path.display()))?;

    let dates = filter
        .external_comment_dates(&comments)
        .context("Failed to read comment dates")?;
    let quarters = bucket_dates(&dates);

    if json {
        let output = ExternalCommentsOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            comments: comments.len(),
            external_comments: dates.len(),
            quarters,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", style("External Contributor Comments").bold());
    println!("{}", "─".repeat(50));
    if quarters.is_empty() {
        println!("No data to display");
    }
    for (quarter, count) in &quarters {
        println!("{:<10} {:>6}", quarter.to_string(), style(count).cyan());
    }
    println!(
        "\n{} of {} comments from external contributors",
        style(dates.len()).green(),
        comments.len()
    );
    Ok(())
}

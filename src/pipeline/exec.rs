use super::{aggregate_repositories, output_json, output_summary};
use crate::cli::CommonArgs;
use crate::config::Config;
use crate::model::RawData;
use anyhow::{bail, Context};
use std::fs;
use std::path::Path;

pub fn exec(common: CommonArgs, raw_path: &Path, out: Option<&Path>, strict: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(common.config.as_deref()).context("Failed to load config")?;

    let contents = fs::read_to_string(raw_path)
        .with_context(|| format!("Failed to read {}", raw_path.display()))?;
    let raw: RawData = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", raw_path.display()))?;

    let run = aggregate_repositories(&config, &raw, strict).context("Aggregation failed")?;
    if run.metrics.is_empty() && !run.skipped.is_empty() {
        bail!("Every repository failed to aggregate ({} skipped)", run.skipped.len());
    }

    let Some(out) = out else {
        println!("{}", serde_json::to_string_pretty(&run.metrics)?);
        return Ok(());
    };

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(out, serde_json::to_string_pretty(&run.metrics)?)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    if json {
        output_json(&run)?;
    } else {
        output_summary(&run, out)?;
    }

    Ok(())
}

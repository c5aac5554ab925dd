use super::{layout_report, output_json, output_ndjson, output_table};
use crate::cli::CommonArgs;
use crate::config::Config;
use crate::model::MetricsDocument;
use anyhow::{bail, Context};
use std::fs;
use std::path::Path;

pub fn exec(common: CommonArgs, metrics_path: &Path, json: bool, ndjson: bool, strict: bool) -> anyhow::Result<()> {
    let config = Config::load(common.config.as_deref()).context("Failed to load config")?;
    let layout = config.report_layout().context("Invalid report cell positions")?;

    let contents = fs::read_to_string(metrics_path)
        .with_context(|| format!("Failed to read {}", metrics_path.display()))?;
    let document: MetricsDocument = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", metrics_path.display()))?;

    let run = layout_report(&document, &layout, strict).context("Report layout failed")?;
    if run.sheets.is_empty() && !run.skipped.is_empty() {
        bail!("No sheet could be laid out ({} skipped)", run.skipped.len());
    }

    if json {
        output_json(&run)?;
    } else if ndjson {
        output_ndjson(&run.sheets)?;
    } else {
        output_table(&run.sheets)?;
    }

    Ok(())
}

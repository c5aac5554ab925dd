pub mod exec;
pub mod grid;
pub mod layout;
pub mod output;

pub use exec::exec;
pub use grid::{CellGrid, CellRef, CellValue};
pub use layout::{abbreviate_label, layout_block, layout_owner, layout_sheet, ReportLayout, Sheet};
pub use output::{output_json, output_ndjson, output_table};

use crate::error::Result;
use crate::model::{AggregatedBundle, MetricsDocument, SkippedSheet};
use log::{error, info, warn};

/// Sheets laid out from one metrics file.
#[derive(Debug, Clone, Default)]
pub struct ReportRun {
    pub sheets: Vec<Sheet>,
    pub skipped: Vec<SkippedSheet>,
}

/// Lays out every (repo, owner) entry in file order, one sheet each.
///
/// An entry that does not parse or lay out is logged and skipped, unless
/// `strict` is set, in which case the first failure is returned.
pub fn layout_report(document: &MetricsDocument, layout: &ReportLayout, strict: bool) -> Result<ReportRun> {
    let mut run = ReportRun::default();
    for (repo, owners) in document {
        for (owner, value) in owners {
            let title = format!("{repo}-{owner}");
            let sheet = AggregatedBundle::from_value(value.clone())
                .and_then(|bundle| layout_sheet(repo, owner, &bundle, layout));
            match sheet {
                Ok(sheet) => {
                    info!("Laid out sheet {} ({} cells)", sheet.title, sheet.grid.len());
                    run.sheets.push(sheet);
                }
                Err(e) if !strict => {
                    warn!("Skipping sheet {title}: {e}");
                    run.skipped.push(SkippedSheet {
                        title,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!("Sheet {title} failed: {e}");
                    return Err(e);
                }
            }
        }
    }
    Ok(run)
}

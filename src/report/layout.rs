use super::grid::{CellGrid, CellRef};
use crate::error::{MetricsError, Result};
use crate::model::{AggregatedBundle, QuarterCounts, ScalarKind};

pub const DATE_LABEL: &str = "date";
pub const COUNT_LABEL: &str = "count";
pub const CUMULATED_LABEL: &str = "cumulated";

/// Columns taken by one metric block: date, count, cumulated.
pub const BLOCK_WIDTH: usize = 3;

/// Rows above the first data row of a block: metric name, column labels.
pub const HEADER_ROWS: usize = 2;

/// Where the punctual indicators go. By default each value sits under the
/// `count` label of its own block, which for the three reported series is
/// `K3` and `N3`. A pinned cell keeps its position whatever precedes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportLayout {
    pub open_issues_cell: Option<CellRef>,
    pub open_pulls_cell: Option<CellRef>,
}

impl ReportLayout {
    pub fn pinned(open_issues_cell: CellRef, open_pulls_cell: CellRef) -> Self {
        Self {
            open_issues_cell: Some(open_issues_cell),
            open_pulls_cell: Some(open_pulls_cell),
        }
    }

    fn pinned_cell(&self, kind: ScalarKind) -> Option<CellRef> {
        match kind {
            ScalarKind::OpenIssuesCount => self.open_issues_cell,
            ScalarKind::OpenPullsCount => self.open_pulls_cell,
        }
    }
}

/// One laid-out (repo, owner) sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub title: String,
    pub repo: String,
    pub owner: String,
    pub grid: CellGrid,
}

/// Display form of the quarter label on data row `row_index` of a block.
///
/// Q1 labels and the first row keep the year; later rows show only the
/// quarter (`Q2`, `Q3`, ...) so the year is read once per year.
pub fn abbreviate_label(label: &str, row_index: usize) -> String {
    if row_index == 0 || label.contains("Q1") {
        label.to_string()
    } else {
        label.chars().take(2).collect()
    }
}

fn layout_header(grid: &mut CellGrid, metric: &str, idx: usize, idy: usize) {
    grid.set(idx, idy, metric);
    grid.set(idx + 1, idy, DATE_LABEL);
    grid.set(idx + 1, idy + 1, COUNT_LABEL);
    grid.set(idx + 1, idy + 2, CUMULATED_LABEL);
}

/// Writes one metric block with its top-left corner at (`idx`, `idy`).
/// Quarters are written in map order, the cumulated column restarts at 0.
pub fn layout_block(
    grid: &mut CellGrid,
    metric: &str,
    counts: &QuarterCounts,
    idx: usize,
    idy: usize,
) -> Result<()> {
    layout_header(grid, metric, idx, idy);

    let mut cumulated = 0u64;
    for (i, (quarter, count)) in counts.iter().enumerate() {
        let row = idx + HEADER_ROWS + i;
        cumulated = cumulated.checked_add(*count).ok_or_else(|| {
            MetricsError::Overflow(format!("{metric} cumulated at {quarter}: {cumulated} + {count}"))
        })?;
        grid.set(row, idy, abbreviate_label(&quarter.to_string(), i));
        grid.set(row, idy + 1, *count);
        grid.set(row, idy + 2, cumulated);
    }
    Ok(())
}

/// Lays out every field of a bundle side by side, `BLOCK_WIDTH` columns
/// apart: series blocks, then the scalars, then pass-through fields. Scalar
/// and pass-through blocks only carry their header rows; the scalar values
/// go to their punctual cells afterwards.
pub fn layout_owner(bundle: &AggregatedBundle, layout: &ReportLayout) -> Result<CellGrid> {
    let mut grid = CellGrid::new();
    let mut idy = 0;
    for (kind, counts) in &bundle.series {
        layout_block(&mut grid, kind.as_str(), counts, 0, idy)?;
        idy += BLOCK_WIDTH;
    }

    let mut punctual = Vec::with_capacity(ScalarKind::ALL.len());
    for kind in ScalarKind::ALL {
        layout_header(&mut grid, kind.as_str(), 0, idy);
        let cell = layout
            .pinned_cell(kind)
            .unwrap_or_else(|| CellRef::new(HEADER_ROWS, idy + 1));
        punctual.push((kind, cell));
        idy += BLOCK_WIDTH;
    }

    for name in bundle.extra.keys() {
        layout_header(&mut grid, name, 0, idy);
        idy += BLOCK_WIDTH;
    }

    for (kind, cell) in punctual {
        if grid.is_occupied(cell) {
            return Err(MetricsError::CellOverlap { cell: cell.to_a1() });
        }
        grid.set(cell.row, cell.col, bundle.scalar(kind));
    }
    Ok(grid)
}

pub fn layout_sheet(repo: &str, owner: &str, bundle: &AggregatedBundle, layout: &ReportLayout) -> Result<Sheet> {
    Ok(Sheet {
        title: format!("{repo}-{owner}"),
        repo: repo.to_string(),
        owner: owner.to_string(),
        grid: layout_owner(bundle, layout)?,
    })
}

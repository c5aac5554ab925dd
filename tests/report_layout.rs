use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use quartermetrics::error::MetricsError;
use quartermetrics::model::{AggregatedBundle, MetricsDocument, MetricsFile, QuarterCounts, SeriesKind};
use quartermetrics::report::{
    abbreviate_label, layout_block, layout_owner, layout_report, CellGrid, CellRef, CellValue, ReportLayout,
};
use serde_json::json;

fn quarters(pairs: &[(&str, u64)]) -> QuarterCounts {
    pairs.iter().map(|(k, v)| (k.parse().unwrap(), *v)).collect()
}

fn text(grid: &CellGrid, row: usize, col: usize) -> Option<String> {
    grid.get(row, col).and_then(CellValue::as_text).map(str::to_string)
}

fn count(grid: &CellGrid, row: usize, col: usize) -> Option<u64> {
    grid.get(row, col).and_then(CellValue::as_count)
}

fn reported_bundle(comments: QuarterCounts, issues: QuarterCounts, merged: QuarterCounts) -> AggregatedBundle {
    let mut series = IndexMap::new();
    series.insert(SeriesKind::CommentsDates, comments);
    series.insert(SeriesKind::IssueCreationDates, issues);
    series.insert(SeriesKind::PrMergedDates, merged);
    AggregatedBundle {
        series,
        open_issues_count: 12,
        open_pulls_count: 4,
        extra: IndexMap::new(),
    }
}

#[test]
fn labels_abbreviate_after_first_row_except_q1() {
    let labels: Vec<String> = ["Q1-2021", "Q2-2021", "Q3-2021"]
        .iter()
        .enumerate()
        .map(|(i, l)| abbreviate_label(l, i))
        .collect();
    assert_eq!(labels, vec!["Q1-2021", "Q2", "Q3"]);

    let labels: Vec<String> = ["Q3-2020", "Q4-2020", "Q1-2021", "Q2-2021"]
        .iter()
        .enumerate()
        .map(|(i, l)| abbreviate_label(l, i))
        .collect();
    assert_eq!(labels, vec!["Q3-2020", "Q4", "Q1-2021", "Q2"]);
}

#[test]
fn block_has_header_labels_and_rows() {
    let mut grid = CellGrid::new();
    let counts = quarters(&[("Q1-2021", 2), ("Q2-2021", 1), ("Q3-2021", 4)]);
    layout_block(&mut grid, "comments_dates", &counts, 0, 3).unwrap();

    assert_eq!(text(&grid, 0, 3).as_deref(), Some("comments_dates"));
    assert_eq!(text(&grid, 1, 3).as_deref(), Some("date"));
    assert_eq!(text(&grid, 1, 4).as_deref(), Some("count"));
    assert_eq!(text(&grid, 1, 5).as_deref(), Some("cumulated"));

    let dates: Vec<String> = grid.column_run(3, 2).iter().map(|v| v.to_string()).collect();
    assert_eq!(dates, vec!["Q1-2021", "Q2", "Q3"]);
    assert_eq!(count(&grid, 2, 4), Some(2));
    assert_eq!(count(&grid, 3, 4), Some(1));
    assert_eq!(count(&grid, 4, 4), Some(4));
    assert_eq!(grid.get(5, 3), None);
}

#[test]
fn cumulated_column_is_running_sum() {
    let mut grid = CellGrid::new();
    let counts = quarters(&[("Q2-2020", 3), ("Q3-2020", 0), ("Q4-2020", 5), ("Q1-2021", 1)]);
    layout_block(&mut grid, "issue_creation_dates", &counts, 0, 0).unwrap();

    let cumulated: Vec<u64> = grid.column_run(2, 2).iter().filter_map(|v| v.as_count()).collect();
    assert_eq!(cumulated, vec![3, 3, 8, 9]);
    assert!(cumulated.windows(2).all(|w| w[0] <= w[1]));

    let counts_sum: u64 = grid.column_run(1, 2).iter().filter_map(|v| v.as_count()).sum();
    assert_eq!(cumulated.last().copied(), Some(counts_sum));
}

#[test]
fn cumulated_overflow_is_an_error() {
    let mut grid = CellGrid::new();
    let counts = quarters(&[("Q1-2021", u64::MAX), ("Q2-2021", 1)]);
    match layout_block(&mut grid, "comments_dates", &counts, 0, 0) {
        Err(MetricsError::Overflow(message)) => assert!(message.contains("Q2-2021")),
        other => panic!("expected Overflow, got {other:?}"),
    }
}

#[test]
fn empty_metric_emits_only_header_rows() {
    let mut grid = CellGrid::new();
    layout_block(&mut grid, "pr_merged_dates", &QuarterCounts::new(), 0, 6).unwrap();

    assert_eq!(grid.len(), 4);
    assert_eq!(text(&grid, 0, 6).as_deref(), Some("pr_merged_dates"));
    assert_eq!(text(&grid, 1, 8).as_deref(), Some("cumulated"));
    assert!(grid.column_run(8, 2).is_empty());
}

#[test]
fn owner_blocks_sit_side_by_side() {
    let bundle = reported_bundle(
        quarters(&[("Q1-2021", 2)]),
        quarters(&[("Q4-2020", 1), ("Q1-2021", 3)]),
        QuarterCounts::new(),
    );
    let grid = layout_owner(&bundle, &ReportLayout::default()).unwrap();

    assert_eq!(text(&grid, 0, 0).as_deref(), Some("comments_dates"));
    assert_eq!(text(&grid, 0, 3).as_deref(), Some("issue_creation_dates"));
    assert_eq!(text(&grid, 0, 6).as_deref(), Some("pr_merged_dates"));
    assert_eq!(count(&grid, 3, 5), Some(4));
    assert_eq!(grid.get(2, 6), None);
}

#[test]
fn scalar_fields_get_labelled_blocks() {
    let bundle = reported_bundle(quarters(&[("Q1-2021", 2)]), QuarterCounts::new(), QuarterCounts::new());
    let grid = layout_owner(&bundle, &ReportLayout::default()).unwrap();

    // J1:L2 and M1:O2, values under the count labels at K3 and N3
    assert_eq!(text(&grid, 0, 9).as_deref(), Some("open_issues_count"));
    assert_eq!(text(&grid, 1, 9).as_deref(), Some("date"));
    assert_eq!(text(&grid, 1, 10).as_deref(), Some("count"));
    assert_eq!(text(&grid, 1, 11).as_deref(), Some("cumulated"));
    assert_eq!(count(&grid, 2, 10), Some(12));
    assert_eq!(text(&grid, 0, 12).as_deref(), Some("open_pulls_count"));
    assert_eq!(text(&grid, 1, 13).as_deref(), Some("count"));
    assert_eq!(count(&grid, 2, 13), Some(4));
    assert_eq!(grid.get(2, 9), None);
}

#[test]
fn extra_fields_follow_the_scalar_blocks() {
    let mut bundle = reported_bundle(QuarterCounts::new(), QuarterCounts::new(), QuarterCounts::new());
    bundle.extra.insert("stargazers".to_string(), json!(12));
    let grid = layout_owner(&bundle, &ReportLayout::default()).unwrap();

    assert_eq!(text(&grid, 0, 15).as_deref(), Some("stargazers"));
    assert_eq!(text(&grid, 1, 16).as_deref(), Some("count"));
    assert_eq!(grid.get(2, 16), None);
}

#[test]
fn extra_series_shift_the_punctual_values() {
    let mut bundle = reported_bundle(QuarterCounts::new(), QuarterCounts::new(), QuarterCounts::new());
    bundle.series.insert(SeriesKind::ExternalCommentsDates, quarters(&[("Q1-2021", 1)]));

    let grid = layout_owner(&bundle, &ReportLayout::default()).unwrap();
    assert_eq!(text(&grid, 0, 9).as_deref(), Some("external_comments_dates"));
    assert_eq!(count(&grid, 2, 10), Some(1));
    assert_eq!(text(&grid, 0, 12).as_deref(), Some("open_issues_count"));
    assert_eq!(count(&grid, 2, 13), Some(12));
    assert_eq!(count(&grid, 2, 16), Some(4));
}

#[test]
fn pinned_punctual_cell_inside_a_block_is_rejected() {
    let pinned = ReportLayout::pinned(CellRef::from_a1("K3").unwrap(), CellRef::from_a1("N3").unwrap());

    let reported = reported_bundle(QuarterCounts::new(), QuarterCounts::new(), QuarterCounts::new());
    assert_eq!(
        layout_owner(&reported, &pinned).unwrap(),
        layout_owner(&reported, &ReportLayout::default()).unwrap()
    );

    let mut bundle = reported;
    bundle.series.insert(SeriesKind::ExternalCommentsDates, quarters(&[("Q1-2021", 1)]));
    match layout_owner(&bundle, &pinned) {
        Err(MetricsError::CellOverlap { cell }) => assert_eq!(cell, "K3"),
        other => panic!("expected CellOverlap, got {other:?}"),
    }

    let moved = ReportLayout::pinned(CellRef::from_a1("Q4").unwrap(), CellRef::from_a1("T4").unwrap());
    let grid = layout_owner(&bundle, &moved).unwrap();
    assert_eq!(count(&grid, 3, 16), Some(12));
    assert_eq!(count(&grid, 3, 19), Some(4));
}

#[test]
fn a1_references() {
    assert_eq!(CellRef::from_a1("A1").unwrap(), CellRef::new(0, 0));
    assert_eq!(CellRef::from_a1("K3").unwrap(), CellRef::new(2, 10));
    assert_eq!(CellRef::from_a1("n3").unwrap(), CellRef::new(2, 13));
    assert_eq!(CellRef::from_a1("AA10").unwrap(), CellRef::new(9, 26));
    assert_eq!(CellRef::new(2, 10).to_a1(), "K3");
    assert_eq!(CellRef::new(0, 27).to_a1(), "AB1");

    for bad in ["", "3K", "K0", "K", "K3X", "Ä1"] {
        assert!(
            matches!(CellRef::from_a1(bad), Err(MetricsError::InvalidCell(_))),
            "{bad} should not parse"
        );
    }
}

fn document_of(metrics: &MetricsFile) -> MetricsDocument {
    serde_json::from_value(serde_json::to_value(metrics).unwrap()).unwrap()
}

#[test]
fn report_has_one_sheet_per_owner_in_file_order() {
    let mut metrics = MetricsFile::new();
    let single = reported_bundle(quarters(&[("Q1-2021", 1)]), QuarterCounts::new(), QuarterCounts::new());
    metrics
        .entry("gtfs-validator".to_string())
        .or_default()
        .insert("MobilityData".to_string(), single.clone());
    let transit = metrics.entry("transit".to_string()).or_default();
    transit.insert("MobilityData".to_string(), single.clone());
    transit.insert("google".to_string(), single.clone());
    transit.insert("total".to_string(), single);

    let run = layout_report(&document_of(&metrics), &ReportLayout::default(), false).unwrap();
    let titles: Vec<&str> = run.sheets.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["gtfs-validator-MobilityData", "transit-MobilityData", "transit-google", "transit-total"]
    );
    assert!(run.skipped.is_empty());
}

#[test]
fn malformed_owner_entry_skips_only_its_sheet() {
    let document: MetricsDocument = serde_json::from_str(
        r#"{
          "gbfs": {
            "MobilityData": { "comments_dates": { "Q1-2021": 1 }, "open_issues_count": 3 },
            "NABSA": { "comments_dates": { "Q1-2021": 2 }, "open_issues_count": 1, "open_pulls_count": 0 },
            "total": "not a bundle"
          }
        }"#,
    )
    .unwrap();

    let run = layout_report(&document, &ReportLayout::default(), false).unwrap();
    let titles: Vec<&str> = run.sheets.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["gbfs-NABSA"]);
    let skipped: Vec<&str> = run.skipped.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(skipped, vec!["gbfs-MobilityData", "gbfs-total"]);
    assert!(run.skipped[0].reason.contains("open_pulls_count"));

    assert!(matches!(
        layout_report(&document, &ReportLayout::default(), true),
        Err(MetricsError::InvalidField { .. })
    ));
}

#[test]
fn dense_rows_fill_gaps() {
    let mut grid = CellGrid::new();
    grid.set(0, 0, "a");
    grid.set(1, 2, 7u64);

    assert_eq!(
        grid.dense_rows(),
        vec![
            vec!["a".to_string(), String::new(), String::new()],
            vec![String::new(), String::new(), "7".to_string()],
        ]
    );
    assert!(CellGrid::new().dense_rows().is_empty());
}

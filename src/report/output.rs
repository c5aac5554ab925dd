use super::layout::Sheet;
use super::ReportRun;
use crate::model::{CellLine, CellOutput, ReportOutput, SheetOutput, SCHEMA_VERSION};
use anyhow::Result;
use chrono::Utc;
use console::style;

fn cells_of(sheet: &Sheet) -> Vec<CellOutput> {
    sheet
        .grid
        .iter()
        .map(|(cell, value)| CellOutput {
            cell: cell.to_a1(),
            row: cell.row,
            col: cell.col,
            value: value.clone(),
        })
        .collect()
}

pub fn output_json(run: &ReportRun) -> Result<()> {
    let output = ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        sheets: run
            .sheets
            .iter()
            .map(|sheet| SheetOutput {
                title: sheet.title.clone(),
                repo: sheet.repo.clone(),
                owner: sheet.owner.clone(),
                cells: cells_of(sheet),
            })
            .collect(),
        skipped: run.skipped.clone(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_ndjson(sheets: &[Sheet]) -> Result<()> {
    for sheet in sheets {
        for cell in cells_of(sheet) {
            let line = CellLine {
                sheet: sheet.title.clone(),
                cell,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
    }
    Ok(())
}

pub fn output_table(sheets: &[Sheet]) -> Result<()> {
    if sheets.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    for sheet in sheets {
        let rows = sheet.grid.dense_rows();
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let widths: Vec<usize> = (0..cols)
            .map(|c| rows.iter().map(|r| r[c].chars().count()).max().unwrap_or(0).max(2))
            .collect();

        println!("{}", style(&sheet.title).bold());
        println!("{}", "─".repeat(widths.iter().map(|w| w + 2).sum::<usize>().max(20)));
        for (i, row) in rows.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .zip(widths.iter().copied())
                .map(|(value, width)| format!("{value:<width$}"))
                .collect();
            let line = line.join("  ");
            if i < 2 {
                println!("{}", style(line.trim_end()).cyan());
            } else {
                println!("{}", line.trim_end());
            }
        }
        println!();
    }
    Ok(())
}

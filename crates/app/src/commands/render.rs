//! Plain-text layouts for grids and history rows.

use mastery_core::model::{AggregationGrid, CrossTable, SessionKind, SessionResult};
use mastery_core::scorer::CellStatus;
use mastery_core::timer::format_duration;

fn pad_row(cells: &[String], width: usize) -> String {
    cells
        .iter()
        .map(|c| format!("{c:>width$}"))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// Header row plus one line per row header; answer cells are blank dots.
#[must_use]
pub fn cross_table(table: &CrossTable) -> String {
    let max = table
        .row_headers()
        .iter()
        .chain(table.col_headers())
        .max()
        .copied()
        .unwrap_or(0);
    let width = max.to_string().len().max(1) + 1;

    let mut header = vec![table.operation().symbol().to_string()];
    header.extend(table.col_headers().iter().map(u64::to_string));
    let mut lines = vec![pad_row(&header, width)];
    for &row in table.row_headers() {
        let mut cells = vec![row.to_string()];
        cells.extend(table.col_headers().iter().map(|_| "·".to_string()));
        lines.push(pad_row(&cells, width));
    }
    lines.join("\n")
}

/// Grid values with `?` where row and column sums go.
#[must_use]
pub fn aggregation_grid(grid: &AggregationGrid) -> String {
    let width = grid.grand_total().to_string().len() + 1;
    let n = grid.dimension();
    let mut lines: Vec<String> = grid
        .rows()
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(u64::to_string).collect();
            cells.push("?".to_string());
            pad_row(&cells, width)
        })
        .collect();
    lines.push(pad_row(&vec!["?".to_string(); n + 1], width));
    lines.join("\n")
}

#[must_use]
pub fn status_mark(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Correct => "✓",
        CellStatus::Incorrect => "✗",
        CellStatus::Unchecked => "-",
    }
}

#[must_use]
pub fn difficulty(kind: SessionKind, difficulty: u32) -> String {
    match kind {
        SessionKind::Aggregation => format!("{difficulty}×{difficulty} grid"),
        SessionKind::Practice(_) if difficulty == 1 => "1 digit".to_string(),
        SessionKind::Practice(_) => format!("{difficulty} digits"),
    }
}

/// One history line: time, kind, difficulty, score, accuracy, duration.
#[must_use]
pub fn result_line(result: &SessionResult) -> String {
    format!(
        "{}  {:<22} {:<10} {:>4}/{:<4} {:>3}%  {}",
        result.created_at().format("%H:%M"),
        result.kind().label(),
        difficulty(result.kind(), result.difficulty()),
        result.correct(),
        result.total_problems(),
        result.accuracy(),
        format_duration(result.elapsed_secs()),
    )
}

/// Horizontal bar, one block per 5 points of accuracy.
#[must_use]
pub fn accuracy_bar(accuracy: u8) -> String {
    "█".repeat(usize::from(accuracy / 5))
}

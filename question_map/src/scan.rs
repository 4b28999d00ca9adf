use log::debug;

use crate::cell::{CellSource, CellValue};

/// The marker carried by rows describing hidden system fields.
pub const SYSTEM_MARKER: &str = "System";

/// Whether rows tagged with the system marker take part in a scan.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SkipPolicy {
    KeepAll,
    /// System rows share the marker column with question rows but are never
    /// a valid question number.
    SkipSystem,
}

/// Returns the first row at or after `start_row` whose trimmed value in
/// `column` equals `target`.
///
/// Not finding anything is not an error: callers treat `None` as an absent
/// question.
pub fn find_row_by_marker<S: CellSource + ?Sized>(
    sheet: &S,
    column: u32,
    target: &str,
    start_row: u32,
    policy: SkipPolicy,
) -> Option<u32> {
    let target = target.trim();
    let res = find_row_where(sheet, column, start_row, |v| {
        let marker = v.trimmed();
        if policy == SkipPolicy::SkipSystem && marker == SYSTEM_MARKER {
            return false;
        }
        marker == target
    });
    debug!(
        "find_row_by_marker: column {} target {:?} from row {}: {:?}",
        column, target, start_row, res
    );
    res
}

/// Returns the first row at or after `start_row` for which the predicate
/// holds on the value in `column`.
pub fn find_row_where<S, F>(sheet: &S, column: u32, start_row: u32, pred: F) -> Option<u32>
where
    S: CellSource + ?Sized,
    F: Fn(&CellValue) -> bool,
{
    (start_row.max(1)..=sheet.max_row()).find(|row| pred(&sheet.value_at(*row, column)))
}

/// All the rows at or after `start_row` whose trimmed value equals `target`,
/// in row order.
pub fn rows_with_value<S: CellSource + ?Sized>(
    sheet: &S,
    column: u32,
    target: &str,
    start_row: u32,
) -> Vec<u32> {
    (start_row.max(1)..=sheet.max_row())
        .filter(|row| {
            let v = sheet.value_at(*row, column);
            v.has_text() && v.trimmed() == target
        })
        .collect()
}

/// The last row at or after `start_row` with non-blank content in `column`.
pub fn last_row_with_text<S: CellSource + ?Sized>(
    sheet: &S,
    column: u32,
    start_row: u32,
) -> Option<u32> {
    (start_row.max(1)..=sheet.max_row())
        .rev()
        .find(|row| sheet.value_at(*row, column).has_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Grid;

    fn marker_sheet() -> Grid {
        let mut g = Grid::new();
        for (idx, m) in ["1", "1", "2", "System", "1"].iter().enumerate() {
            g.set(4 + idx as u32, 7, CellValue::text(m));
        }
        g
    }

    #[test]
    fn first_matching_row_wins() {
        let g = marker_sheet();
        assert_eq!(
            find_row_by_marker(&g, 7, "1", 4, SkipPolicy::SkipSystem),
            Some(4)
        );
        assert_eq!(
            find_row_by_marker(&g, 7, "2", 4, SkipPolicy::SkipSystem),
            Some(6)
        );
        // Same answer twice on unchanged input.
        assert_eq!(
            find_row_by_marker(&g, 7, "1", 4, SkipPolicy::SkipSystem),
            find_row_by_marker(&g, 7, "1", 4, SkipPolicy::SkipSystem)
        );
    }

    #[test]
    fn system_rows_and_missing_markers() {
        let g = marker_sheet();
        assert_eq!(
            find_row_by_marker(&g, 7, "System", 4, SkipPolicy::SkipSystem),
            None
        );
        assert_eq!(
            find_row_by_marker(&g, 7, "System", 4, SkipPolicy::KeepAll),
            Some(7)
        );
        assert_eq!(
            find_row_by_marker(&g, 7, "9", 4, SkipPolicy::KeepAll),
            None
        );
        assert_eq!(
            find_row_by_marker(&g, 7, "1", 5, SkipPolicy::KeepAll),
            Some(5)
        );
    }

    #[test]
    fn numeric_markers_match_their_text() {
        let mut g = Grid::new();
        g.set(4, 7, CellValue::Number(3.0));
        g.set(5, 7, CellValue::text(" 3 "));
        assert_eq!(
            find_row_by_marker(&g, 7, "3", 1, SkipPolicy::SkipSystem),
            Some(4)
        );
        assert_eq!(rows_with_value(&g, 7, "3", 1), vec![4, 5]);
    }

    #[test]
    fn last_text_row() {
        let mut g = Grid::new();
        g.set(2, 3, CellValue::text("a"));
        g.set(5, 3, CellValue::text("b"));
        g.set(6, 3, CellValue::text("  "));
        g.set(9, 4, CellValue::text("other column"));
        assert_eq!(last_row_with_text(&g, 3, 1), Some(5));
        assert_eq!(last_row_with_text(&g, 3, 6), None);
    }
}

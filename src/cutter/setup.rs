// Sheet naming and the raw data tab.

use crate::cutter::workbook::{Border, Style, VAlign, Workbook};
use crate::cutter::*;

use question_map::templates::{
    RawDataRange, COLUMN_MAP_SHEET, DATA_MAP_SHEET, LOOP_VARIABLES_SHEET, RAW_DATA_SHEET,
};
use question_map::CellSource;

pub const NARROW_WIDTH: f64 = 3.0;
pub const PALE_BLUE: u32 = 0xE6F3FF;

/// Bordered, pale blue, centred: the header cells of the map sheets.
pub fn header_style() -> Style {
    Style {
        fill: Some(PALE_BLUE),
        border: Some(Border::Thin),
        centered: true,
        v_align: Some(VAlign::Center),
        ..Style::default()
    }
}

fn squashed(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

fn is_raw_data_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower == "a"
        || lower == "b"
        || squashed(name) == "rawdata"
        || (lower.starts_with('a') && lower.chars().count() <= 3)
}

/// Normalizes the sheet names of an export and adds the sheets the builder
/// fills later.
pub fn initial_setup(wb: &mut Workbook) {
    let names = wb.sheet_names();
    if let Some(name) = names.iter().find(|n| is_raw_data_name(n)) {
        if name != RAW_DATA_SHEET {
            info!("Renaming tab {:?} to {:?}", name, RAW_DATA_SHEET);
            wb.rename_sheet(name, RAW_DATA_SHEET);
        }
    }
    let names = wb.sheet_names();
    if let Some(name) = names.iter().find(|n| squashed(n).contains("datamap")) {
        if name != DATA_MAP_SHEET {
            info!("Renaming tab {:?} to {:?}", name, DATA_MAP_SHEET);
            wb.rename_sheet(name, DATA_MAP_SHEET);
        }
    }
    for tab in [COLUMN_MAP_SHEET, LOOP_VARIABLES_SHEET] {
        let exists = wb
            .sheet_names()
            .iter()
            .any(|n| n.to_lowercase() == tab.to_lowercase());
        if exists {
            debug!("initial_setup: tab {:?} already present", tab);
        } else {
            info!("Creating tab {:?}", tab);
            wb.create_sheet(tab);
        }
    }
}

/// The row holding the raw data headers once the spacer row is in: row 2, or
/// row 1 when row 2 has nothing right of the spacer columns.
fn header_row<S: CellSource + ?Sized>(sheet: &S, first_col: u32, last_col: u32) -> u32 {
    let has_values = |row: u32| (first_col..=last_col).any(|c| !sheet.value_at(row, c).is_empty());
    if !has_values(2) && has_values(1) {
        1
    } else {
        2
    }
}

/// Adds the spacer columns and row in front of the respondent data and
/// formats the headers. Skipped with a warning when there is no raw data tab.
pub fn raw_data_setup(wb: &mut Workbook, range: &RawDataRange) {
    let ws = match wb.sheet_mut(RAW_DATA_SHEET) {
        Some(ws) => ws,
        None => {
            warn!("No {:?} tab found, skipping raw data setup", RAW_DATA_SHEET);
            return;
        }
    };
    let spacer_cols = range.first_col - 1;
    ws.insert_cols(1, spacer_cols);
    for c in 1..=spacer_cols {
        ws.set_column_width(c, NARROW_WIDTH);
    }
    ws.insert_rows(1, range.header_row - 1);
    ws.gridlines = false;

    let max_col = ws.max_col();
    let row = header_row(&*ws, range.first_col, max_col);
    let last = (range.first_col..=max_col)
        .find(|c| ws.value_at(row, *c).is_empty())
        .map(|c| c - 1)
        .unwrap_or(max_col);
    let mut formatted = 0;
    for c in range.first_col..=last {
        *ws.style_mut(row, c) = header_style();
        formatted += 1;
    }
    info!(
        "Raw data setup done: {} headers formatted on row {}",
        formatted, row
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use question_map::CellValue;

    #[test]
    fn renames_and_creates_tabs() {
        let mut wb = Workbook::new();
        wb.create_sheet("A");
        wb.create_sheet("Data Map");
        wb.create_sheet("Loop Variables");
        initial_setup(&mut wb);
        assert_eq!(
            wb.sheet_names(),
            vec!["raw data", "data map", "Loop Variables", "column question map"]
        );
        // Running it again changes nothing.
        initial_setup(&mut wb);
        assert_eq!(wb.sheet_names().len(), 4);
    }

    #[test]
    fn raw_data_names() {
        assert!(is_raw_data_name("B"));
        assert!(is_raw_data_name("Raw Data"));
        assert!(is_raw_data_name("abc"));
        assert!(!is_raw_data_name("abcd"));
        assert!(!is_raw_data_name("datamap"));
    }

    #[test]
    fn raw_data_gets_spacers_and_header_format() {
        let mut wb = Workbook::new();
        let ws = wb.create_sheet(RAW_DATA_SHEET);
        ws.set_value(1, 1, "record");
        ws.set_value(1, 2, "S1");
        ws.set_value(1, 4, "S3");
        ws.set_value(2, 1, CellValue::Number(1.0));
        raw_data_setup(&mut wb, &RawDataRange::default());

        let ws = wb.sheet(RAW_DATA_SHEET).unwrap();
        assert_eq!(ws.value_at(2, 3), CellValue::text("record"));
        assert_eq!(ws.value_at(3, 3), CellValue::Number(1.0));
        assert_eq!(ws.column_width(1), Some(NARROW_WIDTH));
        assert!(!ws.gridlines);
        assert_eq!(ws.cell(2, 4).map(|c| c.style.fill), Some(Some(PALE_BLUE)));
        // Formatting stops at the first blank header.
        assert!(ws.cell(2, 5).is_none());
        assert!(ws.cell(2, 6).map(|c| c.style.is_plain()).unwrap_or(true));
    }

    #[test]
    fn raw_data_missing_is_skipped() {
        let mut wb = Workbook::new();
        wb.create_sheet(DATA_MAP_SHEET);
        raw_data_setup(&mut wb, &RawDataRange::default());
        assert_eq!(wb.sheet_names(), vec!["data map"]);
    }
}

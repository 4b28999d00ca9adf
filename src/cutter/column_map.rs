// The column question map: one row per raw data column, with its marker.

use crate::cutter::setup::{header_style, NARROW_WIDTH};
use crate::cutter::workbook::{Workbook, Worksheet};
use crate::cutter::*;

use question_map::templates::{
    RawDataRange, COLUMN_MAP_SHEET, COLUMN_MAP_TEMPLATE_ROW, COLUMN_MARKER_TEMPLATE,
    COLUMN_NUMBER_TEMPLATE, COLUMN_ORIGIN_TEMPLATE, QUESTION_NUMBER_SLOTS, RAW_DATA_SHEET,
};
use question_map::{last_row_with_text, render_down, unique_markers, CellSource, CellValue};

pub const MAP_WIDTH: f64 = 20.0;

const HEADERS: [&str; 6] = [
    "All question columns",
    "System or Survey",
    "Question markers",
    "Question Number",
    "Unique question markers",
    "Question Number Map",
];

const HEADERS_COL: u32 = 3;
const MARKERS_COL: u32 = 7;
const NUMBERS_COL: u32 = 8;

/// The non-blank headers of the raw data, from the first data column to the
/// last non-blank header, in column order.
fn raw_headers(raw: &Worksheet, range: &RawDataRange) -> Vec<CellValue> {
    let row = range.header_row;
    let last = (1..=raw.max_col())
        .rev()
        .find(|c| raw.value_at(row, *c).has_text())
        .unwrap_or(0);
    (range.first_col..=last)
        .map(|c| raw.value_at(row, c))
        .filter(|v| !v.is_empty())
        .collect()
}

fn write_row_templates(ws: &mut Worksheet) -> CutResult<()> {
    let base = COLUMN_MAP_TEMPLATE_ROW;
    let last = last_row_with_text(&*ws, HEADERS_COL, 1).unwrap_or(1);
    let rows: Vec<u32> = if last > base {
        ((base + 1)..=last).collect()
    } else {
        Vec::new()
    };
    let templates = [
        (4, COLUMN_ORIGIN_TEMPLATE),
        (5, COLUMN_MARKER_TEMPLATE),
        (6, COLUMN_NUMBER_TEMPLATE),
    ];
    for (col, template) in templates {
        ws.set_formula(base, col, template);
        let rendered = render_down(template, base, &rows).context(RenderingFormulaSnafu {
            sheet: COLUMN_MAP_SHEET,
            cell: question_map::cell_address(base, col),
        })?;
        for (row, f) in rendered {
            ws.set_formula(row, col, &f);
        }
    }
    info!(
        "Column question map formulas copied to {} rows",
        rows.len()
    );
    Ok(())
}

/// Fills the column question map from the raw data headers. Skipped with a
/// warning when the tab is missing; without raw data only the scaffolding is
/// written.
pub fn column_map_setup(wb: &mut Workbook, range: &RawDataRange) -> CutResult<()> {
    let headers: Option<Vec<CellValue>> = wb.sheet(RAW_DATA_SHEET).map(|raw| raw_headers(raw, range));
    let ws = match wb.sheet_mut(COLUMN_MAP_SHEET) {
        Some(ws) => ws,
        None => {
            warn!(
                "No {:?} tab found, skipping column question map setup",
                COLUMN_MAP_SHEET
            );
            return Ok(());
        }
    };
    ws.gridlines = false;
    ws.set_column_width(1, NARROW_WIDTH);
    ws.set_column_width(2, NARROW_WIDTH);
    for c in 3..=8 {
        ws.set_column_width(c, MAP_WIDTH);
    }
    for (i, h) in HEADERS.iter().enumerate() {
        let col = HEADERS_COL + i as u32;
        ws.set_value(2, col, *h);
        *ws.style_mut(2, col) = header_style();
    }

    let headers = match headers {
        Some(h) => h,
        None => {
            warn!("Raw data tab not found, skipping header copying");
            Vec::new()
        }
    };
    for (i, h) in headers.iter().enumerate() {
        ws.set_value(COLUMN_MAP_TEMPLATE_ROW + i as u32, HEADERS_COL, h.clone());
    }
    info!("Copied {} raw data headers", headers.len());

    write_row_templates(ws)?;

    for n in 1..=QUESTION_NUMBER_SLOTS {
        ws.set_value(COLUMN_MAP_TEMPLATE_ROW + n - 1, NUMBERS_COL, n);
    }

    let texts: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let markers = unique_markers(texts.iter().map(|s| s.as_str()));
    for (i, m) in markers.iter().enumerate() {
        ws.set_value(COLUMN_MAP_TEMPLATE_ROW + i as u32, MARKERS_COL, m.as_str());
    }
    info!("Found {} unique question markers", markers.len());

    for c in 6..=8 {
        ws.column_style_mut(c).centered = true;
    }
    Ok(())
}

// Scaffolding of the data map: spacers, headers and classification formulas.

use crate::cutter::setup::{header_style, NARROW_WIDTH};
use crate::cutter::workbook::{VAlign, Workbook, Worksheet};
use crate::cutter::*;

use question_map::templates::{DATA_MAP_SHEET, DATA_MAP_TEMPLATES, DATA_MAP_TEMPLATE_ROW};
use question_map::{column_index, column_letters, last_row_with_text, render_down};

pub const WIDE_WIDTH: f64 = 50.0;
pub const STANDARD_WIDTH: f64 = 13.0;

/// Headers of row 2, from column C.
const LEFT_HEADERS: [(u32, &str); 4] = [
    (3, "Question Info"),
    (4, "System Response Option"),
    (5, "Text Response Option"),
    (7, "Question Number"),
];

/// Headers of row 2, H to AG.
const FLAG_HEADERS: [&str; 26] = [
    "Question Type",
    "Question Text",
    "Question Code",
    "System or Survey Q",
    "Question Prefix",
    "Section Marker",
    "Section Number",
    "Row Tag",
    "Row Tag + Section",
    "Other Text Entry Flag",
    "Other Question Type Flag",
    "Other Question Type",
    "System Question Flag",
    "System Question",
    "Open Text",
    "Numerical",
    "Simple Select",
    "Multi Select (placeholder)",
    "Rank",
    "Matrix",
    "Loop",
    "Double Loop",
    "Double Loop Flag #0",
    "Double Loop Flag #1",
    "Double Loop Flag #2",
    "Double Loop Flag #3",
];

const HEADER_ROW: u32 = 2;

/// Height of the header row so that the longest wrapped header fits.
pub fn header_row_height(ws: &Worksheet) -> f64 {
    let mut max_lines = 1;
    for ((row, col), cell) in ws.cells() {
        if *row != HEADER_ROW {
            continue;
        }
        let text = cell.value().to_string();
        if text.is_empty() {
            continue;
        }
        let width = ws.column_width(*col).unwrap_or(STANDARD_WIDTH);
        let per_line = ((width * 0.8) as usize).max(1);
        let len = text.chars().count();
        let mut lines = ((len + per_line - 1) / per_line).max(1);
        let longest_word = text
            .split_whitespace()
            .map(|w| w.chars().count())
            .max()
            .unwrap_or(0);
        if longest_word > per_line {
            lines = lines.max(2);
        }
        max_lines = max_lines.max(lines);
    }
    (max_lines * 15 + 5) as f64
}

fn set_widths(ws: &mut Worksheet) {
    for c in [1, 2, 6] {
        ws.set_column_width(c, NARROW_WIDTH);
    }
    ws.set_column_width(3, WIDE_WIDTH);
    ws.set_column_width(4, STANDARD_WIDTH);
    ws.set_column_width(5, STANDARD_WIDTH);
    // G to Z
    for c in 7..=26 {
        ws.set_column_width(c, STANDARD_WIDTH);
    }
}

fn write_headers(ws: &mut Worksheet) {
    for (col, h) in LEFT_HEADERS.iter() {
        ws.set_value(HEADER_ROW, *col, *h);
    }
    for (i, h) in FLAG_HEADERS.iter().enumerate() {
        ws.set_value(HEADER_ROW, 8 + i as u32, *h);
    }
    let cols: Vec<u32> = ws
        .cells()
        .filter(|((r, _), c)| *r == HEADER_ROW && !c.value().is_empty())
        .map(|((_, c), _)| *c)
        .collect();
    for c in cols {
        let style = ws.style_mut(HEADER_ROW, c);
        *style = header_style();
        style.wrap = true;
    }
    let c = ws.column_style_mut(3);
    c.wrap = true;
    c.v_align = Some(VAlign::Top);
}

/// Writes the classification templates on the template row and copies them
/// down to one row below the last question info text. Y stays on the template
/// row only.
fn write_templates(ws: &mut Worksheet) -> CutResult<()> {
    let base = DATA_MAP_TEMPLATE_ROW;
    let last_text = last_row_with_text(&*ws, 3, 1).unwrap_or(1);
    let target_last = last_text + 1;
    let rows: Vec<u32> = if target_last > base {
        ((base + 1)..=target_last).collect()
    } else {
        Vec::new()
    };
    for (letters, template) in DATA_MAP_TEMPLATES.iter() {
        let col = match column_index(letters) {
            Some(c) => c,
            None => whatever!("Bad template column {:?}", letters),
        };
        ws.set_text(base, col, template);
        if !template.starts_with('=') {
            continue;
        }
        let rendered = render_down(template, base, &rows).context(RenderingFormulaSnafu {
            sheet: DATA_MAP_SHEET,
            cell: format!("{}{}", letters, base),
        })?;
        for (row, f) in rendered {
            ws.set_formula(row, col, &f);
        }
    }
    info!(
        "Data map templates written on row {} and copied to {} rows",
        base,
        rows.len()
    );
    debug!(
        "write_templates: templates span G{}:{}{}",
        base,
        column_letters(33),
        target_last.max(base)
    );
    Ok(())
}

/// Inserts the spacers, headers and classification formulas of the data map.
/// Skipped with a warning when there is no data map.
pub fn data_map_setup(wb: &mut Workbook) -> CutResult<()> {
    let ws = match wb.sheet_mut(DATA_MAP_SHEET) {
        Some(ws) => ws,
        None => {
            warn!("No {:?} tab found, skipping data map setup", DATA_MAP_SHEET);
            return Ok(());
        }
    };
    ws.gridlines = false;
    ws.insert_cols(1, 2);
    ws.insert_rows(1, 3);
    set_widths(ws);
    write_headers(ws);
    let height = header_row_height(ws);
    ws.set_row_height(HEADER_ROW, height);
    debug!("data_map_setup: header row height {}", height);
    write_templates(ws)?;
    info!("Data map setup done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use question_map::{CellSource, CellValue};

    fn sample_map() -> Workbook {
        let mut wb = Workbook::new();
        let ws = wb.create_sheet(DATA_MAP_SHEET);
        ws.set_value(1, 1, "[S1]: Region");
        ws.set_value(2, 1, "Values: 1-2");
        ws.set_value(3, 2, CellValue::Number(1.0));
        ws.set_value(3, 3, "North");
        ws.set_value(4, 2, CellValue::Number(2.0));
        ws.set_value(4, 3, "South");
        ws.set_value(6, 1, "[S2]: Comments");
        wb
    }

    #[test]
    fn layout_after_setup() {
        let mut wb = sample_map();
        data_map_setup(&mut wb).unwrap();
        let ws = wb.sheet(DATA_MAP_SHEET).unwrap();
        assert!(!ws.gridlines);
        assert_eq!(ws.value_at(4, 3), CellValue::text("[S1]: Region"));
        assert_eq!(ws.value_at(6, 4), CellValue::Number(1.0));
        assert_eq!(ws.value_at(6, 5), CellValue::text("North"));
        assert_eq!(ws.value_at(2, 3), CellValue::text("Question Info"));
        assert_eq!(ws.value_at(2, 8), CellValue::text("Question Type"));
        assert_eq!(ws.value_at(2, 33), CellValue::text("Double Loop Flag #3"));
        assert_eq!(ws.column_width(3), Some(WIDE_WIDTH));
        assert_eq!(ws.column_width(6), Some(NARROW_WIDTH));
        assert_eq!(ws.column_style(3).map(|s| s.v_align), Some(Some(VAlign::Top)));
        assert_eq!(ws.cell(2, 8).map(|c| c.style.wrap), Some(true));
    }

    #[test]
    fn templates_copied_below_last_text() {
        let mut wb = sample_map();
        data_map_setup(&mut wb).unwrap();
        let ws = wb.sheet(DATA_MAP_SHEET).unwrap();
        // Last question info text on row 9, so templates go down to row 10.
        let formula = |r: u32, c: u32| ws.cell(r, c).and_then(|c| c.formula()).map(|s| s.to_string());
        assert_eq!(
            formula(10, 14),
            Some("=COUNTIFS($M$4:M10, \"Start\")".to_string())
        );
        assert_eq!(
            formula(7, 8),
            Some(r#"=U7&", "&V7&", "&W7&", "&X7&", "&Y7&", "&Z7&", "&AA7&", "&AB7&", "&AC7&", "&S7"#.to_string())
        );
        assert!(formula(11, 14).is_none());
        assert_eq!(ws.value_at(4, 25), CellValue::text("0"));
        assert!(ws.cell(5, 25).is_none());
        assert!(formula(10, 7)
            .map(|f| f.contains("MATCH('data map'!$L10,"))
            .unwrap_or(false));
    }

    #[test]
    fn header_height_fits_the_longest_header() {
        let mut ws = Worksheet::new("s");
        ws.set_column_width(3, 10.0);
        ws.set_value(2, 3, "short");
        assert_eq!(header_row_height(&ws), 20.0);
        // 8 characters per line at width 10.
        ws.set_value(2, 3, "Multi Select (placeholder)");
        assert_eq!(header_row_height(&ws), 65.0);
        ws.set_value(2, 3, "Abcdefghijk");
        assert_eq!(header_row_height(&ws), 35.0);
    }

    #[test]
    fn missing_data_map_is_skipped() {
        let mut wb = Workbook::new();
        data_map_setup(&mut wb).unwrap();
        assert!(wb.sheets().is_empty());
    }
}

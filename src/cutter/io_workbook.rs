// Reading with calamine, writing with rust_xlsxwriter.

use crate::cutter::workbook::{Border, CellContent, Style, VAlign, Workbook, Worksheet};
use crate::cutter::*;

use calamine::{open_workbook_auto, DataType, Reader};
use question_map::CellValue;
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, Formula as XlsxFormula,
    Workbook as XlsxWorkbook, Worksheet as XlsxWorksheet,
};
use std::path::Path;

#[allow(unreachable_patterns)]
fn read_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) if s.is_empty() => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::DateTime(f) => CellValue::Number(*f),
        DataType::Bool(b) => CellValue::Bool(*b),
        DataType::Error(e) => CellValue::Text(e.to_string()),
        _ => CellValue::Empty,
    }
}

/// Loads the values and formulas of every sheet. Formatting is not read.
pub fn read_workbook(path: &Path) -> CutResult<Workbook> {
    let p = path.display().to_string();
    let mut xl = open_workbook_auto(path).context(OpeningWorkbookSnafu { path: p.clone() })?;
    let mut wb = Workbook::new();
    let names: Vec<String> = xl.sheet_names().to_vec();
    for name in names {
        let mut ws = Worksheet::new(&name);
        if let Some(range) = xl.worksheet_range(&name) {
            let range = range.context(ReadingSheetSnafu {
                path: p.clone(),
                sheet: name.clone(),
            })?;
            if let Some((r0, c0)) = range.start() {
                for (ri, row) in range.rows().enumerate() {
                    for (ci, cell) in row.iter().enumerate() {
                        let v = read_value(cell);
                        if !v.is_empty() {
                            ws.set_value(r0 + ri as u32 + 1, c0 + ci as u32 + 1, v);
                        }
                    }
                }
            }
        }
        match xl.worksheet_formula(&name) {
            Some(Ok(formulas)) => {
                if let Some((r0, c0)) = formulas.start() {
                    for (ri, row) in formulas.rows().enumerate() {
                        for (ci, f) in row.iter().enumerate() {
                            if f.is_empty() {
                                continue;
                            }
                            let (r, c) = (r0 + ri as u32 + 1, c0 + ci as u32 + 1);
                            let cached = ws.cell(r, c).map(|cell| cell.value());
                            ws.set_content(
                                r,
                                c,
                                CellContent::Formula {
                                    text: format!("={}", f),
                                    cached,
                                },
                            );
                        }
                    }
                }
            }
            Some(Err(e)) => {
                warn!("read_workbook: {}: formulas of {:?} not read: {}", p, name, e);
            }
            None => {}
        }
        debug!(
            "read_workbook: sheet {:?}: {} rows",
            name,
            question_map::CellSource::max_row(&ws)
        );
        wb.add_sheet(ws);
    }
    info!("Loaded {} sheets from {}", wb.sheets().len(), p);
    Ok(wb)
}

fn build_format(style: &Style) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if let Some(c) = style.font_color {
        format = format.set_font_color(Color::RGB(c));
    }
    if let Some(c) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(c));
    }
    match style.border {
        Some(Border::Thin) => format = format.set_border(FormatBorder::Thin),
        Some(Border::ThinBottom) => format = format.set_border_bottom(FormatBorder::Thin),
        None => {}
    }
    if style.centered {
        format = format.set_align(FormatAlign::Center);
    }
    match style.v_align {
        Some(VAlign::Top) => format = format.set_align(FormatAlign::Top),
        Some(VAlign::Center) => format = format.set_align(FormatAlign::VerticalCenter),
        None => {}
    }
    if style.wrap {
        format = format.set_text_wrap();
    }
    if let Some(nf) = &style.num_format {
        format = format.set_num_format(nf);
    }
    format
}

fn write_sheet(sheet: &Worksheet, ws: &mut XlsxWorksheet, path: &str) -> CutResult<()> {
    let ctx = || SavingWorkbookSnafu {
        path: path.to_string(),
    };
    ws.set_name(&sheet.name).with_context(|_| ctx())?;
    ws.set_screen_gridlines(sheet.gridlines);
    for (col, width) in sheet.column_widths() {
        ws.set_column_width((col - 1) as u16, *width)
            .with_context(|_| ctx())?;
    }
    for (col, style) in sheet.column_styles() {
        ws.set_column_format((col - 1) as u16, &build_format(style))
            .with_context(|_| ctx())?;
    }
    for (row, height) in sheet.row_heights() {
        ws.set_row_height(row - 1, *height).with_context(|_| ctx())?;
    }
    for ((row, col), cell) in sheet.cells() {
        let (r, c) = (row - 1, (col - 1) as u16);
        let style = match sheet.column_style(*col) {
            Some(base) => cell.style.over(base),
            None => cell.style.clone(),
        };
        let format = build_format(&style);
        match &cell.content {
            CellContent::Value(CellValue::Empty) => {
                if !style.is_plain() {
                    ws.write_blank(r, c, &format).with_context(|_| ctx())?;
                }
            }
            CellContent::Value(CellValue::Number(n)) => {
                ws.write_number_with_format(r, c, *n, &format)
                    .with_context(|_| ctx())?;
            }
            CellContent::Value(CellValue::Text(s)) => {
                ws.write_string_with_format(r, c, s, &format)
                    .with_context(|_| ctx())?;
            }
            CellContent::Value(CellValue::Bool(b)) => {
                ws.write_boolean_with_format(r, c, *b, &format)
                    .with_context(|_| ctx())?;
            }
            CellContent::Formula { text, cached } => {
                let mut f = XlsxFormula::new(text);
                if let Some(v) = cached {
                    f = f.set_result(v.to_string());
                }
                ws.write_formula_with_format(r, c, f, &format)
                    .with_context(|_| ctx())?;
            }
        }
    }
    Ok(())
}

/// Saves the workbook, creating the parent directory when needed.
pub fn save_workbook(wb: &Workbook, path: &Path) -> CutResult<()> {
    let p = path.display().to_string();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context(CreatingDirectorySnafu {
                path: parent.display().to_string(),
            })?;
        }
    }
    let mut book = XlsxWorkbook::new();
    for sheet in wb.sheets() {
        let ws = book.add_worksheet();
        write_sheet(sheet, ws, &p)?;
    }
    book.save(path).context(SavingWorkbookSnafu { path: p.clone() })?;
    info!("Workbook saved to {}", p);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use question_map::CellSource;

    #[test]
    fn save_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("book.xlsx");

        let mut wb = Workbook::new();
        let ws = wb.create_sheet("raw data");
        ws.set_value(2, 3, "record");
        ws.set_value(3, 3, CellValue::Number(17.0));
        ws.set_formula(3, 4, "=C3*2");
        ws.style_mut(2, 3).fill = Some(0xE6F3FF);
        ws.set_column_width(1, 3.0);
        ws.gridlines = false;
        wb.create_sheet("Q1").set_value(1, 1, CellValue::Number(1.0));

        save_workbook(&wb, &path).unwrap();
        let back = read_workbook(&path).unwrap();
        assert_eq!(back.sheet_names(), vec!["raw data", "Q1"]);
        let ws = back.sheet("raw data").unwrap();
        assert_eq!(ws.value_at(2, 3), CellValue::text("record"));
        assert_eq!(ws.value_at(3, 3), CellValue::Number(17.0));
        assert_eq!(ws.cell(3, 4).and_then(|c| c.formula()), Some("=C3*2"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = read_workbook(&dir.path().join("nothing.xlsx"));
        assert!(matches!(res, Err(CutterError::OpeningWorkbook { .. })));
    }
}

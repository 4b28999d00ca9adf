// Question tabs Q1..QN: response table, cross cut block and other-specify list.

use crate::cutter::workbook::{Border, Style, Workbook, Worksheet};
use crate::cutter::*;

use question_map::templates::{
    cross_cut_count, filter_label_lookup, filter_question_lookup, filtered_list, frequency_count,
    percentage, CrossCutFilters, RawDataRange, DATA_MAP_SHEET, NO_FILTER_COLUMN,
};
use question_map::{
    cell_address, column_letters, extract_bracketed_text, extract_options,
    find_other_specify_child, last_row_with_text, lookup_question, render_across, render_down,
    DataMapColumns, FormulaError, QuestionRecord, QuestionType, ResponseOption,
    SENTINEL,
};

pub const NO_DATA_MAP: &str = "Data map not available";

const BLUE: u32 = 0x0000FF;
const PERCENT_FORMAT: &str = "0.0%";

/// First row of the response table.
const TABLE_ROW: u32 = 6;

const COL_B: u32 = 2;
const COL_C: u32 = 3;
const COL_D: u32 = 4;
const COL_E: u32 = 5;
const COL_G: u32 = 7;
const COL_I: u32 = 9;
const COL_N: u32 = 14;
const COL_Q: u32 = 17;

const WITH_OTHER_WIDTHS: [(&str, f64); 17] = [
    ("A", 3.0),
    ("B", 3.0),
    ("C", 20.0),
    ("D", 16.0),
    ("E", 16.0),
    ("F", 3.0),
    ("G", 16.0),
    ("H", 3.0),
    ("I", 16.0),
    ("J", 16.0),
    ("K", 16.0),
    ("L", 16.0),
    ("M", 16.0),
    ("N", 16.0),
    ("O", 3.0),
    ("P", 3.0),
    ("Q", 13.0),
];

const SINGLE_SELECT_WIDTHS: [(&str, f64); 14] = [
    ("A", 3.0),
    ("B", 3.0),
    ("C", 20.0),
    ("D", 13.0),
    ("E", 13.0),
    ("F", 3.0),
    ("G", 13.0),
    ("H", 3.0),
    ("I", 13.0),
    ("J", 13.0),
    ("K", 13.0),
    ("L", 13.0),
    ("M", 13.0),
    ("N", 13.0),
];

/// The two select layouts differ in their widths, their row 2 markers and the
/// other-specify column Q.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Layout {
    SingleSelect,
    WithOther,
}

impl Layout {
    fn widths(&self) -> &'static [(&'static str, f64)] {
        match self {
            Layout::SingleSelect => &SINGLE_SELECT_WIDTHS,
            Layout::WithOther => &WITH_OTHER_WIDTHS,
        }
    }

    /// Column of the second `x` marker of row 2.
    fn marker_col(&self) -> u32 {
        match self {
            Layout::SingleSelect => 15, // O
            Layout::WithOther => 16,    // P
        }
    }
}

fn blue() -> Style {
    Style {
        font_color: Some(BLUE),
        ..Style::default()
    }
}

fn bold() -> Style {
    Style {
        bold: true,
        ..Style::default()
    }
}

fn bottom_border(ws: &mut Worksheet, row: u32, col: u32) {
    ws.style_mut(row, col).border = Some(Border::ThinBottom);
}

fn rendering_error(ws: &Worksheet, row: u32, col: u32) -> impl FnOnce(FormulaError) -> CutterError {
    let sheet = ws.name.clone();
    let cell = cell_address(row, col);
    move |source| CutterError::RenderingFormula {
        source,
        sheet,
        cell,
    }
}

/// Title, question prefix, and the row 4 headers.
fn write_header(ws: &mut Worksheet, rec: &QuestionRecord, layout: Layout) {
    let n = rec.question_number;
    ws.gridlines = false;
    for (letters, width) in layout.widths() {
        if let Some(c) = question_map::column_index(letters) {
            ws.set_column_width(c, *width);
        }
    }
    ws.set_value(2, COL_B, "x");
    ws.set_value(2, layout.marker_col(), "x");

    match rec.text() {
        Some(t) => {
            ws.set_value(2, COL_C, t);
            info!("Q{}: question text {:?}", n, t);
        }
        None => {
            ws.set_value(2, COL_C, format!("Question {} text not found", n));
            warn!("Question text not found for question {}", n);
        }
    }
    *ws.style_mut(2, COL_C) = bold();
    match rec.prefix() {
        Some(p) => ws.set_value(4, COL_G, p),
        None => {
            ws.set_value(4, COL_G, format!("Column L text not found for question {}", n));
            warn!("Question prefix not found for question {}", n);
        }
    }

    let headers = [
        (COL_C, "Response Text"),
        (COL_D, "N"),
        (COL_E, "%"),
        (9, "Filter Column #1"),
        (10, "Filter #1"),
        (11, "Filter Column #2"),
        (12, "Filter #2"),
        (13, "Filter Column #3"),
        (14, "Filter #3"),
    ];
    for (col, h) in headers {
        ws.set_value(4, col, h);
        bottom_border(ws, 4, col);
    }
    bottom_border(ws, 4, COL_G);
    if layout == Layout::WithOther {
        bottom_border(ws, 4, COL_Q);
    }
}

/// Response options from row 6, with their count and percentage formulas and
/// the default filter pairs. The sentinel comes last.
fn write_response_table(
    ws: &mut Worksheet,
    options: &[ResponseOption],
    range: &RawDataRange,
) -> CutResult<()> {
    if options.is_empty() {
        return Ok(());
    }
    let rows: Vec<u32> = (0..options.len() as u32).map(|i| TABLE_ROW + i).collect();
    let sentinel_row = TABLE_ROW + options.len() as u32 - 1;
    for (row, opt) in rows.iter().zip(options.iter()) {
        if opt.code.has_text() {
            ws.set_value(*row, COL_G, opt.code.clone());
        }
        if opt.label.has_text() {
            ws.set_value(*row, COL_C, opt.label.clone());
        }
        debug!("write_response_table: row {}: {} - {}", row, opt.code, opt.label);
    }

    let counts = render_down(&frequency_count(range, TABLE_ROW), TABLE_ROW, &rows)
        .map_err(rendering_error(ws, TABLE_ROW, COL_D))?;
    for (row, f) in counts {
        ws.set_formula(row, COL_D, &f);
    }
    let shares = render_down(&percentage(TABLE_ROW, sentinel_row), TABLE_ROW, &rows)
        .map_err(rendering_error(ws, TABLE_ROW, COL_E))?;
    for (row, f) in shares {
        ws.set_formula(row, COL_E, &f);
        ws.style_mut(row, COL_E).num_format = Some(PERCENT_FORMAT.to_string());
    }
    for row in rows.iter() {
        for (i, col) in (COL_I..=COL_N).enumerate() {
            let v = if i % 2 == 0 { NO_FILTER_COLUMN } else { SENTINEL };
            ws.set_value(*row, col, v);
            *ws.style_mut(*row, col) = blue();
        }
    }
    info!(
        "Wrote {} response rows, percentages over $D${}",
        rows.len(),
        sentinel_row
    );
    Ok(())
}

/// The other-specify child in Q2, its identifier in Q4 and the inert filtered
/// list in Q6. Returns the identifier.
fn write_other_specify(
    ws: &mut Worksheet,
    data_map: &Worksheet,
    cols: &DataMapColumns,
    question_number: u32,
    range: &RawDataRange,
) -> Option<String> {
    let child = match find_other_specify_child(data_map, cols, question_number) {
        Some(c) if !c.question_info_text.is_empty() => c,
        _ => {
            warn!(
                "No Other Specify Child text found for question {}",
                question_number
            );
            return None;
        }
    };
    ws.set_value(2, COL_Q, child.question_info_text.as_str());
    *ws.style_mut(2, COL_Q) = bold();
    match extract_bracketed_text(&child.question_info_text) {
        Some(id) => {
            ws.set_value(4, COL_Q, id.as_str());
            ws.set_value(TABLE_ROW, COL_Q, filtered_list(range));
            info!("Q{}: other specify column {}", question_number, id);
            Some(id)
        }
        None => {
            warn!(
                "No bracketed text found in {:?}",
                child.question_info_text
            );
            None
        }
    }
}

/// Copies column D of `rows` into E..N, moving the relative column references
/// of formulas. Values and font colours are copied as they are.
fn drag_across(ws: &mut Worksheet, rows: std::ops::RangeInclusive<u32>) -> CutResult<()> {
    let targets: Vec<u32> = ((COL_D + 1)..=COL_N).collect();
    for row in rows {
        let source = match ws.cell(row, COL_D) {
            Some(c) => c.clone(),
            None => continue,
        };
        let font = Style {
            bold: source.style.bold,
            font_color: source.style.font_color,
            ..Style::default()
        };
        match source.formula() {
            Some(text) => {
                let rendered = render_across(text, COL_D, &targets)
                    .map_err(rendering_error(ws, row, COL_D))?;
                for (col, f) in rendered {
                    ws.set_formula(row, col, &f);
                    *ws.style_mut(row, col) = font.clone();
                }
            }
            None => {
                let v = source.value();
                if v.is_empty() {
                    continue;
                }
                for col in targets.iter() {
                    ws.set_value(row, *col, v.clone());
                    *ws.style_mut(row, *col) = font.clone();
                }
            }
        }
    }
    Ok(())
}

/// The Cross Cut block two rows below the response table: two filter pairs,
/// their readable labels, and one two-filter count per option, for D..N.
fn write_cross_cut(ws: &mut Worksheet, option_count: u32, range: &RawDataRange) -> CutResult<u32> {
    let last_text = last_row_with_text(&*ws, COL_C, TABLE_ROW).unwrap_or(TABLE_ROW);
    let cc = last_text + 2;
    ws.set_value(cc, COL_B, "x");
    ws.set_value(cc, COL_C, "Cross Cut");
    for col in COL_C..=COL_N {
        bottom_border(ws, cc, col);
    }

    let labels = [
        "Filter Q #1",
        "Filter Column #1",
        "Filter #1",
        "Filter Q #2",
        "Filter Column #2",
        "Filter #2",
    ];
    for (i, l) in labels.iter().enumerate() {
        ws.set_value(cc + 2 + i as u32, COL_C, *l);
    }
    let filters = CrossCutFilters {
        column_1: cc + 3,
        value_1: cc + 4,
        column_2: cc + 6,
        value_2: cc + 7,
    };
    for (row, v) in [
        (filters.column_1, NO_FILTER_COLUMN),
        (filters.value_1, SENTINEL),
        (filters.column_2, NO_FILTER_COLUMN),
        (filters.value_2, SENTINEL),
    ] {
        ws.set_value(row, COL_D, v);
        *ws.style_mut(row, COL_D) = blue();
    }
    ws.set_formula(cc + 2, COL_D, &filter_question_lookup(filters.column_1));
    ws.set_formula(cc + 5, COL_D, &filter_question_lookup(filters.column_2));

    ws.set_value(cc + 9, COL_C, "HumRead Filter #1");
    ws.set_value(cc + 10, COL_C, "HumRead Filter #2");
    ws.set_formula(
        cc + 9,
        COL_D,
        &filter_label_lookup(filters.column_1, filters.value_1),
    );
    ws.set_formula(
        cc + 10,
        COL_D,
        &filter_label_lookup(filters.column_2, filters.value_2),
    );

    let data_row = cc + 12;
    if option_count == 0 {
        info!("Cross Cut at row {} without response rows", cc);
        return Ok(cc);
    }
    let rows: Vec<u32> = (0..option_count).map(|i| data_row + i).collect();
    let labels = render_down(&format!("=C{}", TABLE_ROW), data_row, &rows)
        .map_err(rendering_error(ws, data_row, COL_C))?;
    for (row, f) in labels {
        ws.set_formula(row, COL_C, &f);
    }
    let counts = render_down(&cross_cut_count(range, TABLE_ROW, &filters), data_row, &rows)
        .map_err(rendering_error(ws, data_row, COL_D))?;
    for (row, f) in counts {
        ws.set_formula(row, COL_D, &f);
    }

    let last = data_row + option_count - 1;
    drag_across(ws, (cc + 2)..=last)?;
    info!(
        "Cross Cut at row {}: data rows {}..={} over D:{}",
        cc,
        data_row,
        last,
        column_letters(COL_N)
    );
    Ok(cc)
}

fn center_columns(ws: &mut Worksheet) {
    for col in COL_D..=COL_N {
        ws.column_style_mut(col).centered = true;
    }
}

/// Populates the tab of a select question. Returns the number of response
/// options and the other-specify identifier.
fn build_select_tab(
    ws: &mut Worksheet,
    data_map: &Worksheet,
    cols: &DataMapColumns,
    rec: &QuestionRecord,
    range: &RawDataRange,
    layout: Layout,
) -> CutResult<(usize, Option<String>)> {
    let n = rec.question_number;
    info!("Setting up {:?} tab for question {}", layout, n);
    write_header(ws, rec, layout);

    let options = extract_options(data_map, cols, n);
    write_response_table(ws, &options, range)?;

    let other_id = if layout == Layout::WithOther {
        write_other_specify(ws, data_map, cols, n, range)
    } else {
        None
    };

    center_columns(ws);
    write_cross_cut(ws, options.len() as u32, range)?;

    if layout == Layout::WithOther {
        for col in COL_D..=COL_N {
            ws.set_column_width(col, 16.0);
        }
    }
    let real_options = options.iter().filter(|o| !o.is_sentinel()).count();
    info!("Question {} tab done with {} options", n, real_options);
    Ok((real_options, other_id))
}

/// Builds one tab and reports what it holds.
fn build_tab(
    ws: &mut Worksheet,
    data_map: Option<&Worksheet>,
    cols: &DataMapColumns,
    range: &RawDataRange,
    question_number: u32,
) -> CutResult<TabSummary> {
    let mut summary = TabSummary {
        question: question_number,
        tab: ws.name.clone(),
        signature: None,
        question_type: None,
        options: 0,
        other_specify_id: None,
    };
    ws.set_value(1, 1, question_number);
    let data_map = match data_map {
        Some(dm) => dm,
        None => {
            ws.set_value(2, 1, NO_DATA_MAP);
            warn!("{}: data map not available", ws.name);
            return Ok(summary);
        }
    };
    // A question row with a blank signature counts as not found.
    let found = lookup_question(data_map, cols, question_number)
        .and_then(|r| r.signature().map(|s| s.to_string()).map(|s| (s, r)));
    let (signature, rec) = match found {
        Some(f) => f,
        None => {
            ws.set_value(2, 1, format!("No data found for question {}", question_number));
            warn!("No data found for question {}", question_number);
            return Ok(summary);
        }
    };
    ws.set_value(2, 1, signature.as_str());
    let qt = rec.question_type();
    info!("{}: signature {:?} -> {:?}", ws.name, signature, qt);
    summary.signature = Some(signature);
    summary.question_type = Some(qt.name().to_string());

    let built = match qt {
        QuestionType::SingleSelectWithOther => Some(build_select_tab(
            ws,
            data_map,
            cols,
            &rec,
            range,
            Layout::WithOther,
        )?),
        QuestionType::SingleSelect => Some(build_select_tab(
            ws,
            data_map,
            cols,
            &rec,
            range,
            Layout::SingleSelect,
        )?),
        _ => {
            debug!("{}: no layout for {:?}", ws.name, qt);
            None
        }
    };
    if let Some((options, other_id)) = built {
        summary.options = options;
        summary.other_specify_id = other_id;
    }
    Ok(summary)
}

/// Replaces the tabs Q1..Q`count` and fills the ones of the select questions.
/// The first failing tab aborts the run.
pub fn build_question_tabs(
    wb: &mut Workbook,
    cols: &DataMapColumns,
    range: &RawDataRange,
    count: u32,
) -> CutResult<Vec<TabSummary>> {
    let mut res: Vec<TabSummary> = Vec::new();
    for n in 1..=count {
        let tab = format!("Q{}", n);
        if wb.remove_sheet(&tab) {
            info!("Removed existing tab {}", tab);
        }
        let mut ws = Worksheet::new(&tab);
        let built = build_tab(&mut ws, wb.sheet(DATA_MAP_SHEET), cols, range, n);
        let summary = match built {
            Ok(s) => s,
            Err(e) => {
                error!("Error building tab {}: {}", tab, e);
                return Err(e).context(BuildingTabSnafu { tab });
            }
        };
        wb.add_sheet(ws);
        res.push(summary);
    }
    info!("Built {} question tabs", res.len());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use question_map::{CellSource, CellValue};

    const WITH_OTHER: &str = "0, 0, 0, Simple Select, , 0, 0, 0, 0, Other Specify Parent";
    const SELECT: &str = "0, 0, 0, Simple Select, , 0, 0, 0, 0, 0";
    const CHILD: &str = "0, Open Text, 0, 0, , 0, 0, 0, 0, Other Specify Child";

    /// A recalculated data map: question 1 is a select with an other-specify
    /// child, question 2 a plain select, question 3 open text.
    fn data_map() -> Worksheet {
        let mut ws = Worksheet::new(DATA_MAP_SHEET);
        let mut row = |r: u32, c: &str, d: Option<f64>, e: &str, g: &str, h: &str, l: &str, n: &str, p: &str| {
            if !c.is_empty() {
                ws.set_value(r, 3, c);
            }
            if let Some(v) = d {
                ws.set_value(r, 4, v);
            }
            if !e.is_empty() {
                ws.set_value(r, 5, e);
            }
            ws.set_value(r, 7, g);
            ws.set_value(r, 8, h);
            ws.set_value(r, 12, l);
            ws.set_value(r, 14, n);
            ws.set_value(r, 16, p);
        };
        row(4, "[S1]: Region?", None, "", "1", WITH_OTHER, "S1", "1", "Question Text 1");
        row(5, "Values: 1-3", None, "", "1", WITH_OTHER, "S1", "1", "Response Type 1");
        row(6, "", Some(1.0), "North", "1", WITH_OTHER, "S1", "1", "Select Option 1");
        row(7, "", Some(2.0), "South", "1", WITH_OTHER, "S1", "1", "Select Option 1");
        row(8, "", Some(3.0), "Other", "1", WITH_OTHER, "S1", "1", "Select Option 1");
        row(10, "[S1r3oe]: Region? - Other", None, "", "1", CHILD, "S1", "2", "Question Text 2");
        row(11, "Open text response", None, "", "1", CHILD, "S1", "2", "Response Type 2");
        row(13, "[S2]: Age?", None, "", "2", SELECT, "S2", "3", "Question Text 3");
        row(14, "Values: 1-2", None, "", "2", SELECT, "S2", "3", "Response Type 3");
        row(15, "", Some(1.0), "Young", "2", SELECT, "S2", "3", "Select Option 3");
        row(16, "", Some(2.0), "Old", "2", SELECT, "S2", "3", "Select Option 3");
        row(
            18,
            "[S3]: Comments",
            None,
            "",
            "3",
            "0, Open Text, 0, 0, , 0, 0, 0, 0, 0",
            "S3",
            "4",
            "Question Text 4",
        );
        ws
    }

    fn workbook() -> Workbook {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut wb = Workbook::new();
        wb.add_sheet(data_map());
        wb
    }

    fn formula(ws: &Worksheet, row: u32, col: u32) -> Option<String> {
        ws.cell(row, col)
            .and_then(|c| c.formula())
            .map(|f| f.to_string())
    }

    #[test]
    fn with_other_tab() {
        let mut wb = workbook();
        let summary = build_question_tabs(
            &mut wb,
            &DataMapColumns::default(),
            &RawDataRange::default(),
            1,
        )
        .unwrap();
        assert_eq!(summary[0].question_type.as_deref(), Some("singleSelectWithOther"));
        assert_eq!(summary[0].options, 3);
        assert_eq!(summary[0].other_specify_id.as_deref(), Some("S1r3oe"));

        let ws = wb.sheet("Q1").unwrap();
        assert_eq!(ws.value_at(1, 1), CellValue::Number(1.0));
        assert_eq!(ws.value_at(2, 1), CellValue::text(WITH_OTHER));
        assert_eq!(ws.value_at(2, 2), CellValue::text("x"));
        assert_eq!(ws.value_at(2, 16), CellValue::text("x"));
        assert_eq!(ws.value_at(2, 3), CellValue::text("[S1]: Region?"));
        assert!(ws.cell(2, 3).map(|c| c.style.bold).unwrap_or(false));
        assert_eq!(ws.value_at(4, 7), CellValue::text("S1"));

        // Options on rows 6..8, sentinel on row 9.
        assert_eq!(ws.value_at(6, 3), CellValue::text("North"));
        assert_eq!(ws.value_at(8, 7), CellValue::Number(3.0));
        assert_eq!(ws.value_at(9, 3), CellValue::text("<>"));
        assert_eq!(ws.value_at(9, 7), CellValue::text("<>"));
        assert_eq!(formula(ws, 7, 5).as_deref(), Some("=D7/$D$9"));
        assert_eq!(formula(ws, 9, 5).as_deref(), Some("=D9/$D$9"));
        assert!(formula(ws, 8, 4)
            .map(|f| f.contains("$G8, OFFSET") && f.ends_with("$N8)"))
            .unwrap_or(false));
        assert_eq!(ws.value_at(9, 13), CellValue::text("record"));
        assert_eq!(ws.value_at(9, 14), CellValue::text("<>"));
        assert_eq!(ws.cell(9, 14).and_then(|c| c.style.font_color), Some(BLUE));

        assert_eq!(ws.value_at(2, 17), CellValue::text("[S1r3oe]: Region? - Other"));
        assert_eq!(ws.value_at(4, 17), CellValue::text("S1r3oe"));
        assert!(ws.value_at(6, 17).to_string().starts_with("'=FILTER("));

        // Cross Cut two rows below the sentinel.
        assert_eq!(ws.value_at(11, 3), CellValue::text("Cross Cut"));
        assert_eq!(ws.value_at(11, 2), CellValue::text("x"));
        assert_eq!(ws.value_at(14, 4), CellValue::text("record"));
        assert_eq!(ws.value_at(14, 9), CellValue::text("record"));
        assert_eq!(ws.value_at(15, 14), CellValue::text("<>"));
        assert_eq!(
            formula(ws, 13, 5).as_deref(),
            Some("=IF(E$14=\"record\", \"No filter\", OFFSET('data map'!$C$2, MATCH(E$14, 'data map'!$L$2:$L$3200, 0)-1, 0))")
        );
        assert_eq!(formula(ws, 20, 6), Some(filter_label_lookup(14, 15).replace("D$", "F$")));
        // One data row per option including the sentinel, from row 23.
        assert_eq!(formula(ws, 23, 3).as_deref(), Some("=C6"));
        assert_eq!(formula(ws, 26, 3).as_deref(), Some("=C9"));
        assert!(formula(ws, 27, 3).is_none());
        let d26 = formula(ws, 26, 4).unwrap();
        assert!(d26.contains("$G9, OFFSET"));
        assert!(d26.ends_with("D$18)"));
        let n26 = formula(ws, 26, 14).unwrap();
        assert!(n26.contains("$G9, OFFSET"));
        assert!(n26.contains("MATCH(N$14,"));
        assert!(n26.ends_with("N$18)"));

        assert_eq!(ws.column_width(4), Some(16.0));
        assert_eq!(ws.column_width(17), Some(13.0));
        assert!(ws.column_style(10).map(|s| s.centered).unwrap_or(false));
    }

    #[test]
    fn plain_select_tab() {
        let mut wb = workbook();
        let summary = build_question_tabs(
            &mut wb,
            &DataMapColumns::default(),
            &RawDataRange::default(),
            2,
        )
        .unwrap();
        assert_eq!(summary[1].question_type.as_deref(), Some("singleSelect"));
        assert_eq!(summary[1].options, 2);
        assert_eq!(summary[1].other_specify_id, None);
        let ws = wb.sheet("Q2").unwrap();
        assert_eq!(ws.value_at(2, 15), CellValue::text("x"));
        assert!(ws.value_at(2, 16).is_empty());
        assert!(ws.value_at(2, 17).is_empty());
        assert_eq!(ws.value_at(7, 3), CellValue::text("Old"));
        assert_eq!(ws.value_at(8, 3), CellValue::text("<>"));
        assert_eq!(formula(ws, 6, 5).as_deref(), Some("=D6/$D$8"));
        assert_eq!(ws.value_at(10, 3), CellValue::text("Cross Cut"));
        assert_eq!(formula(ws, 22, 3).as_deref(), Some("=C6"));
        assert_eq!(formula(ws, 24, 3).as_deref(), Some("=C8"));
        assert_eq!(ws.column_width(4), Some(13.0));
    }

    #[test]
    fn other_questions_get_the_signature_only() {
        let mut wb = workbook();
        let summary = build_question_tabs(
            &mut wb,
            &DataMapColumns::default(),
            &RawDataRange::default(),
            4,
        )
        .unwrap();
        let q3 = wb.sheet("Q3").unwrap();
        assert_eq!(
            q3.value_at(2, 1),
            CellValue::text("0, Open Text, 0, 0, , 0, 0, 0, 0, 0")
        );
        assert!(q3.value_at(2, 3).is_empty());
        assert_eq!(summary[2].question_type.as_deref(), Some("openText"));
        let q4 = wb.sheet("Q4").unwrap();
        assert_eq!(q4.value_at(2, 1), CellValue::text("No data found for question 4"));
        assert_eq!(summary[3].signature, None);
    }

    #[test]
    fn blank_signature_is_no_data() {
        let mut wb = Workbook::new();
        let mut dm = Worksheet::new(DATA_MAP_SHEET);
        dm.set_value(4, 3, "[S1]: Region?");
        dm.set_value(4, 7, "1");
        wb.add_sheet(dm);
        let summary = build_question_tabs(
            &mut wb,
            &DataMapColumns::default(),
            &RawDataRange::default(),
            1,
        )
        .unwrap();
        let ws = wb.sheet("Q1").unwrap();
        assert_eq!(ws.value_at(2, 1), CellValue::text("No data found for question 1"));
        assert!(ws.value_at(2, 3).is_empty());
        assert_eq!(summary[0].signature, None);
        assert_eq!(summary[0].question_type, None);
    }

    #[test]
    fn tabs_are_replaced_and_work_without_data_map() {
        let mut wb = Workbook::new();
        wb.create_sheet("Q1").set_value(5, 5, "stale");
        let summary = build_question_tabs(
            &mut wb,
            &DataMapColumns::default(),
            &RawDataRange::default(),
            2,
        )
        .unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(wb.sheet_names(), vec!["Q1", "Q2"]);
        let q1 = wb.sheet("Q1").unwrap();
        assert!(q1.value_at(5, 5).is_empty());
        assert_eq!(q1.value_at(2, 1), CellValue::text(NO_DATA_MAP));
    }

    #[test]
    fn select_without_options_still_gets_a_cross_cut() {
        let mut wb = Workbook::new();
        let mut dm = Worksheet::new(DATA_MAP_SHEET);
        dm.set_value(4, 3, "[S9]: Nothing listed");
        dm.set_value(4, 7, "1");
        dm.set_value(4, 8, SELECT);
        dm.set_value(4, 14, "1");
        wb.add_sheet(dm);
        let summary = build_question_tabs(
            &mut wb,
            &DataMapColumns::default(),
            &RawDataRange::default(),
            1,
        )
        .unwrap();
        assert_eq!(summary[0].options, 0);
        let ws = wb.sheet("Q1").unwrap();
        assert_eq!(ws.value_at(4, 7), CellValue::text("Column L text not found for question 1"));
        assert_eq!(ws.value_at(8, 3), CellValue::text("Cross Cut"));
        assert!(formula(ws, 20, 3).is_none());
        assert!(formula(ws, 17, 4).is_some());
    }
}

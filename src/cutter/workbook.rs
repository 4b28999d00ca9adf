use log::debug;
use question_map::{CellSource, CellValue};
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Border {
    /// Thin line on the four sides.
    Thin,
    ThinBottom,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum VAlign {
    Top,
    Center,
}

/// The subset of cell formatting the builder uses.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Style {
    pub bold: bool,
    /// RGB, e.g. 0x0000FF.
    pub font_color: Option<u32>,
    pub fill: Option<u32>,
    pub border: Option<Border>,
    pub centered: bool,
    pub v_align: Option<VAlign>,
    pub wrap: bool,
    pub num_format: Option<String>,
}

impl Style {
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }

    /// This style with the unset parts taken from `base`.
    pub fn over(&self, base: &Style) -> Style {
        Style {
            bold: self.bold || base.bold,
            font_color: self.font_color.or(base.font_color),
            fill: self.fill.or(base.fill),
            border: self.border.or(base.border),
            centered: self.centered || base.centered,
            v_align: self.v_align.or(base.v_align),
            wrap: self.wrap || base.wrap,
            num_format: self.num_format.clone().or_else(|| base.num_format.clone()),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum CellContent {
    Value(CellValue),
    /// `text` includes the leading '='. `cached` is the last computed value,
    /// known only after a recalculation.
    Formula {
        text: String,
        cached: Option<CellValue>,
    },
}

#[derive(PartialEq, Debug, Clone)]
pub struct Cell {
    pub content: CellContent,
    pub style: Style,
}

impl Cell {
    fn blank() -> Cell {
        Cell {
            content: CellContent::Value(CellValue::Empty),
            style: Style::default(),
        }
    }

    /// The value as read by lookups: the cached result of a formula, or its
    /// text when it was never computed.
    pub fn value(&self) -> CellValue {
        match &self.content {
            CellContent::Value(v) => v.clone(),
            CellContent::Formula {
                cached: Some(v), ..
            } => v.clone(),
            CellContent::Formula { text, cached: None } => CellValue::Text(text.clone()),
        }
    }

    pub fn formula(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// One sheet of the in-memory workbook. Rows and columns are 1-based.
#[derive(PartialEq, Debug, Clone)]
pub struct Worksheet {
    pub name: String,
    pub gridlines: bool,
    cells: BTreeMap<(u32, u32), Cell>,
    col_widths: BTreeMap<u32, f64>,
    row_heights: BTreeMap<u32, f64>,
    col_styles: BTreeMap<u32, Style>,
}

fn shifted<V: Clone>(map: &BTreeMap<u32, V>, at: u32, n: u32) -> BTreeMap<u32, V> {
    map.iter()
        .map(|(k, v)| (if *k >= at { k + n } else { *k }, v.clone()))
        .collect()
}

impl Worksheet {
    pub fn new(name: &str) -> Worksheet {
        Worksheet {
            name: name.to_string(),
            gridlines: true,
            cells: BTreeMap::new(),
            col_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            col_styles: BTreeMap::new(),
        }
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    fn cell_mut(&mut self, row: u32, col: u32) -> &mut Cell {
        self.cells.entry((row, col)).or_insert_with(Cell::blank)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u32), &Cell)> {
        self.cells.iter()
    }

    /// Writes a value, keeping the style of the cell.
    pub fn set_value<V: Into<CellValue>>(&mut self, row: u32, col: u32, v: V) {
        self.cell_mut(row, col).content = CellContent::Value(v.into());
    }

    pub fn set_formula(&mut self, row: u32, col: u32, text: &str) {
        self.cell_mut(row, col).content = CellContent::Formula {
            text: text.to_string(),
            cached: None,
        };
    }

    /// Writes text starting with '=' as a formula and anything else as a
    /// value.
    pub fn set_text(&mut self, row: u32, col: u32, text: &str) {
        if text.starts_with('=') {
            self.set_formula(row, col, text);
        } else {
            self.set_value(row, col, text);
        }
    }

    pub fn set_content(&mut self, row: u32, col: u32, content: CellContent) {
        self.cell_mut(row, col).content = content;
    }

    pub fn style_mut(&mut self, row: u32, col: u32) -> &mut Style {
        &mut self.cell_mut(row, col).style
    }

    pub fn set_cached(&mut self, row: u32, col: u32, v: CellValue) {
        if let Some(Cell {
            content: CellContent::Formula { cached, .. },
            ..
        }) = self.cells.get_mut(&(row, col))
        {
            *cached = Some(v);
        }
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.col_widths.insert(col, width);
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.col_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (&u32, &f64)> {
        self.col_widths.iter()
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn row_heights(&self) -> impl Iterator<Item = (&u32, &f64)> {
        self.row_heights.iter()
    }

    /// Default style of a whole column, under the styles of its cells.
    pub fn column_style_mut(&mut self, col: u32) -> &mut Style {
        self.col_styles.entry(col).or_default()
    }

    pub fn column_style(&self, col: u32) -> Option<&Style> {
        self.col_styles.get(&col)
    }

    pub fn column_styles(&self) -> impl Iterator<Item = (&u32, &Style)> {
        self.col_styles.iter()
    }

    pub fn max_col(&self) -> u32 {
        self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// Moves every row at or below `at` down by `n`. Formula texts are not
    /// rewritten.
    pub fn insert_rows(&mut self, at: u32, n: u32) {
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .map(|((r, c), cell)| (if r >= at { (r + n, c) } else { (r, c) }, cell))
            .collect();
        self.row_heights = shifted(&self.row_heights, at, n);
        debug!("{}: inserted {} rows at {}", self.name, n, at);
    }

    /// Moves every column at or right of `at` by `n`. Formula texts are not
    /// rewritten.
    pub fn insert_cols(&mut self, at: u32, n: u32) {
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .map(|((r, c), cell)| (if c >= at { (r, c + n) } else { (r, c) }, cell))
            .collect();
        self.col_widths = shifted(&self.col_widths, at, n);
        self.col_styles = shifted(&self.col_styles, at, n);
        debug!("{}: inserted {} columns at {}", self.name, n, at);
    }
}

impl CellSource for Worksheet {
    fn value_at(&self, row: u32, col: u32) -> CellValue {
        self.cell(row, col)
            .map(|c| c.value())
            .unwrap_or(CellValue::Empty)
    }

    fn max_row(&self) -> u32 {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }
}

/// An ordered collection of named sheets.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Workbook {
        Workbook { sheets: Vec::new() }
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn add_sheet(&mut self, sheet: Worksheet) {
        self.sheets.push(sheet);
    }

    /// Appends an empty sheet, or returns the existing one.
    pub fn create_sheet(&mut self, name: &str) -> &mut Worksheet {
        let idx = match self.sheets.iter().position(|s| s.name == name) {
            Some(i) => i,
            None => {
                self.sheets.push(Worksheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }

    pub fn remove_sheet(&mut self, name: &str) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|s| s.name != name);
        before != self.sheets.len()
    }

    pub fn rename_sheet(&mut self, from: &str, to: &str) -> bool {
        match self.sheet_mut(from) {
            Some(s) => {
                s.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Copies the computed values of `other` into the formula cells of the
    /// same-named sheets, keeping formulas and styles. Returns the number of
    /// cells updated.
    pub fn merge_cached(&mut self, other: &Workbook) -> usize {
        let mut count = 0;
        for sheet in self.sheets.iter_mut() {
            let src = match other.sheet(&sheet.name) {
                Some(s) => s,
                None => continue,
            };
            let formula_cells: Vec<(u32, u32)> = sheet
                .cells()
                .filter(|(_, c)| c.formula().is_some())
                .map(|(k, _)| *k)
                .collect();
            for (row, col) in formula_cells {
                sheet.set_cached(row, col, src.value_at(row, col));
                count += 1;
            }
        }
        count
    }
}

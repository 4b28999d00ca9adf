// ********* Cell values and addressing ***********

use std::fmt::Display;

/// The value held by a cell, as seen by the lookups.
///
/// Formula cells are exposed through their cached value when the workbook
/// was recalculated, otherwise through the text of the formula itself.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True when the cell holds something other than whitespace.
    pub fn has_text(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    /// The trimmed display form of the value, used for all marker comparisons.
    pub fn trimmed(&self) -> String {
        self.to_string().trim().to_string()
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            // Whole numbers print without a fractional part so that a numeric
            // marker 1.0 compares equal to the question number "1".
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

/// Read access to one sheet. Rows and columns are 1-based, as in spreadsheet
/// addresses.
pub trait CellSource {
    fn value_at(&self, row: u32, col: u32) -> CellValue;

    /// The last row holding any cell, 0 for an empty sheet.
    fn max_row(&self) -> u32;
}

/// Converts a 1-based column index to its letters (1 = A, 27 = AA).
pub fn column_letters(index: u32) -> String {
    let mut letters: Vec<char> = Vec::new();
    let mut n = index;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Converts column letters to a 1-based index. Lowercase is accepted.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let v = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index.checked_mul(26)?.checked_add(v)?;
    }
    Some(index)
}

/// An A1-style address such as "D16".
pub fn cell_address(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_indices() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(33), "AG");
        assert_eq!(column_index("AJC"), Some(946));
        assert_eq!(column_letters(946), "AJC");
        assert_eq!(column_index("d"), Some(4));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn display_of_numbers() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(0.5).to_string(), "0.5");
        assert_eq!(CellValue::text("  Yes ").trimmed(), "Yes");
        assert!(!CellValue::text("   ").has_text());
        assert!(CellValue::Number(0.0).has_text());
        assert_eq!(cell_address(16, 4), "D16");
    }
}

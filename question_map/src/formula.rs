use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use crate::cell::{column_index, column_letters};

/// The largest column a worksheet can address (XFD).
pub const MAX_COLUMN: u32 = 16_384;
/// The largest row a worksheet can address.
pub const MAX_ROW: u32 = 1_048_576;

/// Errors raised while rewriting a formula.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FormulaError {
    /// Shifting a relative reference moved it off the grid.
    ReferenceOutOfRange { reference: String, offset: i64 },
}

impl Error for FormulaError {}

impl Display for FormulaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormulaError::ReferenceOutOfRange { reference, offset } => write!(
                f,
                "shifting reference {} by {} leaves the worksheet",
                reference, offset
            ),
        }
    }
}

/// A single-cell reference such as `$C$3`, `D$16` or `N4`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CellRef {
    pub col_abs: bool,
    pub col: u32,
    pub row_abs: bool,
    pub row: u32,
}

impl CellRef {
    /// Parses a whole token. Columns are one to three uppercase letters.
    pub fn parse(token: &str) -> Option<CellRef> {
        let mut rest = token;
        let col_abs = rest.starts_with('$');
        if col_abs {
            rest = &rest[1..];
        }
        let letters_len = rest.chars().take_while(|c| c.is_ascii_uppercase()).count();
        if letters_len == 0 || letters_len > 3 {
            return None;
        }
        let (letters, mut rest) = rest.split_at(letters_len);
        let row_abs = rest.starts_with('$');
        if row_abs {
            rest = &rest[1..];
        }
        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let col = column_index(letters)?;
        let row = rest.parse::<u32>().ok()?;
        if col > MAX_COLUMN || row == 0 || row > MAX_ROW {
            return None;
        }
        Some(CellRef {
            col_abs,
            col,
            row_abs,
            row,
        })
    }

    fn shift_rows(&self, offset: i64) -> Result<CellRef, FormulaError> {
        if self.row_abs {
            return Ok(*self);
        }
        let row = self.row as i64 + offset;
        if row < 1 || row > MAX_ROW as i64 {
            return Err(FormulaError::ReferenceOutOfRange {
                reference: self.to_string(),
                offset,
            });
        }
        Ok(CellRef {
            row: row as u32,
            ..*self
        })
    }

    fn shift_cols(&self, offset: i64) -> Result<CellRef, FormulaError> {
        if self.col_abs {
            return Ok(*self);
        }
        let col = self.col as i64 + offset;
        if col < 1 || col > MAX_COLUMN as i64 {
            return Err(FormulaError::ReferenceOutOfRange {
                reference: self.to_string(),
                offset,
            });
        }
        Ok(CellRef {
            col: col as u32,
            ..*self
        })
    }
}

impl Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.col_abs { "$" } else { "" },
            column_letters(self.col),
            if self.row_abs { "$" } else { "" },
            self.row
        )
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum Token {
    /// Operators, function names, numbers, sheet prefixes: never rewritten.
    Text(String),
    /// A double-quoted string literal, quotes included.
    Literal(String),
    Ref(CellRef),
}

/// A formula split into the pieces a copy can move.
///
/// String literals and function names are kept as opaque text, so a literal
/// such as `"[s24627]"` or a name such as `LOG10` is never mistaken for a
/// reference. Sheet prefixes are opaque too; the reference that follows a
/// prefix obeys the same `$` rules as any other.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Formula {
    tokens: Vec<Token>,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'
}

impl Formula {
    pub fn parse(text: &str) -> Formula {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens: Vec<Token> = Vec::new();
        let mut pending = String::new();
        let mut i = 0;
        let flush = |pending: &mut String, tokens: &mut Vec<Token>| {
            if !pending.is_empty() {
                tokens.push(Token::Text(std::mem::take(pending)));
            }
        };
        while i < chars.len() {
            let c = chars[i];
            if c == '"' || c == '\'' {
                // Both quote styles double the quote character to escape it.
                let end = quoted_end(&chars, i);
                let quoted: String = chars[i..end].iter().collect();
                if c == '"' {
                    flush(&mut pending, &mut tokens);
                    tokens.push(Token::Literal(quoted));
                } else {
                    pending.push_str(&quoted);
                }
                i = end;
            } else if is_word_char(c) {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let next = chars.get(i).copied();
                let cell_ref = match next {
                    Some('(') | Some('!') => None,
                    _ => CellRef::parse(&word),
                };
                match cell_ref {
                    Some(r) => {
                        flush(&mut pending, &mut tokens);
                        tokens.push(Token::Ref(r));
                    }
                    None => pending.push_str(&word),
                }
            } else {
                pending.push(c);
                i += 1;
            }
        }
        flush(&mut pending, &mut tokens);
        Formula { tokens }
    }

    /// The references in order of appearance.
    pub fn refs(&self) -> Vec<CellRef> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Ref(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// The formula as copied `offset` rows down: rows without a `$` move.
    pub fn shift_rows(&self, offset: i64) -> Result<Formula, FormulaError> {
        self.map_refs(|r| r.shift_rows(offset))
    }

    /// The formula as copied `offset` columns right: columns without a `$` move.
    pub fn shift_cols(&self, offset: i64) -> Result<Formula, FormulaError> {
        self.map_refs(|r| r.shift_cols(offset))
    }

    fn map_refs<F>(&self, f: F) -> Result<Formula, FormulaError>
    where
        F: Fn(&CellRef) -> Result<CellRef, FormulaError>,
    {
        let mut tokens: Vec<Token> = Vec::with_capacity(self.tokens.len());
        for t in self.tokens.iter() {
            tokens.push(match t {
                Token::Ref(r) => Token::Ref(f(r)?),
                x => x.clone(),
            });
        }
        Ok(Formula { tokens })
    }
}

// Returns the index just past the closing quote (or the end of input).
fn quoted_end(chars: &[char], start: usize) -> usize {
    let q = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == q {
            if chars.get(i + 1) == Some(&q) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for t in self.tokens.iter() {
            match t {
                Token::Text(s) | Token::Literal(s) => write!(f, "{}", s)?,
                Token::Ref(r) => write!(f, "{}", r)?,
            }
        }
        Ok(())
    }
}

/// Renders a template written for `base_row` into each of the target rows.
pub fn render_down(
    template: &str,
    base_row: u32,
    target_rows: &[u32],
) -> Result<BTreeMap<u32, String>, FormulaError> {
    let formula = Formula::parse(template);
    let mut res: BTreeMap<u32, String> = BTreeMap::new();
    for row in target_rows.iter() {
        let offset = *row as i64 - base_row as i64;
        res.insert(*row, formula.shift_rows(offset)?.to_string());
    }
    debug!(
        "render_down: {} rows from base row {}",
        target_rows.len(),
        base_row
    );
    Ok(res)
}

/// Renders a template written for `base_col` into each of the target columns.
pub fn render_across(
    template: &str,
    base_col: u32,
    target_cols: &[u32],
) -> Result<BTreeMap<u32, String>, FormulaError> {
    let formula = Formula::parse(template);
    let mut res: BTreeMap<u32, String> = BTreeMap::new();
    for col in target_cols.iter() {
        let offset = *col as i64 - base_col as i64;
        res.insert(*col, formula.shift_cols(offset)?.to_string());
    }
    debug!(
        "render_across: {} columns from base column {}",
        target_cols.len(),
        base_col
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(template: &str, base: u32, target: u32) -> String {
        render_down(template, base, &[target]).unwrap()[&target].clone()
    }

    fn across(template: &str, base: u32, target: u32) -> String {
        render_across(template, base, &[target]).unwrap()[&target].clone()
    }

    #[test]
    fn vertical_moves_relative_rows_only() {
        assert_eq!(down("=A1+$B$2", 1, 5), "=A5+$B$2");
        assert_eq!(down("=$G6&D$16", 6, 9), "=$G9&D$16");
        assert_eq!(down("=COUNTIFS($M$4:M4, \"Start\")", 4, 7), "=COUNTIFS($M$4:M7, \"Start\")");
        // A vertical copy never touches columns.
        assert_eq!(down("=C6", 6, 8), "=C8");
    }

    #[test]
    fn horizontal_moves_relative_columns_only() {
        assert_eq!(across("=D$16", 4, 6), "=F$16");
        assert_eq!(across("=$G$4", 4, 6), "=$G$4");
        assert_eq!(across("=D16+$G6", 4, 5), "=E16+$G6");
        assert_eq!(across("=Z1", 26, 27), "=AA1");
    }

    #[test]
    fn literals_and_names_are_untouched() {
        let f = "=IF(ISNUMBER(SEARCH(\"[vosr15oe]\",C4)),LOG10(A1),\"A1\")";
        assert_eq!(
            down(f, 4, 6),
            "=IF(ISNUMBER(SEARCH(\"[vosr15oe]\",C6)),LOG10(A3),\"A1\")"
        );
        assert_eq!(down("=\"say \"\"B2\"\"\"&B2", 1, 2), "=\"say \"\"B2\"\"\"&B3");
    }

    #[test]
    fn sheet_qualified_references() {
        let f = "=INDEX('column question map'!$F$3:$F$939, MATCH('data map'!$L4, 'column question map'!$E$3:$E$939, 0))";
        assert_eq!(
            down(f, 4, 5),
            "=INDEX('column question map'!$F$3:$F$939, MATCH('data map'!$L5, 'column question map'!$E$3:$E$939, 0))"
        );
        let f = "=COUNTIFS(OFFSET('raw data'!$C$3:$C$502, 0, MATCH($G$4, 'raw data'!$C$2:$AJC$2, 0)-1), $G6)";
        assert_eq!(across(f, 4, 9), f);
        // A sheet named like a reference stays a prefix.
        assert_eq!(down("=Q1!A1", 1, 3), "=Q1!A3");
    }

    #[test]
    fn parsed_references() {
        let f = Formula::parse("=AE4*AF4*AG4=1");
        assert_eq!(f.refs().len(), 3);
        assert_eq!(f.to_string(), "=AE4*AF4*AG4=1");
        assert!(Formula::parse("=TRUE+ABCD1+A0").refs().is_empty());
        assert_eq!(
            CellRef::parse("$AJC$2"),
            Some(CellRef {
                col_abs: true,
                col: 946,
                row_abs: true,
                row: 2
            })
        );
    }

    #[test]
    fn shifting_off_the_grid_fails() {
        assert!(matches!(
            render_down("=A2", 4, &[1]),
            Err(FormulaError::ReferenceOutOfRange { .. })
        ));
        assert!(render_across("=A2", 2, &[1]).is_err());
        assert!(render_across("=$A2", 2, &[1]).is_ok());
    }
}

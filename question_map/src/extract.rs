use log::{debug, info, warn};

use crate::cell::{CellSource, CellValue};
use crate::record::{lookup_question, DataMapColumns};
use crate::scan::rows_with_value;

/// Marks the end of a response list. In the filter slots it also means
/// "no constraint".
pub const SENTINEL: &str = "<>";

/// One enumerated answer of a question.
#[derive(PartialEq, Debug, Clone)]
pub struct ResponseOption {
    pub code: CellValue,
    pub label: CellValue,
}

impl ResponseOption {
    pub fn sentinel() -> ResponseOption {
        ResponseOption {
            code: CellValue::text(SENTINEL),
            label: CellValue::text(SENTINEL),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.code.trimmed() == SENTINEL && self.label.trimmed() == SENTINEL
    }
}

/// The value of the option pattern column on the rows listing the options of
/// a section.
pub fn option_pattern(section: &str) -> String {
    format!("Select Option {}", section)
}

/// All the options listed under a section, in sheet order, followed by the
/// sentinel. Empty when the section lists no option.
pub fn options_for_section<S: CellSource + ?Sized>(
    sheet: &S,
    cols: &DataMapColumns,
    section: &str,
) -> Vec<ResponseOption> {
    let pattern = option_pattern(section);
    let rows = rows_with_value(sheet, cols.option_pattern, &pattern, cols.first_row);
    info!("Found {} response option rows for {:?}", rows.len(), pattern);
    if rows.is_empty() {
        warn!("No response options found for pattern {:?}", pattern);
        return Vec::new();
    }
    let mut res: Vec<ResponseOption> = rows
        .iter()
        .map(|row| {
            let opt = ResponseOption {
                code: sheet.value_at(*row, cols.system_response),
                label: sheet.value_at(*row, cols.text_response),
            };
            debug!("options_for_section: row {}: {:?}", row, opt);
            opt
        })
        .collect();
    res.push(ResponseOption::sentinel());
    res
}

/// The response options of a question, found through its section tag.
///
/// For N option rows the result has N + 1 entries, the last one being the
/// sentinel. A question without a section tag, or a section without option
/// rows, yields an empty list.
pub fn extract_options<S: CellSource + ?Sized>(
    sheet: &S,
    cols: &DataMapColumns,
    question_number: u32,
) -> Vec<ResponseOption> {
    let section = lookup_question(sheet, cols, question_number)
        .and_then(|rec| rec.section().map(|s| s.to_string()));
    match section {
        Some(s) => {
            info!(
                "Extracting response options for question {} (section {})",
                question_number, s
            );
            options_for_section(sheet, cols, &s)
        }
        None => {
            warn!("No section number found for question {}", question_number);
            Vec::new()
        }
    }
}

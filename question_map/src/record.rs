use log::{debug, info, warn};

use crate::cell::{CellSource, CellValue};
use crate::classify::QuestionType;
use crate::scan::{find_row_by_marker, SkipPolicy};

/// Positions of the columns of a data map after its scaffolding was
/// inserted. All indices are 1-based.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct DataMapColumns {
    pub question_info: u32,
    pub system_response: u32,
    pub text_response: u32,
    pub marker: u32,
    pub signature: u32,
    pub prefix: u32,
    pub section: u32,
    pub option_pattern: u32,
    /// The first row holding survey metadata (rows above are headers).
    pub first_row: u32,
}

impl DataMapColumns {
    pub const DEFAULT: DataMapColumns = DataMapColumns {
        question_info: 3,   // C
        system_response: 4, // D
        text_response: 5,   // E
        marker: 7,          // G
        signature: 8,       // H
        prefix: 12,         // L
        section: 14,        // N
        option_pattern: 16, // P
        first_row: 4,
    };
}

impl Default for DataMapColumns {
    fn default() -> Self {
        DataMapColumns::DEFAULT
    }
}

/// One row of the data map.
#[derive(PartialEq, Debug, Clone)]
pub struct MetadataRow {
    pub row: u32,
    pub marker: String,
    pub question_info_text: String,
    pub system_response_option: CellValue,
    pub text_response_option: String,
    pub prefix: String,
    pub section_tag: String,
    pub type_signature: String,
    pub option_pattern: String,
}

impl MetadataRow {
    pub fn read<S: CellSource + ?Sized>(sheet: &S, cols: &DataMapColumns, row: u32) -> MetadataRow {
        let text = |col: u32| sheet.value_at(row, col).trimmed();
        MetadataRow {
            row,
            marker: text(cols.marker),
            question_info_text: text(cols.question_info),
            system_response_option: sheet.value_at(row, cols.system_response),
            text_response_option: text(cols.text_response),
            prefix: text(cols.prefix),
            section_tag: text(cols.section),
            type_signature: text(cols.signature),
            option_pattern: text(cols.option_pattern),
        }
    }
}

/// What the question tabs need to know about one question.
///
/// Built from the first data map row carrying the question number as its
/// marker. Empty strings mean the cell was blank.
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionRecord {
    pub question_number: u32,
    pub row: u32,
    pub question_text: String,
    pub prefix: String,
    pub section_number: String,
    pub type_signature: String,
}

impl QuestionRecord {
    pub fn question_type(&self) -> QuestionType {
        QuestionType::classify(&self.type_signature)
    }

    pub fn text(&self) -> Option<&str> {
        non_empty(&self.question_text)
    }

    pub fn prefix(&self) -> Option<&str> {
        non_empty(&self.prefix)
    }

    pub fn section(&self) -> Option<&str> {
        non_empty(&self.section_number)
    }

    pub fn signature(&self) -> Option<&str> {
        non_empty(&self.type_signature)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Looks up the canonical row of a question.
///
/// When the signature cell still holds an unevaluated formula (the
/// recalculation did not happen), the signature falls back to the question
/// info text, or to a placeholder naming the row.
pub fn lookup_question<S: CellSource + ?Sized>(
    sheet: &S,
    cols: &DataMapColumns,
    question_number: u32,
) -> Option<QuestionRecord> {
    let target = question_number.to_string();
    let row = find_row_by_marker(
        sheet,
        cols.marker,
        &target,
        cols.first_row,
        SkipPolicy::SkipSystem,
    )?;
    let meta = MetadataRow::read(sheet, cols, row);
    let type_signature = if meta.type_signature.starts_with('=') {
        warn!(
            "lookup_question: question {}: signature at row {} was not evaluated",
            question_number, row
        );
        if meta.question_info_text.is_empty() {
            format!("Question {} data from row {}", question_number, row)
        } else {
            meta.question_info_text.clone()
        }
    } else {
        meta.type_signature.clone()
    };
    let rec = QuestionRecord {
        question_number,
        row,
        question_text: meta.question_info_text,
        prefix: meta.prefix,
        section_number: meta.section_tag,
        type_signature,
    };
    debug!("lookup_question: {:?}", rec);
    Some(rec)
}

/// Finds the free-text child linked to a question with an other-specify
/// option: the first row with the same marker and the child signature.
pub fn find_other_specify_child<S: CellSource + ?Sized>(
    sheet: &S,
    cols: &DataMapColumns,
    question_number: u32,
) -> Option<MetadataRow> {
    let target = question_number.to_string();
    let child_sig = QuestionType::OtherSpecifyChild.signature()?;
    let row = (cols.first_row..=sheet.max_row()).find(|r| {
        sheet.value_at(*r, cols.marker).trimmed() == target
            && sheet.value_at(*r, cols.signature).trimmed() == child_sig
    });
    match row {
        Some(r) => {
            info!(
                "find_other_specify_child: question {}: found child at row {}",
                question_number, r
            );
            Some(MetadataRow::read(sheet, cols, r))
        }
        None => {
            info!(
                "find_other_specify_child: no other specify child for question {}",
                question_number
            );
            None
        }
    }
}

/// The content of the first non-empty bracket pair, e.g. "S1r6oe" for
/// "[S1r6oe]: In which region...".
pub fn extract_bracketed_text(text: &str) -> Option<String> {
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(0) => rest = after,
            Some(close) => return Some(after[..close].to_string()),
            None => return None,
        }
    }
    None
}

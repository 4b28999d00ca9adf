//! The spreadsheet formulas written by the workbook builder.
//!
//! Tabulation happens when the workbook is recalculated, never here: these
//! functions only produce formula text. Templates meant to be copied are
//! written for a base row and rendered with [`crate::render_down`].

use crate::cell::{column_letters, column_index};
use crate::extract::SENTINEL;

pub const RAW_DATA_SHEET: &str = "raw data";
pub const DATA_MAP_SHEET: &str = "data map";
pub const COLUMN_MAP_SHEET: &str = "column question map";
pub const LOOP_VARIABLES_SHEET: &str = "loop variables";

/// Placed in a filter column slot, selects the raw data column present on
/// every respondent row.
pub const NO_FILTER_COLUMN: &str = "record";

/// Leading character that keeps a formula as literal text until a user
/// removes it.
pub const INERT_PREFIX: char = '\'';

/// The block of raw data the tabulation formulas look at.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawDataRange {
    /// Row holding the column headers.
    pub header_row: u32,
    pub first_row: u32,
    pub last_row: u32,
    /// First data column, after the spacer columns.
    pub first_col: u32,
    pub last_col: u32,
}

impl Default for RawDataRange {
    fn default() -> Self {
        RawDataRange {
            header_row: 2,
            first_row: 3,
            last_row: 502,
            first_col: 3,
            last_col: column_index("AJC").unwrap_or(946),
        }
    }
}

fn quoted_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

impl RawDataRange {
    /// The respondent values of the first data column, e.g.
    /// `'raw data'!$C$3:$C$502`.
    pub fn values_block(&self) -> String {
        let c = column_letters(self.first_col);
        format!(
            "{}!${}${}:${}${}",
            quoted_sheet(RAW_DATA_SHEET),
            c,
            self.first_row,
            c,
            self.last_row
        )
    }

    /// The header row, e.g. `'raw data'!$C$2:$AJC$2`.
    pub fn header_block(&self) -> String {
        format!(
            "{}!${}${}:${}${}",
            quoted_sheet(RAW_DATA_SHEET),
            column_letters(self.first_col),
            self.header_row,
            column_letters(self.last_col),
            self.header_row
        )
    }

    /// The respondent values of the column whose header is held in `key`.
    pub fn column_for(&self, key: &str) -> String {
        format!(
            "OFFSET({}, 0, MATCH({}, {}, 0)-1)",
            self.values_block(),
            key,
            self.header_block()
        )
    }
}

// ****** Question tab templates ******

/// Count of respondents giving the option of row `base_row`, under the three
/// filter pairs (I,J) (K,L) (M,N) of that row. A filter value of `<>` matches
/// any non-blank cell, so the default `record`/`<>` pair is no constraint.
///
/// The question column comes from `$G$4`; copy down with `render_down`.
pub fn frequency_count(range: &RawDataRange, base_row: u32) -> String {
    let r = base_row;
    format!(
        "=COUNTIFS({}, $G{r}, {}, $J{r}, {}, $L{r}, {}, $N{r})",
        range.column_for("$G$4"),
        range.column_for(&format!("$I{}", r)),
        range.column_for(&format!("$K{}", r)),
        range.column_for(&format!("$M{}", r)),
        r = r
    )
}

/// Share of the option of `row` in the total held on the sentinel row.
pub fn percentage(row: u32, sentinel_row: u32) -> String {
    format!("=D{}/$D${}", row, sentinel_row)
}

/// All non-blank answers of the column named in `$Q$4`, filtered by the
/// three filter pairs of row 6, as inert text.
pub fn filtered_list(range: &RawDataRange) -> String {
    let target = range.column_for("$Q$4");
    let clause = |col: &str, val: &str| {
        format!(
            "(IF(${v}$6=\"{s}\", TRUE, {}=${v}$6))",
            range.column_for(&format!("${}$6", col)),
            v = val,
            s = SENTINEL
        )
    };
    format!(
        "{}=FILTER({}, ({}<>\"\") * {} * {} * {})",
        INERT_PREFIX,
        target,
        target,
        clause("I", "J"),
        clause("K", "L"),
        clause("M", "N")
    )
}

/// The rows of a Cross Cut block holding the two filter column/value pairs.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CrossCutFilters {
    pub column_1: u32,
    pub value_1: u32,
    pub column_2: u32,
    pub value_2: u32,
}

/// Count of respondents giving the option of `option_row` under both cross
/// cut filters. Written in column D; relative in its column so that it can be
/// copied across.
pub fn cross_cut_count(range: &RawDataRange, option_row: u32, f: &CrossCutFilters) -> String {
    format!(
        "=COUNTIFS({}, $G{}, {}, D${}, {}, D${})",
        range.column_for("$G$4"),
        option_row,
        range.column_for(&format!("D${}", f.column_1)),
        f.value_1,
        range.column_for(&format!("D${}", f.column_2)),
        f.value_2
    )
}

/// Question text of the data map row whose prefix is named in the filter
/// column cell.
pub fn filter_question_lookup(column_row: u32) -> String {
    format!(
        "=IF(D${c}=\"{none}\", \"No filter\", OFFSET({dm}!$C$2, MATCH(D${c}, {dm}!$L$2:$L$3200, 0)-1, 0))",
        c = column_row,
        none = NO_FILTER_COLUMN,
        dm = quoted_sheet(DATA_MAP_SHEET)
    )
}

/// Label of the selected filter value, found by its offset below the
/// question row in the data map.
pub fn filter_label_lookup(column_row: u32, value_row: u32) -> String {
    format!(
        "=IF(D${v}=\"{s}\", \"No filter\", OFFSET({dm}!$E$2, MATCH(D${c}, {dm}!$L$2:$L$3200, 0)+D${v},0))",
        c = column_row,
        v = value_row,
        s = SENTINEL,
        dm = quoted_sheet(DATA_MAP_SHEET)
    )
}

// ****** Data map templates ******

/// The row the data map templates are written for.
pub const DATA_MAP_TEMPLATE_ROW: u32 = 4;

/// The classification templates of the data map, by column. `Y` is a plain
/// value on the template row and is not copied down.
pub const DATA_MAP_TEMPLATES: [(&str, &str); 27] = [
    ("G", r#"=INDEX('column question map'!$F$3:$F$939, MATCH('data map'!$L4, 'column question map'!$E$3:$E$939, 0))"#),
    ("H", r#"=U4&", "&V4&", "&W4&", "&X4&", "&Y4&", "&Z4&", "&AA4&", "&AB4&", "&AC4&", "&S4"#),
    ("I", r#"=INDEX($C$4:$C$3200, MATCH("Question Text "&N4, $P$4:$P$3200, 0))"#),
    ("J", r#"=SUBSTITUTE(SUBSTITUTE(LEFT(I4,FIND(":",I4)-1),"[",""),"]","")"#),
    ("K", r#"=IF(ISTEXT(LEFT(J4,1)),IF(EXACT(LEFT(J4,1),UPPER(LEFT(J4,1))),"Survey","System"),"First Char not Letter")"#),
    ("L", r#"=IF(K4="System","System",IF(ISNUMBER(FIND("_",J4)),LEFT(J4,FIND("_",J4)-1),IF(ISNUMBER(FIND("none",J4)),LEFT(J4,FIND("none",J4)-1),IF(ISNUMBER(FIND("r",J4)),LEFT(J4,FIND("r",J4)-1),J4))))"#),
    ("M", r#"=IF(AND(C4="", D4="", E4=""), "End", IF(AND(OFFSET(C4,-1,0)="", OFFSET(D4,-1,0)="", OFFSET(E4,-1,0)=""), "Start", "Mid"))"#),
    ("N", r#"=COUNTIFS($M$4:M4, "Start")"#),
    ("O", r#"=IF(M4="Start","Question Text",IF(O3="Question Text","Response Type",IF(ISNUMBER(D4),"Select Option",IF(AND(LEFT(D4,1)="[",RIGHT(D4,1)="]"),"Bracketed Sub-Question","End"))))"#),
    ("P", r#"=O4 & " " &N4"#),
    ("Q", r#"=IF(ISNUMBER(SEARCH("oe]", C4)), "Other Text Entry", 0)"#),
    ("R", r#"=IFERROR(IF(Q4="Other Text Entry","Other Specify Child",IF(INDEX($Q$4:$Q$3200,MATCH(O4&" "&TEXT(N4+1,"0"),$P$4:$P$3200,0))="Other Text Entry","Other Specify Parent",0)),0)"#),
    ("S", r#"=INDEX($R$4:$R$3200, MATCH("Question Text "&N4, $P$4:$P$3200, 0))"#),
    ("T", r#"=IF(OR(ISNUMBER(SEARCH("[record]",C4)),ISNUMBER(SEARCH("[uuid]",C4)),ISNUMBER(SEARCH("[date]",C4)),ISNUMBER(SEARCH("[markers]",C4)),ISNUMBER(SEARCH("[status]",C4)),ISNUMBER(SEARCH("conditions: Conditions",C4)),ISNUMBER(SEARCH("[vlist]",C4)),ISNUMBER(SEARCH("[qtime]",C4)),ISNUMBER(SEARCH("[vos]",C4)),ISNUMBER(SEARCH("[vosr15oe]",C4)),ISNUMBER(SEARCH("[vbrowser]",C4)),ISNUMBER(SEARCH("[vbrowser15oe]",C4)),ISNUMBER(SEARCH("[vmobiledevice]",C4)),ISNUMBER(SEARCH("[vmobileos]",C4)),ISNUMBER(SEARCH("[start_date]",C4)),ISNUMBER(SEARCH("[vdropout]",C4)),ISNUMBER(SEARCH("[source]",C4)),ISNUMBER(SEARCH("[decLang]",C4)),ISNUMBER(SEARCH("[list]",C4)),ISNUMBER(SEARCH("[userAgent]",C4)),ISNUMBER(SEARCH("[fp_etag]",C4)),ISNUMBER(SEARCH("[fp_html5]",C4)),ISNUMBER(SEARCH("[fp_flash]",C4)),ISNUMBER(SEARCH("[fp_browser]",C4)),ISNUMBER(SEARCH("[dcua]",C4)),ISNUMBER(SEARCH("[url]",C4)),ISNUMBER(SEARCH("[session]",C4)),ISNUMBER(SEARCH("[s24627]",C4)),ISNUMBER(SEARCH("[s25023]",C4))),"System Question",0)"#),
    ("U", r#"=INDEX($T$4:$T$3200, MATCH("Question Text "&N4, $P$4:$P$3200, 0))"#),
    ("V", r#"=IF(INDEX($C$4:$C$3200, MATCH("Response Type "&N4, $P$4:$P$3200, 0)) = "Open text response", "Open Text", 0)"#),
    ("W", r#"=IF(INDEX($C$4:$C$3200, MATCH("Response Type "&N4, $P$4:$P$3200, 0)) = "Open numeric response", "Numerical", IF(AND(LEFT(INDEX($C$4:$C$3200, MATCH("Response Type "&N4, $P$4:$P$3200, 0)), 5) = "Value", ISERROR(MATCH("Select Option "&N4, $P$4:$P$3200, 0))), "Numerical", 0))"#),
    ("X", r#"=IF(AND(NOT(S4="Other Specify Child"), T4=0, U4=0, V4=0, W4=0, LEFT(INDEX($C$4:$C$3200, MATCH("Question Text "&N4, $P$4:$P$3200, 0)), 1) = "["), "Simple Select", 0)"#),
    ("Y", "0"),
    ("Z", r#"=IF(ISNUMBER(SEARCH("rank", INDEX($C$4:$C$3200, MATCH("Question Text "&N4, $P$4:$P$3200, 0)))), "Rank", 0)"#),
    ("AA", r#"=IF(AND(Z4=0, NOT((ISERROR(MATCH("Bracketed Sub-Question " & N4, $P$4:$P$3200, 0))))), "Matrix", 0)"#),
    ("AB", r#"=IF(ISNUMBER(SEARCH("_", INDEX($C$4:$C$3200, MATCH("Question Text "&N4, $P$4:$P$3200, 0)))), "Loop", 0)"#),
    ("AC", r#"=INDEX($AD$4:$AD$3200, MATCH("Question Text "&N4, $P$4:$P$3200, 0))"#),
    ("AD", r#"=IF(AE4*AF4*AG4=1, "Double Loop", 0)"#),
    ("AE", r#"=IFERROR(IF(AND(ISNUMBER(SEARCH("_",C4)),ISERROR(VALUE(MID(C4,SEARCH("_",C4)-1,1))),MID(C4,SEARCH("_",C4)-1,1)<>""),1,0), 0)"#),
    ("AF", r#"=IF(AND(ISNUMBER(SEARCH("Lr",C4)),ISNUMBER(VALUE(MID(C4,SEARCH("Lr",C4)+2,1)))),1,0)"#),
    ("AG", r#"=IF(OR(ISNUMBER(SEARCH("0r",C4)),ISNUMBER(SEARCH("1r",C4)),ISNUMBER(SEARCH("2r",C4)),ISNUMBER(SEARCH("3r",C4)),ISNUMBER(SEARCH("4r",C4)),ISNUMBER(SEARCH("5r",C4)),ISNUMBER(SEARCH("6r",C4)),ISNUMBER(SEARCH("7r",C4)),ISNUMBER(SEARCH("8r",C4)),ISNUMBER(SEARCH("9r",C4))),1,0)"#),
];

// ****** Column question map templates ******

pub const COLUMN_MAP_TEMPLATE_ROW: u32 = 3;

/// Survey or System, from the first character of the header in C.
pub const COLUMN_ORIGIN_TEMPLATE: &str = r#"=IF(ISTEXT(LEFT(C3,1)),IF(EXACT(LEFT(C3,1),UPPER(LEFT(C3,1))),"Survey","System"),"First Char not Letter")"#;

/// The question marker of the header in C; see `question_marker`.
pub const COLUMN_MARKER_TEMPLATE: &str = r#"=IF(D3="System","System",IF(ISNUMBER(FIND("_",C3)),LEFT(C3,FIND("_",C3)-1),IF(ISNUMBER(FIND("none",C3)),LEFT(C3,FIND("none",C3)-1),IF(ISNUMBER(FIND("r",C3)),LEFT(C3,FIND("r",C3)-1),C3))))"#;

/// The question number of the marker in E, from the unique marker list.
pub const COLUMN_NUMBER_TEMPLATE: &str =
    r#"=IFERROR(INDEX($H$3:$H$200, MATCH($E3, $G$3:$G$200, 0)), "System")"#;

/// How many question numbers the column question map enumerates.
pub const QUESTION_NUMBER_SLOTS: u32 = 200;

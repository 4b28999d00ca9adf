//! Lookups, classification and formula templating over the data map of a
//! survey export.
//!
//! The data map lists every question of a survey, one row per question
//! text, response type and response option. Once the workbook builder has
//! added its classification formulas and the workbook was recalculated, each
//! row carries a question marker and a type signature. This crate reads those
//! rows through [`CellSource`] to:
//!
//! - find the canonical row of a question ([`find_row_by_marker`],
//!   [`lookup_question`]),
//! - classify it ([`QuestionType::classify`]),
//! - list its response options ([`extract_options`]),
//! - produce the formulas that tabulate it ([`templates`], [`render_down`],
//!   [`render_across`]).
//!
//! It never evaluates a formula.

mod cell;
mod classify;
mod column_marker;
mod extract;
mod formula;
mod record;
mod scan;
pub mod templates;

pub use crate::cell::*;
pub use crate::classify::*;
pub use crate::column_marker::*;
pub use crate::extract::*;
pub use crate::formula::*;
pub use crate::record::*;
pub use crate::scan::*;

#[cfg(test)]
pub(crate) mod testing {
    use crate::cell::{CellSource, CellValue};
    use std::collections::BTreeMap;

    /// A sparse sheet for the tests.
    pub struct Grid {
        cells: BTreeMap<(u32, u32), CellValue>,
    }

    impl Grid {
        pub fn new() -> Grid {
            let _ = env_logger::builder().is_test(true).try_init();
            Grid {
                cells: BTreeMap::new(),
            }
        }

        pub fn set(&mut self, row: u32, col: u32, v: CellValue) {
            self.cells.insert((row, col), v);
        }
    }

    impl CellSource for Grid {
        fn value_at(&self, row: u32, col: u32) -> CellValue {
            self.cells
                .get(&(row, col))
                .cloned()
                .unwrap_or(CellValue::Empty)
        }

        fn max_row(&self) -> u32 {
            self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
        }
    }
}

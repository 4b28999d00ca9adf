use log::{debug, error, info, warn};

use question_map::templates::RawDataRange;
use question_map::DataMapColumns;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::cutter::config_reader::*;
use crate::cutter::io_common::*;
use crate::cutter::io_workbook::{read_workbook, save_workbook};
use crate::cutter::recalc::Recalculator;
use crate::cutter::workbook::Workbook;

pub mod column_map;
pub mod config_reader;
pub mod data_map;
pub mod io_common;
pub mod io_workbook;
pub mod question_tab;
pub mod recalc;
pub mod setup;
pub mod workbook;

#[derive(Debug, Snafu)]
pub enum CutterError {
    #[snafu(display("File not found: {path}"))]
    InputNotFound { path: String },
    #[snafu(display("Unsupported file type: {path} (expected .xlsx, .xlsm or .xls)"))]
    UnsupportedExtension { path: String },
    #[snafu(display("Error opening workbook {path}: {source}"))]
    OpeningWorkbook {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Error reading sheet {sheet:?} of {path}: {source}"))]
    ReadingSheet {
        source: calamine::Error,
        path: String,
        sheet: String,
    },
    #[snafu(display("Error saving workbook {path}: {source}"))]
    SavingWorkbook {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error creating directory {path}: {source}"))]
    CreatingDirectory {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing {path}: {source}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing summary to {path}: {source}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error rendering formula for {sheet}!{cell}: {source}"))]
    RenderingFormula {
        source: question_map::FormulaError,
        sheet: String,
        cell: String,
    },
    #[snafu(display("Could not launch {command}: {source}"))]
    RecalculationLaunch {
        source: std::io::Error,
        command: String,
    },
    #[snafu(display("Recalculation of {path} failed: {message}"))]
    RecalculationFailed { path: String, message: String },
    #[snafu(display("Error building tab {tab}: {source}"))]
    BuildingTab {
        #[snafu(source(from(CutterError, Box::new)))]
        source: Box<CutterError>,
        tab: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CutResult<T> = Result<T, CutterError>;

/// What was built for one question slot.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TabSummary {
    pub question: u32,
    pub tab: String,
    pub signature: Option<String>,
    #[serde(rename = "questionType")]
    pub question_type: Option<String>,
    /// Response options written, without the sentinel.
    pub options: usize,
    #[serde(rename = "otherSpecifyId")]
    pub other_specify_id: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input: String,
    pub output: String,
    pub tabs: Vec<TabSummary>,
}

fn setup_maps(wb: &mut Workbook, range: &RawDataRange) -> CutResult<()> {
    setup::initial_setup(wb);
    setup::raw_data_setup(wb, range);
    data_map::data_map_setup(wb)?;
    column_map::column_map_setup(wb, range)?;
    Ok(())
}

/// Runs the external recalculation and pulls the computed values back into
/// the workbook. Failures, including an unreadable recalculated file, are
/// logged and the formulas stay unevaluated.
fn recalculate_and_reload(wb: &mut Workbook, output: &Path, recalculator: &dyn Recalculator) {
    let computed = match recalculator.recalculate(output) {
        Ok(true) => read_workbook(output),
        Ok(false) => {
            info!("Recalculation skipped, formulas stay unevaluated");
            return;
        }
        Err(e) => Err(e),
    };
    match computed {
        Ok(computed) => {
            let n = wb.merge_cached(&computed);
            info!("Reloaded {} computed cells from {}", n, output.display());
        }
        Err(e) => {
            warn!("Could not recalculate {}: {}", output.display(), e);
            warn!("Continuing with unevaluated formulas");
        }
    }
}

/// The whole run: maps, snapshot, save, recalculation, question tabs, save.
pub fn process_workbook(
    input: &Path,
    output: &Path,
    config: &CutterConfig,
    recalculator: &dyn Recalculator,
) -> CutResult<RunSummary> {
    check_input(input)?;
    info!("Processing {} -> {}", input.display(), output.display());
    let range = config.raw_data.range()?;
    let mut wb = read_workbook(input)?;

    setup_maps(&mut wb, &range).map_err(|e| {
        error!("Error during workbook setup: {}", e);
        e
    })?;

    if config.write_formula_snapshot {
        let snapshot = formula_snapshot_path(output);
        save_workbook(&wb, &snapshot)?;
        info!("Formula snapshot saved to {}", snapshot.display());
    }
    save_workbook(&wb, output)?;

    recalculate_and_reload(&mut wb, output, recalculator);

    let cols = DataMapColumns::default();
    let tabs = question_tab::build_question_tabs(&mut wb, &cols, &range, config.question_count)?;
    save_workbook(&wb, output)?;

    let summary = RunSummary {
        input: simplify_file_name(input),
        output: simplify_file_name(output),
        tabs,
    };
    debug!("process_workbook: summary: {:?}", summary);
    Ok(summary)
}

fn summary_js(summary: &RunSummary, path: &str) -> CutResult<JSValue> {
    serde_json::to_value(summary).context(ParsingJsonSnafu { path })
}

/// Writes the summary as pretty JSON to a file, or to the standard output
/// when `dest` is `stdout` or empty.
pub fn write_summary(summary: &RunSummary, dest: &str) -> CutResult<()> {
    let js = summary_js(summary, dest)?;
    let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu { path: dest })?;
    if dest.is_empty() || dest == "stdout" {
        println!("{}", pretty);
    } else {
        fs::write(dest, pretty).context(WritingSummarySnafu { path: dest })?;
        info!("Summary written to {}", dest);
    }
    Ok(())
}

/// Fails when the summary differs from the reference summary stored at
/// `reference_path`, after printing the differences.
pub fn check_summary(summary: &RunSummary, reference_path: &str) -> CutResult<()> {
    let js = summary_js(summary, reference_path)?;
    let pretty_stats = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {
        path: reference_path,
    })?;
    let summary_ref = read_summary(reference_path)?;
    let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {
        path: reference_path,
    })?;
    if pretty_ref != pretty_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty_stats.as_ref(), "\n");
        whatever!("Difference detected between the run summary and the reference summary")
    }
    info!("Summary matches the reference {}", reference_path);
    Ok(())
}

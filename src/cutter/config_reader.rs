use crate::cutter::*;

use question_map::templates::RawDataRange;
use question_map::{column_index, column_letters};

fn default_question_count() -> u32 {
    10
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_output_base_name() -> String {
    "processed_survey_v".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDataSettings {
    #[serde(rename = "firstRow")]
    pub first_row: u32,
    #[serde(rename = "lastRow")]
    pub last_row: u32,
    #[serde(rename = "lastColumn")]
    pub last_column: String,
}

impl Default for RawDataSettings {
    fn default() -> Self {
        let r = RawDataRange::default();
        RawDataSettings {
            first_row: r.first_row,
            last_row: r.last_row,
            last_column: column_letters(r.last_col),
        }
    }
}

impl RawDataSettings {
    /// The block of respondent rows the tabulation formulas read.
    pub fn range(&self) -> CutResult<RawDataRange> {
        let base = RawDataRange::default();
        let last_col = match column_index(&self.last_column) {
            Some(c) if c >= base.first_col => c,
            _ => whatever!("Invalid rawData.lastColumn: {:?}", self.last_column),
        };
        if self.first_row <= base.header_row || self.last_row < self.first_row {
            whatever!(
                "Invalid rawData rows: firstRow {} lastRow {}",
                self.first_row,
                self.last_row
            )
        }
        Ok(RawDataRange {
            first_row: self.first_row,
            last_row: self.last_row,
            last_col,
            ..base
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecalculationSettings {
    pub enabled: bool,
    /// The office suite executable used headless to recalculate.
    pub command: String,
    #[serde(rename = "waitSeconds")]
    pub wait_seconds: u64,
}

impl Default for RecalculationSettings {
    fn default() -> Self {
        RecalculationSettings {
            enabled: true,
            command: "soffice".to_string(),
            wait_seconds: 3,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CutterConfig {
    #[serde(rename = "questionCount", default = "default_question_count")]
    pub question_count: u32,
    #[serde(rename = "outputDirectory", default = "default_output_directory")]
    pub output_directory: String,
    #[serde(rename = "outputBaseName", default = "default_output_base_name")]
    pub output_base_name: String,
    #[serde(rename = "writeFormulaSnapshot", default = "default_true")]
    pub write_formula_snapshot: bool,
    #[serde(rename = "rawData", default)]
    pub raw_data: RawDataSettings,
    #[serde(default)]
    pub recalculation: RecalculationSettings,
}

impl Default for CutterConfig {
    fn default() -> Self {
        CutterConfig {
            question_count: default_question_count(),
            output_directory: default_output_directory(),
            output_base_name: default_output_base_name(),
            write_formula_snapshot: true,
            raw_data: RawDataSettings::default(),
            recalculation: RecalculationSettings::default(),
        }
    }
}

pub fn read_config(path: &str) -> CutResult<CutterConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read config content: {:?}", contents);
    let config: CutterConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    info!("config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> CutResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read summary: {:?}", js);
    Ok(js)
}

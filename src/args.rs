use clap::Parser;

/// Adds the data map scaffolding, the column question map and one tabulation tab
/// per question to a survey workbook export.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The survey export to process (.xlsx, .xlsm or .xls).
    #[clap(value_parser)]
    pub input: String,

    /// (file path, optional) Where to write the processed workbook. If not specified, the next free
    /// <outputBaseName>N.xlsx in the output directory of the configuration is used.
    #[clap(short, long, value_parser)]
    pub output: Option<String>,

    /// (file path, optional) A JSON configuration file. All its fields are optional, see the README for the
    /// list of settings and their defaults.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the run will be written in JSON format to the
    /// given location. An empty value writes to the standard output.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, qcut will check that the summary of the run
    /// matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (number, default 10) The number of question tabs to build. Overrides the configuration file.
    #[clap(short, long, value_parser)]
    pub questions: Option<u32>,

    /// If passed as an argument, the workbook is not recalculated and the question tabs are built from
    /// unevaluated formulas.
    #[clap(long, takes_value = false)]
    pub no_recalc: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

use clap::Parser;

/// Splits a raw scouting results spreadsheet into per-patrol report sheets.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The workbook to process. JSON snapshots and Excel workbooks are supported,
    /// see --input-type.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (default json) The type of the input file: 'json' for a workbook snapshot or 'xlsx' for
    /// an Excel workbook.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the processed workbook snapshot will be
    /// written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference snapshot of the processed workbook in JSON format. If provided,
    /// patrolsplit will check that the processed workbook matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 0) The identity of the raw results sheet inside the workbook.
    #[clap(long, value_parser)]
    pub sheet_id: Option<i64>,

    /// (default: current time in seconds) The run-unique tag appended to the names of the
    /// generated sheets. Pass an explicit tag for reproducible runs.
    #[clap(long, value_parser)]
    pub tag: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

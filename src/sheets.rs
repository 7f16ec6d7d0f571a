use log::{info, warn};

use patrol_split::*;
use snafu::{prelude::*, Snafu};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_json;
pub mod io_xlsx;
pub mod workbook;

pub use workbook::*;

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error rendering JSON output"))]
    RenderingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no sheets"))]
    EmptyExcel { path: String },
    #[snafu(display("Unknown input type {input_type} (expected 'json' or 'xlsx')"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Pipeline failed: {source}"))]
    Pipeline { source: PipelineError },
    #[snafu(display("The processed workbook does not match the reference snapshot"))]
    ReferenceMismatch {},
}

pub type AppResult<T> = Result<T, AppError>;

pub fn run(args: &Args) -> AppResult<()> {
    let input_type = args.input_type.clone().unwrap_or_else(|| "json".to_string());
    let mut workbook = match input_type.as_str() {
        "json" => io_json::read_workbook(&args.input)?,
        "xlsx" => io_xlsx::read_workbook(&args.input)?,
        _ => return UnknownInputTypeSnafu { input_type }.fail(),
    };

    let run_tag = match &args.tag {
        Some(tag) => tag.clone(),
        None => default_run_tag(),
    };
    let source_sheet_id = args.sheet_id.unwrap_or(0);
    info!(
        "processing {:?} (sheet id {}) with tag {:?}",
        args.input, source_sheet_id, run_tag
    );

    let report =
        run_pipeline(&mut workbook, source_sheet_id, &run_tag).context(PipelineSnafu {})?;
    info!("report: {:?}", report);

    let pretty_report =
        serde_json::to_string_pretty(&report_to_json(&report)).context(RenderingJsonSnafu {})?;
    println!("report:{}", pretty_report);

    if let Some(out) = &args.out {
        io_json::write_workbook(out, &workbook)?;
    }

    // The reference snapshot, if provided for comparison.
    if let Some(reference) = &args.reference {
        check_reference(reference, &workbook)?;
    }

    Ok(())
}

// Matches the remote service convention of naming runs by the clock; callers
// that need reproducible names pass --tag instead.
fn default_run_tag() -> String {
    let seconds = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}", seconds)
}

fn report_to_json(report: &PipelineReport) -> JSValue {
    let groups: Vec<JSValue> = report
        .groups
        .iter()
        .map(|g| {
            json!({
                "name": g.name,
                "start": g.start_label(),
                "end": g.end_label(),
                "columns": g.width(),
            })
        })
        .collect();
    let created: Vec<JSValue> = report
        .created
        .iter()
        .map(|s| json!({"sheetId": s.sheet_id, "title": s.title}))
        .collect();
    json!({
        "workingSheet": report.duplicate_title,
        "deletedRows": report.deleted_rows,
        "groups": groups,
        "createdSheets": created,
    })
}

fn check_reference(path: &str, workbook: &Workbook) -> AppResult<()> {
    let reference = io_json::read_workbook(path)?;
    let pretty_reference =
        serde_json::to_string_pretty(&reference).context(RenderingJsonSnafu {})?;
    let pretty_processed =
        serde_json::to_string_pretty(workbook).context(RenderingJsonSnafu {})?;
    if pretty_reference != pretty_processed {
        warn!("Found differences with the reference snapshot");
        print_diff(pretty_reference.as_str(), pretty_processed.as_str(), "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

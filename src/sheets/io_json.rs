// Workbook snapshots are plain JSON files, see [Workbook] for the shape.

use std::fs;

use log::debug;
use snafu::prelude::*;

use crate::sheets::*;

pub fn read_workbook(path: &str) -> AppResult<Workbook> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let workbook: Workbook =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read workbook with {} sheets from {}", workbook.sheets.len(), path);
    Ok(workbook)
}

pub fn write_workbook(path: &str, workbook: &Workbook) -> AppResult<()> {
    let pretty = serde_json::to_string_pretty(workbook).context(RenderingJsonSnafu {})?;
    if path == "stdout" {
        println!("{}", pretty);
        return Ok(());
    }
    fs::write(path, pretty).context(WritingJsonSnafu { path })?;
    Ok(())
}

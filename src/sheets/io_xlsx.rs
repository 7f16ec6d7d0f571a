// Imports an Excel workbook into the snapshot model. Values are read as
// displayed text where possible; formats are not carried over.

use calamine::{open_workbook, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::sheets::*;
use patrol_split::SheetId;

pub fn read_workbook(path: &str) -> AppResult<Workbook> {
    let mut excel: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let names = excel.sheet_names().to_owned();
    ensure!(!names.is_empty(), EmptyExcelSnafu { path });

    let mut sheets: Vec<Sheet> = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let wrange = excel
            .worksheet_range(name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        debug!("worksheet {:?}: {} rows", name, wrange.height());
        let rows: Vec<Vec<Cell>> = wrange
            .rows()
            .map(|row| {
                row.iter()
                    .map(|data| Cell {
                        value: cell_text(data),
                        format: None,
                    })
                    .collect()
            })
            .collect();
        sheets.push(Sheet {
            id: index as SheetId,
            title: name.clone(),
            rows,
        });
    }
    Ok(Workbook { sheets })
}

fn cell_text(data: &calamine::DataType) -> String {
    match data {
        calamine::DataType::String(s) => s.clone(),
        calamine::DataType::Empty => String::new(),
        other => format!("{}", other),
    }
}

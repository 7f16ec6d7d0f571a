// An in-memory workbook implementing the spreadsheet service capability.
//
// The model doubles as the JSON snapshot format: a workbook is a list of
// sheets, a sheet is a grid of cells, a cell is its entered text plus an
// optional display format. Formulas are kept as entered text and never
// evaluated here.

use serde::{Deserialize, Serialize};

use patrol_split::notation::parse_range;
use patrol_split::{
    BatchOutcome, CellFormat, CreatedSheet, Dimension, FormatKind, Request, ServiceError, SheetId,
    SpreadsheetService, WriteOptions,
};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub id: SheetId,
    pub title: String,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CellRepr")]
pub struct Cell {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<CellStyle>,
}

// Snapshot files may spell a cell as a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Plain(String),
    Rich {
        #[serde(default)]
        value: String,
        #[serde(default)]
        format: Option<CellStyle>,
    },
}

impl From<CellRepr> for Cell {
    fn from(repr: CellRepr) -> Cell {
        match repr {
            CellRepr::Plain(value) => Cell {
                value,
                format: None,
            },
            CellRepr::Rich { value, format } => Cell { value, format },
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CellStyle {
    pub pattern: String,
    pub kind: String,
}

impl From<&CellFormat> for CellStyle {
    fn from(format: &CellFormat) -> CellStyle {
        CellStyle {
            pattern: format.pattern.clone(),
            kind: match format.kind {
                FormatKind::Percent => "PERCENT".to_string(),
                FormatKind::Number => "NUMBER".to_string(),
            },
        }
    }
}

impl Sheet {
    fn cell_mut(&mut self, row: usize, column: usize) -> &mut Cell {
        while self.rows.len() <= row {
            self.rows.push(Vec::new());
        }
        let cells = &mut self.rows[row];
        while cells.len() <= column {
            cells.push(Cell::default());
        }
        &mut cells[column]
    }
}

impl Workbook {
    fn sheet_by_title(&self, title: &str) -> Result<&Sheet, ServiceError> {
        self.sheets
            .iter()
            .find(|s| s.title == title)
            .ok_or_else(|| ServiceError::new(format!("no sheet titled {:?}", title)))
    }

    fn sheet_mut_by_title(&mut self, title: &str) -> Result<&mut Sheet, ServiceError> {
        self.sheets
            .iter_mut()
            .find(|s| s.title == title)
            .ok_or_else(|| ServiceError::new(format!("no sheet titled {:?}", title)))
    }

    fn sheet_mut_by_id(&mut self, id: SheetId) -> Result<&mut Sheet, ServiceError> {
        self.sheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ServiceError::new(format!("no sheet with id {}", id)))
    }

    fn next_sheet_id(&self) -> SheetId {
        self.sheets.iter().map(|s| s.id + 1).max().unwrap_or(0)
    }

    fn create_sheet(
        &mut self,
        title: &str,
        rows: Vec<Vec<Cell>>,
        outcome: &mut BatchOutcome,
    ) -> Result<(), ServiceError> {
        if self.sheets.iter().any(|s| s.title == title) {
            return Err(ServiceError::new(format!(
                "a sheet titled {:?} already exists",
                title
            )));
        }
        let sheet = Sheet {
            id: self.next_sheet_id(),
            title: title.to_string(),
            rows,
        };
        outcome.created.push(CreatedSheet {
            sheet_id: sheet.id,
            title: sheet.title.clone(),
        });
        self.sheets.push(sheet);
        Ok(())
    }
}

impl SpreadsheetService for Workbook {
    // Reads mimic the remote service: every row is trimmed of trailing empty
    // cells and trailing empty rows are dropped, so callers may observe
    // asymmetric row lengths.
    fn read_range(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>, ServiceError> {
        let spec = parse_range(range)
            .ok_or_else(|| ServiceError::new(format!("invalid range {:?}", range)))?;
        let sheet = self.sheet_by_title(sheet)?;

        let mut grid: Vec<Vec<String>> = Vec::new();
        for (index, row) in sheet.rows.iter().enumerate() {
            if index < spec.start_row.unwrap_or(0) {
                continue;
            }
            if let Some(end) = spec.end_row {
                if index > end {
                    break;
                }
            }
            let mut values: Vec<String> = row
                .iter()
                .enumerate()
                .filter(|(column, _)| {
                    *column >= spec.start_column && *column <= spec.end_column
                })
                .map(|(_, cell)| cell.value.clone())
                .collect();
            while values.last().map(|v| v.is_empty()).unwrap_or(false) {
                values.pop();
            }
            grid.push(values);
        }
        while grid.last().map(|row| row.is_empty()).unwrap_or(false) {
            grid.pop();
        }
        Ok(grid)
    }

    fn apply_batch(&mut self, requests: &[Request]) -> Result<BatchOutcome, ServiceError> {
        let mut outcome = BatchOutcome::default();
        for request in requests {
            match request {
                Request::DuplicateSheet {
                    source_sheet_id,
                    new_title,
                } => {
                    let rows = self
                        .sheets
                        .iter()
                        .find(|s| s.id == *source_sheet_id)
                        .map(|s| s.rows.clone())
                        .ok_or_else(|| {
                            ServiceError::new(format!("no sheet with id {}", source_sheet_id))
                        })?;
                    self.create_sheet(new_title, rows, &mut outcome)?;
                }
                Request::AddSheet { title } => {
                    self.create_sheet(title, Vec::new(), &mut outcome)?;
                }
                Request::DeleteDimension {
                    sheet_id,
                    dimension,
                    start,
                    end,
                } => {
                    let sheet = self.sheet_mut_by_id(*sheet_id)?;
                    match dimension {
                        Dimension::Rows => {
                            let end = (*end).min(sheet.rows.len());
                            if *start < end {
                                sheet.rows.drain(*start..end);
                            }
                        }
                        Dimension::Columns => {
                            for row in sheet.rows.iter_mut() {
                                let end = (*end).min(row.len());
                                if *start < end {
                                    row.drain(*start..end);
                                }
                            }
                        }
                    }
                }
                Request::RepeatCell {
                    sheet_id,
                    row,
                    start_column,
                    end_column,
                    formula,
                    format,
                } => {
                    let style = CellStyle::from(format);
                    let sheet = self.sheet_mut_by_id(*sheet_id)?;
                    for column in *start_column..*end_column {
                        let cell = sheet.cell_mut(*row, column);
                        cell.value = formula.clone();
                        cell.format = Some(style.clone());
                    }
                }
            }
        }
        Ok(outcome)
    }

    fn write_range(
        &mut self,
        sheet: &str,
        range: &str,
        values: &[Vec<String>],
        options: &WriteOptions,
    ) -> Result<(), ServiceError> {
        let spec = parse_range(range)
            .ok_or_else(|| ServiceError::new(format!("invalid range {:?}", range)))?;
        let anchor_row = spec.start_row.unwrap_or(0);
        let anchor_column = spec.start_column;
        let sheet = self.sheet_mut_by_title(sheet)?;

        for (major, line) in values.iter().enumerate() {
            for (minor, value) in line.iter().enumerate() {
                let (row, column) = match options.major_dimension {
                    Dimension::Rows => (anchor_row + major, anchor_column + minor),
                    Dimension::Columns => (anchor_row + minor, anchor_column + major),
                };
                // Formula or plain text, the snapshot stores the entered text.
                sheet.cell_mut(row, column).value = value.clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(id: SheetId, title: &str, rows: &[&[&str]]) -> Sheet {
        Sheet {
            id,
            title: title.to_string(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|value| Cell {
                            value: value.to_string(),
                            format: None,
                        })
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn reads_trim_trailing_empties() {
        let wb = Workbook {
            sheets: vec![sheet(
                0,
                "Raw",
                &[
                    &["a", "", "c", ""],
                    &["", "", ""],
                    &["x", "y"],
                    &["", ""],
                ],
            )],
        };
        // The middle empty row is preserved, the trailing one is dropped.
        let grid = wb.read_range("Raw", "A:C").unwrap();
        assert_eq!(
            vec![
                vec!["a".to_string(), "".to_string(), "c".to_string()],
                vec![],
                vec!["x".to_string(), "y".to_string()],
            ],
            grid
        );

        let bounded = wb.read_range("Raw", "A1:ZZ3").unwrap();
        assert_eq!(3, bounded.len());
        assert_eq!(3, bounded[0].len());
    }

    #[test]
    fn duplicate_then_delete_rows_and_columns() {
        let mut wb = Workbook {
            sheets: vec![sheet(0, "Raw", &[&["r0c0", "r0c1", "r0c2"], &["r1c0"], &["r2c0"]])],
        };
        let outcome = wb
            .apply_batch(&[Request::DuplicateSheet {
                source_sheet_id: 0,
                new_title: "copy".to_string(),
            }])
            .unwrap();
        assert_eq!(1, outcome.created.len());
        let copy_id = outcome.created[0].sheet_id;
        assert_eq!(1, copy_id);

        wb.apply_batch(&[
            Request::DeleteDimension {
                sheet_id: copy_id,
                dimension: Dimension::Rows,
                start: 1,
                end: 2,
            },
            Request::DeleteDimension {
                sheet_id: copy_id,
                dimension: Dimension::Columns,
                start: 1,
                end: 3,
            },
        ])
        .unwrap();

        let grid = wb.read_range("copy", "A:C").unwrap();
        assert_eq!(
            vec![vec!["r0c0".to_string()], vec!["r2c0".to_string()]],
            grid
        );
        // The original sheet is untouched.
        assert_eq!(3, wb.read_range("Raw", "A:C").unwrap()[0].len());
    }

    #[test]
    fn repeat_cell_grows_the_grid_and_sets_the_format() {
        let mut wb = Workbook {
            sheets: vec![sheet(0, "Report", &[])],
        };
        wb.apply_batch(&[Request::RepeatCell {
            sheet_id: 0,
            row: 2,
            start_column: 3,
            end_column: 5,
            formula: "=D3/D2".to_string(),
            format: CellFormat::percent(),
        }])
        .unwrap();

        let cell = &wb.sheets[0].rows[2][4];
        assert_eq!("=D3/D2", cell.value);
        assert_eq!(
            Some(CellStyle {
                pattern: "##0.00%".to_string(),
                kind: "PERCENT".to_string()
            }),
            cell.format
        );
    }

    #[test]
    fn column_major_writes_transpose() {
        let mut wb = Workbook {
            sheets: vec![sheet(0, "Report", &[])],
        };
        wb.write_range(
            "Report",
            "D5:ZZ99",
            &[vec!["one".to_string(), "two".to_string()]],
            &WriteOptions {
                major_dimension: Dimension::Columns,
                as_formulas: true,
            },
        )
        .unwrap();
        assert_eq!("one", wb.sheets[0].rows[4][3].value);
        assert_eq!("two", wb.sheets[0].rows[5][3].value);
    }

    #[test]
    fn duplicate_titles_are_rejected() {
        let mut wb = Workbook {
            sheets: vec![sheet(0, "Raw", &[])],
        };
        let res = wb.apply_batch(&[Request::AddSheet {
            title: "Raw".to_string(),
        }]);
        assert!(res.is_err());
    }

    #[test]
    fn snapshot_cells_accept_bare_strings() {
        let wb: Workbook = serde_json::from_str(
            r#"{"sheets": [{"id": 0, "title": "Raw", "rows": [["a", {"value": "b"}]]}]}"#,
        )
        .unwrap();
        assert_eq!("a", wb.sheets[0].rows[0][0].value);
        assert_eq!("b", wb.sheets[0].rows[0][1].value);
    }
}

// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use crate::notation::index_to_label;

/// The identity of a sheet inside a spreadsheet document, as assigned by the
/// spreadsheet service.
pub type SheetId = i64;

/// A named contiguous run of columns in the source sheet, detected from a
/// header cell. One group becomes one filtered report sheet.
///
/// Invariant: `start <= end`, both zero-based and inclusive. The segmenter is
/// the only producer; a range is never mutated once its `end` is closed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupRange {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl GroupRange {
    pub fn start_label(&self) -> String {
        index_to_label(self.start)
    }

    pub fn end_label(&self) -> String {
        index_to_label(self.end)
    }

    pub fn width(&self) -> usize {
        (self.end - self.start) + 1
    }
}

// ******** Mutation requests *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Dimension {
    Rows,
    Columns,
}

/// The display format attached to a repeated formula cell.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CellFormat {
    pub pattern: String,
    pub kind: FormatKind,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FormatKind {
    Percent,
    Number,
}

impl CellFormat {
    /// Percentage with two decimal places.
    pub fn percent() -> CellFormat {
        CellFormat {
            pattern: "##0.00%".to_string(),
            kind: FormatKind::Percent,
        }
    }

    /// Plain integer count.
    pub fn number() -> CellFormat {
        CellFormat {
            pattern: "####0".to_string(),
            kind: FormatKind::Number,
        }
    }
}

/// A structural or formatting mutation understood by the spreadsheet service.
///
/// This is the complete set of descriptor kinds the pipeline constructs; the
/// wire encoding is the service implementation's concern.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Request {
    DuplicateSheet {
        source_sheet_id: SheetId,
        new_title: String,
    },
    /// Deletes the half-open `[start, end)` range of rows or columns.
    DeleteDimension {
        sheet_id: SheetId,
        dimension: Dimension,
        start: usize,
        end: usize,
    },
    AddSheet {
        title: String,
    },
    /// Applies one formula and format to a single-row run of cells.
    RepeatCell {
        sheet_id: SheetId,
        row: usize,
        start_column: usize,
        end_column: usize,
        formula: String,
        format: CellFormat,
    },
}

/// A sheet created while applying a batch, reported back by the service.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CreatedSheet {
    pub sheet_id: SheetId,
    pub title: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BatchOutcome {
    pub created: Vec<CreatedSheet>,
}

/// How a rectangular write should be interpreted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WriteOptions {
    /// Whether the outer axis of the value grid is rows or columns.
    pub major_dimension: Dimension,
    /// When set, leading `=` cells are entered as formulas rather than text.
    pub as_formulas: bool,
}

// ******** The external collaborator *********

/// The narrow capability the pipeline needs from a spreadsheet backend.
///
/// The core itself performs no I/O: it computes over grids already fetched
/// through this trait and hands mutation batches back through it.
pub trait SpreadsheetService {
    /// Reads a rectangular range of cell values. Rows may come back shorter
    /// than the widest row of the range; trailing empty rows may be dropped.
    fn read_range(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>, ServiceError>;

    /// Applies an ordered batch of mutations, reporting any sheets it created.
    fn apply_batch(&mut self, requests: &[Request]) -> Result<BatchOutcome, ServiceError>;

    /// Writes a grid of values anchored at the top-left corner of `range`.
    fn write_range(
        &mut self,
        sheet: &str,
        range: &str,
        values: &[Vec<String>],
        options: &WriteOptions,
    ) -> Result<(), ServiceError>;
}

// ******** Errors *********

/// An opaque failure reported by the spreadsheet service.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    pub fn new<S: Into<String>>(message: S) -> ServiceError {
        ServiceError {
            message: message.into(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spreadsheet service error: {}", self.message)
    }
}

impl Error for ServiceError {}

/// Errors that abort a pipeline run. None of these are retried internally.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PipelineError {
    /// A group header cell did not contain the `<token> <name>` separator.
    MalformedHeader { column: usize, content: String },
    /// The boundary marker was absent from the header row.
    BoundaryNotFound { label: String },
    /// The header row produced zero groups; there is nothing to synthesize.
    EmptySegmentation,
    /// The service failed or broke its contract; opaque to the core.
    Service(ServiceError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MalformedHeader { column, content } => write!(
                f,
                "malformed group header {:?} in column {} (expected a '<token> <name>' cell)",
                content, column
            ),
            PipelineError::BoundaryNotFound { label } => {
                write!(f, "boundary marker {:?} not found in the header row", label)
            }
            PipelineError::EmptySegmentation => {
                write!(f, "no group headers were found: nothing to segment")
            }
            PipelineError::Service(e) => write!(f, "{}", e),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceError> for PipelineError {
    fn from(e: ServiceError) -> PipelineError {
        PipelineError::Service(e)
    }
}

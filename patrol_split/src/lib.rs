mod config;
pub mod notation;
pub mod synth;

use log::{debug, info};

pub use crate::config::*;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// The header value marking the right edge of the groups region. Everything
/// from this column to the end of the populated header is a trailing block of
/// per-leader columns that the reports do not use.
pub const BOUNDARY_MARKER: &str = "Leader";

/// The literal spellings recognized as a zero percentage. This is a closed
/// set on purpose: other locale renderings of zero will not match and the
/// corresponding rows are kept. See [is_zero_percent].
pub const ZERO_PERCENT_SENTINELS: [&str; 2] = ["0%", "0.00%"];

pub fn is_zero_percent(cell: &str) -> bool {
    ZERO_PERCENT_SENTINELS.contains(&cell)
}

// **** Row filter planning ****

/// Scans a block of raw rows and returns the original indices of the rows
/// whose value in `predicate_column` matches, in encountered order (hence
/// strictly increasing).
///
/// Rows too short to have a `predicate_column` cell never match: sparse rows
/// are a normal input, not an error.
pub fn plan_deletions<F>(rows: &[Vec<String>], predicate_column: usize, matches: F) -> Vec<usize>
where
    F: Fn(&str) -> bool,
{
    rows.iter()
        .enumerate()
        .filter(|(_, row)| match row.get(predicate_column) {
            Some(cell) => matches(cell),
            None => false,
        })
        .map(|(index, _)| index)
        .collect()
}

/// Translates a deletion plan into half-open single-row ranges against the
/// document as it looks while the batch is being applied: deleting a row
/// shifts every later row up by one, so the i-th entry lands at
/// `original - i`.
pub fn adjusted_deletions(plan: &[usize]) -> Vec<(usize, usize)> {
    plan.iter()
        .enumerate()
        .map(|(applied, original)| {
            let target = original - applied;
            (target, target + 1)
        })
        .collect()
}

// **** Header segmentation ****

// Boundary-closing scan state: a group's end is only known once the next
// header (or the stop column) is reached.
enum SegmentState {
    NoOpenGroup,
    OpenGroup { name: String, start: usize },
}

/// Partitions the columns left of `stop_column` into one [GroupRange] per
/// group header found in `header_row`.
///
/// A non-empty cell is a group header of the form `<token> <name>`; the name
/// is everything after the first space. A header without a space is malformed
/// input. Finding no header at all is an error as well: callers cannot
/// synthesize anything from zero groups.
pub fn segment(header_row: &[String], stop_column: usize) -> PipelineResult<Vec<GroupRange>> {
    let mut groups: Vec<GroupRange> = Vec::new();
    let mut state = SegmentState::NoOpenGroup;

    for (column, cell) in header_row.iter().enumerate().take(stop_column) {
        if cell.is_empty() {
            continue;
        }
        let name = match cell.split_once(' ') {
            Some((_token, name)) => name.to_string(),
            None => {
                return Err(PipelineError::MalformedHeader {
                    column,
                    content: cell.clone(),
                })
            }
        };
        debug!("segment: found group {:?} starting at column {}", name, column);
        if let SegmentState::OpenGroup { name: open, start } =
            std::mem::replace(&mut state, SegmentState::OpenGroup { name, start: column })
        {
            groups.push(GroupRange {
                name: open,
                start,
                end: column - 1,
            });
        }
    }

    match state {
        SegmentState::OpenGroup { name, start } => {
            groups.push(GroupRange {
                name,
                start,
                end: stop_column - 1,
            });
            Ok(groups)
        }
        SegmentState::NoOpenGroup => Err(PipelineError::EmptySegmentation),
    }
}

/// Returns the leftmost column of `header_row` whose value equals `label`.
pub fn find_column(header_row: &[String], label: &str) -> PipelineResult<usize> {
    header_row
        .iter()
        .position(|cell| cell == label)
        .ok_or_else(|| PipelineError::BoundaryNotFound {
            label: label.to_string(),
        })
}

// **** The pipeline driver ****

/// What one run did, for logging and reporting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PipelineReport {
    pub duplicate_title: String,
    pub duplicate_id: SheetId,
    pub deleted_rows: usize,
    pub groups: Vec<GroupRange>,
    pub created: Vec<CreatedSheet>,
}

/// Runs the whole post-processing pipeline against a spreadsheet service.
///
/// The stages are strictly ordered: every read depends on the mutations
/// issued before it, and the statistic formulas target sheet identities that
/// only exist once the create batch has been applied. Any failure aborts the
/// run immediately; mutations already applied are not rolled back, and a
/// re-run under a fresh `run_tag` simply produces a new set of report sheets.
pub fn run_pipeline(
    service: &mut dyn SpreadsheetService,
    source_sheet_id: SheetId,
    run_tag: &str,
) -> PipelineResult<PipelineReport> {
    // Stage 1: work on a duplicate, never on the raw sheet itself.
    let duplicate_title = format!("raw-non-zero-{}", run_tag);
    let outcome = service.apply_batch(&[Request::DuplicateSheet {
        source_sheet_id,
        new_title: duplicate_title.clone(),
    }])?;
    let duplicate_id = created_sheet_id(&outcome, &duplicate_title)?;
    info!(
        "created working duplicate {:?} with id {}",
        duplicate_title, duplicate_id
    );

    // Stage 2: drop the rows nobody voted on.
    let key_block = service.read_range(&duplicate_title, "A:C")?;
    let plan = plan_deletions(&key_block, 1, is_zero_percent);
    debug!("rows planned for deletion: {:?}", plan);
    let deletions: Vec<Request> = adjusted_deletions(&plan)
        .iter()
        .map(|(start, end)| Request::DeleteDimension {
            sheet_id: duplicate_id,
            dimension: Dimension::Rows,
            start: *start,
            end: *end,
        })
        .collect();
    if !deletions.is_empty() {
        service.apply_batch(&deletions)?;
    }
    info!("deleted {} zero-value rows", plan.len());

    // Stage 3: find the trailing leader block and cut it off. The service may
    // report asymmetric row lengths, so the populated width is the maximum
    // across the header rows.
    let header_block = service.read_range(&duplicate_title, "A1:ZZ3")?;
    let empty_row: Vec<String> = Vec::new();
    let marker_row = header_block.first().unwrap_or(&empty_row);
    let boundary = find_column(marker_row, BOUNDARY_MARKER)?;
    let populated_width = header_block
        .iter()
        .take(3)
        .map(|row| row.len())
        .max()
        .unwrap_or(0);
    debug!(
        "boundary {:?} at column {}, populated width {}",
        BOUNDARY_MARKER, boundary, populated_width
    );
    service.apply_batch(&[Request::DeleteDimension {
        sheet_id: duplicate_id,
        dimension: Dimension::Columns,
        start: boundary,
        end: populated_width,
    }])?;

    // Stage 4: segment the group header row. The row was fetched before the
    // column deletion, so the pre-deletion boundary is the stop column.
    let group_row = header_block.get(1).unwrap_or(&empty_row);
    let groups = segment(group_row, boundary)?;
    info!("found {} groups: {:?}", groups.len(), groups);

    // Stage 5: create every report sheet in one batch, then fill them in.
    let creates: Vec<Request> = groups
        .iter()
        .map(|g| synth::add_sheet_request(g, run_tag))
        .collect();
    let outcome = service.apply_batch(&creates)?;

    let mut calculations: Vec<Request> = Vec::new();
    for group in &groups {
        let plan = synth::plan_sheet(group, run_tag, &duplicate_title);
        let sheet_id = created_sheet_id(&outcome, &plan.title)?;
        for projection in &plan.projections {
            service.write_range(
                &plan.title,
                projection.range,
                &[vec![projection.formula.clone()]],
                &projection.options,
            )?;
        }
        calculations.extend(synth::statistic_requests(sheet_id, group));
    }

    // Stage 6: one final batch for all the derived statistics.
    service.apply_batch(&calculations)?;

    Ok(PipelineReport {
        duplicate_title,
        duplicate_id,
        deleted_rows: plan.len(),
        groups,
        created: outcome.created,
    })
}

// A service that creates a sheet without reporting its identity has broken
// the batch contract; surface that as a service failure.
fn created_sheet_id(outcome: &BatchOutcome, title: &str) -> PipelineResult<SheetId> {
    outcome
        .created
        .iter()
        .find(|sheet| sheet.title == title)
        .map(|sheet| sheet.sheet_id)
        .ok_or_else(|| {
            PipelineError::Service(ServiceError::new(format!(
                "batch outcome does not report created sheet {:?}",
                title
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn cells(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn zero_sentinels() {
        assert!(is_zero_percent("0%"));
        assert!(is_zero_percent("0.00%"));
        assert!(!is_zero_percent("0.0%"));
        assert!(!is_zero_percent("5%"));
        assert!(!is_zero_percent(""));
    }

    #[test]
    fn deletion_planning_and_adjustment() {
        let block = rows(&[&["x", "0%"], &["x", "5%"], &["x", "0.00%"]]);
        let plan = plan_deletions(&block, 1, is_zero_percent);
        assert_eq!(vec![0, 2], plan);
        // After deleting row 0, original row 2 sits at position 1.
        assert_eq!(vec![(0, 1), (1, 2)], adjusted_deletions(&plan));
    }

    #[test]
    fn short_rows_never_match() {
        let block = rows(&[&[], &["only one cell"], &["x", "0%"]]);
        assert_eq!(vec![2], plan_deletions(&block, 1, is_zero_percent));
    }

    #[test]
    fn segmentation_closes_groups_on_the_next_header() {
        let header = cells(&["", "Wolf A", "", "Bear B", ""]);
        let groups = segment(&header, 5).unwrap();
        assert_eq!(
            vec![
                GroupRange {
                    name: "A".to_string(),
                    start: 1,
                    end: 2
                },
                GroupRange {
                    name: "B".to_string(),
                    start: 3,
                    end: 4
                },
            ],
            groups
        );
    }

    #[test]
    fn segmentation_stops_at_the_boundary() {
        let header = cells(&["Wolf A", "", "Bear B", "Leader C"]);
        let groups = segment(&header, 2).unwrap();
        assert_eq!(
            vec![GroupRange {
                name: "A".to_string(),
                start: 0,
                end: 1
            }],
            groups
        );
    }

    #[test]
    fn header_without_separator_is_malformed() {
        let header = cells(&["", "Wolf"]);
        assert_eq!(
            Err(PipelineError::MalformedHeader {
                column: 1,
                content: "Wolf".to_string()
            }),
            segment(&header, 5)
        );
    }

    #[test]
    fn empty_header_row_yields_no_groups() {
        let header = cells(&["", "", ""]);
        assert_eq!(Err(PipelineError::EmptySegmentation), segment(&header, 3));
    }

    #[test]
    fn boundary_lookup() {
        let header = cells(&["Name", "Leader", "Score"]);
        assert_eq!(Ok(1), find_column(&header, "Leader"));
        assert_eq!(
            Err(PipelineError::BoundaryNotFound {
                label: "Missing".to_string()
            }),
            find_column(&header, "Missing")
        );
    }

    #[test]
    fn group_range_derived_values() {
        let g = GroupRange {
            name: "A".to_string(),
            start: 3,
            end: 5,
        };
        assert_eq!(3, g.width());
        assert_eq!("D", g.start_label());
        assert_eq!("F", g.end_label());
    }
}

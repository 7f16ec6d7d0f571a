//! Builds the per-group report sheets: one create request, two projection
//! formulas and a block of repeated statistic cells for every [GroupRange].
//!
//! A group's synthesis only ever references its own column span plus the
//! shared three-column key block, so groups can be planned independently and
//! batched together in any order.

use crate::config::*;

/// Target range of the key block projection on every report sheet.
pub const KEY_BLOCK_TARGET: &str = "A5:C99";
/// Target range of the group data projection on every report sheet.
pub const GROUP_BLOCK_TARGET: &str = "D5:ZZ99";

// Report sheets share a uniform layout: three key columns projected from the
// source, then the group's own columns starting at D.
const STATISTICS_START_COLUMN: usize = 3;

/// The four derived statistic rows, in row order.
///
/// The cell references are deliberately fixed: D3 holds the "Yes" count, D4
/// the "No" count, D2 the total, so row 0 is the yes-ratio and row 1 the
/// total of answers. The count range starts below the projected block.
fn statistic_rows() -> [(String, CellFormat); 4] {
    [
        ("=D3/D2".to_string(), CellFormat::percent()),
        ("=D3+D4".to_string(), CellFormat::number()),
        (
            "=COUNTIF(D7:D999,\"=\"&\"Yes\")".to_string(),
            CellFormat::number(),
        ),
        (
            "=COUNTIF(D7:D999,\"=\"&\"No\")".to_string(),
            CellFormat::number(),
        ),
    ]
}

/// A value write the driver issues once the sheet exists.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Projection {
    pub range: &'static str,
    pub formula: String,
    pub options: WriteOptions,
}

/// The creation plan for one group's report sheet. The statistics cannot be
/// planned here: they target the sheet by identity, which is only known once
/// the create batch has been applied.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetPlan {
    pub title: String,
    pub projections: Vec<Projection>,
}

/// The deterministic title of a group's report sheet for one run.
pub fn sheet_title(group: &GroupRange, run_tag: &str) -> String {
    format!("filter-{}-{}", group.name, run_tag)
}

pub fn add_sheet_request(group: &GroupRange, run_tag: &str) -> Request {
    Request::AddSheet {
        title: sheet_title(group, run_tag),
    }
}

/// Plans the projections copying the source key block and the group's own
/// column span into the report sheet.
pub fn plan_sheet(group: &GroupRange, run_tag: &str, source_title: &str) -> SheetPlan {
    let key_block = Projection {
        range: KEY_BLOCK_TARGET,
        formula: format!("=ARRAYFORMULA('{}'!A2:C)", source_title),
        options: WriteOptions {
            major_dimension: Dimension::Rows,
            as_formulas: true,
        },
    };
    // Written column-major so the group columns land side by side after the
    // key block, whatever the group's width.
    let group_block = Projection {
        range: GROUP_BLOCK_TARGET,
        formula: format!(
            "=ARRAYFORMULA('{}'!{}2:{})",
            source_title,
            group.start_label(),
            group.end_label()
        ),
        options: WriteOptions {
            major_dimension: Dimension::Columns,
            as_formulas: true,
        },
    };
    SheetPlan {
        title: sheet_title(group, run_tag),
        projections: vec![key_block, group_block],
    }
}

/// The per-row statistic cells for one report sheet: each of the four
/// statistics is repeated across the group's width, one request per target
/// cell.
pub fn statistic_requests(sheet_id: SheetId, group: &GroupRange) -> Vec<Request> {
    let mut requests: Vec<Request> = Vec::new();
    for (row, (formula, format)) in statistic_rows().iter().enumerate() {
        for offset in 0..group.width() {
            let column = STATISTICS_START_COLUMN + offset;
            requests.push(Request::RepeatCell {
                sheet_id,
                row,
                start_column: column,
                end_column: column + 1,
                formula: formula.clone(),
                format: format.clone(),
            });
        }
    }
    requests
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wolves() -> GroupRange {
        GroupRange {
            name: "A".to_string(),
            start: 3,
            end: 5,
        }
    }

    #[test]
    fn titles_carry_the_run_tag() {
        assert_eq!("filter-A-17", sheet_title(&wolves(), "17"));
        assert_eq!(
            Request::AddSheet {
                title: "filter-A-17".to_string()
            },
            add_sheet_request(&wolves(), "17")
        );
    }

    #[test]
    fn projections_cover_key_block_and_group_span() {
        let plan = plan_sheet(&wolves(), "17", "raw-non-zero-17");
        assert_eq!("filter-A-17", plan.title);
        assert_eq!(2, plan.projections.len());

        let key = &plan.projections[0];
        assert_eq!("A5:C99", key.range);
        assert_eq!("=ARRAYFORMULA('raw-non-zero-17'!A2:C)", key.formula);
        assert_eq!(Dimension::Rows, key.options.major_dimension);

        let group = &plan.projections[1];
        assert_eq!("D5:ZZ99", group.range);
        assert_eq!("=ARRAYFORMULA('raw-non-zero-17'!D2:F)", group.formula);
        assert_eq!(Dimension::Columns, group.options.major_dimension);
        assert!(group.options.as_formulas);
    }

    #[test]
    fn statistic_display_formats() {
        let percent = CellFormat::percent();
        assert_eq!("##0.00%", percent.pattern);
        assert_eq!(FormatKind::Percent, percent.kind);

        let number = CellFormat::number();
        assert_eq!("####0", number.pattern);
        assert_eq!(FormatKind::Number, number.kind);
    }

    #[test]
    fn statistics_repeat_each_row_across_the_group_width() {
        let requests = statistic_requests(7, &wolves());
        // 4 statistic rows times a width of 3.
        assert_eq!(12, requests.len());
        assert_eq!(
            Request::RepeatCell {
                sheet_id: 7,
                row: 0,
                start_column: 3,
                end_column: 4,
                formula: "=D3/D2".to_string(),
                format: CellFormat::percent(),
            },
            requests[0]
        );
        assert_eq!(
            Request::RepeatCell {
                sheet_id: 7,
                row: 3,
                start_column: 5,
                end_column: 6,
                formula: "=COUNTIF(D7:D999,\"=\"&\"No\")".to_string(),
                format: CellFormat::number(),
            },
            requests[11]
        );
        // Every statistic stays inside the report sheet's own columns.
        for r in &requests {
            match r {
                Request::RepeatCell {
                    start_column,
                    end_column,
                    ..
                } => {
                    assert!(*start_column >= 3 && *end_column <= 6);
                }
                other => panic!("unexpected request {:?}", other),
            }
        }
    }
}

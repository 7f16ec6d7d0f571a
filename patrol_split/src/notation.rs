// ********* Spreadsheet A1 notation ***********

/// Converts a zero-based column index to its spreadsheet letter label.
///
/// The labels follow bijective base-26 numeration: there is no "zero" letter,
/// so after dividing out a digit the remaining index has to be decremented
/// before the next round. Without the decrement, index 26 would collide with
/// index 0 prefixed by a spurious leading digit.
///
/// `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`, `51 -> "AZ"`, `52 -> "BA"`.
pub fn index_to_label(index: usize) -> String {
    let mut index = index;
    let mut letters: Vec<char> = Vec::new();
    loop {
        let remainder = index % 26;
        letters.push((b'A' + remainder as u8) as char);
        index /= 26;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    letters.iter().rev().collect()
}

/// The left inverse of [index_to_label]. Returns `None` for anything that is
/// not a non-empty string of ASCII uppercase letters.
pub fn label_to_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut acc: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        acc = acc * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(acc - 1)
}

/// A rectangular range in A1 notation, with zero-based bounds.
///
/// Rows are optional: ranges such as `A:C` span the full vertical extent of
/// the sheet. All bounds are inclusive, matching the notation itself.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RangeSpec {
    pub start_column: usize,
    pub start_row: Option<usize>,
    pub end_column: usize,
    pub end_row: Option<usize>,
}

/// Parses range specifications such as `A:C`, `A1:ZZ3` or `A5:C99`.
/// A single cell reference (`D5`) is accepted as a degenerate range.
pub fn parse_range(spec: &str) -> Option<RangeSpec> {
    let (first, second) = match spec.split_once(':') {
        Some((a, b)) => (a, b),
        None => (spec, spec),
    };
    let (start_column, start_row) = parse_cell(first)?;
    let (end_column, end_row) = parse_cell(second)?;
    Some(RangeSpec {
        start_column,
        start_row,
        end_column,
        end_row,
    })
}

fn parse_cell(part: &str) -> Option<(usize, Option<usize>)> {
    let letters: String = part.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &part[letters.len()..];
    let column = label_to_index(&letters)?;
    if digits.is_empty() {
        return Some((column, None));
    }
    // The notation counts rows from 1.
    match digits.parse::<usize>() {
        Ok(row) if row >= 1 => Some((column, Some(row - 1))),
        _ => None,
    }
}

//! Stateless helpers used by the layout kernel.

use chrono::{Datelike, NaiveDate};

use crate::conf::{
    N_ROW_CHARS_PER_WIDTH, N_ROW_HEIGHT_EMPTY, N_ROW_LINE_PADDING, TUP_FILE_NAME_ILLEGAL,
    TUP_MONTHS_GENITIVE_UK,
};
use crate::spec::{SpecColumn, SpecMergeRegion};

////////////////////////////////////////////////////////////////////////////////
// #region RowHeight

/// Estimate the height of a merged, wrapped row holding `text`.
///
/// Each `\n`-separated segment occupies `ceil(len / (width_total * 1.2))` lines and
/// each line is `font_size + 2` points tall. Empty text gets the fixed height 15.
pub fn calculate_merged_row_height(text: &str, width_total: f64, font_size: f64) -> f64 {
    if text.is_empty() {
        return N_ROW_HEIGHT_EMPTY;
    }
    let n_chars_per_line = width_total * N_ROW_CHARS_PER_WIDTH;
    if n_chars_per_line <= 0.0 {
        return N_ROW_HEIGHT_EMPTY;
    }

    let n_lines: f64 = text
        .split('\n')
        .map(|segment| (segment.chars().count() as f64 / n_chars_per_line).ceil())
        .sum();
    n_lines * (font_size + N_ROW_LINE_PADDING)
}

/// Sum of column widths.
pub fn derive_total_width(columns: &[SpecColumn]) -> f64 {
    columns.iter().map(|col| col.width).sum()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Dates

/// `05 березня 2025 р.`
pub fn format_date_long_uk(date: NaiveDate) -> String {
    let c_month = TUP_MONTHS_GENITIVE_UK[date.month0() as usize];
    format!("{:02} {c_month} {} р.", date.day(), date.year())
}

/// `05.03.2025`
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TextTemplates

/// Substitute `{name}` placeholders from `slots` in one pass.
///
/// Unknown placeholders and unbalanced braces are kept verbatim; substituted text
/// is never rescanned.
pub fn render_text_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut c_out = String::with_capacity(template.len());
    let mut c_rest = template;

    while let Some(n_open) = c_rest.find('{') {
        c_out.push_str(&c_rest[..n_open]);
        let c_after_open = &c_rest[n_open + 1..];
        let Some(n_close) = c_after_open.find('}') else {
            c_out.push_str(&c_rest[n_open..]);
            return c_out;
        };

        let c_name = &c_after_open[..n_close];
        match slots.iter().find(|(name, _)| *name == c_name) {
            Some((_, value)) => c_out.push_str(value),
            None => c_out.push_str(&c_rest[n_open..n_open + n_close + 2]),
        }
        c_rest = &c_after_open[n_close + 1..];
    }

    c_out.push_str(c_rest);
    c_out
}

/// Replace characters illegal in file names.
pub fn sanitize_file_name_part(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_FILE_NAME_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name.trim().to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeValidation

/// Check that every region is well formed, in bounds and disjoint from the others.
pub fn validate_merge_regions(
    merges: &[SpecMergeRegion],
    n_rows: usize,
    n_cols: usize,
) -> Result<(), String> {
    for (n_idx, merge) in merges.iter().enumerate() {
        if !merge.is_valid() {
            return Err(format!("Merge region #{n_idx} is empty or inverted: {merge:?}"));
        }
        if merge.row_end as usize > n_rows || merge.col_end as usize > n_cols {
            return Err(format!(
                "Merge region #{n_idx} exceeds document bounds {n_rows}x{n_cols}: {merge:?}"
            ));
        }
        if let Some(other) = merges[..n_idx].iter().find(|other| other.overlaps(merge)) {
            return Err(format!(
                "Merge region #{n_idx} overlaps an earlier region: {merge:?} / {other:?}"
            ));
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

//! Output rendering
//!
//! Turns a populated [`MetricTable`] into either a single CSV data row
//! (optionally preceded by a header row) or a long-form sorted
//! `key: value` listing. Rendering is pure string building; the caller
//! owns stdout.

use chrono::{DateTime, Local};

use super::table::MetricTable;

/// Timestamp layout of the CSV row's first field
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the CSV output: optional header row plus exactly one data row
///
/// The header, when requested, is `Date/time` followed by each selected
/// column name. The data row starts with the formatted timestamp; a
/// selected column absent from the table renders as an empty field so
/// field positions stay stable across runs.
pub fn render_csv(
    table: &MetricTable,
    columns: &[String],
    headers: bool,
    now: DateTime<Local>,
) -> String {
    let mut out = String::new();

    if headers {
        out.push_str("Date/time");
        for col in columns {
            out.push(',');
            out.push_str(col);
        }
        out.push('\n');
    }

    out.push_str(&now.format(TIMESTAMP_FORMAT).to_string());
    for col in columns {
        out.push(',');
        if let Some(value) = table.get(col) {
            out.push_str(value);
        }
    }
    out.push('\n');
    out
}

/// Render the long-form listing: every table key, sorted, one
/// `key: value` line each
///
/// Column selection, headers, and the timestamp do not apply here.
pub fn render_long(table: &MetricTable) -> String {
    let mut out = String::new();
    for (key, value) in table.iter() {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_table() -> MetricTable {
        let mut table = MetricTable::new();
        table.insert("Thread count", "42");
        table.insert("Classes - loaded", "1200");
        table
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2021, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_csv_row_with_headers() {
        let columns = vec!["Thread count".to_string(), "Classes - loaded".to_string()];
        let out = render_csv(&sample_table(), &columns, true, fixed_now());
        assert_eq!(
            out,
            "Date/time,Thread count,Classes - loaded\n2021-03-14 09:26:53,42,1200\n"
        );
    }

    #[test]
    fn test_csv_row_without_headers() {
        let columns = vec!["Thread count".to_string()];
        let out = render_csv(&sample_table(), &columns, false, fixed_now());
        assert_eq!(out, "2021-03-14 09:26:53,42\n");
    }

    #[test]
    fn test_absent_column_renders_empty_field() {
        let columns = vec![
            "Thread count".to_string(),
            "no such key".to_string(),
            "Classes - loaded".to_string(),
        ];
        let out = render_csv(&sample_table(), &columns, true, fixed_now());
        let mut lines = out.lines();
        let header = lines.next().unwrap();
        let data = lines.next().unwrap();
        // Field counts always match, absent key leaves its slot empty.
        assert_eq!(header.split(',').count(), data.split(',').count());
        assert_eq!(data, "2021-03-14 09:26:53,42,,1200");
    }

    #[test]
    fn test_csv_with_no_columns_is_just_the_timestamp() {
        let out = render_csv(&sample_table(), &[], false, fixed_now());
        assert_eq!(out, "2021-03-14 09:26:53\n");
    }

    #[test]
    fn test_long_form_sorted_no_timestamp() {
        let out = render_long(&sample_table());
        assert_eq!(out, "Classes - loaded: 1200\nThread count: 42\n");
        assert!(!out.contains("Date/time"));
    }

    #[test]
    fn test_long_form_of_empty_table() {
        assert_eq!(render_long(&MetricTable::new()), "");
    }
}

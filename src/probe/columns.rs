//! Output column resolution
//!
//! Decides which metric keys become CSV columns and in what order:
//! either the user's explicit list verbatim, or every key discovered in
//! this run, sorted.

use super::table::MetricTable;

/// Column selection input, taken from the resolved configuration
#[derive(Debug, Clone, Default)]
pub struct ColumnSpec {
    /// Explicit ordered column list (`-C` / config file)
    pub columns: Vec<String>,
    /// `-A`: substitute all discovered keys, sorted
    pub all_columns: bool,
}

impl ColumnSpec {
    /// Resolve the final column order against a populated table
    ///
    /// With `all_columns` set, any configured list is ignored and every
    /// key present in the table is taken in case-sensitive ordinal
    /// order. Otherwise the configured list is used verbatim, keeping
    /// the user's order even for keys absent from the table.
    pub fn resolve(&self, table: &MetricTable) -> Vec<String> {
        if self.all_columns {
            table.sorted_keys().iter().map(|k| k.to_string()).collect()
        } else {
            self.columns.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> MetricTable {
        let mut table = MetricTable::new();
        table.insert("Thread count", "42");
        table.insert("Classes - loaded", "1200");
        table.insert("Memory - heap memory - used", "52428800");
        table
    }

    #[test]
    fn test_all_columns_sorted_exactly_the_table_keys() {
        let spec = ColumnSpec {
            columns: vec!["ignored".to_string()],
            all_columns: true,
        };
        let resolved = spec.resolve(&sample_table());
        assert_eq!(
            resolved,
            vec![
                "Classes - loaded",
                "Memory - heap memory - used",
                "Thread count",
            ]
        );
    }

    #[test]
    fn test_explicit_list_kept_verbatim() {
        let spec = ColumnSpec {
            columns: vec![
                "Thread count".to_string(),
                "no such key".to_string(),
                "Classes - loaded".to_string(),
            ],
            all_columns: false,
        };
        // Absent keys stay in place; resolution never consults the table.
        let resolved = spec.resolve(&sample_table());
        assert_eq!(resolved, vec!["Thread count", "no such key", "Classes - loaded"]);
    }

    #[test]
    fn test_empty_spec_resolves_to_no_columns() {
        let spec = ColumnSpec::default();
        assert!(spec.resolve(&sample_table()).is_empty());
    }
}

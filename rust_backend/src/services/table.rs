use crate::models::{RawTable, TableData};

fn capitalize_first(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize a raw table payload for display.
///
/// Category names get their first character upper-cased; rows are passed
/// through untouched, ragged rows included. A table missing either its
/// categories or its values comes back empty.
pub fn format_table_data(table: Option<&RawTable>) -> TableData {
    match table {
        Some(RawTable {
            categories: Some(categories),
            values: Some(values),
        }) => TableData {
            categories: categories.iter().map(|c| capitalize_first(c)).collect(),
            values: values.clone(),
        },
        _ => TableData::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TableCell;

    fn raw(categories: &[&str], values: Vec<Vec<TableCell>>) -> RawTable {
        RawTable {
            categories: Some(categories.iter().map(|c| c.to_string()).collect()),
            values: Some(values),
        }
    }

    #[test]
    fn test_capitalizes_categories() {
        let table = raw(
            &["nodes", "avg wait", "", "Already"],
            vec![vec!["1".into(), 2.5.into()]],
        );
        let formatted = format_table_data(Some(&table));
        assert_eq!(formatted.categories, vec!["Nodes", "Avg wait", "", "Already"]);
        assert_eq!(formatted.values, table.values.unwrap());
    }

    #[test]
    fn test_missing_halves_yield_empty() {
        assert_eq!(format_table_data(None), TableData::default());

        let no_values = RawTable {
            categories: Some(vec!["a".into()]),
            values: None,
        };
        assert_eq!(format_table_data(Some(&no_values)), TableData::default());

        let no_categories = RawTable {
            categories: None,
            values: Some(vec![vec![1.0.into()]]),
        };
        assert_eq!(format_table_data(Some(&no_categories)), TableData::default());
    }

    #[test]
    fn test_ragged_rows_pass_through() {
        let table = raw(&["a", "b"], vec![vec![1.0.into()], vec![1.0.into(), 2.0.into(), 3.0.into()]]);
        let formatted = format_table_data(Some(&table));
        assert_eq!(formatted.ragged_rows(), 2);
        assert_eq!(formatted.values[1].len(), 3);
    }

    #[test]
    fn test_idempotent() {
        let table = raw(&["nodes", "éclair"], vec![vec!["x".into()]]);
        let once = format_table_data(Some(&table));
        let again = format_table_data(Some(&RawTable {
            categories: Some(once.categories.clone()),
            values: Some(once.values.clone()),
        }));
        assert_eq!(once, again);
        assert_eq!(once.categories[1], "Éclair");
    }
}

#[cfg(test)]
mod tests {
    use crate::models::PowerPoint;
    use crate::parsing::csv_parser::{parse_leading_float, parse_power_csv, parse_power_csv_str};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to create a temp CSV file
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_parse_skips_bad_lines() {
        let points = parse_power_csv_str("time,power\n100,50\n200,75\nbad,line\n");
        assert_eq!(
            points,
            vec![PowerPoint::new(100.0, 50.0), PowerPoint::new(200.0, 75.0)]
        );
    }

    #[test]
    fn test_parse_header_only() {
        assert!(parse_power_csv_str("time,power\n").is_empty());
        assert!(parse_power_csv_str("").is_empty());
    }

    #[test]
    fn test_parse_blank_lines_and_whitespace() {
        let points = parse_power_csv_str("time,power\n\n  1700000000000 , 1200.5 \n\n");
        assert_eq!(points, vec![PowerPoint::new(1_700_000_000_000.0, 1200.5)]);
    }

    #[test]
    fn test_parse_single_column_row_is_skipped() {
        let points = parse_power_csv_str("time,power\n100\n200,10\n");
        assert_eq!(points, vec![PowerPoint::new(200.0, 10.0)]);
    }

    #[test]
    fn test_parse_extra_columns_ignored() {
        let points = parse_power_csv_str("time,power,site\n100,50,perlmutter\n");
        assert_eq!(points, vec![PowerPoint::new(100.0, 50.0)]);
    }

    #[test]
    fn test_parse_windows_line_endings() {
        let points = parse_power_csv_str("time,power\r\n1,2\r\n3,4\r\n");
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], PowerPoint::new(3.0, 4.0));
    }

    #[test]
    fn test_leading_float_semantics() {
        assert_eq!(parse_leading_float("12.5W"), Some(12.5));
        assert_eq!(parse_leading_float(" -3 "), Some(-3.0));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("1e"), Some(1.0));
        assert_eq!(parse_leading_float("bad"), None);
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("."), None);
    }

    #[test]
    fn test_parse_from_file() {
        let temp_file = create_temp_csv("time,power\n10,20\n30,40\n");
        let points = parse_power_csv(temp_file.path()).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_parse_missing_file_errors() {
        let result = parse_power_csv(std::path::Path::new("/nonexistent/power.csv"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read power CSV"));
    }
}

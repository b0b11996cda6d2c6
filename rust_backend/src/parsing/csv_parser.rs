use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::models::PowerPoint;

/// Parse the system power CSV text.
///
/// The first line is a header and is skipped. Each following line is split on
/// commas and the first two fields are read as `time` and `power`. Blank lines
/// and lines where either field is not numeric are skipped, so a partially
/// corrupt file still yields every good row.
pub fn parse_power_csv_str(csv_text: &str) -> Vec<PowerPoint> {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for line in csv_text.trim().lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(',');
        let time = fields.next().and_then(parse_leading_float);
        let power = fields.next().and_then(parse_leading_float);

        match (time, power) {
            (Some(time), Some(power)) => points.push(PowerPoint::new(time, power)),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} malformed power CSV rows", skipped);
    }

    points
}

/// Read and parse a power CSV file. Undecodable bytes are replaced before
/// parsing, so only the lines containing them are lost.
pub fn parse_power_csv(csv_path: &Path) -> Result<Vec<PowerPoint>> {
    let bytes = std::fs::read(csv_path)
        .with_context(|| format!("Failed to read power CSV {}", csv_path.display()))?;
    Ok(parse_power_csv_str(&String::from_utf8_lossy(&bytes)))
}

/// Parse the longest numeric prefix of a field.
///
/// `"12.5W"` reads as `12.5`; a field with no numeric prefix yields `None`.
pub(crate) fn parse_leading_float(field: &str) -> Option<f64> {
    let field = field.trim();
    let prefix_len = field
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;

    (1..=prefix_len)
        .rev()
        .find_map(|end| field[..end].parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

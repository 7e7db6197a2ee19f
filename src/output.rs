//! Output formatting and persistence for analysis results.
//!
//! The pipeline returns structured rows; this module renders them, rounding
//! to 3 decimals for presentation while the originals keep full precision.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use serde_json::Value;
use tracing::{debug, info};

use crate::analysis::{DescriptiveSummary, TestResult};
use crate::stats::round3;

/// Appends descriptive summary rows to a CSV file, creating it with headers
/// if it does not already exist.
pub fn append_summary_records(path: &str, rows: &[DescriptiveSummary]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "appending summary records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        let mut row = row.clone();
        row.mean = round3(row.mean);
        row.stddev = round3(row.stddev);
        row.std_error = round3(row.std_error);
        writer.serialize(&row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Appends hypothesis test rows to a CSV file, creating it with headers if
/// it does not already exist.
pub fn append_test_records(path: &str, rows: &[TestResult]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "appending test records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for row in rows {
        let mut row = row.clone();
        row.t_statistic = round3(row.t_statistic);
        row.degrees_of_freedom = round3(row.degrees_of_freedom);
        row.p_raw = round3(row.p_raw);
        row.p_adjusted = row.p_adjusted.map(round3);
        writer.serialize(&row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Logs recommended tracks as one line per track with its artist names.
pub fn print_recommendations(tracks: &[Value]) {
    for track in tracks {
        let name = track.get("name").and_then(Value::as_str).unwrap_or("(unnamed)");
        let artists = track
            .get("artists")
            .and_then(Value::as_array)
            .map(|artists| {
                artists
                    .iter()
                    .filter_map(|a| a.get("name").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        info!(track = name, artists = %artists, "recommended");
    }
}

/// Logs a serializable result set as pretty-printed JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn summary_row() -> DescriptiveSummary {
        DescriptiveSummary {
            group: "happy".to_string(),
            feature: "tempo".to_string(),
            mean: 120.123456,
            stddev: 10.98765,
            std_error: 1.23456,
        }
    }

    fn test_row() -> TestResult {
        TestResult {
            group: "running".to_string(),
            feature: "tempo".to_string(),
            t_statistic: -2.34567,
            degrees_of_freedom: 57.8912,
            p_raw: 0.021234,
            p_adjusted: Some(0.127404),
        }
    }

    #[test]
    fn summary_records_create_file_with_single_header() {
        let path = temp_path("playlist_profiler_test_summaries.csv");
        let _ = fs::remove_file(&path);

        append_summary_records(&path, &[summary_row()]).unwrap();
        append_summary_records(&path, &[summary_row()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("std_error")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn summary_records_round_to_three_decimals() {
        let path = temp_path("playlist_profiler_test_rounding.csv");
        let _ = fs::remove_file(&path);

        append_summary_records(&path, &[summary_row()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("120.123"));
        assert!(content.contains("10.988"));
        assert!(!content.contains("120.123456"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_records_serialize_adjusted_p() {
        let path = temp_path("playlist_profiler_test_tests.csv");
        let _ = fs::remove_file(&path);

        append_test_records(&path, &[test_row()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("p_adjusted"));
        assert!(content.contains("0.127"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn print_recommendations_does_not_panic() {
        let tracks = vec![serde_json::json!({
            "name": "Song",
            "artists": [{"name": "Artist A"}, {"name": "Artist B"}],
        })];
        print_recommendations(&tracks);
    }
}

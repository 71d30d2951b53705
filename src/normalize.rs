//! Normalize foreign CSV timestamps into the table format the renderer
//! loads. Used to prepare replay inputs recorded by other tools.

use crate::series::TIMESTAMP_FORMAT;
use crate::{Error, Result};

use chrono::NaiveDateTime;
use std::path::Path;

/// Timestamp formats accepted in column 0 of the input.
const INPUT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%y %H:%M", "%d-%m-%Y %H:%M:%S"];

/// Rewrite column 0 of every non-empty row to `YYYY-MM-DD HH:MM:SS`.
///
/// Unlike series loading this is strict: an unrecognized timestamp fails the
/// whole run, naming the row — silently dropping replay rows would skew the
/// run being prepared.
pub fn normalize_timestamps(input: &Path, output: &Path, delimiter: u8) -> Result<()> {
    if !input.exists() {
        return Err(Error::Config(format!("missing input: {}", input.display())));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(input)?;
    let mut writer = csv::Writer::from_path(output)?;

    for (row_num, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let raw = record.get(0).unwrap_or("");
        let ts = parse_any(raw).ok_or_else(|| {
            Error::Malformed(format!(
                "row {}: unsupported or empty timestamp '{raw}'",
                row_num + 1
            ))
        })?;

        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        fields[0] = ts.format(TIMESTAMP_FORMAT).to_string();
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}

fn parse_any(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim_start_matches('\u{feff}').trim();
    if raw.is_empty() {
        return None;
    }
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV parsing and validation for bulk facility registration.
//!
//! Parsing never touches the database. Rows are validated against the
//! facilities already registered and against earlier rows of the same file.

use csv::StringRecord;
use odn_flow_domain::{
    Facility, FacilityPeriod, validate_facility_fields, validate_facility_names_unique,
};
use std::collections::HashMap;
use thiserror::Error;

use crate::request_response::{CsvRowPreview, CsvRowStatus, PreviewFacilitiesCsvResponse};

/// Errors that make a whole CSV document unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvFormatError {
    /// The header row could not be read.
    #[error("Failed to read CSV headers: {0}")]
    UnreadableHeaders(String),

    /// Required columns are absent.
    #[error("Missing required headers: {0}")]
    MissingHeaders(String),

    /// A data row could not be read.
    #[error("Failed to read CSV row {row_number}: {reason}")]
    UnreadableRow { row_number: usize, reason: String },
}

/// Required CSV column headers (case-insensitive, normalized).
const REQUIRED_HEADERS: &[&str] = &["name", "region", "zone", "woreda"];

/// A validated CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub preview: CsvRowPreview,
    /// The facility to register, present only for valid rows.
    pub facility: Option<Facility>,
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, CsvFormatError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !header_map.contains_key(*required))
        .collect();

    if !missing.is_empty() {
        return Err(CsvFormatError::MissingHeaders(missing.join(", ")));
    }

    Ok(header_map)
}

fn parse_row(
    row_number: usize,
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    accepted: &[Facility],
) -> ParsedRow {
    let get_field = |name: &str| -> Option<String> {
        header_map
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let name: Option<String> = get_field("name");
    let region: Option<String> = get_field("region");
    let zone: Option<String> = get_field("zone");
    let woreda: Option<String> = get_field("woreda");
    let route: Option<String> = get_field("route");
    let period_text: Option<String> = get_field("period");

    let mut errors: Vec<String> = Vec::new();
    for (field, value) in [
        ("name", &name),
        ("region", &region),
        ("zone", &zone),
        ("woreda", &woreda),
    ] {
        if value.is_none() {
            errors.push(format!("{field}: required field is missing or empty"));
        }
    }

    let period: Option<FacilityPeriod> =
        match FacilityPeriod::parse_optional(period_text.as_deref().unwrap_or_default()) {
            Ok(period) => period,
            Err(e) => {
                errors.push(format!("period: {e}"));
                None
            }
        };

    let mut facility: Option<Facility> = None;
    if errors.is_empty() {
        let candidate: Facility = Facility::new(
            name.as_deref().unwrap_or_default(),
            region.as_deref().unwrap_or_default(),
            zone.as_deref().unwrap_or_default(),
            woreda.as_deref().unwrap_or_default(),
            route.as_deref(),
            period,
        );
        if let Err(e) = validate_facility_fields(&candidate) {
            errors.push(format!("validation: {e}"));
        }
        let mut combined: Vec<Facility> = accepted.to_vec();
        combined.push(candidate.clone());
        if let Err(e) = validate_facility_names_unique(&combined) {
            errors.push(format!("name: {e}"));
        }
        if errors.is_empty() {
            facility = Some(candidate);
        }
    }

    let status: CsvRowStatus = if errors.is_empty() {
        CsvRowStatus::Valid
    } else {
        CsvRowStatus::Invalid
    };

    ParsedRow {
        preview: CsvRowPreview {
            row_number,
            name,
            region,
            zone,
            woreda,
            route,
            period: period.map(|p| p.as_str().to_string()),
            status,
            errors,
        },
        facility,
    }
}

/// Parses and validates every data row of a facility CSV.
///
/// Columns `name`, `region`, `zone` and `woreda` are required; `route` and
/// `period` are optional. Rows are numbered from 1, excluding the header.
///
/// # Arguments
///
/// * `csv_content` - The raw CSV content
/// * `existing` - Facilities already registered
///
/// # Errors
///
/// Returns an error if the headers are unreadable or incomplete, or a row
/// cannot be read at all. Field-level problems are reported per row.
pub fn parse_facility_csv(
    csv_content: &str,
    existing: &[Facility],
) -> Result<Vec<ParsedRow>, CsvFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| CsvFormatError::UnreadableHeaders(e.to_string()))?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers)?;

    let mut accepted: Vec<Facility> = existing.to_vec();
    let mut rows: Vec<ParsedRow> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        let record: StringRecord = record.map_err(|e| CsvFormatError::UnreadableRow {
            row_number,
            reason: e.to_string(),
        })?;
        let row: ParsedRow = parse_row(row_number, &record, &header_map, &accepted);
        if let Some(facility) = &row.facility {
            accepted.push(facility.clone());
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Summarizes parsed rows as a preview response.
#[must_use]
pub fn summarize(rows: Vec<ParsedRow>) -> PreviewFacilitiesCsvResponse {
    let rows: Vec<CsvRowPreview> = rows.into_iter().map(|r| r.preview).collect();
    let valid_count: usize = rows
        .iter()
        .filter(|r| r.status == CsvRowStatus::Valid)
        .count();
    PreviewFacilitiesCsvResponse {
        total_rows: rows.len(),
        valid_count,
        invalid_count: rows.len() - valid_count,
        rows,
    }
}

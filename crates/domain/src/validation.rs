// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::Facility;
use std::collections::HashSet;

/// Validates that a facility's basic field constraints are met.
///
/// This function checks that required fields are not empty.
/// It does NOT check for uniqueness (that requires context).
///
/// # Errors
///
/// Returns an error if:
/// - The facility name is empty
/// - The region is empty
pub fn validate_facility_fields(facility: &Facility) -> Result<(), DomainError> {
    if facility.name.is_empty() {
        return Err(DomainError::InvalidFacilityName(String::from(
            "Name cannot be empty",
        )));
    }

    if facility.region.is_empty() {
        return Err(DomainError::InvalidFacilityName(format!(
            "Region cannot be empty for facility '{}'",
            facility.name
        )));
    }

    Ok(())
}

/// Validates that facility names are unique within a woreda.
///
/// Two facilities in different woredas may share a name.
///
/// # Errors
///
/// Returns `DomainError::InvalidFacilityName` naming the first duplicate.
pub fn validate_facility_names_unique(facilities: &[Facility]) -> Result<(), DomainError> {
    let mut seen: HashSet<(String, String, String, String)> = HashSet::new();
    for facility in facilities {
        let key = (
            facility.region.to_lowercase(),
            facility.zone.to_lowercase(),
            facility.woreda.to_lowercase(),
            facility.name.to_lowercase(),
        );
        if !seen.insert(key) {
            return Err(DomainError::InvalidFacilityName(format!(
                "Facility '{}' is already registered in {} / {} / {}",
                facility.name, facility.region, facility.zone, facility.woreda
            )));
        }
    }
    Ok(())
}

/// Trims an optional text field; blank values become `None`.
#[must_use]
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Facility, FacilityPeriod, Role, Stage, StageOfficers, normalize_route};
use std::str::FromStr;

#[test]
fn test_facility_creation_trims_fields() {
    let facility: Facility = Facility::new(
        "  Adama HC ",
        "Oromia",
        "East Shewa",
        "Adama",
        Some(" R7 "),
        Some(FacilityPeriod::Odd),
    );
    assert_eq!(facility.name, "Adama HC");
    assert_eq!(facility.route(), Some("R7"));
    assert!(facility.facility_id.is_none());
    assert!(facility.is_hp_classified());
}

#[test]
fn test_blank_route_is_unset() {
    assert_eq!(normalize_route(Some("")), None);
    assert_eq!(normalize_route(Some("  ")), None);
    assert_eq!(normalize_route(None), None);
    assert_eq!(normalize_route(Some("R1")), Some(String::from("R1")));
}

#[test]
fn test_facility_without_period_is_not_hp_classified() {
    let facility: Facility =
        Facility::new("Adama HC", "Oromia", "East Shewa", "Adama", Some("R7"), None);
    assert!(!facility.is_hp_classified());
}

#[test]
fn test_facility_period_parsing() {
    assert_eq!(
        FacilityPeriod::parse_optional("Monthly").unwrap(),
        Some(FacilityPeriod::Monthly)
    );
    assert_eq!(FacilityPeriod::parse_optional("").unwrap(), None);
    assert_eq!(FacilityPeriod::parse_optional("  ").unwrap(), None);
    assert!(matches!(
        FacilityPeriod::parse_optional("weekly"),
        Err(DomainError::InvalidFacilityPeriod(_))
    ));
}

#[test]
fn test_role_string_round_trip() {
    for role in Role::ALL {
        assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
    }
    assert!(matches!(
        Role::from_str("supervisor"),
        Err(DomainError::InvalidRole(_))
    ));
}

#[test]
fn test_stage_officer_recording_replaces_previous() {
    let mut officers: StageOfficers = StageOfficers::default();
    assert_eq!(officers.get(Stage::Ewm), None);

    officers.record(Stage::Ewm, "ewm-1");
    officers.record(Stage::Ewm, "ewm-2");
    assert_eq!(officers.get(Stage::Ewm), Some("ewm-2"));
    assert_eq!(officers.get(Stage::Pi), None);
}

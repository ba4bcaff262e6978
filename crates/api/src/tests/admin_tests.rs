// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use odn_flow_audit::AuditEvent;
use odn_flow_domain::{Deliverer, Facility, FacilityPeriod, Role, Vehicle};
use odn_flow_persistence::SqlitePersistence;

use crate::tests::helpers::{
    create_facility, create_owner, create_persistence, create_test_admin, create_test_cause,
    facility_request, now, officer, start_id,
};
use crate::{
    ApiError, CsvImportRowStatus, CsvRowStatus, ImportFacilitiesCsvRequest,
    ImportFacilitiesCsvResponse, PreviewFacilitiesCsvRequest, PreviewFacilitiesCsvResponse,
    RegisterDelivererRequest, RegisterVehicleRequest, UpdateFacilityRoutingRequest,
    get_audit_trail, import_facilities_csv, list_deliverers, list_facilities, list_vehicles,
    preview_facilities_csv, register_deliverer, register_facility, register_vehicle,
    update_facility_routing,
};

const CSV: &str = "name,region,zone,woreda,route,period
Mojo HC,Oromia,East Shewa,Lume,R1,odd
Adama HC,Oromia,East Shewa,Adama,R1,monthly
,Oromia,East Shewa,Lume,R2,even
Dukem HC,Oromia,East Shewa,Akaki,R2,weekly
";

fn vehicle_request(plate: &str) -> RegisterVehicleRequest {
    RegisterVehicleRequest {
        plate_number: String::from(plate),
        description: None,
    }
}

#[test]
fn test_register_facility_normalizes_fields() {
    let mut persistence: SqlitePersistence = create_persistence();
    let mut request = facility_request("  Mojo HC ", Some(" R1 "), Some("ODD"));
    request.region = String::from(" Oromia ");

    let facility: Facility = register_facility(
        &mut persistence,
        &request,
        &create_test_admin(),
        create_test_cause(),
        now(),
    )
    .unwrap();

    assert_eq!(facility.name, "Mojo HC");
    assert_eq!(facility.region, "Oromia");
    assert_eq!(facility.route(), Some("R1"));
    assert_eq!(facility.period, Some(FacilityPeriod::Odd));
    assert_eq!(list_facilities(&mut persistence).unwrap(), vec![facility]);
}

#[test]
fn test_register_facility_requires_admin() {
    let mut persistence: SqlitePersistence = create_persistence();

    let result: Result<Facility, ApiError> = register_facility(
        &mut persistence,
        &facility_request("Mojo HC", Some("R1"), Some("odd")),
        &create_owner(),
        create_test_cause(),
        now(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert!(list_facilities(&mut persistence).unwrap().is_empty());
}

#[test]
fn test_duplicate_facility_name_in_woreda_is_rejected() {
    let mut persistence: SqlitePersistence = create_persistence();
    create_facility(&mut persistence, "Mojo HC", Some("R1"), Some("odd"));

    let result: Result<Facility, ApiError> = register_facility(
        &mut persistence,
        &facility_request("MOJO hc", Some("R2"), None),
        &create_test_admin(),
        create_test_cause(),
        now(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { ref field, .. }) if field == "name"));
}

#[test]
fn test_unknown_period_class_is_rejected() {
    let mut persistence: SqlitePersistence = create_persistence();

    let result: Result<Facility, ApiError> = register_facility(
        &mut persistence,
        &facility_request("Mojo HC", Some("R1"), Some("weekly")),
        &create_test_admin(),
        create_test_cause(),
        now(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { ref field, .. }) if field == "period"));
}

#[test]
fn test_update_facility_routing_keeps_identity() {
    let mut persistence: SqlitePersistence = create_persistence();
    let facility_id: i64 = create_facility(&mut persistence, "Mojo HC", Some("R1"), Some("odd"));

    let updated: Facility = update_facility_routing(
        &mut persistence,
        &UpdateFacilityRoutingRequest {
            facility_id,
            route: Some(String::from("R7")),
            period: Some(String::from("even")),
        },
        &create_test_admin(),
        create_test_cause(),
        now(),
    )
    .unwrap();

    assert_eq!(updated.facility_id, Some(facility_id));
    assert_eq!(updated.name, "Mojo HC");
    assert_eq!(updated.route(), Some("R7"));
    assert_eq!(updated.period, Some(FacilityPeriod::Even));
    assert_eq!(list_facilities(&mut persistence).unwrap(), vec![updated]);
}

#[test]
fn test_update_routing_of_unknown_facility_is_not_found() {
    let mut persistence: SqlitePersistence = create_persistence();

    let result: Result<Facility, ApiError> = update_facility_routing(
        &mut persistence,
        &UpdateFacilityRoutingRequest {
            facility_id: 55,
            route: None,
            period: None,
        },
        &create_test_admin(),
        create_test_cause(),
        now(),
    );

    assert!(matches!(result, Err(ApiError::NotFound { .. })));
}

#[test]
fn test_preview_reports_row_errors() {
    let mut persistence: SqlitePersistence = create_persistence();

    let preview: PreviewFacilitiesCsvResponse = preview_facilities_csv(
        &mut persistence,
        &PreviewFacilitiesCsvRequest {
            csv_content: String::from(CSV),
        },
        &create_test_admin(),
    )
    .unwrap();

    assert_eq!(preview.total_rows, 4);
    assert_eq!(preview.valid_count, 2);
    assert_eq!(preview.invalid_count, 2);
    assert_eq!(preview.rows[2].status, CsvRowStatus::Invalid);
    assert!(preview.rows[2].errors[0].starts_with("name"));
    assert!(preview.rows[3].errors[0].starts_with("period"));
    assert!(list_facilities(&mut persistence).unwrap().is_empty());
}

#[test]
fn test_preview_rejects_missing_headers() {
    let mut persistence: SqlitePersistence = create_persistence();

    let result: Result<PreviewFacilitiesCsvResponse, ApiError> = preview_facilities_csv(
        &mut persistence,
        &PreviewFacilitiesCsvRequest {
            csv_content: String::from("name,region\nMojo HC,Oromia\n"),
        },
        &create_test_admin(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref message, .. }) if message.contains("zone, woreda")
    ));
}

#[test]
fn test_preview_flags_duplicates_within_file_and_registry() {
    let mut persistence: SqlitePersistence = create_persistence();
    create_facility(&mut persistence, "Mojo HC", Some("R1"), Some("odd"));
    let csv: &str = "name,region,zone,woreda
Mojo HC,Oromia,East Shewa,Lume
Adama HC,Oromia,East Shewa,Adama
adama hc,Oromia,East Shewa,Adama
";

    let preview: PreviewFacilitiesCsvResponse = preview_facilities_csv(
        &mut persistence,
        &PreviewFacilitiesCsvRequest {
            csv_content: String::from(csv),
        },
        &create_test_admin(),
    )
    .unwrap();

    let statuses: Vec<CsvRowStatus> = preview.rows.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            CsvRowStatus::Invalid,
            CsvRowStatus::Valid,
            CsvRowStatus::Invalid
        ]
    );
}

#[test]
fn test_import_stores_valid_rows_and_reports_failures() {
    let mut persistence: SqlitePersistence = create_persistence();

    let response: ImportFacilitiesCsvResponse = import_facilities_csv(
        &mut persistence,
        &ImportFacilitiesCsvRequest {
            csv_content: String::from(CSV),
            selected_rows: None,
        },
        &create_test_admin(),
        &create_test_cause(),
        now(),
    )
    .unwrap();

    assert_eq!(response.total_selected, 4);
    assert_eq!(response.successful_count, 2);
    assert_eq!(response.failed_count, 2);
    assert_eq!(response.results[0].status, CsvImportRowStatus::Success);
    assert!(response.results[0].facility_id.is_some());
    assert_eq!(response.results[3].status, CsvImportRowStatus::Failed);
    assert!(response.results[3].error.is_some());

    let names: Vec<String> = list_facilities(&mut persistence)
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Mojo HC", "Adama HC"]);
}

#[test]
fn test_import_only_selected_rows() {
    let mut persistence: SqlitePersistence = create_persistence();

    let response: ImportFacilitiesCsvResponse = import_facilities_csv(
        &mut persistence,
        &ImportFacilitiesCsvRequest {
            csv_content: String::from(CSV),
            selected_rows: Some(vec![2]),
        },
        &create_test_admin(),
        &create_test_cause(),
        now(),
    )
    .unwrap();

    assert_eq!(response.total_selected, 1);
    assert_eq!(response.results[0].row_number, 2);
    assert_eq!(response.results[0].name.as_deref(), Some("Adama HC"));
    assert_eq!(list_facilities(&mut persistence).unwrap().len(), 1);
}

#[test]
fn test_import_requires_admin() {
    let mut persistence: SqlitePersistence = create_persistence();

    let result: Result<ImportFacilitiesCsvResponse, ApiError> = import_facilities_csv(
        &mut persistence,
        &ImportFacilitiesCsvRequest {
            csv_content: String::from(CSV),
            selected_rows: None,
        },
        &officer(Role::PiOfficer),
        &create_test_cause(),
        now(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_duplicate_plate_is_invalid_input() {
    let mut persistence: SqlitePersistence = create_persistence();
    register_vehicle(
        &mut persistence,
        &vehicle_request("3-AA-12345"),
        &create_test_admin(),
        create_test_cause(),
        now(),
    )
    .unwrap();

    let result: Result<Vehicle, ApiError> = register_vehicle(
        &mut persistence,
        &vehicle_request("3-AA-12345"),
        &create_test_admin(),
        create_test_cause(),
        now(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "plate_number"
    ));
    assert_eq!(list_vehicles(&mut persistence).unwrap().len(), 1);
}

#[test]
fn test_blank_plate_is_invalid_input() {
    let mut persistence: SqlitePersistence = create_persistence();

    let result: Result<Vehicle, ApiError> = register_vehicle(
        &mut persistence,
        &vehicle_request("  "),
        &create_test_admin(),
        create_test_cause(),
        now(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_register_deliverer_is_available() {
    let mut persistence: SqlitePersistence = create_persistence();

    register_deliverer(
        &mut persistence,
        &RegisterDelivererRequest {
            name: String::from(" Tsegaye "),
            phone: Some(String::from(" ")),
        },
        &create_test_admin(),
        create_test_cause(),
        now(),
    )
    .unwrap();

    let deliverers: Vec<Deliverer> = list_deliverers(&mut persistence).unwrap();
    assert_eq!(deliverers.len(), 1);
    assert_eq!(deliverers[0].name, "Tsegaye");
    assert_eq!(deliverers[0].phone, None);
    assert!(deliverers[0].is_available);
}

#[test]
fn test_audit_trail_lists_process_events_in_order() {
    let mut persistence: SqlitePersistence = create_persistence();
    let facility_id: i64 = create_facility(&mut persistence, "Mojo HC", Some("R1"), Some("odd"));
    let process_id: i64 = start_id(&mut persistence, facility_id);

    let trail: Vec<AuditEvent> = get_audit_trail(&mut persistence, process_id).unwrap();

    let actions: Vec<&str> = trail.iter().map(|e| e.action.name.as_str()).collect();
    assert_eq!(actions, vec!["StartProcess"]);
    assert_eq!(trail[0].actor.role, Role::O2cOfficer);
}

#[test]
fn test_audit_trail_of_unknown_process_is_not_found() {
    let mut persistence: SqlitePersistence = create_persistence();

    let result: Result<Vec<AuditEvent>, ApiError> = get_audit_trail(&mut persistence, 12);

    assert!(matches!(result, Err(ApiError::NotFound { .. })));
}

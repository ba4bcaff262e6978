// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Resolving "today" in the organization's time zone.
//!
//! The reporting calendar itself is pure and lives in the domain crate. The
//! only impure step is deciding which wall-clock date it is, which depends on
//! the zone the organization operates in rather than the server's zone.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use odn_flow_domain::{ReportingPeriod, to_reporting_period};
use time::{Date, Month};

use crate::error::{ApiError, translate_domain_error};
use crate::request_response::PeriodInfo;

/// Zone used when none is configured.
pub const DEFAULT_TIME_ZONE: &str = "Africa/Addis_Ababa";

/// Parses an IANA time zone name.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the name is not a known zone.
pub fn parse_time_zone(name: &str) -> Result<Tz, ApiError> {
    name.trim().parse().map_err(|_| ApiError::InvalidInput {
        field: String::from("timezone"),
        message: format!("Unknown time zone '{name}'"),
    })
}

fn to_time_date(local: NaiveDate) -> Result<Date, ApiError> {
    let internal = |reason: String| ApiError::Internal { message: reason };
    let month: Month = u8::try_from(local.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| internal(format!("invalid month in {local}")))?;
    let day: u8 =
        u8::try_from(local.day()).map_err(|_| internal(format!("invalid day in {local}")))?;
    Date::from_calendar_date(local.year(), month, day)
        .map_err(|e| internal(format!("cannot represent {local}: {e}")))
}

/// Returns the calendar date of `instant` as seen in `zone`.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the date cannot be represented.
pub fn date_in_zone(instant: DateTime<Utc>, zone: Tz) -> Result<Date, ApiError> {
    to_time_date(instant.with_timezone(&zone).date_naive())
}

/// Returns today's date in `zone`.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the date cannot be represented.
pub fn today_in_zone(zone: Tz) -> Result<Date, ApiError> {
    date_in_zone(Utc::now(), zone)
}

/// Returns the reporting period that is current in `zone`.
///
/// # Errors
///
/// Returns an error if today's date cannot be converted.
pub fn current_period(zone: Tz) -> Result<ReportingPeriod, ApiError> {
    to_reporting_period(today_in_zone(zone)?).map_err(translate_domain_error)
}

/// Computes the reporting period a date falls in.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the date is outside the supported range.
pub fn compute_period(date: Date) -> Result<PeriodInfo, ApiError> {
    let period: ReportingPeriod = to_reporting_period(date).map_err(translate_domain_error)?;
    Ok(PeriodInfo::from(period))
}

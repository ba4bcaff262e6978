// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route readiness evaluation.
//!
//! A route is ready for a vehicle request once every facility on it has
//! reached EWM completion for the period. Readiness is **computed**, not
//! stored; it is a pure function of the facilities on the route and the
//! processes recorded for the route and period.

use crate::calendar::ReportingPeriod;
use crate::process_status::ProcessStatus;
use crate::types::Process;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate readiness of one route for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteReadiness {
    pub route: String,
    pub period: ReportingPeriod,
    /// Facilities without a process or still below EWM completion.
    pub remaining: usize,
    /// Facilities that have a process for the period.
    pub started: usize,
    /// True iff nothing remains and at least one process exists.
    pub ready: bool,
}

/// Evaluates readiness of a route.
///
/// The facilities counted are every facility with a process on the route
/// plus the facilities in `eligible_facility_ids` (those currently assigned
/// the route that are eligible in Regular mode) with no process in the
/// period at all. A facility moved here while its process runs on another
/// route is therefore not waited for. When a facility has more than one
/// process on the route, the latest one counts.
///
/// # Arguments
///
/// * `route` - The route code
/// * `period` - The reporting period
/// * `eligible_facility_ids` - Regular-eligible facilities on the route
/// * `processes` - Processes recorded for the period, on any route
#[must_use]
pub fn evaluate_route_readiness(
    route: &str,
    period: ReportingPeriod,
    eligible_facility_ids: &[i64],
    processes: &[Process],
) -> RouteReadiness {
    // Unpersisted processes sort after every stored one.
    let mut latest: BTreeMap<i64, (i64, ProcessStatus)> = BTreeMap::new();
    for process in processes
        .iter()
        .filter(|p| p.route == route && p.period == period)
    {
        let order: i64 = process.process_id.unwrap_or(i64::MAX);
        latest
            .entry(process.facility_id)
            .and_modify(|entry| {
                if order >= entry.0 {
                    *entry = (order, process.status);
                }
            })
            .or_insert((order, process.status));
    }

    let started_elsewhere: BTreeSet<i64> = processes
        .iter()
        .filter(|p| p.route != route && p.period == period)
        .map(|p| p.facility_id)
        .collect();

    let facilities: BTreeSet<i64> = eligible_facility_ids
        .iter()
        .copied()
        .filter(|id| !started_elsewhere.contains(id))
        .chain(latest.keys().copied())
        .collect();

    let remaining: usize = facilities
        .iter()
        .filter(|id| {
            latest
                .get(*id)
                .is_none_or(|(_, status)| !status.has_reached(ProcessStatus::EwmCompleted))
        })
        .count();

    let started: usize = latest.len();

    RouteReadiness {
        route: route.to_string(),
        period,
        remaining,
        started,
        ready: remaining == 0 && started > 0,
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, PeriodClass, ReportingPeriod, is_gregorian_leap_year, new_year_date,
    to_reporting_period,
};
use time::macros::date;

#[test]
fn test_day_before_new_year_belongs_to_previous_year() {
    let period: ReportingPeriod = to_reporting_period(date!(2024 - 09 - 10)).unwrap();
    assert_eq!(period.year(), 2016);
}

#[test]
fn test_new_year_in_leap_year_starts_meskerem() {
    let period: ReportingPeriod = to_reporting_period(date!(2024 - 09 - 12)).unwrap();
    assert_eq!(period.year(), 2017);
    assert_eq!(period.month_index(), 0);
    assert_eq!(period.month_name(), "Meskerem");
    assert_eq!(period.period_class(), Some(PeriodClass::Odd));
}

#[test]
fn test_day_before_leap_new_year_is_pagume() {
    let period: ReportingPeriod = to_reporting_period(date!(2024 - 09 - 11)).unwrap();
    assert_eq!(period.year(), 2016);
    assert_eq!(period.month_index(), 12);
    assert_eq!(period.month_name(), "Pagume");
    assert_eq!(period.period_class(), None);
}

#[test]
fn test_second_month_is_even() {
    let period: ReportingPeriod = to_reporting_period(date!(2025 - 10 - 11)).unwrap();
    assert_eq!(period.year(), 2018);
    assert_eq!(period.month_index(), 1);
    assert_eq!(period.month_name(), "Tikimt");
    assert_eq!(period.period_class(), Some(PeriodClass::Even));
}

#[test]
fn test_january_falls_in_fifth_month() {
    // 125 days after the 2024-09-12 new year.
    let period: ReportingPeriod = to_reporting_period(date!(2025 - 01 - 15)).unwrap();
    assert_eq!(period.year(), 2017);
    assert_eq!(period.month_index(), 4);
    assert_eq!(period.month_name(), "Tir");
}

#[test]
fn test_month_index_is_always_in_range() {
    let mut day = date!(2023 - 01 - 01);
    while day < date!(2026 - 01 - 01) {
        let period: ReportingPeriod = to_reporting_period(day).unwrap();
        assert!(period.month_index() <= 12, "{day} produced {period:?}");
        day = day.next_day().unwrap();
    }
}

#[test]
fn test_from_parts_rejects_out_of_range_index() {
    let result = ReportingPeriod::from_parts(2017, 13);
    assert!(matches!(
        result,
        Err(DomainError::InvalidMonthIndex { index: 13 })
    ));
}

#[test]
fn test_next_and_previous_roll_over_year() {
    let pagume: ReportingPeriod = ReportingPeriod::from_parts(2016, 12).unwrap();
    let meskerem: ReportingPeriod = ReportingPeriod::from_parts(2017, 0).unwrap();
    assert_eq!(pagume.next(), meskerem);
    assert_eq!(meskerem.previous(), pagume);

    let tikimt: ReportingPeriod = ReportingPeriod::from_parts(2017, 1).unwrap();
    assert_eq!(meskerem.next(), tikimt);
    assert_eq!(tikimt.previous(), meskerem);
}

#[test]
fn test_period_key_format() {
    let period: ReportingPeriod = ReportingPeriod::from_parts(2017, 0).unwrap();
    assert_eq!(period.key(), "2017-Meskerem");
    assert_eq!(period.to_string(), "2017-Meskerem");
}

#[test]
fn test_gregorian_leap_rule() {
    assert!(is_gregorian_leap_year(2024));
    assert!(is_gregorian_leap_year(2000));
    assert!(!is_gregorian_leap_year(1900));
    assert!(!is_gregorian_leap_year(2023));
}

#[test]
fn test_new_year_date_depends_on_leap_year() {
    assert_eq!(new_year_date(2024).unwrap(), date!(2024 - 09 - 12));
    assert_eq!(new_year_date(2025).unwrap(), date!(2025 - 09 - 11));
}

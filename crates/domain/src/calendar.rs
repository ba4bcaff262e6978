// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reporting period calculation on the organization's 13-month calendar.
//!
//! The calendar year starts on September 11 or 12 of the Gregorian
//! calendar and is divided into twelve 30-day months plus a short
//! thirteenth month (Pagume). Reporting periods are **computed**, never
//! stored; persisted records only carry `(year, month_index)`.
//!
//! ## Invariants
//!
//! - `month_index` is always within `0..=12`
//! - Month 12 has no odd/even class
//! - The conversion is a pure function of the input date

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

/// Month names, indexed by `month_index`.
pub const MONTH_NAMES: [&str; 13] = [
    "Meskerem", "Tikimt", "Hidar", "Tahsas", "Tir", "Yekatit", "Megabit", "Miazia", "Genbot",
    "Sene", "Hamle", "Nehase", "Pagume",
];

/// Index of the short thirteenth month.
pub const PAGUME_INDEX: u8 = 12;

/// Binary period class derived from the 1-based month number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodClass {
    /// Months 1, 3, 5, ... 11.
    Odd,
    /// Months 2, 4, 6, ... 12.
    Even,
}

impl PeriodClass {
    /// Returns the string representation of the class.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Odd => "odd",
            Self::Even => "even",
        }
    }
}

impl std::fmt::Display for PeriodClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One month of the organization calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportingPeriod {
    year: i32,
    month_index: u8,
}

impl ReportingPeriod {
    /// Rebuilds a period from its stored parts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMonthIndex` if `month_index > 12`.
    pub const fn from_parts(year: i32, month_index: u8) -> Result<Self, DomainError> {
        if month_index > PAGUME_INDEX {
            return Err(DomainError::InvalidMonthIndex { index: month_index });
        }
        Ok(Self { year, month_index })
    }

    /// Returns the organization calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the zero-based month index (0..=12).
    #[must_use]
    pub const fn month_index(&self) -> u8 {
        self.month_index
    }

    /// Returns the month name.
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.month_index)]
    }

    /// Returns the odd/even class, or `None` for Pagume.
    #[must_use]
    pub const fn period_class(&self) -> Option<PeriodClass> {
        if self.month_index == PAGUME_INDEX {
            return None;
        }
        if (self.month_index + 1) % 2 == 0 {
            Some(PeriodClass::Even)
        } else {
            Some(PeriodClass::Odd)
        }
    }

    /// Returns the display key, e.g. `2017-Meskerem`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.year, self.month_name())
    }

    /// Returns the following period, rolling over after Pagume.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month_index == PAGUME_INDEX {
            Self {
                year: self.year + 1,
                month_index: 0,
            }
        } else {
            Self {
                year: self.year,
                month_index: self.month_index + 1,
            }
        }
    }

    /// Returns the preceding period, rolling back before Meskerem.
    #[must_use]
    pub const fn previous(&self) -> Self {
        if self.month_index == 0 {
            Self {
                year: self.year - 1,
                month_index: PAGUME_INDEX,
            }
        } else {
            Self {
                year: self.year,
                month_index: self.month_index - 1,
            }
        }
    }
}

impl std::fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Returns true if the Gregorian year is a leap year.
#[must_use]
pub const fn is_gregorian_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the organization new-year date within a Gregorian year.
///
/// September 12 in Gregorian leap years, September 11 otherwise.
///
/// # Errors
///
/// Returns an error if the date cannot be represented.
pub fn new_year_date(gregorian_year: i32) -> Result<Date, DomainError> {
    let day: u8 = if is_gregorian_leap_year(gregorian_year) {
        12
    } else {
        11
    };
    Date::from_calendar_date(gregorian_year, Month::September, day).map_err(|e| {
        DomainError::DateArithmeticOverflow {
            operation: format!("computing new year for {gregorian_year}: {e}"),
        }
    })
}

/// Converts a Gregorian date into its reporting period.
///
/// # Arguments
///
/// * `date` - The wall-clock date to convert
///
/// # Errors
///
/// Returns an error only if the new-year date for the surrounding
/// Gregorian years cannot be represented.
pub fn to_reporting_period(date: Date) -> Result<ReportingPeriod, DomainError> {
    let gregorian_year: i32 = date.year();
    let this_new_year: Date = new_year_date(gregorian_year)?;

    let (year, new_year): (i32, Date) = if date >= this_new_year {
        (gregorian_year - 7, this_new_year)
    } else {
        (gregorian_year - 8, new_year_date(gregorian_year - 1)?)
    };

    let diff_days: i64 = (date - new_year).whole_days();
    let month_index: u8 = u8::try_from((diff_days / 30).min(i64::from(PAGUME_INDEX)))
        .map_err(|_| DomainError::DateArithmeticOverflow {
            operation: format!("computing month index for {date}"),
        })?;

    ReportingPeriod::from_parts(year, month_index)
}

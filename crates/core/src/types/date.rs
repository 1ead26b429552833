//! Persian solar (Jalali) calendar dates for display.
//!
//! Order confirmations show the placement date the way the shop's customers
//! read dates: day, month name and year of the solar hijri calendar, written
//! with Persian digits.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::price::to_persian_digits;

/// Iran Standard Time offset from UTC (+03:30), in seconds.
pub const IRAN_UTC_OFFSET_SECONDS: i64 = 12_600;

const MONTH_NAMES: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

/// Cumulative day counts before each Gregorian month in a common year.
const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// A date in the Persian solar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolarDate {
    /// Solar hijri year (e.g. 1405).
    pub year: i64,
    /// Month, 1 (Farvardin) through 12 (Esfand).
    pub month: u32,
    /// Day of month, 1 through 31.
    pub day: u32,
}

impl SolarDate {
    /// Convert a Gregorian date.
    #[must_use]
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let gy = i64::from(date.year());
        let gm = date.month();
        let gd = i64::from(date.day());

        let leap_year = if gm > 2 { gy + 1 } else { gy };
        let month_offset = usize::try_from(gm.saturating_sub(1))
            .ok()
            .and_then(|i| DAYS_BEFORE_MONTH.get(i).copied())
            .unwrap_or(0);

        let mut days = 355_666
            + 365 * gy
            + (leap_year + 3).div_euclid(4)
            - (leap_year + 99).div_euclid(100)
            + (leap_year + 399).div_euclid(400)
            + gd
            + month_offset;

        let mut year = -1595 + 33 * days.div_euclid(12_053);
        days = days.rem_euclid(12_053);
        year += 4 * days.div_euclid(1461);
        days = days.rem_euclid(1461);
        if days > 365 {
            year += (days - 1).div_euclid(365);
            days = (days - 1).rem_euclid(365);
        }

        let (month, day) = if days < 186 {
            (1 + days / 31, 1 + days % 31)
        } else {
            (7 + (days - 186) / 30, 1 + (days - 186) % 30)
        };

        Self {
            year,
            month: u32::try_from(month).unwrap_or(1),
            day: u32::try_from(day).unwrap_or(1),
        }
    }

    /// Persian name of the month.
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        usize::try_from(self.month.saturating_sub(1))
            .ok()
            .and_then(|i| MONTH_NAMES.get(i).copied())
            .unwrap_or("")
    }
}

impl From<NaiveDate> for SolarDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_gregorian(date)
    }
}

impl std::fmt::Display for SolarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            to_persian_digits(&self.day.to_string()),
            self.month_name(),
            to_persian_digits(&self.year.to_string())
        )
    }
}

/// Render a date as e.g. `۲۶ مهر ۱۴۰۵`.
#[must_use]
pub fn solar_date(date: NaiveDate) -> String {
    SolarDate::from_gregorian(date).to_string()
}

/// Render a date and time as e.g. `۲۶ مهر ۱۴۰۵، ۱۴:۰۵`.
#[must_use]
pub fn solar_date_time(datetime: NaiveDateTime) -> String {
    let time = format!("{:02}:{:02}", datetime.hour(), datetime.minute());
    format!(
        "{}، {}",
        solar_date(datetime.date()),
        to_persian_digits(&time)
    )
}

/// Wall-clock time in Iran for a UTC instant.
#[must_use]
pub fn iran_local_time(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc() + Duration::seconds(IRAN_UTC_OFFSET_SECONDS)
}

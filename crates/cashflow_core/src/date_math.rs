//! Calendar arithmetic for the daily simulation grid.
//!
//! Everything here works on `jiff::civil::Date` and never touches time zones or
//! wall clocks. Day distances use Rata Die day-numbering so that the hot loops
//! (bucketing, month-end detection) stay O(1) per day with no `Span`
//! normalisation involved.
//!
//! Month and year offsets clamp the day-of-month to the length of the target
//! month, optionally towards an *anchor* day (and month) so that a rule anchored
//! on the 31st returns to the 31st after passing through a short month. Results
//! saturate at [`MIN_DATE`] / [`MAX_DATE`] instead of overflowing.

use jiff::civil::Date;

/// Earliest date the engine handles.
pub const MIN_DATE: Date = jiff::civil::date(1, 1, 1);

/// Latest date the engine handles.
pub const MAX_DATE: Date = jiff::civil::date(9999, 12, 31);

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Fast leap year check.
#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Fast inline days-in-month calculation without creating a `jiff::civil::Date`.
#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Proleptic Gregorian algorithm from Baum (2017). Only valid for positive
/// years, which is all the engine admits.
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Convert a Rata Die day number back to a `jiff::civil::Date`.
#[inline]
fn rd_to_date(rd: i32) -> Date {
    // Shift so day 0 = March 1, year 0
    let z = rd + 306;
    let h = 100 * z - 25;
    let a = h / 3_652_425;
    let b = a - a / 4;
    let y = (100 * b + h) / 36_525;
    let c = b + z - 365 * y - y / 4;
    let m = (5 * c + 456) / 153;
    let day = c - (153 * m - 457) / 5;

    let (year, month) = if m > 12 { (y + 1, m - 12) } else { (y, m) };

    jiff::civil::date(year as i16, month as i8, day as i8)
}

/// Number of whole days from `start` to `target` (negative when `target` is earlier).
#[inline]
pub fn day_index(start: Date, target: Date) -> i32 {
    rata_die(target) - rata_die(start)
}

/// Add `n` days to a date, saturating at the supported calendar bounds.
#[inline]
pub fn add_days(d: Date, n: i32) -> Date {
    let rd = rata_die(d)
        .saturating_add(n)
        .clamp(rata_die(MIN_DATE), rata_die(MAX_DATE));
    rd_to_date(rd)
}

/// Build a date from a possibly out-of-range year, clamping the day to the
/// month length and saturating the year to the calendar bounds.
fn clamped_date(year: i32, month: i8, day: i8) -> Date {
    if year > MAX_YEAR {
        return MAX_DATE;
    }
    if year < MIN_YEAR {
        return MIN_DATE;
    }
    let year = year as i16;
    let day = day.clamp(1, days_in_month(year, month));
    jiff::civil::date(year, month, day)
}

/// Add a signed number of months.
///
/// The resulting day is `min(anchor_day.unwrap_or(date.day()), days_in_target_month)`.
pub fn add_months_clamped(date: Date, months: i32, anchor_day: Option<i8>) -> Date {
    let month_index = date.year() as i32 * 12 + (date.month() as i32 - 1) + months;
    let year = month_index.div_euclid(12);
    let month = (month_index.rem_euclid(12) + 1) as i8;
    clamped_date(year, month, anchor_day.unwrap_or(date.day()))
}

/// Add a signed number of years, landing on `anchor_month` (default: the
/// date's own month) and the clamped `anchor_day` (default: the date's day).
pub fn add_years_clamped(
    date: Date,
    years: i32,
    anchor_day: Option<i8>,
    anchor_month: Option<i8>,
) -> Date {
    let year = date.year() as i32 + years;
    let month = anchor_month.unwrap_or(date.month());
    clamped_date(year, month, anchor_day.unwrap_or(date.day()))
}

/// ISO-8601 week-numbering year and week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeek {
    pub year: i16,
    pub week: i8,
}

/// ISO-8601 week of `date`.
///
/// Shifts to the Thursday of the containing Monday-based week; that Thursday's
/// year is the week-year and its ordinal day gives the week number.
pub fn iso_week(date: Date) -> IsoWeek {
    let weekday = date.weekday().to_monday_one_offset() as i32;
    let thursday = add_days(date, 4 - weekday);
    let year_start = jiff::civil::date(thursday.year(), 1, 1);
    let week = day_index(year_start, thursday) / 7 + 1;
    IsoWeek {
        year: thursday.year(),
        week: week as i8,
    }
}

/// True for every day index that closes a calendar month inside the window,
/// including the final simulated day.
pub fn month_end_flags(start: Date, total_days: usize) -> Vec<bool> {
    let mut flags = vec![false; total_days];
    let mut date = start;
    for (i, flag) in flags.iter_mut().enumerate() {
        let next = add_days(date, 1);
        *flag = i + 1 >= total_days || next.month() != date.month() || next.year() != date.year();
        date = next;
    }
    flags
}

/// Consecutive dates starting at `start`.
pub fn dates_from(start: Date, count: usize) -> impl Iterator<Item = Date> {
    (0..count).map(move |i| add_days(start, i as i32))
}

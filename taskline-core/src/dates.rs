//! Working-day calendar arithmetic and due-date parsing.
//!
//! All functions operate on [`NaiveDate`], so both "today" and parsed
//! dates are inherently normalized to day granularity. Anything that
//! depends on the current date takes an explicit `today` argument; the
//! `*_now` wrappers read the local clock.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Public holidays, keyed by ISO year. Years absent from the table have
/// no holidays beyond weekends.
const HOLIDAYS: &[(i32, &[(u32, u32)])] = &[
    (
        2024,
        &[
            (1, 1),
            (3, 29),
            (4, 1),
            (5, 1),
            (5, 9),
            (5, 20),
            (12, 25),
            (12, 26),
        ],
    ),
    (
        2025,
        &[
            (1, 1),
            (4, 18),
            (4, 21),
            (5, 1),
            (5, 29),
            (6, 9),
            (12, 25),
            (12, 26),
        ],
    ),
    (
        2026,
        &[
            (1, 1),
            (4, 3),
            (4, 6),
            (5, 1),
            (5, 14),
            (5, 25),
            (12, 25),
            (12, 26),
        ],
    ),
    (
        2027,
        &[
            (1, 1),
            (3, 26),
            (3, 29),
            (5, 1),
            (5, 6),
            (5, 17),
            (12, 25),
            (12, 26),
        ],
    ),
];

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn holidays_for(year: i32) -> &'static [(u32, u32)] {
    HOLIDAYS
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, days)| *days)
        .unwrap_or(&[])
}

/// The current local date at day granularity.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// True iff `date` is a weekday (Mon-Fri) and not a listed holiday.
pub fn is_working_day(date: NaiveDate) -> bool {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    !holidays_for(date.year()).contains(&(date.month(), date.day()))
}

/// Count of working days strictly after `start` through `end` inclusive.
/// Returns 0 when `start > end`.
pub fn calculate_working_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }
    let mut count = 0;
    let mut day = start;
    while day < end {
        day += Duration::days(1);
        if is_working_day(day) {
            count += 1;
        }
    }
    count
}

/// Advance from `start` until `n` working days have been consumed.
pub fn add_working_days(start: NaiveDate, n: u32) -> NaiveDate {
    let mut date = start;
    let mut remaining = n;
    while remaining > 0 {
        date += Duration::days(1);
        if is_working_day(date) {
            remaining -= 1;
        }
    }
    date
}

/// Signed working-day count from `today` to a due-date string: positive
/// when the due date lies ahead, negative when overdue, `None` when the
/// string does not parse.
pub fn working_days_until_due(due: &str, today: NaiveDate) -> Option<i64> {
    let due_date = parse_due_date(due, today)?;
    if due_date >= today {
        Some(calculate_working_days(today, due_date))
    } else {
        Some(-calculate_working_days(due_date, today))
    }
}

/// Wrapper over [`working_days_until_due`] using the local clock.
pub fn working_days_until_due_now(due: &str) -> Option<i64> {
    working_days_until_due(due, today())
}

/// Parse a free-form due-date string.
///
/// Accepted forms, in order: the literals `today`/`tomorrow`, `D/MMM`
/// (`28/Mar`, current year), `MM/DD` (current year), then a fallback over
/// explicit formats (`2026-03-05`, `3/5/2026`, `5 Mar 2026`, `Mar 5 2026`).
/// Returns `None` on failure — callers treat that as "no date", not an
/// error.
///
/// The `MM/DD` branch and the `%d/%m/%Y`-free fallback can disagree on
/// locale-ambiguous input: `3/4` is always read month-first while a
/// four-digit-year string is read `%m/%d/%Y`. Both paths are kept as-is;
/// there is no canonical resolution for such strings.
pub fn parse_due_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    match s.to_ascii_lowercase().as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some((first, second)) = s.split_once('/') {
        let (first, second) = (first.trim(), second.trim());
        // D/MMM, the canonical display format
        if let (Ok(day), Some(month)) = (first.parse::<u32>(), month_from_abbrev(second)) {
            if let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day) {
                return Some(date);
            }
        }
        // MM/DD with the current year assumed
        if let (Ok(month), Ok(day)) = (first.parse::<u32>(), second.parse::<u32>()) {
            if second.len() <= 2 {
                if let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day) {
                    return Some(date);
                }
            }
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y", "%b %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    None
}

/// Canonical display format: `5/Mar`.
pub fn format_d_mmm(date: NaiveDate) -> String {
    format!("{}/{}", date.day(), MONTH_ABBREV[date.month0() as usize])
}

fn month_from_abbrev(s: &str) -> Option<u32> {
    let lower = s.to_ascii_lowercase();
    MONTH_ABBREV
        .iter()
        .position(|m| m.to_ascii_lowercase() == lower)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekends_are_not_working_days() {
        // 2026-03-07 is a Saturday, 2026-03-08 a Sunday
        assert!(!is_working_day(d(2026, 3, 7)));
        assert!(!is_working_day(d(2026, 3, 8)));
        assert!(is_working_day(d(2026, 3, 9)));
    }

    #[test]
    fn holidays_are_not_working_days() {
        // Good Friday 2026 falls on a weekday
        assert!(!is_working_day(d(2026, 4, 3)));
        // New Year's Day 2026 is a Thursday
        assert!(!is_working_day(d(2026, 1, 1)));
    }

    #[test]
    fn years_without_a_table_only_skip_weekends() {
        // 2030-01-01 is a Tuesday; no holiday table for 2030
        assert!(is_working_day(d(2030, 1, 1)));
    }

    #[test]
    fn working_days_excludes_start_includes_end() {
        // Mon 2026-03-09 .. Fri 2026-03-13: Tue, Wed, Thu, Fri
        assert_eq!(calculate_working_days(d(2026, 3, 9), d(2026, 3, 13)), 4);
        // Same day yields zero
        assert_eq!(calculate_working_days(d(2026, 3, 9), d(2026, 3, 9)), 0);
    }

    #[test]
    fn working_days_zero_when_inverted() {
        assert_eq!(calculate_working_days(d(2026, 3, 13), d(2026, 3, 9)), 0);
    }

    #[test]
    fn working_days_spanning_a_weekend() {
        // Fri 2026-03-06 .. Mon 2026-03-09: only Monday counts
        assert_eq!(calculate_working_days(d(2026, 3, 6), d(2026, 3, 9)), 1);
    }

    #[test]
    fn add_working_days_agrees_with_count() {
        let start = d(2026, 3, 4);
        for n in 0..30 {
            let end = add_working_days(start, n);
            assert_eq!(calculate_working_days(start, end), i64::from(n));
        }
    }

    #[test]
    fn add_working_days_lands_on_a_working_day() {
        // Friday + 1 working day skips the weekend
        assert_eq!(add_working_days(d(2026, 3, 6), 1), d(2026, 3, 9));
    }

    #[test]
    fn parse_d_mmm() {
        let today = d(2026, 2, 1);
        assert_eq!(parse_due_date("28/Mar", today), Some(d(2026, 3, 28)));
        assert_eq!(parse_due_date("5/mar", today), Some(d(2026, 3, 5)));
    }

    #[test]
    fn parse_mm_dd() {
        let today = d(2026, 2, 1);
        assert_eq!(parse_due_date("3/4", today), Some(d(2026, 3, 4)));
        assert_eq!(parse_due_date("12/31", today), Some(d(2026, 12, 31)));
    }

    #[test]
    fn parse_literals() {
        let today = d(2026, 3, 6);
        assert_eq!(parse_due_date("today", today), Some(today));
        assert_eq!(parse_due_date("Tomorrow", today), Some(d(2026, 3, 7)));
    }

    #[test]
    fn parse_fallback_formats() {
        let today = d(2026, 2, 1);
        assert_eq!(parse_due_date("2026-03-05", today), Some(d(2026, 3, 5)));
        assert_eq!(parse_due_date("3/5/2026", today), Some(d(2026, 3, 5)));
        assert_eq!(parse_due_date("5 Mar 2026", today), Some(d(2026, 3, 5)));
    }

    #[test]
    fn parse_garbage_is_none() {
        let today = d(2026, 2, 1);
        assert_eq!(parse_due_date("", today), None);
        assert_eq!(parse_due_date("soonish", today), None);
        assert_eq!(parse_due_date("13/45", today), None);
    }

    #[test]
    fn format_round_trips_at_day_granularity() {
        let today = d(2026, 6, 15);
        for offset in [0i64, 1, 30, 100, 180, -30] {
            let date = today + Duration::days(offset);
            if date.year() != today.year() {
                continue;
            }
            assert_eq!(parse_due_date(&format_d_mmm(date), today), Some(date));
        }
    }

    #[test]
    fn due_in_working_days_signed() {
        // Today Wed 2026-03-04; due Friday = 2 working days out
        let today = d(2026, 3, 4);
        assert_eq!(working_days_until_due("6/Mar", today), Some(2));
        // Due the previous Friday: overdue by 3 working days (Mon..Wed)
        assert_eq!(working_days_until_due("27/Feb", today), Some(-3));
        assert_eq!(working_days_until_due("today", today), Some(0));
        assert_eq!(working_days_until_due("nope", today), None);
    }
}

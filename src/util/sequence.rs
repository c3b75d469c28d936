//! Human-readable document numbers of the form `PREFIX-YYYYMMDD-NNN`.
//!
//! There is no stored counter: the next number is derived by scanning the
//! numbers already issued for the day and taking the maximum ordinal.

use chrono::NaiveDate;

use crate::util::time::date_of;

/// Minimum number of digits in the ordinal.
pub const ORDINAL_WIDTH: usize = 3;

/// What the generator needs to know about one existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuedNumber {
    pub number: Option<String>,
    pub created_at: Option<String>,
}

/// `PREFIX-YYYYMMDD` for the given day.
pub fn day_prefix(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}", prefix, date.format("%Y%m%d"))
}

pub fn format_number(day_prefix: &str, ordinal: u32) -> String {
    format!("{}-{:0width$}", day_prefix, ordinal, width = ORDINAL_WIDTH)
}

/// Number used when nothing was issued yet or the scan failed.
pub fn first_number(day_prefix: &str) -> String {
    format_number(day_prefix, 1)
}

fn all_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `ANY-YYYYMMDD-N…`: a current-format number, possibly of another day or prefix.
fn is_dated_format(number: &str) -> bool {
    let parts: Vec<&str> = number.split('-').collect();
    parts.len() == 3 && parts[1].len() == 8 && all_digits(parts[1]).is_some()
}

/// Ordinal a record contributes to the day, if any.
///
/// Numbers carrying the day prefix contribute the digits after it. Legacy
/// numbers in another format count when the record was created that day,
/// using the digits after their last `-`.
fn ordinal_for_day(record: &IssuedNumber, day_prefix: &str, date: NaiveDate) -> Option<u32> {
    let number = record.number.as_deref()?.trim();
    if let Some(rest) = number.strip_prefix(day_prefix).and_then(|r| r.strip_prefix('-')) {
        return all_digits(rest);
    }
    if is_dated_format(number) {
        return None;
    }
    let created_on = record.created_at.as_deref().and_then(date_of)?;
    if created_on != date {
        return None;
    }
    let tail = number.rsplit('-').next()?;
    all_digits(tail)
}

/// Next free number for `date`: one past the highest ordinal issued that day.
pub fn next_number<'a, I>(prefix: &str, date: NaiveDate, records: I) -> String
where
    I: IntoIterator<Item = &'a IssuedNumber>,
{
    let day_prefix = day_prefix(prefix, date);
    let max = records
        .into_iter()
        .filter_map(|record| ordinal_for_day(record, &day_prefix, date))
        .max()
        .unwrap_or(0);
    format_number(&day_prefix, max.saturating_add(1))
}

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

/// Current instant as stored in `createdAt`/`updatedAt`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar day (UTC) of a stored timestamp. Plain `YYYY-MM-DD` values are
/// accepted as well.
pub fn date_of(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp.trim())
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| timestamp.get(..10).and_then(parse_date))
}

/// Midnight UTC of `date`, in the stored timestamp format.
pub fn day_start(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", format_date(date))
}

/// Inclusive range of calendar days used by the list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, String> {
        let parse = |raw: Option<&str>, name: &str| -> Result<Option<NaiveDate>, String> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(None),
                Some(value) => parse_date(value)
                    .map(Some)
                    .ok_or_else(|| format!("{} must be formatted as YYYY-MM-DD, got '{}'", name, value)),
            }
        };
        let range = DateRange {
            start: parse(start, "startDate")?,
            end: parse(end, "endDate")?,
        };
        if let (Some(start), Some(end)) = (range.start, range.end) {
            if start > end {
                return Err("startDate cannot be after endDate".to_string());
            }
        }
        Ok(range)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Inclusive lower bound on stored timestamps.
    pub fn lower_bound(&self) -> Option<String> {
        self.start.map(day_start)
    }

    /// Exclusive upper bound on stored timestamps (midnight after `end`).
    pub fn upper_bound(&self) -> Option<String> {
        self.end.map(|end| day_start(end + Duration::days(1)))
    }

    pub fn contains(&self, timestamp: Option<&str>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = timestamp.and_then(date_of) else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

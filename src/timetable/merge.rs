use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use super::model::{Element, Period};
use crate::UntisError;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a period timestamp such as `2024-09-02T07:45Z`.
///
/// Timestamps without an offset are taken as UTC, so both forms order
/// against each other.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, UntisError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| UntisError::MalformedInput(format!("unparseable timestamp {value:?}")))
}

fn same_elements(current: &[Element], next: &[Element]) -> bool {
    current.len() == next.len()
        && current
            .iter()
            .zip(next)
            .all(|(a, b)| a.same_reference(b))
}

/// Whether `next` continues `current` without a break: it starts exactly
/// when `current` ends and references the same elements in the same order.
fn continues(current: &Period, next: &Period) -> bool {
    current.end_date_time == next.start_date_time && same_elements(&current.elements, &next.elements)
}

/// Sorts periods by start time and collapses runs of back-to-back periods of
/// the same lesson into one period spanning the whole run.
///
/// The sort is stable. A merged period keeps every field of the first period
/// of its run and takes the end time of the last one.
pub fn merge_periods(periods: Vec<Period>) -> Result<Vec<Period>, UntisError> {
    let received = periods.len();
    if received < 2 {
        return Ok(periods);
    }

    let mut keyed = periods
        .into_iter()
        .map(|period| Ok((parse_timestamp(&period.start_date_time)?, period)))
        .collect::<Result<Vec<_>, UntisError>>()?;
    keyed.sort_by_key(|(start, _)| *start);

    let mut merged: Vec<Period> = Vec::with_capacity(received);
    for (_, period) in keyed {
        match merged.last_mut() {
            Some(current) if continues(current, &period) => {
                current.end_date_time = period.end_date_time;
            }
            _ => merged.push(period),
        }
    }

    debug!(received, merged = merged.len(), "Merged contiguous periods");

    Ok(merged)
}

//! Human-readable note date labels.
//!
//! Dates that fail to parse are shown verbatim.

use crate::model::note::parse_timestamp;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
const TIME_FORMAT: &str = "%I:%M %p";

/// Card label relative to `now`: `Today, 09:05 AM`, `Yesterday, 09:05 AM`,
/// or `5/1/2024, 09:05 AM`.
///
/// Rendered in the timezone of `now`.
pub fn format_card_date<Tz>(date: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(at) = parse_timestamp(date) else {
        return date.to_string();
    };
    let local = at.with_timezone(&now.timezone());
    let age_hours = now
        .clone()
        .signed_duration_since(local.clone())
        .num_milliseconds()
        .div_euclid(MILLIS_PER_HOUR);
    let time = local.format(TIME_FORMAT);

    if age_hours < 24 {
        format!("Today, {time}")
    } else if age_hours < 48 {
        format!("Yesterday, {time}")
    } else {
        format!("{}, {time}", local.format("%-m/%-d/%Y"))
    }
}

/// Detail label: `Wednesday, May 1, 2024 at 09:30 AM`, rendered in `tz`.
pub fn format_detail_date<Tz>(date: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match parse_timestamp(date) {
        Some(at) => at
            .with_timezone(tz)
            .format("%A, %B %-d, %Y at %I:%M %p")
            .to_string(),
        None => date.to_string(),
    }
}

//! Floating-time calendar timestamps.
//!
//! Dose times are clinic wall-clock times. They are written as iCalendar
//! "floating" date-times (`YYYYMMDDTHHMMSS`, no `Z`, no `TZID`) so every
//! calendar app shows the same hour the clinic meant, wherever the device is.

use crate::types::{parse_date, parse_time};
use crate::{DoseSlot, Error, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

/// Length of every encoded timestamp
pub const TIMESTAMP_LEN: usize = 15;

/// Encode a clinic-local date and time as a floating timestamp
///
/// Fails for years that do not fit four digits and for leap-second times,
/// since neither can be written in the fixed-width form.
pub fn encode(date: NaiveDate, time: NaiveTime) -> Result<String> {
    if !(0..=9999).contains(&date.year()) {
        return Err(Error::InvalidDateTime(format!(
            "year {} cannot be encoded in four digits",
            date.year()
        )));
    }
    if time.nanosecond() >= 1_000_000_000 {
        return Err(Error::InvalidDateTime(format!(
            "leap second {} cannot be encoded",
            time
        )));
    }

    Ok(NaiveDateTime::new(date, time)
        .format("%Y%m%dT%H%M%S")
        .to_string())
}

/// Encode from `YYYY-MM-DD` and `HH:MM[:SS]` text
pub fn encode_str(date: &str, time: &str) -> Result<String> {
    encode(parse_date(date)?, parse_time(time)?)
}

/// Start and end timestamps for one calendar event
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct EventTimes {
    pub start: String,
    pub end: String,
}

/// Floating start/end timestamps for a slot lasting `minutes`
///
/// The end rolls over to the next date when the appointment crosses midnight.
pub fn event_times(slot: &DoseSlot, minutes: u32) -> Result<EventTimes> {
    let start = NaiveDateTime::new(slot.date, slot.time);
    let end = start
        .checked_add_signed(Duration::minutes(i64::from(minutes)))
        .ok_or_else(|| Error::DateOutOfRange(format!("{} + {} minutes", start, minutes)))?;

    Ok(EventTimes {
        start: encode(start.date(), start.time())?,
        end: encode(end.date(), end.time())?,
    })
}

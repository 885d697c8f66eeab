//! Core domain types for laser-therapy dose scheduling.
//!
//! This module defines:
//! - Prescription input and the dosing protocol it carries
//! - Interval rules between consecutive doses
//! - Clinic operating configuration
//! - Dose slots produced by the schedule builder

use crate::i18n::{Locale, LocalizedText};
use crate::schedule::MAX_DOSES;
use crate::{Error, Result};
use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Protocol Types
// ============================================================================

/// Spacing rule applied to the previous dose date to get the next candidate
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntervalRule {
    /// Fixed spacing in days ("+3 days")
    Days(u32),
    /// Fixed spacing in weeks ("+1 week")
    Weeks(u32),
    /// Weekly pattern: the next listed weekday strictly after the previous dose
    Weekdays(Vec<Weekday>),
}

impl IntervalRule {
    /// Reject rules that cannot move the schedule forward
    pub fn validate(&self) -> Result<()> {
        match self {
            IntervalRule::Days(0) => Err(Error::InvalidProtocol(
                "interval of 0 days would stack doses on one date".into(),
            )),
            IntervalRule::Weeks(0) => Err(Error::InvalidProtocol(
                "interval of 0 weeks would stack doses on one date".into(),
            )),
            IntervalRule::Weekdays(days) if days.is_empty() => Err(Error::InvalidProtocol(
                "weekly pattern lists no weekdays".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Candidate date for the dose following one given on `previous`
    ///
    /// The candidate is not yet checked against clinic closures.
    pub fn next_after(&self, previous: NaiveDate) -> Result<NaiveDate> {
        let step = match self {
            IntervalRule::Days(n) => u64::from(*n),
            IntervalRule::Weeks(n) => u64::from(*n) * 7,
            IntervalRule::Weekdays(days) => {
                let mut found = None;
                for offset in 1..=7u64 {
                    let candidate = previous.checked_add_days(Days::new(offset)).ok_or_else(|| {
                        Error::DateOutOfRange(format!("{} + {} days", previous, offset))
                    })?;
                    if days.contains(&candidate.weekday()) {
                        found = Some(offset);
                        break;
                    }
                }
                found.ok_or_else(|| {
                    Error::InvalidProtocol("weekly pattern lists no weekdays".into())
                })?
            }
        };

        previous
            .checked_add_days(Days::new(step))
            .ok_or_else(|| Error::DateOutOfRange(format!("{} + {} days", previous, step)))
    }
}

impl fmt::Display for IntervalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalRule::Days(1) => write!(f, "+1 day"),
            IntervalRule::Days(n) => write!(f, "+{} days", n),
            IntervalRule::Weeks(1) => write!(f, "+1 week"),
            IntervalRule::Weeks(n) => write!(f, "+{} weeks", n),
            IntervalRule::Weekdays(days) => {
                let names: Vec<String> = days.iter().map(|d| d.to_string()).collect();
                write!(f, "weekly:{}", names.join(","))
            }
        }
    }
}

impl FromStr for IntervalRule {
    type Err = Error;

    /// Accepts "+3 days", "3 days", "3d", "1 week", "2w", "mon,thu",
    /// and "weekly:mon,thu"
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim().to_lowercase();

        if text.starts_with('-') {
            return Err(Error::InvalidProtocol(format!(
                "negative interval '{}' is not allowed",
                s.trim()
            )));
        }

        let text = text.trim_start_matches('+').trim();
        let pattern = text.strip_prefix("weekly:").unwrap_or(text);

        if pattern.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let days = pattern
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| {
                    d.parse::<Weekday>().map_err(|_| {
                        Error::InvalidProtocol(format!("unknown weekday '{}' in '{}'", d, s.trim()))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(IntervalRule::Weekdays(days));
        }

        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);
        let count: u32 = digits.parse().map_err(|_| {
            Error::InvalidProtocol(format!("interval '{}' has no leading count", s.trim()))
        })?;

        match unit.trim() {
            "" | "d" | "day" | "days" => Ok(IntervalRule::Days(count)),
            "w" | "week" | "weeks" => Ok(IntervalRule::Weeks(count)),
            other => Err(Error::InvalidProtocol(format!(
                "unknown interval unit '{}' in '{}'",
                other,
                s.trim()
            ))),
        }
    }
}

/// How many doses a prescription requires and how they are spaced
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseProtocol {
    pub dose_count: u32,
    pub interval: IntervalRule,
}

// ============================================================================
// Prescription Input
// ============================================================================

/// Caller-supplied prescription, immutable once constructed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaserPrescriptionInput {
    /// Clinic slug; unknown or missing slugs resolve to the fallback clinic
    #[serde(default)]
    pub clinic: Option<String>,
    pub start_date: NaiveDate,
    pub protocol: DoseProtocol,
    #[serde(default, with = "hhmm::option")]
    pub preferred_time: Option<NaiveTime>,
    #[serde(default)]
    pub locale: Locale,
}

impl LaserPrescriptionInput {
    /// Check the protocol before any scheduling work happens
    pub fn validate(&self) -> Result<()> {
        if self.protocol.dose_count == 0 {
            return Err(Error::InvalidProtocol(
                "dose count must be a positive integer".into(),
            ));
        }
        if self.protocol.dose_count > MAX_DOSES {
            return Err(Error::InvalidProtocol(format!(
                "dose count {} exceeds the maximum of {}",
                self.protocol.dose_count, MAX_DOSES
            )));
        }
        self.protocol.interval.validate()
    }
}

// ============================================================================
// Clinic Configuration
// ============================================================================

/// Daily opening window, in clinic local time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatingHours {
    #[serde(with = "hhmm")]
    pub opens: NaiveTime,
    #[serde(with = "hhmm")]
    pub closes: NaiveTime,
}

impl OperatingHours {
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.opens && time < self.closes
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            opens: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            closes: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
        }
    }
}

/// Display-only clinic identity; scheduling never reads it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Branding {
    pub display_name: LocalizedText,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            display_name: LocalizedText::bilingual(
                "Laser Therapy Clinic",
                "Clínica de Terapia Láser",
            ),
            accent_color: default_accent_color(),
            logo_url: None,
        }
    }
}

/// Operating parameters for one clinic
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicConfig {
    pub slug: String,
    #[serde(default = "default_closed_weekdays")]
    pub closed_weekdays: Vec<Weekday>,
    /// One-off closures such as public holidays
    #[serde(default)]
    pub closed_dates: Vec<NaiveDate>,
    #[serde(default = "default_dose_time", with = "hhmm")]
    pub default_dose_time: NaiveTime,
    #[serde(default = "default_appointment_minutes")]
    pub appointment_minutes: u32,
    #[serde(default)]
    pub hours: OperatingHours,
    #[serde(default)]
    pub branding: Branding,
}

impl ClinicConfig {
    /// A clinic with default hours and closures under the given slug
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            closed_weekdays: default_closed_weekdays(),
            closed_dates: Vec::new(),
            default_dose_time: default_dose_time(),
            appointment_minutes: default_appointment_minutes(),
            hours: OperatingHours::default(),
            branding: Branding::default(),
        }
    }

    /// Whether no treatment can be given on `date`
    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.closed_weekdays.contains(&date.weekday()) || self.closed_dates.contains(&date)
    }
}

fn default_closed_weekdays() -> Vec<Weekday> {
    vec![Weekday::Sat, Weekday::Sun]
}

fn default_dose_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn default_appointment_minutes() -> u32 {
    30
}

fn default_accent_color() -> String {
    "#0f766e".into()
}

// ============================================================================
// Schedule Output
// ============================================================================

/// One scheduled treatment appointment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseSlot {
    /// 1-based position in the schedule
    pub index: u32,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub label: Option<String>,
}

// ============================================================================
// Time Parsing
// ============================================================================

/// Parse a wall-clock time written as `HH:MM` or `HH:MM:SS`
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|e| Error::InvalidDateTime(format!("time '{}': {}", text, e)))
}

/// Parse a calendar date written as `YYYY-MM-DD`
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| Error::InvalidDateTime(format!("date '{}': {}", text, e)))
}

/// Serde helpers writing times as `HH:MM` (or `HH:MM:SS` when seconds are set)
pub mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(time: &NaiveTime) -> String {
        if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        }
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_time(&text).map_err(de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.serialize_some(&super::format(t)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| crate::types::parse_time(&text).map_err(de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_interval_days() {
        assert_eq!("+3 days".parse::<IntervalRule>().unwrap(), IntervalRule::Days(3));
        assert_eq!("2d".parse::<IntervalRule>().unwrap(), IntervalRule::Days(2));
        assert_eq!("1 day".parse::<IntervalRule>().unwrap(), IntervalRule::Days(1));
        assert_eq!("5".parse::<IntervalRule>().unwrap(), IntervalRule::Days(5));
    }

    #[test]
    fn test_parse_interval_weeks() {
        assert_eq!("+1 week".parse::<IntervalRule>().unwrap(), IntervalRule::Weeks(1));
        assert_eq!("2W".parse::<IntervalRule>().unwrap(), IntervalRule::Weeks(2));
    }

    #[test]
    fn test_parse_interval_weekdays() {
        let rule: IntervalRule = "weekly:mon, thu".parse().unwrap();
        assert_eq!(rule, IntervalRule::Weekdays(vec![Weekday::Mon, Weekday::Thu]));

        let rule: IntervalRule = "Tuesday".parse().unwrap();
        assert_eq!(rule, IntervalRule::Weekdays(vec![Weekday::Tue]));
    }

    #[test]
    fn test_parse_interval_rejects_negative_and_garbage() {
        assert!(matches!(
            "-2 days".parse::<IntervalRule>(),
            Err(Error::InvalidProtocol(_))
        ));
        assert!("3 fortnights".parse::<IntervalRule>().is_err());
        assert!("mon,funday".parse::<IntervalRule>().is_err());
        assert!("".parse::<IntervalRule>().is_err());
    }

    #[test]
    fn test_degenerate_rules_invalid() {
        assert!(IntervalRule::Days(0).validate().is_err());
        assert!(IntervalRule::Weeks(0).validate().is_err());
        assert!(IntervalRule::Weekdays(vec![]).validate().is_err());
        assert!(IntervalRule::Days(1).validate().is_ok());
    }

    #[test]
    fn test_next_after_fixed_spacing() {
        let start = date(2025, 1, 30);
        assert_eq!(IntervalRule::Days(3).next_after(start).unwrap(), date(2025, 2, 2));
        assert_eq!(IntervalRule::Weeks(2).next_after(start).unwrap(), date(2025, 2, 13));
    }

    #[test]
    fn test_next_after_weekday_pattern_is_strictly_later() {
        // 2025-01-06 is a Monday
        let monday = date(2025, 1, 6);
        let rule = IntervalRule::Weekdays(vec![Weekday::Mon, Weekday::Thu]);
        assert_eq!(rule.next_after(monday).unwrap(), date(2025, 1, 9));
        assert_eq!(rule.next_after(date(2025, 1, 9)).unwrap(), date(2025, 1, 13));
    }

    #[test]
    fn test_next_after_overflow() {
        let result = IntervalRule::Days(10).next_after(NaiveDate::MAX);
        assert!(matches!(result, Err(Error::DateOutOfRange(_))));
    }

    #[test]
    fn test_next_after_weekday_pattern_overflow_is_out_of_range() {
        let rule = IntervalRule::Weekdays(vec![Weekday::Mon, Weekday::Thu]);
        let result = rule.next_after(NaiveDate::MAX);
        assert!(matches!(result, Err(Error::DateOutOfRange(_))));
    }

    #[test]
    fn test_clinic_closed_days() {
        let mut clinic = ClinicConfig::new("test");
        clinic.closed_dates.push(date(2025, 12, 25));

        assert!(clinic.is_closed(date(2025, 1, 4))); // Saturday
        assert!(clinic.is_closed(date(2025, 12, 25))); // holiday, Thursday
        assert!(!clinic.is_closed(date(2025, 1, 6))); // Monday
    }

    #[test]
    fn test_validate_prescription() {
        let mut input = LaserPrescriptionInput {
            clinic: None,
            start_date: date(2025, 1, 6),
            protocol: DoseProtocol {
                dose_count: 0,
                interval: IntervalRule::Days(2),
            },
            preferred_time: None,
            locale: Locale::En,
        };
        assert!(matches!(input.validate(), Err(Error::InvalidProtocol(_))));

        input.protocol.dose_count = 4;
        assert!(input.validate().is_ok());

        input.protocol.dose_count = u32::MAX;
        assert!(matches!(input.validate(), Err(Error::InvalidProtocol(_))));
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("09:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(parse_time("09:05:30").unwrap(), NaiveTime::from_hms_opt(9, 5, 30).unwrap());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_parse_date_rejects_impossible() {
        assert!(parse_date("2025-02-30").is_err());
        assert_eq!(parse_date("2025-02-28").unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_clinic_config_partial_toml() {
        let toml_str = r#"
slug = "eastside"
closed_weekdays = ["Sun"]
default_dose_time = "10:30"

[hours]
opens = "08:00"
closes = "18:00"

[branding]
display_name = { en = "Eastside Laser", es = "Láser Eastside" }
"#;
        let clinic: ClinicConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(clinic.closed_weekdays, vec![Weekday::Sun]);
        assert_eq!(clinic.default_dose_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(clinic.appointment_minutes, 30); // default
        assert_eq!(clinic.branding.accent_color, "#0f766e"); // default
    }

    #[test]
    fn test_dose_slot_json_shape() {
        let slot = DoseSlot {
            index: 1,
            date: date(2025, 1, 9),
            time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
            label: Some("Dose 1 of 1".into()),
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["date"], "2025-01-09");
        assert_eq!(json["time"], "09:05");
    }
}

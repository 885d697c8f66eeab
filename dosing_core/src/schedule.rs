//! Dose schedule builder.
//!
//! Turns a prescription and a resolved clinic configuration into an ordered
//! list of dose slots:
//! - First dose on the start date, pushed forward past closed days
//! - Each later dose one interval after the previous slot, pushed forward
//!   the same way
//! - One time-of-day for the whole schedule

use crate::clinic::ClinicRegistry;
use crate::i18n::dose_label;
use crate::{ClinicConfig, DoseSlot, Error, LaserPrescriptionInput, Result};
use chrono::{Days, NaiveDate};

/// Maximum number of days searched forward for an open clinic day
pub const MAX_ADVANCE_DAYS: u32 = 366;

/// Largest dose count a protocol may request
///
/// Multi-year courses stay well under this; anything larger is rejected as
/// an invalid protocol before any slot is built.
pub const MAX_DOSES: u32 = 1000;

/// Build the dose schedule for a prescription at a clinic
///
/// Returns exactly `dose_count` slots in strictly ascending date order, or
/// an error with no partial schedule.
pub fn build_schedule(
    prescription: &LaserPrescriptionInput,
    clinic: &ClinicConfig,
) -> Result<Vec<DoseSlot>> {
    prescription.validate()?;

    let protocol = &prescription.protocol;
    let total = protocol.dose_count;
    let time = prescription.preferred_time.unwrap_or(clinic.default_dose_time);

    if !clinic.hours.contains(time) {
        tracing::warn!(
            "Dose time {} is outside clinic '{}' hours ({} - {})",
            time,
            clinic.slug,
            clinic.hours.opens,
            clinic.hours.closes
        );
    }

    tracing::info!(
        "Building {} dose schedule at clinic '{}' from {} ({})",
        total,
        clinic.slug,
        prescription.start_date,
        protocol.interval
    );

    let mut slots = Vec::with_capacity(total.min(MAX_DOSES) as usize);
    let mut date = next_open_day(clinic, prescription.start_date)?;

    for index in 1..=total {
        if index > 1 {
            let candidate = protocol.interval.next_after(date)?;
            date = next_open_day(clinic, candidate)?;
        }

        slots.push(DoseSlot {
            index,
            date,
            time,
            label: Some(dose_label(index, total, prescription.locale)),
        });
    }

    Ok(slots)
}

/// Resolve the prescription's clinic in `registry` and build its schedule
pub fn plan(registry: &ClinicRegistry, prescription: &LaserPrescriptionInput) -> Result<Vec<DoseSlot>> {
    let clinic = registry.resolve(prescription.clinic.as_deref());
    build_schedule(prescription, clinic)
}

/// First operating day on or after `date`
///
/// Only ever moves forward. Gives up after `MAX_ADVANCE_DAYS`.
fn next_open_day(clinic: &ClinicConfig, date: NaiveDate) -> Result<NaiveDate> {
    for offset in 0..=MAX_ADVANCE_DAYS {
        let candidate = date
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(|| Error::DateOutOfRange(format!("{} + {} days", date, offset)))?;

        if !clinic.is_closed(candidate) {
            if offset > 0 {
                tracing::debug!(
                    "Clinic '{}' closed on {}, moved dose forward to {}",
                    clinic.slug,
                    date,
                    candidate
                );
            }
            return Ok(candidate);
        }
    }

    Err(Error::SchedulingImpossible {
        from: date,
        window_days: MAX_ADVANCE_DAYS,
    })
}

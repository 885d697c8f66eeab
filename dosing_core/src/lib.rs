#![forbid(unsafe_code)]

//! Core domain model and scheduling logic for laser-therapy dosing.
//!
//! This crate provides:
//! - Domain types (prescriptions, protocols, clinics, dose slots)
//! - Clinic registry with total slug resolution
//! - Schedule builder
//! - Floating-time calendar timestamp encoding
//! - Bilingual text lookup
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod i18n;
pub mod clinic;
pub mod config;
pub mod logging;
pub mod schedule;
pub mod ics;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use i18n::{Locale, LocalizedText};
pub use clinic::{build_default_registry, default_registry, ClinicRegistry};
pub use config::Config;
pub use schedule::{build_schedule, plan};
pub use ics::{encode, event_times, EventTimes};

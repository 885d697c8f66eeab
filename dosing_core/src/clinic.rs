//! Clinic registry and configuration resolver.
//!
//! The registry is built explicitly and never mutated afterwards, so a shared
//! reference can be read from any number of threads. Resolution is total:
//! a missing or unknown slug yields the fallback configuration.

use crate::i18n::LocalizedText;
use crate::types::{Branding, ClinicConfig, OperatingHours};
use chrono::{NaiveTime, Weekday};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Slug of the built-in fallback clinic
pub const DEFAULT_CLINIC_SLUG: &str = "default";

/// Cached built-in registry, built once on first use
static DEFAULT_REGISTRY: Lazy<ClinicRegistry> = Lazy::new(build_default_registry);

/// Get a reference to the cached built-in registry
pub fn default_registry() -> &'static ClinicRegistry {
    &DEFAULT_REGISTRY
}

/// Read-only mapping from clinic slug to operating configuration
#[derive(Clone, Debug)]
pub struct ClinicRegistry {
    clinics: HashMap<String, ClinicConfig>,
    fallback: ClinicConfig,
}

impl ClinicRegistry {
    /// Create a registry with no named clinics
    pub fn new(fallback: ClinicConfig) -> Self {
        Self {
            clinics: HashMap::new(),
            fallback,
        }
    }

    /// Add or replace a clinic, keyed by its normalized slug
    pub fn with_clinic(mut self, clinic: ClinicConfig) -> Self {
        self.clinics.insert(normalize_slug(&clinic.slug), clinic);
        self
    }

    /// Replace the fallback configuration
    pub fn with_fallback(mut self, fallback: ClinicConfig) -> Self {
        self.fallback = fallback;
        self
    }

    /// Resolve a clinic slug to its configuration
    ///
    /// Never fails: `None`, blank, and unregistered slugs all resolve to the
    /// fallback configuration.
    pub fn resolve(&self, slug: Option<&str>) -> &ClinicConfig {
        let Some(key) = slug.map(normalize_slug).filter(|s| !s.is_empty()) else {
            return &self.fallback;
        };

        match self.clinics.get(&key) {
            Some(clinic) => clinic,
            None => {
                tracing::debug!("Unknown clinic '{}', using fallback configuration", key);
                &self.fallback
            }
        }
    }

    pub fn fallback(&self) -> &ClinicConfig {
        &self.fallback
    }

    /// Registered clinics sorted by slug
    pub fn clinics(&self) -> Vec<&ClinicConfig> {
        let mut clinics: Vec<_> = self.clinics.values().collect();
        clinics.sort_by(|a, b| a.slug.cmp(&b.slug));
        clinics
    }

    pub fn len(&self) -> usize {
        self.clinics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clinics.is_empty()
    }

    /// Validate every configuration for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, clinic) in &self.clinics {
            if key != &normalize_slug(&clinic.slug) {
                errors.push(format!(
                    "Clinic key '{}' doesn't match clinic.slug '{}'",
                    key, clinic.slug
                ));
            }
            errors.extend(validate_clinic(clinic));
        }
        errors.extend(validate_clinic(&self.fallback));

        errors
    }
}

impl Default for ClinicRegistry {
    fn default() -> Self {
        Self::new(default_clinic())
    }
}

fn validate_clinic(clinic: &ClinicConfig) -> Vec<String> {
    let mut errors = Vec::new();
    let slug = &clinic.slug;

    if slug.trim().is_empty() {
        errors.push("Clinic has empty slug".to_string());
    }
    if clinic.hours.opens >= clinic.hours.closes {
        errors.push(format!(
            "Clinic '{}': opens at {} but closes at {}",
            slug, clinic.hours.opens, clinic.hours.closes
        ));
    }
    if !clinic.hours.contains(clinic.default_dose_time) {
        errors.push(format!(
            "Clinic '{}': default dose time {} is outside operating hours",
            slug, clinic.default_dose_time
        ));
    }
    if ALL_WEEKDAYS
        .iter()
        .all(|d| clinic.closed_weekdays.contains(d))
    {
        errors.push(format!("Clinic '{}': closed every day of the week", slug));
    }
    if clinic.appointment_minutes == 0 {
        errors.push(format!("Clinic '{}': appointment length is zero", slug));
    }

    errors
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// The fallback configuration: weekdays 09:00-17:00, doses at 09:00
pub fn default_clinic() -> ClinicConfig {
    ClinicConfig::new(DEFAULT_CLINIC_SLUG)
}

/// Builds the built-in registry
///
/// **Note**: prefer `default_registry()` for lookups. This function is
/// retained for tests and for merging configured clinics.
pub fn build_default_registry() -> ClinicRegistry {
    let downtown = ClinicConfig {
        slug: "downtown".into(),
        hours: OperatingHours {
            opens: hm(8, 0),
            closes: hm(19, 0),
        },
        closed_weekdays: vec![Weekday::Sun],
        closed_dates: Vec::new(),
        default_dose_time: hm(8, 30),
        appointment_minutes: 20,
        branding: Branding {
            display_name: LocalizedText::bilingual("Downtown Laser Center", "Centro Láser Downtown"),
            accent_color: "#1d4ed8".into(),
            logo_url: None,
        },
    };

    let riverside = ClinicConfig {
        slug: "riverside".into(),
        hours: OperatingHours {
            opens: hm(10, 0),
            closes: hm(18, 0),
        },
        closed_weekdays: vec![Weekday::Sun, Weekday::Mon],
        closed_dates: Vec::new(),
        default_dose_time: hm(10, 0),
        appointment_minutes: 30,
        branding: Branding {
            display_name: LocalizedText::from("Riverside Photobiomodulation"),
            accent_color: "#b45309".into(),
            logo_url: None,
        },
    };

    ClinicRegistry::default()
        .with_clinic(downtown)
        .with_clinic(riverside)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads() {
        let registry = build_default_registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.fallback().slug, DEFAULT_CLINIC_SLUG);
    }

    #[test]
    fn test_resolve_known_slug() {
        let registry = build_default_registry();
        let clinic = registry.resolve(Some("downtown"));
        assert_eq!(clinic.slug, "downtown");
        assert_eq!(clinic.default_dose_time, hm(8, 30));
    }

    #[test]
    fn test_resolve_normalizes_slug() {
        let registry = build_default_registry();
        assert_eq!(registry.resolve(Some("  RiverSide ")).slug, "riverside");
    }

    #[test]
    fn test_unknown_slug_matches_no_clinic() {
        let registry = build_default_registry();
        let unknown = registry.resolve(Some("nowhere"));
        let missing = registry.resolve(None);
        let blank = registry.resolve(Some("   "));

        assert_eq!(unknown, missing);
        assert_eq!(blank, missing);
        assert_eq!(missing.slug, DEFAULT_CLINIC_SLUG);
    }

    #[test]
    fn test_fabricated_registry() {
        let mut only = ClinicConfig::new("only");
        only.closed_weekdays.clear();
        let registry = ClinicRegistry::new(default_clinic()).with_clinic(only);

        assert!(registry.resolve(Some("only")).closed_weekdays.is_empty());
        assert!(registry.resolve(Some("downtown")).slug == DEFAULT_CLINIC_SLUG);
    }

    #[test]
    fn test_cached_registry_is_shared() {
        let a = default_registry() as *const ClinicRegistry;
        let b = default_registry() as *const ClinicRegistry;
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_registry_validates() {
        let registry = build_default_registry();
        let errors = registry.validate();
        assert!(
            errors.is_empty(),
            "Default registry has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_validate_flags_bad_clinic() {
        let mut broken = ClinicConfig::new("broken");
        broken.hours.opens = hm(18, 0);
        broken.closed_weekdays = ALL_WEEKDAYS.to_vec();
        broken.appointment_minutes = 0;

        let errors = ClinicRegistry::default().with_clinic(broken).validate();

        assert!(errors.iter().any(|e| e.contains("opens at")));
        assert!(errors.iter().any(|e| e.contains("closed every day")));
        assert!(errors.iter().any(|e| e.contains("appointment length")));
        assert!(errors.iter().any(|e| e.contains("outside operating hours")));
    }
}

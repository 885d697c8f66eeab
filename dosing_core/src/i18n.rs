//! Bilingual string lookup.
//!
//! Clinic branding and slot labels are either a plain string or an
//! English/Spanish pair. Resolution never fails: the requested language is
//! tried first, then the other one, then the empty string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported UI languages
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// The language tried when the requested one has no text
    pub fn secondary(self) -> Locale {
        match self {
            Locale::En => Locale::Es,
            Locale::Es => Locale::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "es" | "spanish" | "español" => Ok(Locale::Es),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

/// A user-facing string in one or two languages
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LocalizedText {
    Single(String),
    Bilingual {
        #[serde(default)]
        en: Option<String>,
        #[serde(default)]
        es: Option<String>,
    },
}

impl LocalizedText {
    pub fn bilingual(en: impl Into<String>, es: impl Into<String>) -> Self {
        LocalizedText::Bilingual {
            en: Some(en.into()),
            es: Some(es.into()),
        }
    }

    /// Resolve to a concrete string for `locale`
    pub fn resolve(&self, locale: Locale) -> String {
        match self {
            LocalizedText::Single(text) => text.clone(),
            LocalizedText::Bilingual { .. } => self
                .get(locale)
                .or_else(|| self.get(locale.secondary()))
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn get(&self, locale: Locale) -> Option<&str> {
        let LocalizedText::Bilingual { en, es } = self else {
            return None;
        };
        let text = match locale {
            Locale::En => en.as_deref(),
            Locale::Es => es.as_deref(),
        };
        text.filter(|t| !t.is_empty())
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        LocalizedText::Single(text.to_string())
    }
}

/// Human-readable label for one slot, e.g. "Dose 3 of 8"
pub fn dose_label(index: u32, total: u32, locale: Locale) -> String {
    let template = LocalizedText::bilingual("Dose {n} of {total}", "Dosis {n} de {total}");
    template
        .resolve(locale)
        .replace("{n}", &index.to_string())
        .replace("{total}", &total.to_string())
}

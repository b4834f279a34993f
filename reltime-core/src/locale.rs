//! Locales and their message catalogs.
//!
//! Each locale carries the placeholder shown for a missing date and the
//! vocabulary used to build relative-time phrases. Templates use `{}` as the
//! single substitution slot.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Supported display locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    En,
    Fr,
    De,
    Es,
}

/// A unit of relative-time vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    FewSeconds,
    Minute,
    Minutes,
    Hour,
    Hours,
    Day,
    Days,
    Month,
    Months,
    Year,
    Years,
}

/// Translated strings for one locale.
#[derive(Debug)]
pub struct Catalog {
    /// Placeholder for an absent date
    pub not_available: &'static str,
    /// Wraps a phrase describing a future instant
    pub future: &'static str,
    /// Wraps a phrase describing a past instant
    pub past: &'static str,
    few_seconds: &'static str,
    minute: &'static str,
    minutes: &'static str,
    hour: &'static str,
    hours: &'static str,
    day: &'static str,
    days: &'static str,
    month: &'static str,
    months: &'static str,
    year: &'static str,
    years: &'static str,
}

static EN: Catalog = Catalog {
    not_available: "N/A",
    future: "in {}",
    past: "{} ago",
    few_seconds: "a few seconds",
    minute: "a minute",
    minutes: "{} minutes",
    hour: "an hour",
    hours: "{} hours",
    day: "a day",
    days: "{} days",
    month: "a month",
    months: "{} months",
    year: "a year",
    years: "{} years",
};

static FR: Catalog = Catalog {
    not_available: "N/A",
    future: "dans {}",
    past: "il y a {}",
    few_seconds: "quelques secondes",
    minute: "une minute",
    minutes: "{} minutes",
    hour: "une heure",
    hours: "{} heures",
    day: "un jour",
    days: "{} jours",
    month: "un mois",
    months: "{} mois",
    year: "un an",
    years: "{} ans",
};

// German phrases are always used with a preposition, hence the dative forms.
static DE: Catalog = Catalog {
    not_available: "k. A.",
    future: "in {}",
    past: "vor {}",
    few_seconds: "ein paar Sekunden",
    minute: "einer Minute",
    minutes: "{} Minuten",
    hour: "einer Stunde",
    hours: "{} Stunden",
    day: "einem Tag",
    days: "{} Tagen",
    month: "einem Monat",
    months: "{} Monaten",
    year: "einem Jahr",
    years: "{} Jahren",
};

static ES: Catalog = Catalog {
    not_available: "N/D",
    future: "en {}",
    past: "hace {}",
    few_seconds: "unos segundos",
    minute: "un minuto",
    minutes: "{} minutos",
    hour: "una hora",
    hours: "{} horas",
    day: "un día",
    days: "{} días",
    month: "un mes",
    months: "{} meses",
    year: "un año",
    years: "{} años",
};

impl Catalog {
    /// Render a phrase, substituting `count` where the template has a slot.
    pub fn phrase(&self, phrase: Phrase, count: i64) -> String {
        let template = match phrase {
            Phrase::FewSeconds => self.few_seconds,
            Phrase::Minute => self.minute,
            Phrase::Minutes => self.minutes,
            Phrase::Hour => self.hour,
            Phrase::Hours => self.hours,
            Phrase::Day => self.day,
            Phrase::Days => self.days,
            Phrase::Month => self.month,
            Phrase::Months => self.months,
            Phrase::Year => self.year,
            Phrase::Years => self.years,
        };
        template.replace("{}", &count.to_string())
    }

    /// Wrap a phrase with the past or future template.
    pub fn directed(&self, phrase: &str, future: bool) -> String {
        let template = if future { self.future } else { self.past };
        template.replace("{}", phrase)
    }
}

impl Locale {
    /// All supported locales
    pub const ALL: [Locale; 4] = [Locale::En, Locale::Fr, Locale::De, Locale::Es];

    /// Short language tag for this locale
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::De => "de",
            Locale::Es => "es",
        }
    }

    /// Message catalog for this locale
    pub fn catalog(&self) -> &'static Catalog {
        match self {
            Locale::En => &EN,
            Locale::Fr => &FR,
            Locale::De => &DE,
            Locale::Es => &ES,
        }
    }

    /// Resolve a language tag such as `en`, `fr-FR` or `de_AT`.
    ///
    /// Only the primary language subtag is considered.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let language = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        Locale::ALL.into_iter().find(|l| l.tag() == language)
    }

    /// Resolve a tag, falling back to English for unknown languages.
    pub fn from_tag_or_default(tag: &str) -> Locale {
        match Locale::from_tag(tag) {
            Some(locale) => locale,
            None => {
                tracing::warn!(tag, "Unsupported locale, falling back to en");
                Locale::default()
            }
        }
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Locale::from_tag(s).ok_or_else(|| Error::Config(format!("unsupported locale: {s}")))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_uses_language_subtag() {
        assert_eq!(Locale::from_tag("en"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr-FR"), Some(Locale::Fr));
        assert_eq!(Locale::from_tag("de_AT.UTF-8"), Some(Locale::De));
        assert_eq!(Locale::from_tag("ES"), Some(Locale::Es));
        assert_eq!(Locale::from_tag("ja"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_english() {
        assert_eq!(Locale::from_tag_or_default("pt-BR"), Locale::En);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Locale::En.catalog().not_available, "N/A");
        assert_eq!(Locale::De.catalog().not_available, "k. A.");
        assert_eq!(Locale::Es.catalog().not_available, "N/D");
    }

    #[test]
    fn test_phrase_substitution() {
        let catalog = Locale::En.catalog();
        assert_eq!(catalog.phrase(Phrase::Minutes, 5), "5 minutes");
        assert_eq!(catalog.phrase(Phrase::Hour, 1), "an hour");
        assert_eq!(catalog.directed("5 minutes", false), "5 minutes ago");
        assert_eq!(catalog.directed("2 days", true), "in 2 days");

        let fr = Locale::Fr.catalog();
        assert_eq!(fr.directed(&fr.phrase(Phrase::Days, 3), false), "il y a 3 jours");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("it".parse::<Locale>().is_err());
        assert_eq!("de".parse::<Locale>().unwrap(), Locale::De);
    }
}

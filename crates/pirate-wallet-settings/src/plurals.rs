//! Locale-aware plural formatting
//!
//! Integer cardinal rules from CLDR for the locales the wallet ships with.
//! Unknown locale tags fall back to English.

/// CLDR plural category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    /// Singular
    One,
    /// Paucal (2-4 in Slavic languages)
    Few,
    /// Genitive plural in Slavic languages
    Many,
    /// Everything else
    Other,
}

/// Supported locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    /// en
    #[default]
    English,
    /// de
    German,
    /// es
    Spanish,
    /// fr
    French,
    /// pt
    Portuguese,
    /// ru
    Russian,
    /// uk
    Ukrainian,
    /// pl
    Polish,
    /// it
    Italian,
    /// nl
    Dutch,
    /// ja
    Japanese,
    /// zh
    Chinese,
    /// ko
    Korean,
}

impl Locale {
    /// Parse a BCP-47-ish tag (`en`, `en-US`, `pt_BR`)
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match language.as_str() {
            "de" => Self::German,
            "es" => Self::Spanish,
            "fr" => Self::French,
            "pt" => Self::Portuguese,
            "ru" => Self::Russian,
            "uk" => Self::Ukrainian,
            "pl" => Self::Polish,
            "it" => Self::Italian,
            "nl" => Self::Dutch,
            "ja" => Self::Japanese,
            "zh" => Self::Chinese,
            "ko" => Self::Korean,
            _ => Self::English,
        }
    }

    /// Plural category for an integer count
    pub fn plural_category(&self, n: u32) -> PluralCategory {
        match self {
            Self::English | Self::German | Self::Spanish | Self::Italian | Self::Dutch => {
                if n == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::French | Self::Portuguese => {
                if n <= 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::Russian | Self::Ukrainian => {
                let (m10, m100) = (n % 10, n % 100);
                if m10 == 1 && m100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::Polish => {
                let (m10, m100) = (n % 10, n % 100);
                if n == 1 {
                    PluralCategory::One
                } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::Japanese | Self::Chinese | Self::Korean => PluralCategory::Other,
        }
    }

    fn minutes_template(&self, category: PluralCategory) -> &'static str {
        use PluralCategory::*;
        match (self, category) {
            (Self::English, One) => "{} minute",
            (Self::English, _) => "{} minutes",
            (Self::German, One) => "{} Minute",
            (Self::German, _) => "{} Minuten",
            (Self::Spanish, One) => "{} minuto",
            (Self::Spanish, _) => "{} minutos",
            (Self::French, One) => "{} minute",
            (Self::French, _) => "{} minutes",
            (Self::Portuguese, One) => "{} minuto",
            (Self::Portuguese, _) => "{} minutos",
            (Self::Russian, One) => "{} минута",
            (Self::Russian, Few) => "{} минуты",
            (Self::Russian, _) => "{} минут",
            (Self::Ukrainian, One) => "{} хвилина",
            (Self::Ukrainian, Few) => "{} хвилини",
            (Self::Ukrainian, _) => "{} хвилин",
            (Self::Polish, One) => "{} minuta",
            (Self::Polish, Few) => "{} minuty",
            (Self::Polish, _) => "{} minut",
            (Self::Italian, One) => "{} minuto",
            (Self::Italian, _) => "{} minuti",
            (Self::Dutch, One) => "{} minuut",
            (Self::Dutch, _) => "{} minuten",
            (Self::Japanese, _) => "{} 分",
            (Self::Chinese, _) => "{} 分钟",
            (Self::Korean, _) => "{} 분",
        }
    }
}

/// Formats auto-lock durations as "N minute(s)"
#[derive(Debug, Clone, Copy, Default)]
pub struct MinutesFormatter {
    locale: Locale,
}

impl MinutesFormatter {
    /// Formatter for `locale`
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Pluralized, locale-aware duration string
    pub fn format(&self, minutes: u32) -> String {
        let category = self.locale.plural_category(minutes);
        self.locale
            .minutes_template(category)
            .replace("{}", &minutes.to_string())
    }
}

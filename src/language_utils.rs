use anyhow::{Result, anyhow};
use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language utilities for the three subtitle tracks
///
/// Every row carries one text payload per language and the playback surface
/// holds one cue track per language. The set is closed: English, French and
/// Arabic, always handled in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    French,
    Arabic,
}

impl Language {
    /// All languages in fan-out order
    pub const ALL: [Language; 3] = [Language::English, Language::French, Language::Arabic];

    /// Lowercase key used for row fields, track ids and export filenames
    pub fn key(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::French => "french",
            Self::Arabic => "arabic",
        }
    }

    /// ISO 639-1 code of the language
    pub fn iso_code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Arabic => "ar",
        }
    }

    /// Spreadsheet header token identifying the language column
    pub fn header_token(&self) -> &'static str {
        match self {
            Self::English => "EN",
            Self::French => "FR",
            Self::Arabic => "AR",
        }
    }

    // @returns: Track label in the language itself (e.g. "Français")
    pub fn track_label(&self) -> String {
        IsoLanguage::from_639_1(self.iso_code())
            .and_then(|lang| lang.to_autonym())
            .map(capitalize)
            .unwrap_or_else(|| self.english_name().to_string())
    }

    // @returns: English name of the language
    pub fn english_name(&self) -> &'static str {
        IsoLanguage::from_639_1(self.iso_code())
            .map(|lang| lang.to_name())
            .unwrap_or(self.key())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    /// Accepts track keys ("french"), ISO 639-1/639-2 codes ("fr", "fra", "fre")
    /// and English names in any case
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        if let Some(lang) = Self::ALL.iter().find(|l| l.key() == normalized) {
            return Ok(*lang);
        }

        let iso = match normalized.len() {
            2 => IsoLanguage::from_639_1(&normalized),
            3 => IsoLanguage::from_639_3(&normalized).or_else(|| match normalized.as_str() {
                // ISO 639-2/B code that differs from 639-2/T
                "fre" => Some(IsoLanguage::Fra),
                _ => None,
            }),
            _ => IsoLanguage::from_name(&capitalize(&normalized)),
        };

        iso.and_then(|iso| iso.to_639_1())
            .and_then(|code| Self::ALL.iter().find(|l| l.iso_code() == code).copied())
            .ok_or_else(|| anyhow!("Unsupported subtitle language: {}", s))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Supported site languages and their presentation metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Writing direction applied to the page shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// A language the site is translated into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Ar,
}

impl Language {
    pub const fn ordered() -> [Self; 3] {
        [Self::En, Self::De, Self::Ar]
    }

    pub fn from_code(code: &str) -> Result<Self, LanguageError> {
        match code.trim() {
            "en" => Ok(Self::En),
            "de" => Ok(Self::De),
            "ar" => Ok(Self::Ar),
            other => Err(LanguageError::Unsupported(other.to_string())),
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Ar => "ar",
        }
    }

    /// Name in the language itself.
    pub const fn name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::De => "Deutsch",
            Self::Ar => "العربية",
        }
    }

    pub const fn flag(self) -> &'static str {
        match self {
            Self::En => "🇺🇸",
            Self::De => "🇩🇪",
            Self::Ar => "🇸🇦",
        }
    }

    pub const fn direction(self) -> TextDirection {
        match self {
            Self::Ar => TextDirection::Rtl,
            Self::En | Self::De => TextDirection::Ltr,
        }
    }

    pub fn attributes(self) -> DocumentAttributes {
        DocumentAttributes {
            lang: self,
            dir: self.direction(),
        }
    }

    pub fn descriptor(self) -> LanguageDescriptor {
        LanguageDescriptor {
            code: self,
            name: self.name(),
            flag: self.flag(),
            dir: self.direction(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

/// Attributes the page shell sets on its root element after a language change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentAttributes {
    pub lang: Language,
    pub dir: TextDirection,
}

/// Entry of the language picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageDescriptor {
    pub code: Language,
    pub name: &'static str,
    pub flag: &'static str,
    pub dir: TextDirection,
}

/// Every selectable language, in picker order.
pub fn languages() -> Vec<LanguageDescriptor> {
    Language::ordered()
        .into_iter()
        .map(Language::descriptor)
        .collect()
}

/// Direction for a raw code. Anything but Arabic reads left to right.
pub fn direction_of(code: &str) -> TextDirection {
    Language::from_code(code)
        .map(Language::direction)
        .unwrap_or(TextDirection::Ltr)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("unsupported language code `{0}`")]
    Unsupported(String),
}

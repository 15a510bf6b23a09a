//! Dot-path lookup into nested locale dictionaries.

use std::sync::OnceLock;

use serde_json::Value;
use tracing::warn;

use super::language::Language;

const EN: &str = include_str!("../../locales/en.json");
const DE: &str = include_str!("../../locales/de.json");
const AR: &str = include_str!("../../locales/ar.json");

/// Resolve `key` (e.g. `nav.home`) against `dictionary`. Falls back to the key itself when a
/// segment is missing, an intermediate node is not a mapping, or the final node is not a string.
pub fn translate(dictionary: &Value, key: &str) -> String {
    let mut node = dictionary;
    for segment in key.split('.') {
        match node {
            Value::Object(map) => match map.get(segment) {
                Some(next) => node = next,
                None => return key.to_string(),
            },
            _ => return key.to_string(),
        }
    }

    match node {
        Value::String(text) => text.clone(),
        _ => key.to_string(),
    }
}

/// The three locale dictionaries compiled into the binary.
#[derive(Debug)]
pub struct Dictionaries {
    en: Value,
    de: Value,
    ar: Value,
}

impl Dictionaries {
    pub fn embedded() -> &'static Dictionaries {
        static DICTIONARIES: OnceLock<Dictionaries> = OnceLock::new();
        DICTIONARIES.get_or_init(|| Dictionaries {
            en: parse(Language::En, EN),
            de: parse(Language::De, DE),
            ar: parse(Language::Ar, AR),
        })
    }

    pub fn get(&self, language: Language) -> &Value {
        match language {
            Language::En => &self.en,
            Language::De => &self.de,
            Language::Ar => &self.ar,
        }
    }

    pub fn translate(&self, language: Language, key: &str) -> String {
        translate(self.get(language), key)
    }
}

fn parse(language: Language, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(language = %language, error = %err, "locale dictionary is malformed");
        Value::Object(Default::default())
    })
}

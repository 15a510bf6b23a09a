//! Site localization: the selected language, its persistence, and dictionary lookup.

mod language;
mod store;
mod translate;

pub use language::{
    direction_of, languages, DocumentAttributes, Language, LanguageDescriptor, LanguageError,
    TextDirection,
};
pub use store::{
    FilePreferenceStorage, InMemoryPreferenceStorage, LanguageSnapshot, LanguageStore,
    PersistedLanguage, PreferenceStorage, PreferenceStorageError, LANGUAGE_STORAGE_KEY,
};
pub use translate::{translate, Dictionaries};

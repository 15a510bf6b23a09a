//! Read-only program catalog backing the programs pages and the program picker of the
//! application wizard.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::workflows::application::domain::StudyMode;

const EMBEDDED_PROGRAMS: &str = include_str!("../../data/programs.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramLevel {
    Bachelor,
    Master,
    Certificate,
}

impl ProgramLevel {
    pub fn from_code(code: &str) -> Result<Self, CatalogError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "bachelor" => Ok(Self::Bachelor),
            "master" => Ok(Self::Master),
            "certificate" => Ok(Self::Certificate),
            other => Err(CatalogError::UnknownLevel(other.to_string())),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bachelor => "Bachelor",
            Self::Master => "Master",
            Self::Certificate => "Certificate",
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: ProgramLevel,
    pub duration: String,
    pub language: Vec<String>,
    pub mode: StudyMode,
    pub tuition: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ects: Option<u16>,
    #[serde(default)]
    pub outcomes: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Criteria of the programs page. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgramFilter {
    pub search: Option<String>,
    pub level: Option<ProgramLevel>,
    pub mode: Option<StudyMode>,
    pub language: Option<String>,
}

impl ProgramFilter {
    pub fn is_active(&self) -> bool {
        self.search
            .as_deref()
            .is_some_and(|term| !term.trim().is_empty())
            || self.level.is_some()
            || self.mode.is_some()
            || self.language.is_some()
    }

    pub fn matches(&self, program: &Program) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                program.title.to_lowercase().contains(&needle)
                    || program.description.to_lowercase().contains(&needle)
            }
            _ => true,
        };
        let matches_level = self.level.map_or(true, |level| program.level == level);
        let matches_mode = self.mode.map_or(true, |mode| program.mode == mode);
        let matches_language = self
            .language
            .as_deref()
            .map_or(true, |language| program.language.iter().any(|l| l == language));

        matches_search && matches_level && matches_mode && matches_language
    }
}

/// Raw query-string criteria. Empty values and `all` mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgramQuery {
    pub search: Option<String>,
    pub level: Option<String>,
    pub mode: Option<String>,
    pub language: Option<String>,
}

fn selected(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty() && !raw.eq_ignore_ascii_case("all"))
}

impl ProgramQuery {
    pub fn into_filter(self) -> Result<ProgramFilter, CatalogError> {
        let level = selected(self.level)
            .map(|code| ProgramLevel::from_code(&code))
            .transpose()?;
        let mode = selected(self.mode)
            .map(|code| {
                StudyMode::ordered()
                    .into_iter()
                    .find(|mode| mode.code() == code.to_ascii_lowercase())
                    .ok_or(CatalogError::UnknownMode(code))
            })
            .transpose()?;

        Ok(ProgramFilter {
            search: self.search,
            level,
            mode,
            language: selected(self.language),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("program `{0}` not found")]
    NotFound(String),
    #[error("unknown program level `{0}`")]
    UnknownLevel(String),
    #[error("unknown study mode `{0}`")]
    UnknownMode(String),
}

/// Ordered, immutable collection of programs keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    programs: Vec<Program>,
}

impl ProgramCatalog {
    pub fn new(programs: Vec<Program>) -> Self {
        Self { programs }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self::new)
    }

    /// Catalog compiled into the binary. A malformed data file yields an empty catalog.
    pub fn embedded() -> &'static ProgramCatalog {
        static CATALOG: OnceLock<ProgramCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            Self::from_json(EMBEDDED_PROGRAMS).unwrap_or_else(|err| {
                warn!(error = %err, "embedded program catalog is malformed");
                Self::default()
            })
        })
    }

    pub fn all(&self) -> &[Program] {
        &self.programs
    }

    pub fn find(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|program| program.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Program, CatalogError> {
        self.find(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn filter(&self, filter: &ProgramFilter) -> Vec<&Program> {
        self.programs
            .iter()
            .filter(|program| filter.matches(program))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_loads_every_program() {
        let catalog = ProgramCatalog::embedded();
        assert_eq!(catalog.all().len(), 5);
        let program = catalog.find("msc-data-science").expect("program present");
        assert_eq!(program.level, ProgramLevel::Master);
        assert_eq!(program.mode, StudyMode::Online);
        assert_eq!(program.ects, Some(120));
    }

    #[test]
    fn certificate_without_ects_parses() {
        let catalog = ProgramCatalog::embedded();
        let program = catalog
            .find("cert-project-management")
            .expect("program present");
        assert!(program.ects.is_none());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let catalog = ProgramCatalog::embedded();
        let filter = ProgramFilter {
            search: Some("PROJECT".to_string()),
            ..ProgramFilter::default()
        };
        let ids: Vec<_> = catalog
            .filter(&filter)
            .into_iter()
            .map(|program| program.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bsc-computer-science", "cert-project-management"]);
    }

    #[test]
    fn filters_combine() {
        let catalog = ProgramCatalog::embedded();
        let filter = ProgramFilter {
            level: Some(ProgramLevel::Master),
            mode: Some(StudyMode::Hybrid),
            language: Some("Arabic".to_string()),
            ..ProgramFilter::default()
        };
        assert!(filter.is_active());
        let matches = catalog.filter(&filter);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "ma-digital-media");
    }

    #[test]
    fn empty_filter_returns_everything() {
        let catalog = ProgramCatalog::embedded();
        let filter = ProgramFilter {
            search: Some("   ".to_string()),
            ..ProgramFilter::default()
        };
        assert!(!filter.is_active());
        assert_eq!(catalog.filter(&filter).len(), catalog.all().len());
    }

    #[test]
    fn unknown_program_is_absent() {
        assert!(ProgramCatalog::embedded().find("phd-alchemy").is_none());
        assert_eq!(
            ProgramCatalog::embedded().get("phd-alchemy"),
            Err(CatalogError::NotFound("phd-alchemy".to_string()))
        );
    }

    #[test]
    fn query_treats_all_as_no_filter() {
        let query = ProgramQuery {
            level: Some("all".to_string()),
            mode: Some("ON-CAMPUS".to_string()),
            language: Some(" ".to_string()),
            ..ProgramQuery::default()
        };
        let filter = query.into_filter().expect("valid query");
        assert_eq!(filter.level, None);
        assert_eq!(filter.mode, Some(StudyMode::OnCampus));
        assert_eq!(filter.language, None);
    }

    #[test]
    fn query_rejects_unknown_level() {
        let query = ProgramQuery {
            level: Some("doctorate".to_string()),
            ..ProgramQuery::default()
        };
        assert_eq!(
            query.into_filter(),
            Err(CatalogError::UnknownLevel("doctorate".to_string()))
        );
    }
}

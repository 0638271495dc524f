//! Crawl configuration

use crate::graph::local_name;
use crate::query::Restriction;
use crate::resolve::WaitPolicy;
use crate::session::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://dbpedia.org/resource/";
pub const DEFAULT_MAX_DEPTH: usize = 10;
/// The crawl recurses once per level, so depth is bounded by stack size
pub const MAX_DEPTH_LIMIT: usize = 256;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Local names of the XSD datatypes accepted by the `any` wildcard
pub const ALL_DATE_FORMATS: &[&str] = &[
    "integer",
    "date",
    "time",
    "dateTime",
    "dateTimeStamp",
    "duration",
    "dayTimeDuration",
    "yearMonthDuration",
    "gDay",
    "gMonth",
    "gYear",
    "gYearMonth",
    "gMonthDay",
];

const DEFAULT_IGNORED_PATH_PREDICATES: &[&str] = &[
    "http://dbpedia.org/ontology/wikiPageWikiLink",
    "http://dbpedia.org/ontology/wikiPageExternalLink",
    "http://www.w3.org/2002/07/owl#sameAs",
    "http://dbpedia.org/property/wikiPageUsesTemplate",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
    "http://dbpedia.org/ontology/abstract",
    "http://purl.org/dc/terms/subject",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Datatypes whose literals count as dates
///
/// Written in YAML as a list of local names; `any` anywhere in the list
/// accepts every format in [`ALL_DATE_FORMATS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum DateFormats {
    Any,
    Only(BTreeSet<String>),
}

impl DateFormats {
    pub fn only<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Vec::from_iter(formats.into_iter().map(|s| s.as_ref().to_string())).into()
    }

    /// Whether a literal with this datatype IRI is a date
    pub fn matches(&self, datatype: &str) -> bool {
        let local = local_name(datatype).to_lowercase();
        match self {
            Self::Any => ALL_DATE_FORMATS.iter().any(|f| f.to_lowercase() == local),
            Self::Only(set) => set.contains(&local),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(set) if set.is_empty())
    }
}

impl Default for DateFormats {
    fn default() -> Self {
        Self::Any
    }
}

impl From<Vec<String>> for DateFormats {
    fn from(formats: Vec<String>) -> Self {
        if formats.iter().any(|f| f.eq_ignore_ascii_case("any")) {
            return Self::Any;
        }
        Self::Only(formats.iter().map(|f| f.to_lowercase()).collect())
    }
}

impl From<DateFormats> for Vec<String> {
    fn from(formats: DateFormats) -> Self {
        match formats {
            DateFormats::Any => vec!["any".to_string()],
            DateFormats::Only(set) => set.into_iter().collect(),
        }
    }
}

/// Typed configuration consumed by a crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlConfig {
    /// Prefix turning a bare query like `Charles_IV` into a resource URI
    pub base_url: String,
    pub ignored_path_predicates: Vec<String>,
    pub valid_date_formats: DateFormats,
    /// Deepest tree level a crawl may reach (root is 0, initial subject 1)
    pub max_depth: usize,
    pub poll_interval_ms: u64,
    /// Give up on an unanswered resolver after this long
    pub resolution_timeout_ms: Option<u64>,
    pub retry: RetryPolicy,
    pub restrictions: Vec<Restriction>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ignored_path_predicates: DEFAULT_IGNORED_PATH_PREDICATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            valid_date_formats: DateFormats::Any,
            max_depth: DEFAULT_MAX_DEPTH,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            resolution_timeout_ms: None,
            retry: RetryPolicy::default(),
            restrictions: Vec::new(),
        }
    }
}

impl CrawlConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max-depth must be at least 1".into()));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max-depth must be at most {}",
                MAX_DEPTH_LIMIT
            )));
        }
        if self.valid_date_formats.is_empty() {
            return Err(ConfigError::Invalid("valid-date-formats must not be empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll-interval-ms must be positive".into()));
        }
        Ok(())
    }

    /// Turn a user query into the initial subject URI
    pub fn resolve_query(&self, query: &str) -> String {
        let query = query.trim();
        if query.starts_with(&self.base_url) {
            query.to_string()
        } else {
            format!("{}{}", self.base_url, query)
        }
    }

    pub fn is_ignored(&self, predicate: &str) -> bool {
        self.ignored_path_predicates.iter().any(|p| p == predicate)
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            deadline: self.resolution_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }
}

use crate::Config;
use chrono::{DateTime, Utc};
use reqlint_deps::{dependency_info, has_errors, validate, DependencyInfo, Issue, Manifest, Section};
use serde::{Deserialize, Serialize};

/// Everything we know about one manifest after parsing and checking it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub summary: DependencyInfo,
    pub sections: Vec<Section>,
    pub issues: Vec<Issue>,
    pub passed: bool,
}

impl Report {
    /// Run validation and classification with the given config
    pub fn build(source: impl Into<String>, manifest: &Manifest, config: &Config) -> Self {
        let issues = validate(manifest, &config.rules);
        let summary = dependency_info(manifest, &config.sections);

        Self {
            source: source.into(),
            generated_at: Utc::now(),
            summary,
            sections: manifest.sections(),
            passed: !has_errors(&issues),
            issues,
        }
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == reqlint_deps::Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }
}

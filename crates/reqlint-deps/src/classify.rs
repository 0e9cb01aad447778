// Maps comment-header sections onto dependency types
use crate::models::{Dependency, DependencyInfo, DependencyType, Line, Manifest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keywords matched case-insensitively against whole words of section titles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionRules {
    pub dev_keywords: Vec<String>,
    pub build_keywords: Vec<String>,
    pub optional_keywords: Vec<String>,
}

impl Default for SectionRules {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            dev_keywords: words(&[
                "dev",
                "development",
                "test",
                "tests",
                "testing",
                "lint",
                "linting",
                "monitoring",
            ]),
            build_keywords: words(&["build", "packaging"]),
            optional_keywords: words(&["optional", "production", "deployment"]),
        }
    }
}

impl SectionRules {
    /// Dev wins over build, build over optional; no match means runtime
    pub fn classify(&self, section: Option<&str>) -> DependencyType {
        let Some(title) = section else {
            return DependencyType::Runtime;
        };
        let title = words_of(title);
        let hit = |keywords: &[String]| {
            keywords.iter().any(|k| {
                let k = words_of(k);
                !k.is_empty() && title.windows(k.len()).any(|w| w == k.as_slice())
            })
        };

        if hit(&self.dev_keywords) {
            DependencyType::Dev
        } else if hit(&self.build_keywords) {
            DependencyType::Build
        } else if hit(&self.optional_keywords) {
            DependencyType::Optional
        } else {
            DependencyType::Runtime
        }
    }
}

/// Lowercase alphanumeric words; a keyword may span several of them
fn words_of(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Summarise a manifest, declared and commented-out requirements alike
pub fn dependency_info(manifest: &Manifest, rules: &SectionRules) -> DependencyInfo {
    let mut dependencies = Vec::new();

    for line in &manifest.lines {
        let (req, dep_type) = match &line.line {
            Line::Requirement(req) => {
                (req, rules.classify(line.section.as_deref()))
            }
            Line::Disabled(req) => (req, DependencyType::Optional),
            _ => continue,
        };
        debug!(name = %req.name, %dep_type, "Classified dependency");
        dependencies.push(Dependency {
            name: req.name.clone(),
            version: req.version_label(),
            dep_type,
            section: line.section.clone(),
            line: line.number,
        });
    }

    DependencyInfo::new("Python".to_string(), dependencies)
}

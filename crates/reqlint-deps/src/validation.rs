// Structural checks over a parsed manifest
use crate::models::{Manifest, Operator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Operators a declaration may use
    pub allowed_operators: Vec<Operator>,
    /// Flag requirements without any version spec
    pub require_pins: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            allowed_operators: vec![Operator::Exact, Operator::AtLeast],
            require_pins: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    DuplicatePackage { name: String, first_line: usize },
    DisallowedOperator { name: String, operator: Operator },
    Unpinned { name: String },
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::DuplicatePackage { .. } | IssueKind::DisallowedOperator { .. } => Severity::Error,
            IssueKind::Unpinned { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::DuplicatePackage { name, first_line } => {
                write!(f, "duplicate package '{}' (first declared on line {})", name, first_line)
            }
            IssueKind::DisallowedOperator { name, operator } => {
                write!(f, "operator '{}' is not allowed (package '{}')", operator, name)
            }
            IssueKind::Unpinned { name } => write!(f, "package '{}' has no version constraint", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub line: usize,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.severity.label(), self.kind)
    }
}

/// Run every check; issues come back ordered by line
pub fn validate(manifest: &Manifest, rules: &ValidationRules) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (line, req) in manifest.requirements() {
        let mut push = |kind: IssueKind| {
            warn!(line, issue = %kind, "Manifest check failed");
            issues.push(Issue {
                line,
                severity: kind.severity(),
                kind,
            });
        };

        let key = req.normalized_name();
        match seen.get(&key).copied() {
            Some(first_line) => push(IssueKind::DuplicatePackage {
                name: req.name.clone(),
                first_line,
            }),
            None => {
                seen.insert(key, line);
            }
        }

        for operator in req.operators() {
            if !rules.allowed_operators.contains(&operator) {
                push(IssueKind::DisallowedOperator {
                    name: req.name.clone(),
                    operator,
                });
            }
        }

        if rules.require_pins && req.spec.is_none() {
            push(IssueKind::Unpinned {
                name: req.name.clone(),
            });
        }
    }

    issues
}

pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

// Dependency manifest analysis
// Parses requirements.txt style manifests and checks their structure

pub mod classify;
pub mod error;
pub mod models;
pub mod parsers;
pub mod validation;

pub use classify::{dependency_info, SectionRules};
pub use error::{ParseError, ParseErrorKind};
pub use models::{
    normalize_name, Dependency, DependencyInfo, DependencyType, Line, Manifest, ManifestLine,
    Operator, Requirement, Section, VersionClause, VersionSpec,
};
pub use parsers::{parse_line, parse_requirement, parse_requirements_txt, parse_version_spec};
pub use validation::{has_errors, validate, Issue, IssueKind, Severity, ValidationRules};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a version clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "===")]
    Arbitrary,
    #[serde(rename = "==")]
    Exact,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "~=")]
    Compatible,
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl Operator {
    /// Longest symbols first so `===` wins over `==` and `>=` over `>`
    pub const ALL: [Operator; 8] = [
        Operator::Arbitrary,
        Operator::Exact,
        Operator::NotEqual,
        Operator::Compatible,
        Operator::AtLeast,
        Operator::AtMost,
        Operator::Greater,
        Operator::Less,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Arbitrary => "===",
            Operator::Exact => "==",
            Operator::NotEqual => "!=",
            Operator::Compatible => "~=",
            Operator::AtLeast => ">=",
            Operator::AtMost => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }

    /// Only `==` and `!=` accept a trailing `.*`
    pub fn allows_wildcard(&self) -> bool {
        matches!(self, Operator::Exact | Operator::NotEqual)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionClause {
    pub operator: Operator,
    pub version: String,
}

impl fmt::Display for VersionClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Comma separated list of clauses, e.g. `>=2.0,<3`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    pub clauses: Vec<VersionClause>,
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// A single `<package>[extras]<specifier>` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub spec: Option<VersionSpec>,
    /// Environment marker after `;`, kept verbatim
    pub marker: Option<String>,
    /// Trailing inline comment without the leading `#`
    pub comment: Option<String>,
}

impl Requirement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extras: Vec::new(),
            spec: None,
            marker: None,
            comment: None,
        }
    }

    /// Name used for identity: lowercase, `-`/`_`/`.` runs folded to `-`
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        self.spec
            .iter()
            .flat_map(|spec| spec.clauses.iter().map(|c| c.operator))
    }

    /// Version as shown in summaries: bare version for `==`, full spec otherwise
    pub fn version_label(&self) -> String {
        match &self.spec {
            None => "*".to_string(),
            Some(spec) if spec.clauses.len() == 1 && spec.clauses[0].operator == Operator::Exact => {
                spec.clauses[0].version.clone()
            }
            Some(spec) => spec.to_string(),
        }
    }
}

/// Renders without the inline comment
impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(spec) = &self.spec {
            write!(f, "{}", spec)?;
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(ch.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

/// What a physical line of the manifest holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Line {
    Blank,
    Comment(String),
    /// pip option such as `-r base.txt` or `--index-url ...`
    Option { raw: String, comment: Option<String> },
    Requirement(Requirement),
    /// Commented-out requirement, e.g. `# gunicorn==21.2.0`
    Disabled(Requirement),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestLine {
    /// 1-based
    pub number: usize,
    pub line: Line,
    pub section: Option<String>,
    /// Line of the header that opened `section`
    pub section_line: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub line: usize,
    pub requirement_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub lines: Vec<ManifestLine>,
}

impl Manifest {
    /// Declared requirements with their line numbers
    pub fn requirements(&self) -> impl Iterator<Item = (usize, &Requirement)> {
        self.lines.iter().filter_map(|l| match &l.line {
            Line::Requirement(req) => Some((l.number, req)),
            _ => None,
        })
    }

    pub fn disabled(&self) -> impl Iterator<Item = (usize, &Requirement)> {
        self.lines.iter().filter_map(|l| match &l.line {
            Line::Disabled(req) => Some((l.number, req)),
            _ => None,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        let wanted = normalize_name(name);
        self.requirements()
            .map(|(_, req)| req)
            .find(|req| req.normalized_name() == wanted)
    }

    pub fn sections(&self) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        for line in &self.lines {
            let (Some(title), Some(header)) = (&line.section, line.section_line) else {
                continue;
            };
            if sections.last().map(|s| s.line) != Some(header) {
                sections.push(Section {
                    title: title.clone(),
                    line: header,
                    requirement_count: 0,
                });
            }
            if let (Line::Requirement(_), Some(last)) = (&line.line, sections.last_mut()) {
                last.requirement_count += 1;
            }
        }
        sections
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub dep_type: DependencyType,
    pub section: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyType {
    Runtime,     // Regular dependencies
    Dev,         // Development dependencies
    Build,       // Build dependencies
    Optional,    // Optional or commented-out dependencies
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyType::Runtime => write!(f, "runtime"),
            DependencyType::Dev => write!(f, "dev"),
            DependencyType::Build => write!(f, "build"),
            DependencyType::Optional => write!(f, "optional"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub ecosystem: String,        // always "Python" for requirements files
    pub total_count: usize,
    pub runtime_count: usize,
    pub dev_count: usize,
    pub build_count: usize,
    pub optional_count: usize,
    pub dependencies: Vec<Dependency>,
}

impl DependencyInfo {
    pub fn new(ecosystem: String, dependencies: Vec<Dependency>) -> Self {
        let count = |t: DependencyType| dependencies.iter().filter(|d| d.dep_type == t).count();
        let runtime_count = count(DependencyType::Runtime);
        let dev_count = count(DependencyType::Dev);
        let build_count = count(DependencyType::Build);
        let optional_count = count(DependencyType::Optional);
        let total_count = dependencies.len();

        Self {
            ecosystem,
            total_count,
            runtime_count,
            dev_count,
            build_count,
            optional_count,
            dependencies,
        }
    }
}

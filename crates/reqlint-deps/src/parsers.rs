use crate::error::{ParseError, ParseErrorKind};
use crate::models::{Line, Manifest, ManifestLine, Operator, Requirement, VersionClause, VersionSpec};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Parse a whole requirements.txt file
///
/// Stops at the first malformed declaration. Comment headers that open a
/// block (start of file or right after a blank line, ignoring bare `#`
/// lines) become the section of every following line until the next header.
pub fn parse_requirements_txt(content: &str) -> Result<Manifest, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = Vec::new();
    let mut section: Option<String> = None;
    let mut section_line: Option<usize> = None;
    let mut after_blank = true;

    for (idx, raw) in content.lines().enumerate() {
        let number = idx + 1;
        let line = parse_line(raw).map_err(|kind| ParseError { line: number, kind })?;

        if let Line::Comment(text) = &line {
            if after_blank && !text.is_empty() {
                debug!(line = number, title = %text, "New section");
                section = Some(text.clone());
                section_line = Some(number);
            }
        }
        // a bare `#` keeps banner headers (`#`, `# Title`, `#`) working
        after_blank = match &line {
            Line::Blank => true,
            Line::Comment(text) if text.is_empty() => after_blank,
            _ => false,
        };

        lines.push(ManifestLine {
            number,
            line,
            section: section.clone(),
            section_line,
        });
    }

    Ok(Manifest { lines })
}

/// Classify a single physical line
pub fn parse_line(raw: &str) -> Result<Line, ParseErrorKind> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }

    if let Some(body) = trimmed.strip_prefix('#') {
        let body = body.trim();
        if let Some(req) = parse_disabled(body) {
            debug!(name = %req.name, "Commented-out requirement");
            return Ok(Line::Disabled(req));
        }
        return Ok(Line::Comment(body.to_string()));
    }

    let (decl, comment) = split_inline_comment(trimmed);

    if decl.starts_with('-') {
        return Ok(Line::Option {
            raw: decl.to_string(),
            comment,
        });
    }

    let mut req = parse_requirement(decl)?;
    req.comment = comment;
    Ok(Line::Requirement(req))
}

/// Parse `<package>[extras]<specifier>[; marker]`
pub fn parse_requirement(text: &str) -> Result<Requirement, ParseErrorKind> {
    let text = text.trim();
    let (body, marker) = match text.split_once(';') {
        Some((body, marker)) => {
            let marker = marker.trim();
            (body.trim(), (!marker.is_empty()).then(|| marker.to_string()))
        }
        None => (text, None),
    };

    let name_end = body
        .find(|c: char| !is_name_char(c))
        .unwrap_or(body.len());
    let name = &body[..name_end];
    if !is_valid_name(name) {
        let shown = if name.is_empty() { body } else { name };
        return Err(ParseErrorKind::InvalidName(shown.to_string()));
    }

    let mut req = Requirement::new(name);
    req.marker = marker;

    let mut rest = body[name_end..].trim_start();
    if let Some(after) = rest.strip_prefix('[') {
        let close = after.find(']').ok_or(ParseErrorKind::UnterminatedExtras)?;
        for extra in after[..close].split(',').map(str::trim) {
            if extra.is_empty() {
                continue;
            }
            if !is_valid_name(extra) {
                return Err(ParseErrorKind::InvalidExtra(extra.to_string()));
            }
            req.extras.push(extra.to_string());
        }
        rest = after[close + 1..].trim_start();
    }

    if !rest.is_empty() {
        req.spec = Some(parse_version_spec(rest)?);
    }

    Ok(req)
}

/// Parse one or more comma separated clauses, optionally wrapped in parentheses
pub fn parse_version_spec(text: &str) -> Result<VersionSpec, ParseErrorKind> {
    let text = text.trim();
    let text = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);

    let clauses = text
        .split(',')
        .map(parse_clause)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VersionSpec { clauses })
}

fn parse_clause(text: &str) -> Result<VersionClause, ParseErrorKind> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseErrorKind::EmptyClause);
    }

    let operator = Operator::ALL
        .into_iter()
        .find(|op| text.starts_with(op.symbol()))
        .ok_or_else(|| {
            let symbol: String = text
                .chars()
                .take_while(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace())
                .collect();
            ParseErrorKind::InvalidOperator(if symbol.is_empty() { text.to_string() } else { symbol })
        })?;

    let version = text[operator.symbol().len()..].trim();
    if version.is_empty() {
        return Err(ParseErrorKind::MissingVersion(operator));
    }
    if !is_valid_version(operator, version) {
        return Err(ParseErrorKind::InvalidVersion {
            operator,
            version: version.to_string(),
        });
    }

    Ok(VersionClause {
        operator,
        version: version.to_string(),
    })
}

/// Whether `version` is acceptable on the right-hand side of `operator`
pub fn is_valid_version(operator: Operator, version: &str) -> bool {
    if version.chars().any(char::is_whitespace) {
        return false;
    }
    match operator {
        // arbitrary equality compares strings
        Operator::Arbitrary => true,
        _ if operator.allows_wildcard() && version.ends_with(".*") => {
            release_regex().is_match(&version[..version.len() - 2])
        }
        Operator::Compatible => {
            // needs at least two release segments and no local label
            let release = version.rsplit('!').next().unwrap_or(version);
            let release_end = release
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(release.len());
            version_regex().is_match(version)
                && !version.contains('+')
                && release[..release_end].split('.').filter(|s| !s.is_empty()).count() >= 2
        }
        _ => version_regex().is_match(version),
    }
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(\d+!)?\d+(\.\d+)*((a|b|rc)\d+)?(\.post\d+)?(\.dev\d+)?(\+[a-z0-9]+(\.[a-z0-9]+)*)?$",
        )
        .expect("version pattern is valid")
    })
}

fn release_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+!)?\d+(\.\d+)*$").expect("release pattern is valid"))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Letters, digits, `.`, `_`, `-`; starts and ends alphanumeric
pub fn is_valid_name(name: &str) -> bool {
    let (Some(first), Some(last)) = (name.chars().next(), name.chars().last()) else {
        return false;
    };
    first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric() && name.chars().all(is_name_char)
}

/// Split off a trailing `# comment`; `#` only counts after whitespace
fn split_inline_comment(line: &str) -> (&str, Option<String>) {
    let mut prev_ws = false;
    for (idx, ch) in line.char_indices() {
        if ch == '#' && prev_ws {
            let comment = line[idx + 1..].trim();
            let comment = (!comment.is_empty()).then(|| comment.to_string());
            return (line[..idx].trim_end(), comment);
        }
        prev_ws = ch.is_whitespace();
    }
    (line, None)
}

/// A comment body counts as a disabled requirement only if it carries a version spec
fn parse_disabled(body: &str) -> Option<Requirement> {
    let (decl, comment) = split_inline_comment(body);
    let mut req = parse_requirement(decl).ok()?;
    req.spec.as_ref()?;
    req.comment = comment;
    Some(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_of(req: &Requirement) -> (Operator, &str) {
        let clause = &req.spec.as_ref().unwrap().clauses[0];
        (clause.operator, clause.version.as_str())
    }

    #[test]
    fn test_parse_exact_pin() {
        let req = parse_requirement("fastapi==0.104.1").unwrap();
        assert_eq!(req.name, "fastapi");
        assert!(req.extras.is_empty());
        assert_eq!(spec_of(&req), (Operator::Exact, "0.104.1"));
    }

    #[test]
    fn test_parse_extras() {
        let req = parse_requirement("uvicorn[standard]==0.24.0").unwrap();
        assert_eq!(req.name, "uvicorn");
        assert_eq!(req.extras, vec!["standard".to_string()]);
        assert_eq!(spec_of(&req), (Operator::Exact, "0.24.0"));

        let req = parse_requirement("python-jose[cryptography, extra_two]").unwrap();
        assert_eq!(req.extras, vec!["cryptography", "extra_two"]);
        assert!(req.spec.is_none());
    }

    #[test]
    fn test_parse_minimum_bound() {
        let req = parse_requirement("sqlalchemy>=2.0.25").unwrap();
        assert_eq!(req.name, "sqlalchemy");
        assert_eq!(spec_of(&req), (Operator::AtLeast, "2.0.25"));
    }

    #[test]
    fn test_parse_unconstrained() {
        let req = parse_requirement("httpx").unwrap();
        assert_eq!(req.name, "httpx");
        assert!(req.spec.is_none());
    }

    #[test]
    fn test_parse_multiple_clauses_and_marker() {
        let req = parse_requirement("openai >= 1.3, < 2.0 ; python_version >= '3.8'").unwrap();
        let spec = req.spec.as_ref().unwrap();
        assert_eq!(spec.clauses.len(), 2);
        assert_eq!(spec.clauses[1].operator, Operator::Less);
        assert_eq!(req.marker.as_deref(), Some("python_version >= '3.8'"));
        assert_eq!(req.to_string(), "openai>=1.3,<2.0; python_version >= '3.8'");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_requirement("requests=2.0"),
            Err(ParseErrorKind::InvalidOperator("=".to_string()))
        );
        assert_eq!(
            parse_requirement("requests=="),
            Err(ParseErrorKind::MissingVersion(Operator::Exact))
        );
        assert!(matches!(
            parse_requirement("requests==two"),
            Err(ParseErrorKind::InvalidVersion { .. })
        ));
        assert_eq!(
            parse_requirement("uvicorn[standard==0.24.0"),
            Err(ParseErrorKind::UnterminatedExtras)
        );
        assert!(matches!(parse_requirement("-bad"), Err(ParseErrorKind::InvalidName(_))));
        assert_eq!(parse_requirement("flask>=1.0,"), Err(ParseErrorKind::EmptyClause));
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version(Operator::Exact, "1.0.0rc1"));
        assert!(is_valid_version(Operator::Exact, "2.0.post1"));
        assert!(is_valid_version(Operator::Exact, "1.4.*"));
        assert!(!is_valid_version(Operator::AtLeast, "1.4.*"));
        assert!(is_valid_version(Operator::Compatible, "1.5"));
        assert!(!is_valid_version(Operator::Compatible, "1"));
        assert!(!is_valid_version(Operator::Exact, "1..0"));
        assert!(is_valid_version(Operator::Arbitrary, "foobar"));
    }

    #[test]
    fn test_parse_line_kinds() {
        assert_eq!(parse_line("   ").unwrap(), Line::Blank);
        assert_eq!(
            parse_line("# Database").unwrap(),
            Line::Comment("Database".to_string())
        );
        assert_eq!(
            parse_line("-r base.txt").unwrap(),
            Line::Option {
                raw: "-r base.txt".to_string(),
                comment: None
            }
        );
        assert_eq!(
            parse_line("--index-url https://mirror.example/simple  # internal mirror").unwrap(),
            Line::Option {
                raw: "--index-url https://mirror.example/simple".to_string(),
                comment: Some("internal mirror".to_string())
            }
        );
        match parse_line("psycopg2-binary==2.9.9  # For PostgreSQL").unwrap() {
            Line::Requirement(req) => {
                assert_eq!(req.name, "psycopg2-binary");
                assert_eq!(req.comment.as_deref(), Some("For PostgreSQL"));
            }
            other => panic!("unexpected line {:?}", other),
        }
    }

    #[test]
    fn test_commented_out_requirement() {
        match parse_line("# gunicorn==21.2.0  # WSGI server").unwrap() {
            Line::Disabled(req) => {
                assert_eq!(req.name, "gunicorn");
                assert_eq!(req.comment.as_deref(), Some("WSGI server"));
            }
            other => panic!("unexpected line {:?}", other),
        }
        // prose and bare words stay comments
        assert!(matches!(parse_line("# Server framework").unwrap(), Line::Comment(_)));
        assert!(matches!(parse_line("# redis").unwrap(), Line::Comment(_)));
    }

    #[test]
    fn test_hash_without_whitespace_is_not_a_comment() {
        let (decl, comment) = split_inline_comment("pkg==1.0#frag");
        assert_eq!(decl, "pkg==1.0#frag");
        assert!(comment.is_none());
    }

    #[test]
    fn test_sections_follow_headers() {
        let content = "# Server framework\nfastapi==0.104.1\n# pinned for py3.8\nuvicorn==0.24.0\n\n# Database\nsqlalchemy>=2.0.25\n";
        let manifest = parse_requirements_txt(content).unwrap();
        let sections = manifest.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Server framework");
        assert_eq!(sections[0].requirement_count, 2);
        assert_eq!(sections[1].title, "Database");
        assert_eq!(sections[1].line, 6);
    }

    #[test]
    fn test_repeated_header_titles_stay_separate() {
        let manifest = parse_requirements_txt("# Misc\na==1\n\n# Misc\nb==1\n").unwrap();
        let sections = manifest.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!((sections[0].line, sections[0].requirement_count), (1, 1));
        assert_eq!((sections[1].line, sections[1].requirement_count), (4, 1));
    }

    #[test]
    fn test_banner_header_opens_section() {
        let content = "fastapi==0.104.1\n\n#\n# Database\n#\nsqlalchemy>=2.0.25\n";
        let manifest = parse_requirements_txt(content).unwrap();
        let sections = manifest.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Database");
        assert_eq!(sections[0].line, 4);
        assert_eq!(sections[0].requirement_count, 1);
        assert_eq!(manifest.lines[5].section.as_deref(), Some("Database"));
    }

    #[test]
    fn test_error_carries_line_number() {
        let err = parse_requirements_txt("fastapi==0.104.1\n\nbroken=>1\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: invalid version operator '=>'");
    }
}

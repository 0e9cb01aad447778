use crate::{Error, Report, Result};
use reqlint_deps::{Line, Manifest, Requirement};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(ExportFormat::Text),
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ExportFormat::Text),
            other => ExportFormat::from_extension(other)
                .ok_or_else(|| format!("unknown format '{}', expected text, json, csv or markdown", s)),
        }
    }
}

/// Exporter for manifest reports
pub struct Exporter;

impl Exporter {
    /// Export a report to a file with automatic format detection
    pub fn export_to_file<P: AsRef<Path>>(report: &Report, path: P) -> Result<()> {
        let path = path.as_ref();

        // Detect format from extension
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::ExportError(
                    "Could not determine export format from extension. Use .txt, .json, .csv, or .md"
                        .to_string(),
                )
            })?;

        Self::export_to_file_with_format(report, path, format)
    }

    /// Export a report to a file with explicit format
    pub fn export_to_file_with_format<P: AsRef<Path>>(
        report: &Report,
        path: P,
        format: ExportFormat,
    ) -> Result<()> {
        let content = Self::render(report, format)?;

        let mut file = File::create(path)
            .map_err(|e| Error::ExportError(format!("Failed to create file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| Error::ExportError(format!("Failed to write file: {}", e)))?;

        Ok(())
    }

    pub fn render(report: &Report, format: ExportFormat) -> Result<String> {
        Ok(match format {
            ExportFormat::Text => Self::to_text(report),
            ExportFormat::Json => Self::to_json(report)?,
            ExportFormat::Csv => Self::to_csv(report),
            ExportFormat::Markdown => Self::to_markdown(report),
        })
    }

    pub fn to_json(report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// One row per dependency
    pub fn to_csv(report: &Report) -> String {
        let mut output = String::from("Name,Version,Type,Section,Line\n");

        for dep in &report.summary.dependencies {
            output.push_str(&format!(
                "{},{},{},{},{}\n",
                Self::escape_csv(&dep.name),
                Self::escape_csv(&dep.version),
                dep.dep_type,
                Self::escape_csv(dep.section.as_deref().unwrap_or("")),
                dep.line,
            ));
        }

        output
    }

    pub fn to_markdown(report: &Report) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Dependency Report: {}\n\n", report.source));
        output.push_str(&format!(
            "Generated: {}\n\n",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));
        output.push_str(&format!(
            "**{}** dependencies ({} runtime, {} dev, {} build, {} optional) - {}\n\n",
            report.summary.total_count,
            report.summary.runtime_count,
            report.summary.dev_count,
            report.summary.build_count,
            report.summary.optional_count,
            if report.passed { "passed" } else { "failed" },
        ));

        output.push_str("| Package | Version | Type | Section |\n");
        output.push_str("|---------|---------|------|---------|\n");
        for dep in &report.summary.dependencies {
            output.push_str(&format!(
                "| {} | `{}` | {} | {} |\n",
                dep.name,
                Self::escape_markdown(&dep.version),
                dep.dep_type,
                Self::escape_markdown(dep.section.as_deref().unwrap_or("-")),
            ));
        }

        if !report.issues.is_empty() {
            output.push_str("\n## Issues\n\n");
            for issue in &report.issues {
                output.push_str(&format!(
                    "- line {} **{}**: {}\n",
                    issue.line,
                    issue.severity.label(),
                    issue.kind
                ));
            }
        }

        output
    }

    /// Terminal friendly listing grouped by section
    pub fn to_text(report: &Report) -> String {
        let mut output = String::new();
        let mut current: Option<&str> = None;

        for dep in &report.summary.dependencies {
            let section = dep.section.as_deref();
            if section != current || output.is_empty() {
                if !output.is_empty() {
                    output.push('\n');
                }
                output.push_str(&format!("[{}]\n", section.unwrap_or("unsectioned")));
                current = section;
            }
            output.push_str(&format!("  {:<28} {:<16} {}\n", dep.name, dep.version, dep.dep_type));
        }

        for issue in &report.issues {
            output.push_str(&format!("{}\n", issue));
        }

        output.push_str(&format!(
            "{} dependencies, {} errors, {} warnings\n",
            report.summary.total_count,
            report.error_count(),
            report.warning_count()
        ));

        output
    }

    /// Canonical manifest text: tight spacing, sorted extras, comments kept
    pub fn to_requirements(manifest: &Manifest) -> String {
        let mut output = String::new();

        for line in &manifest.lines {
            match &line.line {
                Line::Blank => {}
                Line::Comment(text) if text.is_empty() => output.push('#'),
                Line::Comment(text) => {
                    output.push_str("# ");
                    output.push_str(text);
                }
                Line::Option { raw, comment } => {
                    output.push_str(raw);
                    if let Some(comment) = comment {
                        output.push_str("  # ");
                        output.push_str(comment);
                    }
                }
                Line::Requirement(req) => output.push_str(&Self::canonical(req)),
                Line::Disabled(req) => {
                    output.push_str("# ");
                    output.push_str(&Self::canonical(req));
                }
            }
            output.push('\n');
        }

        output
    }

    fn canonical(req: &Requirement) -> String {
        let mut req = req.clone();
        req.extras.sort();
        req.extras.dedup();
        match &req.comment {
            Some(comment) => format!("{}  # {}", req, comment),
            None => req.to_string(),
        }
    }

    /// Pipes would otherwise split a table cell
    fn escape_markdown(s: &str) -> String {
        s.replace('|', "\\|")
    }

    /// Escape CSV fields containing special characters
    fn escape_csv(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

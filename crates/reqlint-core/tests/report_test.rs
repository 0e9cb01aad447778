use reqlint_core::{read_manifest, write_manifest, Config, Error, ExportFormat, Exporter, Report};
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = "# Server framework\nfastapi==0.104.1\nuvicorn[standard]==0.24.0\n\n# Database\nsqlalchemy>=2.0.25\n\n# Production deployment\n# gunicorn==21.2.0\n";

fn write_sample(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("requirements.txt");
    fs::write(&path, MANIFEST).unwrap();
    path
}

#[test]
fn test_json_export_roundtrip() {
    let dir = TempDir::new().unwrap();
    let manifest = read_manifest(&write_sample(&dir)).unwrap();
    let report = Report::build("requirements.txt", &manifest, &Config::default());

    let out = dir.path().join("report.json");
    Exporter::export_to_file(&report, &out).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["passed"], true);
    assert_eq!(json["summary"]["total_count"], 4);
    assert_eq!(json["summary"]["optional_count"], 1);
    assert_eq!(json["sections"].as_array().unwrap().len(), 3);
    assert!(json["issues"].as_array().unwrap().is_empty());
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manifest = read_manifest(&write_sample(&dir)).unwrap();
    let report = Report::build("requirements.txt", &manifest, &Config::default());

    let err = Exporter::export_to_file(&report, dir.path().join("report.xml")).unwrap_err();
    assert!(matches!(err, Error::ExportError(_)));

    let out = dir.path().join("report.out");
    Exporter::export_to_file_with_format(&report, &out, ExportFormat::Csv).unwrap();
    assert!(fs::read_to_string(&out).unwrap().starts_with("Name,Version,Type,Section,Line\n"));
}

#[test]
fn test_parse_error_surfaces_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("requirements.txt");
    fs::write(&path, "fastapi==0.104.1\nuvicorn[standard==0.24.0\n").unwrap();

    match read_manifest(&path).unwrap_err() {
        Error::ParseError(err) => assert_eq!(err.line, 2),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_write_manifest_is_canonical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("requirements.txt");
    fs::write(&path, "fastapi == 0.104.1   # web\n").unwrap();

    let manifest = read_manifest(&path).unwrap();
    write_manifest(&path, &manifest).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "fastapi==0.104.1  # web\n");
}

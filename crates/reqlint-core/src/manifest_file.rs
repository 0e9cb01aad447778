use crate::Result;
use reqlint_deps::{parse_requirements_txt, Manifest};
use std::path::Path;
use tracing::info;

/// Read and parse a manifest from disk
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)?;
    let manifest = parse_requirements_txt(&content)?;
    info!(
        path = %path.display(),
        requirements = manifest.requirements().count(),
        "Parsed manifest"
    );
    Ok(manifest)
}

/// Write a manifest back in canonical form
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    std::fs::write(path, crate::Exporter::to_requirements(manifest))?;
    info!(path = %path.display(), "Wrote manifest");
    Ok(())
}

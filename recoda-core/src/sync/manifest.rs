use crate::models::remote::ManifestEntry;
use crate::traits::store::LoadedArtifact;

/// Project local artifacts to the `{filename, created_at}` manifest.
pub fn build_manifest(local: &[LoadedArtifact]) -> Vec<ManifestEntry> {
    local
        .iter()
        .map(|l| ManifestEntry {
            filename: l.artifact.filename.clone(),
            created_at: l.artifact.created_at,
        })
        .collect()
}

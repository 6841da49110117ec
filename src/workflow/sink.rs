use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Kind of artifact the generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Manual,
    Code,
}

impl ArtifactKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Manual => "manual.md",
            ArtifactKind::Code => "code.md",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Manual => "manual",
            ArtifactKind::Code => "code",
        }
    }
}

/// Writes finished artifacts into one directory.
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, kind: ArtifactKind, content: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.dir.join(kind.file_name());
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Saved {} ({} bytes) to {}", kind.label(), content.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_directory_and_writes_file() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::new(dir.path().join("out").join("md"));

        let path = sink.save(ArtifactKind::Manual, "# Manual").unwrap();
        assert_eq!(path, dir.path().join("out").join("md").join("manual.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Manual");
    }

    #[test]
    fn overwrites_previous_artifact() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::new(dir.path());

        sink.save(ArtifactKind::Code, "old").unwrap();
        let path = sink.save(ArtifactKind::Code, "new").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }
}

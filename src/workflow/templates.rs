use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANUAL_PROMPT: &str = "prompts/manual_v1.txt";
pub const CODE_PROMPT: &str = "prompts/code_v1.txt";
pub const MANUAL_EXAMPLE: &str = "template/doc.txt";
pub const CODE_EXAMPLE: &str = "template/code.txt";

const BUILTIN: &[(&str, &str)] = &[
    (
        MANUAL_PROMPT,
        include_str!("../../templates/prompts/manual_v1.txt"),
    ),
    (
        CODE_PROMPT,
        include_str!("../../templates/prompts/code_v1.txt"),
    ),
    (
        MANUAL_EXAMPLE,
        include_str!("../../templates/template/doc.txt"),
    ),
    (CODE_EXAMPLE, include_str!("../../templates/template/code.txt")),
];

/// Read-only prompt and example store. Files under `root` override the
/// copies compiled into the binary.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);

        if path.is_file() {
            debug!("Reading template {}", path.display());
            return fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()));
        }

        Self::builtin(name)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Unknown template '{name}' (looked in {})", self.root.display()))
    }

    pub fn builtin(name: &str) -> Option<&'static str> {
        BUILTIN
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, content)| *content)
    }

    /// Writes the built-in templates under `root`, leaving existing files alone.
    /// Returns the paths that were created.
    pub fn export(&self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        for (name, content) in BUILTIN {
            let path = self.root.join(name);
            if path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }

        info!("Exported {} templates to {}", written.len(), self.root.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn falls_back_to_builtin() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());

        let prompt = store.read(MANUAL_PROMPT).unwrap();
        assert!(prompt.contains("[doc_name]"));
        assert!(prompt.contains("{{example}}"));
    }

    #[test]
    fn file_on_disk_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("prompts")).unwrap();
        fs::write(dir.path().join(CODE_PROMPT), "custom {{example}}").unwrap();

        let store = TemplateStore::new(dir.path());
        assert_eq!(store.read(CODE_PROMPT).unwrap(), "custom {{example}}");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        assert!(store.read("prompts/missing.txt").is_err());
    }

    #[test]
    fn export_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("template")).unwrap();
        fs::write(dir.path().join(MANUAL_EXAMPLE), "mine").unwrap();

        let store = TemplateStore::new(dir.path());
        let written = store.export().unwrap();

        assert_eq!(written.len(), BUILTIN.len() - 1);
        assert_eq!(fs::read_to_string(dir.path().join(MANUAL_EXAMPLE)).unwrap(), "mine");
        assert!(dir.path().join(CODE_PROMPT).is_file());
        assert!(store.export().unwrap().is_empty());
    }
}

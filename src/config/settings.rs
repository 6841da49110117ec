use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::{ChatModel, SamplingOptions};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub deepseek: DeepSeekConfig,
    pub ollama: OllamaConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DeepSeekConfig {
    pub base_url: String,
    pub model: ChatModel,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub top_p: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Model used for code generation
    pub model: String,
    /// Model used for interactive chat
    pub chat_model: String,
    pub timeout_secs: u64,
    pub top_p: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub use_colors: bool,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: ChatModel::DeepseekReasoner,
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            timeout_secs: 600,
            max_tokens: 8192 * 3,
            temperature: 0.7,
            presence_penalty: 0.5,
            frequency_penalty: 0.3,
            top_p: 0.95,
        }
    }
}

impl DeepSeekConfig {
    pub fn sampling(&self) -> SamplingOptions {
        SamplingOptions {
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            presence_penalty: Some(self.presence_penalty),
            frequency_penalty: Some(self.frequency_penalty),
            top_p: Some(self.top_p),
        }
    }

    /// Reads the API key from the configured environment variable.
    /// Unset reads as empty; the client rejects empty keys itself.
    pub fn api_key(&self) -> String {
        std::env::var(&self.api_key_env).unwrap_or_default()
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "deepseek-coder:6.7b".to_string(),
            chat_model: "deepseek-r1:7b".to_string(),
            timeout_secs: 60,
            top_p: 0.9,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let templates_dir = Settings::softgen_dir()
            .map(|dir| dir.join("templates"))
            .unwrap_or_else(|_| PathBuf::from(".softgen/templates"));

        Self {
            templates_dir,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

impl Settings {
    /// Loads `~/.softgen/config.toml`, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading settings from {}", path.display());
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let settings: Settings = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            Ok(settings)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    pub fn softgen_dir() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;

        Ok(home_dir.join(".softgen"))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::softgen_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.deepseek.model, ChatModel::DeepseekReasoner);
        assert_eq!(settings.deepseek.max_tokens, 24576);
        assert_eq!(settings.ollama.base_url, "http://localhost:11434");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[deepseek]\nmodel = \"deepseek-chat\"\ntimeout_secs = 5\n\n[output]\nuse_colors = false\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.deepseek.model, ChatModel::DeepseekChat);
        assert_eq!(settings.deepseek.timeout_secs, 5);
        assert_eq!(settings.deepseek.api_key_env, "DEEPSEEK_API_KEY");
        assert!(!settings.output.use_colors);
        assert_eq!(settings.ollama.model, "deepseek-coder:6.7b");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.ollama.chat_model = "llama3".to_string();
        settings.paths.output_dir = PathBuf::from("out");
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.ollama.chat_model, "llama3");
        assert_eq!(loaded.paths.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[deepseek\nmodel = ").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn sampling_carries_all_options() {
        let sampling = DeepSeekConfig::default().sampling();
        assert_eq!(sampling.max_tokens, Some(24576));
        assert_eq!(sampling.top_p, Some(0.95));
    }
}

use crate::config::Settings;

pub struct DefaultConfig;

impl DefaultConfig {
    /// Commented config written by `softgen init`.
    pub fn create_default_config_file() -> String {
        r#"# softgen configuration

[deepseek]
base_url = "https://api.deepseek.com/v1"
# 0 / deepseek-chat, 1 / deepseek-reasoner
model = "deepseek-reasoner"
# The API key is read from this environment variable
api_key_env = "DEEPSEEK_API_KEY"
timeout_secs = 600
max_tokens = 24576
temperature = 0.7
presence_penalty = 0.5
frequency_penalty = 0.3
top_p = 0.95

[ollama]
base_url = "http://localhost:11434"
model = "deepseek-coder:6.7b"
chat_model = "deepseek-r1:7b"
timeout_secs = 60
top_p = 0.9

[paths]
# templates_dir = "~/.softgen/templates"
output_dir = "."

[output]
use_colors = true
"#
        .to_string()
    }

    pub fn get_default_settings() -> Settings {
        Settings::default()
    }
}

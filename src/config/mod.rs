pub mod defaults;
pub mod settings;

pub use defaults::DefaultConfig;
pub use settings::{DeepSeekConfig, OllamaConfig, OutputConfig, PathsConfig, Settings};

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::cli::{CodeCommand, Commands, OutputFormatter, Spinner};
use crate::config::{DefaultConfig, Settings};
use crate::llm::{
    ChatModel, CodeRequest, Conversation, DeepSeekClient, LlmError, OllamaClient, ResponseParser,
};
use crate::workflow::{ArtifactGenerator, GenerateTarget, OutputSink, TemplateStore};

pub struct CommandHandler {
    settings: Settings,
    config_path: PathBuf,
    formatter: OutputFormatter,
}

impl CommandHandler {
    /// Loads settings from `config_path`, or `~/.softgen/config.toml` when `None`.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => Settings::default_config_path()?,
        };
        let settings = Settings::load_from(&config_path)?;
        let formatter = OutputFormatter::new(settings.output.use_colors);

        Ok(Self {
            settings,
            config_path,
            formatter,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn handle_command(
        &self,
        command: Commands,
        cancel: &CancellationToken,
    ) -> Result<String> {
        match command {
            Commands::Gen {
                name,
                target,
                model,
                output,
            } => self.handle_gen(&name, target, model, output, cancel).await,
            Commands::Ask {
                prompt,
                json,
                stream,
                model,
            } => self.handle_ask(&prompt, json, stream, model, cancel).await,
            Commands::Code {
                task,
                language,
                output,
            } => self.handle_code(task, &language, output.as_deref()).await,
            Commands::Chat { system } => self.handle_chat(system).await,
            Commands::Init => self.handle_init(),
            Commands::Config => self.handle_config(),
            Commands::Doctor => self.handle_doctor().await,
            Commands::Models => self.handle_models().await,
            Commands::Version => self.handle_version(),
        }
    }

    fn deepseek_client(&self) -> Result<DeepSeekClient> {
        let config = &self.settings.deepseek;
        DeepSeekClient::new(config, config.api_key()).context("Failed to create DeepSeek client")
    }

    fn ollama_client(&self) -> Result<OllamaClient> {
        OllamaClient::new(&self.settings.ollama).context("Failed to create Ollama client")
    }

    // ========================================================================
    // DeepSeek Workflows
    // ========================================================================

    async fn handle_gen(
        &self,
        name: &str,
        target: GenerateTarget,
        model: Option<ChatModel>,
        output: Option<PathBuf>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let client = self.deepseek_client()?;
        let model = model.unwrap_or(self.settings.deepseek.model);
        let templates = TemplateStore::new(&self.settings.paths.templates_dir);
        let sink = OutputSink::new(output.unwrap_or_else(|| self.settings.paths.output_dir.clone()));
        let generator = ArtifactGenerator::new(&client, templates, sink, model);

        let mut messages = Vec::new();
        for kind in target.kinds() {
            let spinner = Spinner::new(&format!(
                "Generating {} for {name} with {model}...",
                kind.label()
            ));
            let result = generator.generate_one(*kind, name, cancel).await;
            spinner.stop();

            let path = result?;
            messages.push(self.formatter.format_success(&format!(
                "{} saved to {}",
                kind.label(),
                path.display()
            )));
        }

        Ok(messages.join("\n"))
    }

    async fn handle_ask(
        &self,
        prompt: &str,
        json: bool,
        stream: bool,
        model: Option<ChatModel>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let client = self.deepseek_client()?;
        let model = model.unwrap_or(self.settings.deepseek.model);

        let spinner = Spinner::new(&format!("Waiting for {model}..."));
        let result = if stream {
            client.chat_stream(prompt, model, cancel).await
        } else {
            client.chat(prompt, model, cancel).await
        };
        spinner.stop();

        let answer = result?;
        if answer.trim().is_empty() {
            return Err(LlmError::EmptyResult.into());
        }

        if json {
            let value = ResponseParser::new().parse_json_payload(&answer)?;
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        Ok(answer)
    }

    // ========================================================================
    // Ollama Workflows
    // ========================================================================

    async fn handle_code(
        &self,
        task: CodeCommand,
        language: &str,
        output: Option<&Path>,
    ) -> Result<String> {
        let client = self.ollama_client()?;
        let request = CodeRequest::new(task.into(), language);

        let spinner = Spinner::new(&format!(
            "Generating {} with {}...",
            request.task.kind(),
            client.model_name()
        ));
        let result = client.generate_code(&request).await;
        spinner.stop();

        let code = result.with_context(|| {
            format!(
                "Code generation failed. Is Ollama running at {} with {} pulled?",
                client.base_url(),
                client.model_name()
            )
        })?;

        match output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, format!("{code}\n"))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Ok(self
                    .formatter
                    .format_success(&format!("Code written to {}", path.display())))
            }
            None => Ok(code),
        }
    }

    async fn handle_chat(&self, system: Option<String>) -> Result<String> {
        let client = self.ollama_client()?;
        client
            .verify_connection()
            .await
            .context("Ollama service not available. Make sure Ollama is installed and running")?;

        let mut conversation = match system {
            Some(prompt) => Conversation::with_system(prompt),
            None => Conversation::new(),
        };

        println!(
            "{}",
            self.formatter
                .format_info("Type /reset to forget the conversation, /exit to quit")
        );

        loop {
            let input: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("you")
                .allow_empty(true)
                .interact_text()?;
            let input = input.trim();

            match input {
                "" => continue,
                "/exit" | "/quit" => break,
                "/reset" => {
                    conversation.reset();
                    println!("{}", self.formatter.format_info("Conversation cleared"));
                    continue;
                }
                _ => {}
            }

            let spinner = Spinner::new("Thinking...");
            let result = conversation.ask(&client, input).await;
            spinner.stop();

            match result {
                Ok(reply) => println!("{}\n", self.formatter.format_reply("ai", reply.trim())),
                Err(e) => {
                    warn!("Chat turn failed: {e}");
                    eprintln!("{}", self.formatter.format_error(&e.to_string()));
                }
            }
        }

        Ok(format!("Conversation ended after {} turns", conversation.turns()))
    }

    // ========================================================================
    // Setup and Diagnostics
    // ========================================================================

    fn handle_init(&self) -> Result<String> {
        info!("Initializing softgen");
        let mut messages = Vec::new();

        if self.config_path.exists() {
            messages.push(self.formatter.format_info(&format!(
                "Config already exists at {}",
                self.config_path.display()
            )));
        } else {
            if let Some(parent) = self.config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.config_path, DefaultConfig::create_default_config_file())
                .with_context(|| format!("Failed to write {}", self.config_path.display()))?;
            messages.push(self.formatter.format_success(&format!(
                "Wrote config to {}",
                self.config_path.display()
            )));
        }

        let store = TemplateStore::new(&self.settings.paths.templates_dir);
        let written = store.export()?;
        messages.push(self.formatter.format_success(&format!(
            "Exported {} templates to {}",
            written.len(),
            store.root().display()
        )));

        Ok(messages.join("\n"))
    }

    fn handle_config(&self) -> Result<String> {
        let deepseek = &self.settings.deepseek;
        let ollama = &self.settings.ollama;
        let paths = &self.settings.paths;
        let key_state = if deepseek.api_key().trim().is_empty() {
            "unset"
        } else {
            "set"
        };

        Ok(format!(
            "{}\n\
            - Config file: {}\n\
            - DeepSeek URL: {}\n\
            - DeepSeek model: {}\n\
            - API key (${}): {}\n\
            - Ollama URL: {}\n\
            - Ollama code model: {}\n\
            - Ollama chat model: {}\n\
            - Templates: {}\n\
            - Output directory: {}\n\
            - Use colors: {}",
            self.formatter.format_heading("softgen configuration:"),
            self.config_path.display(),
            deepseek.base_url,
            deepseek.model,
            deepseek.api_key_env,
            key_state,
            ollama.base_url,
            ollama.model,
            ollama.chat_model,
            paths.templates_dir.display(),
            paths.output_dir.display(),
            self.settings.output.use_colors
        ))
    }

    async fn handle_doctor(&self) -> Result<String> {
        let spinner = Spinner::new("Running diagnostics...");
        let mut diagnostics = Vec::new();

        diagnostics.push(self.formatter.format_check(
            self.config_path.exists(),
            &format!("Config file {}", self.config_path.display()),
        ));

        let deepseek = &self.settings.deepseek;
        diagnostics.push(self.formatter.format_check(
            !deepseek.api_key().trim().is_empty(),
            &format!("DeepSeek API key in ${}", deepseek.api_key_env),
        ));

        let templates_dir = &self.settings.paths.templates_dir;
        diagnostics.push(if templates_dir.is_dir() {
            self.formatter
                .format_check(true, &format!("Templates at {}", templates_dir.display()))
        } else {
            self.formatter.format_info(&format!(
                "No templates at {}, using built-ins (run: softgen init)",
                templates_dir.display()
            ))
        });

        let client = self.ollama_client()?;
        match client.list_models().await {
            Ok(models) => {
                diagnostics.push(
                    self.formatter
                        .format_check(true, &format!("Ollama service at {}", client.base_url())),
                );
                let available = models.iter().any(|m| m == client.model_name());
                diagnostics.push(self.formatter.format_check(
                    available,
                    &format!("Model {} pulled", client.model_name()),
                ));
            }
            Err(e) => {
                debug!("Ollama check failed: {e}");
                diagnostics.push(
                    self.formatter
                        .format_check(false, &format!("Ollama service: {e}")),
                );
            }
        }

        spinner.stop();
        Ok(format!(
            "{}\n{}",
            self.formatter.format_heading("softgen health check:"),
            diagnostics.join("\n")
        ))
    }

    async fn handle_models(&self) -> Result<String> {
        let client = self.ollama_client()?;
        let models = client
            .list_models()
            .await
            .with_context(|| format!("Failed to list models at {}", client.base_url()))?;

        if models.is_empty() {
            return Ok(self.formatter.format_warning("No models installed"));
        }
        Ok(models.join("\n"))
    }

    fn handle_version(&self) -> Result<String> {
        Ok(format!(
            "softgen {}\nRust version: {}\nPlatform: {}-{}",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    pub fn format_error(&self, message: &str) -> String {
        self.formatter.format_error(message)
    }
}

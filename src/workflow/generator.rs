use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::llm::{ChatModel, DeepSeekClient, LlmError, PromptBuilder};
use crate::workflow::sink::{ArtifactKind, OutputSink};
use crate::workflow::templates::{
    TemplateStore, CODE_EXAMPLE, CODE_PROMPT, MANUAL_EXAMPLE, MANUAL_PROMPT,
};

/// What `softgen gen` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenerateTarget {
    Manual,
    Code,
    All,
}

impl GenerateTarget {
    /// Artifacts in generation order.
    pub fn kinds(&self) -> &'static [ArtifactKind] {
        match self {
            GenerateTarget::Manual => &[ArtifactKind::Manual],
            GenerateTarget::Code => &[ArtifactKind::Code],
            GenerateTarget::All => &[ArtifactKind::Manual, ArtifactKind::Code],
        }
    }
}

/// Template -> prompt -> streamed completion -> file.
pub struct ArtifactGenerator<'a> {
    client: &'a DeepSeekClient,
    templates: TemplateStore,
    sink: OutputSink,
    prompts: PromptBuilder,
    model: ChatModel,
}

impl<'a> ArtifactGenerator<'a> {
    pub fn new(
        client: &'a DeepSeekClient,
        templates: TemplateStore,
        sink: OutputSink,
        model: ChatModel,
    ) -> Self {
        Self {
            client,
            templates,
            sink,
            prompts: PromptBuilder::new(),
            model,
        }
    }

    pub fn model(&self) -> ChatModel {
        self.model
    }

    /// Produces every artifact of `target`; the first failure aborts the rest.
    pub async fn generate(
        &self,
        target: GenerateTarget,
        software_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        for kind in target.kinds() {
            saved.push(self.generate_one(*kind, software_name, cancel).await?);
        }
        Ok(saved)
    }

    pub async fn generate_one(
        &self,
        kind: ArtifactKind,
        software_name: &str,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        info!("Generating {} for '{software_name}'", kind.label());

        let prompt = self.build_prompt(kind, software_name)?;
        debug!("Built {} prompt, {} bytes", kind.label(), prompt.len());

        let text = self
            .client
            .chat_stream(&prompt, self.model, cancel)
            .await
            .with_context(|| format!("Failed to generate {}", kind.label()))?;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResult)
                .with_context(|| format!("Failed to generate {}", kind.label()));
        }

        self.sink.save(kind, &text)
    }

    pub fn build_prompt(&self, kind: ArtifactKind, software_name: &str) -> Result<String> {
        match kind {
            ArtifactKind::Manual => {
                let template = self.templates.read(MANUAL_PROMPT)?;
                let example = self.templates.read(MANUAL_EXAMPLE)?;
                Ok(self
                    .prompts
                    .build_manual_prompt(&template, &example, software_name))
            }
            ArtifactKind::Code => {
                let template = self.templates.read(CODE_PROMPT)?;
                let example = self.templates.read(CODE_EXAMPLE)?;
                Ok(self.prompts.build_code_prompt(&template, &example))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeepSeekConfig;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir) -> (DeepSeekClient, TemplateStore, OutputSink) {
        let client = DeepSeekClient::new(&DeepSeekConfig::default(), "").unwrap();
        let templates = TemplateStore::new(dir.path().join("templates"));
        let sink = OutputSink::new(dir.path().join("out"));
        (client, templates, sink)
    }

    #[test]
    fn all_generates_manual_then_code() {
        assert_eq!(
            GenerateTarget::All.kinds(),
            &[ArtifactKind::Manual, ArtifactKind::Code]
        );
    }

    #[test]
    fn manual_prompt_uses_name_and_example() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("templates/prompts")).unwrap();
        fs::create_dir_all(dir.path().join("templates/template")).unwrap();
        fs::write(
            dir.path().join("templates").join(MANUAL_PROMPT),
            "Manual of [doc_name]: {{example}}",
        )
        .unwrap();
        fs::write(dir.path().join("templates").join(MANUAL_EXAMPLE), "EXAMPLE").unwrap();

        let (client, templates, sink) = fixture(&dir);
        let generator = ArtifactGenerator::new(&client, templates, sink, ChatModel::DeepseekChat);

        let prompt = generator.build_prompt(ArtifactKind::Manual, "Snake").unwrap();
        assert_eq!(prompt, "Manual of Snake: EXAMPLE");
    }

    #[tokio::test]
    async fn missing_credential_aborts_without_writing() {
        let dir = TempDir::new().unwrap();
        let (client, templates, sink) = fixture(&dir);
        let generator = ArtifactGenerator::new(&client, templates, sink, ChatModel::DeepseekChat);

        let err = generator
            .generate(GenerateTarget::All, "Snake", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LlmError>(),
            Some(LlmError::MissingCredential(_))
        ));
        assert!(!dir.path().join("out").exists());
    }
}

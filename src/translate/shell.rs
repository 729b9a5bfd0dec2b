use async_trait::async_trait;
use tracing::{debug, info};

use super::{TransCommandBuilder, Translator};
use crate::config::{TranslationDirection, TranslatorConfig};
use crate::error::{Result, SubtransError};

/// Translator backed by the translate-shell command line utility
pub struct TransTranslator {
    config: TranslatorConfig,
    command_builder: TransCommandBuilder,
}

impl TransTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        let command_builder = TransCommandBuilder::new(config.clone());

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl Translator for TransTranslator {
    async fn translate(&self, text: &str, direction: &TranslationDirection) -> Result<String> {
        let command = self.command_builder.translate(text, direction);
        let output = command.output(self.config.use_shell).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(SubtransError::ExternalTool(format!(
                "{} failed ({}): {}",
                command.description,
                output.status,
                stderr.trim()
            )));
        }

        if self.config.fail_on_stderr && !stderr.trim().is_empty() {
            return Err(SubtransError::ExternalTool(format!(
                "{} reported: {}",
                command.description,
                stderr.trim()
            )));
        }

        let translated = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if translated.is_empty() {
            return Err(SubtransError::ExternalTool(format!(
                "{} produced no output",
                command.description
            )));
        }

        debug!("Translated {:?} -> {:?}", text, translated);
        Ok(translated)
    }

    async fn check_availability(&self) -> Result<()> {
        let output = self
            .command_builder
            .version_check()
            .output(self.config.use_shell)
            .await?;

        if output.status.success() {
            info!("{} is available", self.config.binary_path);
            Ok(())
        } else {
            Err(SubtransError::ExternalTool(format!(
                "{} version check failed",
                self.config.binary_path
            )))
        }
    }
}

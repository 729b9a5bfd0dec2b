// Translation backends
//
// The pipeline only sees the `Translator` trait, so tests can swap the
// external utility for a deterministic fake:
// - Command: builder for translate-shell invocations
// - Shell: translate-shell (`trans`) backed implementation

pub mod command;
pub mod shell;

use async_trait::async_trait;

pub use command::*;
pub use shell::*;

use crate::config::{TranslationDirection, TranslatorConfig};
use crate::error::Result;

/// Translates a single subtitle line
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one line, failing with `SubtransError::ExternalTool`
    async fn translate(&self, text: &str, direction: &TranslationDirection) -> Result<String>;

    /// Check that the backend can be reached at all
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the default translator (translate-shell)
    pub fn create_translator(config: TranslatorConfig) -> Box<dyn Translator> {
        Box::new(shell::TransTranslator::new(config))
    }
}

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, TranslationDirection};
use crate::error::{Result, SubtransError};
use crate::progress::ProgressMode;

/// Usage guidance printed with argument errors
pub const USAGE_HINT: &str = "\
Usage: subtrans <FILE.srt> [from:to]
Example: subtrans movie.srt en:fr   translate from English to French
Default direction: en:ru";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How progress is shown
    #[arg(long, value_enum, default_value_t = ProgressMode::Auto)]
    pub progress: ProgressMode,

    /// SubRip file to translate in place
    pub file: Option<PathBuf>,

    /// Translation direction as `from:to`, e.g. `en:fr`
    pub direction: Option<String>,
}

/// Validated arguments for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub file: PathBuf,
    pub direction: TranslationDirection,
}

impl Args {
    /// Check the positional arguments, falling back to the configured direction
    pub fn request(&self, config: &Config) -> Result<Request> {
        let file = self
            .file
            .clone()
            .ok_or_else(|| SubtransError::Usage("no subtitle file given".to_string()))?;

        let direction = match &self.direction {
            Some(token) => token.parse::<TranslationDirection>()?,
            None => config.default_direction()?,
        };

        Ok(Request { file, direction })
    }
}
